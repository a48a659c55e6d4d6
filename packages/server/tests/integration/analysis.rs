use serde_json::json;

use chords_server::config::ResolutionMode;

use crate::common::{TestAnalyser, TestApp, routes};

mod direct {
    use super::*;

    #[tokio::test]
    async fn analyses_the_uploaded_file() {
        let app = TestApp::spawn().await;
        let upload = app.upload("song.mp3", b"ID3 fake audio").await;
        let file_id = upload.body["id"].as_i64().unwrap();
        app.post_json(routes::SONGS, &json!({"id": 1, "file": {"id": file_id}}))
            .await;

        let res = app.get_json(&routes::song_analysis(1)).await;

        assert_eq!(res.status, 200);
        assert!(res.is_json());
        assert_eq!(res.body["filename"], "song.mp3");
        assert_eq!(res.body["chords"][1]["chord"], "G");
        assert_eq!(app.analysed_paths(), vec![app.upload_dir.join("song.mp3")]);
    }

    #[tokio::test]
    async fn unknown_song_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get_json(&routes::song_analysis(5)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.message(), "Could not find song with id 5");
        assert!(app.analysed_paths().is_empty());
    }

    #[tokio::test]
    async fn ids_beyond_stored_range_are_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get_json("/api/songs/99999999999/analysis").await;
        assert_eq!(res.status, 404);
        assert_eq!(res.message(), "Could not find song with id 99999999999");

        let res = app.get_json("/api/songs/abc/analysis").await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
        assert!(app.analysed_paths().is_empty());
    }

    #[tokio::test]
    async fn looks_up_file_by_id_regardless_of_position() {
        let app = TestApp::spawn().await;
        app.seed_file(2, "two.mp3").await;
        app.seed_file(3, "three.mp3").await;
        app.seed_file(4, "four.mp3").await;
        app.seed_song(1, 2).await;

        let res = app.get_json(&routes::song_analysis(1)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["filename"], "two.mp3");
    }

    #[tokio::test]
    async fn reference_past_file_count_resolves_by_id() {
        let app = TestApp::spawn().await;
        app.seed_file(1, "one.mp3").await;
        app.seed_file(5, "five.mp3").await;
        app.seed_song(1, 5).await;

        let res = app.get_json(&routes::song_analysis(1)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["filename"], "five.mp3");
    }

    #[tokio::test]
    async fn rejects_clients_that_do_not_accept_json() {
        let app = TestApp::spawn().await;

        let res = app
            .get_with_accept(&routes::song_analysis(1), "audio/mpeg")
            .await;

        assert_eq!(res.status, 406);
    }
}

mod positional {
    use super::*;

    async fn spawn() -> TestApp {
        TestApp::spawn_with(ResolutionMode::Positional, TestAnalyser::Recording).await
    }

    #[tokio::test]
    async fn gap_free_table_resolves_first_file() {
        let app = spawn().await;
        app.seed_file(1, "FileA.mp3").await;
        app.seed_file(2, "FileB.mp3").await;
        app.seed_file(3, "FileC.mp3").await;
        app.seed_song(1, 1).await;
        app.seed_song(2, 3).await;

        let res = app.get_json(&routes::song_analysis(1)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["filename"], "FileA.mp3");

        let res = app.get_json(&routes::song_analysis(2)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["filename"], "FileC.mp3");
    }

    #[tokio::test]
    async fn diverging_ids_resolve_a_different_file() {
        let app = spawn().await;
        app.seed_file(2, "two.mp3").await;
        app.seed_file(3, "three.mp3").await;
        app.seed_file(4, "four.mp3").await;
        // ids[1] = 3, then position 2 holds file 4.
        app.seed_song(1, 2).await;

        let res = app.get_json(&routes::song_analysis(1)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["filename"], "four.mp3");
    }

    #[tokio::test]
    async fn reference_past_file_count_is_a_server_error() {
        let app = spawn().await;
        app.seed_file(1, "one.mp3").await;
        app.seed_file(5, "five.mp3").await;
        app.seed_song(1, 5).await;

        let res = app.get_json(&routes::song_analysis(1)).await;

        assert_eq!(res.status, 500);
        assert_eq!(res.body["code"], "FILE_RESOLUTION_FAILED");
        assert_eq!(
            res.message(),
            "Could not resolve file reference 5: position 4 is out of range for 2 files"
        );
        assert!(app.analysed_paths().is_empty());
    }

    #[tokio::test]
    async fn candidate_past_file_count_is_a_server_error() {
        let app = spawn().await;
        app.seed_file(2, "two.mp3").await;
        app.seed_file(3, "three.mp3").await;
        app.seed_song(1, 2).await;

        let res = app.get_json(&routes::song_analysis(1)).await;

        assert_eq!(res.status, 500);
        assert_eq!(res.body["code"], "FILE_RESOLUTION_FAILED");
    }

    #[tokio::test]
    async fn unknown_song_is_still_not_found() {
        let app = spawn().await;
        app.seed_file(1, "one.mp3").await;

        let res = app.get_json(&routes::song_analysis(1)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.message(), "Could not find song with id 1");
    }
}

mod probe {
    use super::*;

    async fn spawn() -> TestApp {
        TestApp::spawn_with(ResolutionMode::Direct, TestAnalyser::Probe).await
    }

    #[tokio::test]
    async fn reports_file_facts() {
        let app = spawn().await;
        app.upload("hello.mp3", b"hello world").await;
        app.post_json(routes::SONGS, &json!({"id": 1, "file": {"id": 1}}))
            .await;

        let res = app.get_json(&routes::song_analysis(1)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["filename"], "hello.mp3");
        assert_eq!(res.body["extension"], "mp3");
        assert_eq!(res.body["content_type"], "audio/mpeg");
        assert_eq!(res.body["size"], 11);
        assert_eq!(
            res.body["sha256"],
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[tokio::test]
    async fn missing_bytes_are_not_found() {
        let app = spawn().await;
        app.seed_file(1, "ghost.mp3").await;
        app.seed_song(1, 1).await;

        let res = app.get_json(&routes::song_analysis(1)).await;

        assert_eq!(res.status, 404);
        assert_eq!(
            res.message(),
            "Could not find the uploaded audio for this song"
        );
    }
}
