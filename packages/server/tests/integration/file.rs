use reqwest::multipart::{Form, Part};
use serde_json::json;

use crate::common::{TestApp, routes};

mod upload {
    use super::*;

    #[tokio::test]
    async fn stores_file_and_returns_record() {
        let app = TestApp::spawn().await;

        let res = app.upload("test.txt", b"File contents").await;

        assert_eq!(res.status, 201);
        assert!(res.is_json());
        assert_eq!(
            res.body,
            json!({"id": 1, "filename": "test.txt", "path": "/uploads/test.txt"})
        );

        let on_disk = std::fs::read(app.upload_dir.join("test.txt")).unwrap();
        assert_eq!(on_disk, b"File contents");
    }

    #[tokio::test]
    async fn assigns_increasing_ids() {
        let app = TestApp::spawn().await;

        let first = app.upload("a.mp3", b"a").await;
        let second = app.upload("b.mp3", b"b").await;

        assert_eq!(first.body["id"], 1);
        assert_eq!(second.body["id"], 2);
    }

    #[tokio::test]
    async fn sanitizes_filename() {
        let app = TestApp::spawn().await;

        let res = app.upload("my song.mp3", b"ID3").await;
        assert_eq!(res.status, 201);
        assert_eq!(res.body["filename"], "my_song.mp3");
        assert_eq!(res.body["path"], "/uploads/my_song.mp3");

        let res = app.upload("../../escape.txt", b"nope").await;
        assert_eq!(res.status, 201);
        assert_eq!(res.body["filename"], "escape.txt");
        assert!(app.upload_dir.join("escape.txt").exists());
    }

    #[tokio::test]
    async fn accented_letters_keep_their_base_letter() {
        let app = TestApp::spawn().await;

        let res = app.upload("Beyonc\u{e9} - Halo.mp3", b"ID3").await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["filename"], "Beyonce_-_Halo.mp3");
        assert!(app.upload_dir.join("Beyonce_-_Halo.mp3").exists());
    }

    #[tokio::test]
    async fn overlong_filename_is_rejected_before_writing() {
        let app = TestApp::spawn().await;
        let name = format!("{}.mp3", "a".repeat(130));

        let res = app.upload(&name, b"ID3").await;

        assert_eq!(res.status, 422);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(res.message(), "Filename must be at most 128 characters");
        assert!(!app.upload_dir.join(&name).exists());
    }

    #[tokio::test]
    async fn longest_allowed_filename_is_stored() {
        let app = TestApp::spawn().await;
        let name = format!("{}.mp3", "b".repeat(124));

        let res = app.upload(&name, b"ID3").await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["filename"], name.as_str());
    }

    #[tokio::test]
    async fn empty_filename_counts_as_no_file() {
        let app = TestApp::spawn().await;

        let part = Part::bytes(Vec::new()).file_name("");
        let form = Form::new().part("file", part);
        let res = app.post_form(routes::FILES, form).await;

        assert_eq!(res.status, 422);
        assert_eq!(res.body["code"], "MISSING_UPLOAD");
        assert_eq!(res.message(), "Could not find file data");
    }

    #[tokio::test]
    async fn unusable_filename_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.upload("...", b"data").await;

        assert_eq!(res.status, 422);
        assert_eq!(res.message(), "Invalid filename");
    }

    #[tokio::test]
    async fn missing_file_field_is_unprocessable() {
        let app = TestApp::spawn().await;

        let form = Form::new().text("title", "no file here");
        let res = app.post_form(routes::FILES, form).await;

        assert_eq!(res.status, 422);
        assert_eq!(res.body["code"], "MISSING_UPLOAD");
        assert_eq!(res.message(), "Could not find file data");
    }

    #[tokio::test]
    async fn file_field_under_other_name_is_ignored() {
        let app = TestApp::spawn().await;

        let part = Part::bytes(b"data".to_vec()).file_name("song.mp3");
        let form = Form::new().part("attachment", part);
        let res = app.post_form(routes::FILES, form).await;

        assert_eq!(res.status, 422);
        assert_eq!(res.message(), "Could not find file data");
    }

    #[tokio::test]
    async fn same_name_overwrites_previous_bytes() {
        let app = TestApp::spawn().await;

        let first = app.upload("take.wav", b"first").await;
        let second = app.upload("take.wav", b"second").await;
        assert_eq!(first.status, 201);
        assert_eq!(second.status, 201);
        assert_ne!(first.body["id"], second.body["id"]);

        let res = app.get_raw(&routes::upload("take.wav")).await;
        assert_eq!(res.bytes, b"second");
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected() {
        let app = TestApp::spawn().await;

        let big = vec![0u8; 1024 * 1024 + 1];
        let res = app.upload("big.wav", &big).await;

        assert_eq!(res.status, 422);
        assert!(!app.upload_dir.join("big.wav").exists());
    }

    #[tokio::test]
    async fn non_multipart_body_is_unsupported() {
        let app = TestApp::spawn().await;

        let res = app
            .post_json(routes::FILES, &json!({"file": "test.txt"}))
            .await;

        assert_eq!(res.status, 415);
        assert_eq!(res.message(), "Request must contain multipart/form-data data");
    }
}

mod download {
    use super::*;

    #[tokio::test]
    async fn returns_uploaded_bytes() {
        let app = TestApp::spawn().await;
        let upload = app.upload("test.txt", b"File contents").await;
        let path = upload.body["path"].as_str().unwrap().to_string();

        let res = app.get_raw(&path).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.bytes, b"File contents");
        assert!(
            res.content_type
                .as_deref()
                .is_some_and(|ct| ct.starts_with("text/plain"))
        );
    }

    #[tokio::test]
    async fn binary_content_round_trips() {
        let app = TestApp::spawn().await;
        let bytes: Vec<u8> = (0..=255).cycle().take(4096).collect();
        app.upload("tone.mp3", &bytes).await;

        let res = app.get_raw(&routes::upload("tone.mp3")).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.bytes, bytes);
        assert_eq!(res.content_type.as_deref(), Some("audio/mpeg"));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get_raw(&routes::upload("nothing.mp3")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.message(), "Could not find uploaded file nothing.mp3");
    }

    #[tokio::test]
    async fn hidden_names_are_not_served() {
        let app = TestApp::spawn().await;

        let res = app.get_raw(&routes::upload(".tmp")).await;

        assert_eq!(res.status, 404);
    }
}
