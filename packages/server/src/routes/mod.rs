use axum::Router;
use axum::routing::get;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

/// JSON API, mounted under `/api`.
pub fn api_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(song_routes())
        .merge(file_routes(config))
}

fn song_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::song::list_songs,
            handlers::song::create_song
        ))
        .routes(routes!(handlers::song::get_song))
        .routes(routes!(handlers::song::get_song_analysis))
}

fn file_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::file::upload_file))
        .layer(handlers::file::upload_body_limit(
            config.storage.max_upload_size,
        ))
}

/// Raw downloads of stored uploads.
pub fn upload_routes() -> Router<AppState> {
    Router::new().route("/uploads/{filename}", get(handlers::file::download_upload))
}
