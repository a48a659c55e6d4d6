use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use sea_orm::TransactionTrait;
use serde_json::Value;
use tracing::{info, instrument};

use crate::analysis::AnalysisResult;
use crate::error::{AppError, ErrorBody};
use crate::extractors::accept::AcceptsJson;
use crate::extractors::json::AppJson;
use crate::extractors::path::AppPath;
use crate::models::song::{CreateSongRequest, SongResponse};
use crate::persistence;
use crate::resolver::{self, ResolveError};
use crate::state::AppState;

pub fn song_location(id: i32) -> String {
    format!("/api/songs/{id}")
}

/// Narrow a URL song id to the stored key type. Ids outside the `i32`
/// range cannot exist, so they are reported as missing.
fn song_key(id: i64) -> Result<i32, ResolveError> {
    i32::try_from(id).map_err(|_| ResolveError::SongNotFound(id))
}

#[utoipa::path(
    get,
    path = "/songs",
    tag = "Songs",
    operation_id = "listSongs",
    summary = "List songs",
    description = "Returns every song ordered by ID.",
    responses(
        (status = 200, description = "List of songs", body = Vec<SongResponse>),
        (status = 406, description = "Client does not accept JSON (NOT_ACCEPTABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, _accept))]
pub async fn list_songs(
    _accept: AcceptsJson,
    State(state): State<AppState>,
) -> Result<Json<Vec<SongResponse>>, AppError> {
    let songs = persistence::list_songs(&state.db).await?;
    Ok(Json(songs.into_iter().map(SongResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/songs/{id}",
    tag = "Songs",
    operation_id = "getSong",
    summary = "Get a song by ID",
    params(("id" = i64, Path, description = "Song ID")),
    responses(
        (status = 200, description = "Song details", body = SongResponse),
        (status = 404, description = "Song not found (NOT_FOUND)", body = ErrorBody),
        (status = 406, description = "Client does not accept JSON (NOT_ACCEPTABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, _accept))]
pub async fn get_song(
    _accept: AcceptsJson,
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<SongResponse>, AppError> {
    let song = persistence::find_song(&state.db, song_key(id)?)
        .await?
        .ok_or(ResolveError::SongNotFound(id))?;
    Ok(Json(song.into()))
}

#[utoipa::path(
    post,
    path = "/songs",
    tag = "Songs",
    operation_id = "createSong",
    summary = "Create a song",
    description = "Creates a song with the given ID pointing at an uploaded file. \
        Both `id` and `file.id` are required; the file must already exist.",
    request_body = CreateSongRequest,
    responses(
        (status = 201, description = "Song created; `Location` points at the new song", body = SongResponse),
        (status = 406, description = "Client does not accept JSON (NOT_ACCEPTABLE)", body = ErrorBody),
        (status = 409, description = "Song ID already taken (CONFLICT)", body = ErrorBody),
        (status = 415, description = "Body is not JSON (UNSUPPORTED_MEDIA_TYPE)", body = ErrorBody),
        (status = 422, description = "Schema violation or unknown file (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, _accept, body))]
pub async fn create_song(
    _accept: AcceptsJson,
    State(state): State<AppState>,
    AppJson(body): AppJson<Value>,
) -> Result<impl IntoResponse, AppError> {
    let payload = CreateSongRequest::from_value(&body)?;

    let txn = state.db.begin().await?;

    if persistence::find_song(&txn, payload.id).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Song with id {} already exists",
            payload.id
        )));
    }
    if persistence::find_file(&txn, payload.file.id).await?.is_none() {
        return Err(AppError::Validation(format!(
            "Could not find file with id {}",
            payload.file.id
        )));
    }

    let song = persistence::create_song(&txn, payload.id, payload.file.id).await?;
    txn.commit().await?;

    info!(song_id = song.id, file_id = song.file_id, "Song created");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, song_location(song.id))],
        Json(SongResponse::from(song)),
    ))
}

#[utoipa::path(
    get,
    path = "/songs/{id}/analysis",
    tag = "Songs",
    operation_id = "getSongAnalysis",
    summary = "Analyse a song's audio",
    description = "Resolves the song's uploaded file and returns the analyser's JSON result unchanged.",
    params(("id" = i64, Path, description = "Song ID")),
    responses(
        (status = 200, description = "Analysis result as produced by the configured analyser"),
        (status = 404, description = "Song or file not found (NOT_FOUND)", body = ErrorBody),
        (status = 406, description = "Client does not accept JSON (NOT_ACCEPTABLE)", body = ErrorBody),
        (status = 500, description = "File reference unresolvable (FILE_RESOLUTION_FAILED) or analysis failed (ANALYSIS_FAILED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, _accept))]
pub async fn get_song_analysis(
    _accept: AcceptsJson,
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<AnalysisResult>, AppError> {
    let result = resolver::analyse_song(
        &state.db,
        &*state.uploads,
        &*state.analyser,
        song_key(id)?,
        state.config.analysis.resolution,
    )
    .await?;
    Ok(Json(result))
}
