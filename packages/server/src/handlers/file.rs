use axum::extract::{DefaultBodyLimit, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, body::Body};
use common::storage::{BoxReader, StorageError, UploadStore};
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::extractors::accept::AcceptsJson;
use crate::extractors::multipart::AppMultipart;
use crate::extractors::path::AppPath;
use crate::models::file::FileResponse;
use crate::persistence;
use crate::state::AppState;
use crate::utils::filename::{MAX_FILENAME_LEN, secure_filename, validate_flat_filename};

/// Body limit for the upload route: the storage cap plus room for multipart framing.
pub fn upload_body_limit(max_upload_size: u64) -> DefaultBodyLimit {
    let limit = max_upload_size.saturating_add(64 * 1024);
    DefaultBodyLimit::max(usize::try_from(limit).unwrap_or(usize::MAX))
}

#[utoipa::path(
    post,
    path = "/files",
    tag = "Files",
    operation_id = "uploadFile",
    summary = "Upload an audio file",
    description = "Stores the `file` multipart field under its sanitized filename and records it. \
        Uploading a name that already exists replaces the stored bytes.",
    request_body(content_type = "multipart/form-data", description = "Multipart form with a `file` field"),
    responses(
        (status = 201, description = "File stored", body = FileResponse),
        (status = 406, description = "Client does not accept JSON (NOT_ACCEPTABLE)", body = ErrorBody),
        (status = 415, description = "Body is not multipart (UNSUPPORTED_MEDIA_TYPE)", body = ErrorBody),
        (status = 422, description = "No file data (MISSING_UPLOAD) or invalid, overlong or oversized file (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, _accept, multipart))]
pub async fn upload_file(
    _accept: AcceptsJson,
    State(state): State<AppState>,
    AppMultipart(mut multipart): AppMultipart,
) -> Result<impl IntoResponse, AppError> {
    let mut stored: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        if field.name() != Some("file") || stored.is_some() {
            continue;
        }
        // Browsers send an empty filename when no file was chosen.
        let Some(original) = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
        else {
            continue;
        };

        let filename = secure_filename(&original)
            .ok_or_else(|| AppError::Validation("Invalid filename".into()))?;
        if filename.len() > MAX_FILENAME_LEN {
            return Err(AppError::Validation(format!(
                "Filename must be at most {MAX_FILENAME_LEN} characters"
            )));
        }
        let size = stream_field_to_store(
            field,
            &filename,
            &*state.uploads,
            state.config.storage.max_upload_size,
        )
        .await?;
        info!(%original, %filename, size, "Upload stored");
        stored = Some(filename);
    }

    let filename = stored.ok_or(AppError::MissingUpload)?;
    let model = persistence::create_file(&state.db, &filename).await?;

    Ok((StatusCode::CREATED, Json(FileResponse::from(model))))
}

/// Serve the raw bytes of an upload.
#[instrument(skip(state))]
pub async fn download_upload(
    State(state): State<AppState>,
    AppPath(filename): AppPath<String>,
) -> Result<Response, AppError> {
    let not_found = || AppError::NotFound(format!("Could not find uploaded file {filename}"));

    let name = validate_flat_filename(&filename).map_err(|e| {
        debug!(reason = e.message(), "Rejected download name");
        not_found()
    })?;
    let size = state.uploads.size(name).await.map_err(|e| match e {
        StorageError::NotFound(_) | StorageError::InvalidFilename(_) => not_found(),
        other => other.into(),
    })?;
    let reader = state.uploads.get_stream(name).await?;

    let content_type = mime_guess::from_path(name).first_or_octet_stream();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_LENGTH, size.to_string())
        .body(Body::from_stream(ReaderStream::new(reader)))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}

/// Stream a multipart field to upload storage via a temp file.
async fn stream_field_to_store(
    mut field: axum::extract::multipart::Field<'_>,
    filename: &str,
    uploads: &dyn UploadStore,
    max_size: u64,
) -> Result<u64, AppError> {
    let temp_path = std::env::temp_dir().join(format!("chords-upload-{}", Uuid::new_v4()));

    let result = async {
        let mut temp_file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create temp file: {e}")))?;

        let mut total_size: u64 = 0;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
        {
            total_size += chunk.len() as u64;
            if total_size > max_size {
                return Err(AppError::Validation(format!(
                    "File exceeds maximum size of {max_size} bytes"
                )));
            }
            temp_file
                .write_all(&chunk)
                .await
                .map_err(|e| AppError::Internal(format!("Temp file write failed: {e}")))?;
        }

        temp_file
            .flush()
            .await
            .map_err(|e| AppError::Internal(format!("Temp file flush failed: {e}")))?;
        drop(temp_file);

        let file = tokio::fs::File::open(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to reopen temp file: {e}")))?;
        let reader: BoxReader = Box::new(file);
        Ok(uploads.put_stream(filename, reader).await?)
    }
    .await;

    // Best effort.
    let _ = tokio::fs::remove_file(&temp_path).await;

    result
}
