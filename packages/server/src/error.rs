use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

use crate::analysis::AnalysisError;
use crate::resolver::ResolveError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `MISSING_UPLOAD`,
    /// `NOT_FOUND`, `CONFLICT`, `NOT_ACCEPTABLE`, `UNSUPPORTED_MEDIA_TYPE`,
    /// `FILE_RESOLUTION_FAILED`, `ANALYSIS_FAILED`, `INTERNAL_ERROR`.
    #[schema(example = "NOT_FOUND")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Could not find song with id 1")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    /// Multipart request without a usable `file` field.
    MissingUpload,
    NotFound(String),
    Conflict(String),
    NotAcceptable,
    UnsupportedMediaType(&'static str),
    /// A song's file reference could not be mapped to a file row.
    Resolution(String),
    Analysis(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::MissingUpload => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody {
                    code: "MISSING_UPLOAD",
                    message: "Could not find file data".into(),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "CONFLICT",
                    message: msg,
                },
            ),
            AppError::NotAcceptable => (
                StatusCode::NOT_ACCEPTABLE,
                ErrorBody {
                    code: "NOT_ACCEPTABLE",
                    message: "Request must accept application/json data".into(),
                },
            ),
            AppError::UnsupportedMediaType(mime) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                ErrorBody {
                    code: "UNSUPPORTED_MEDIA_TYPE",
                    message: format!("Request must contain {mime} data"),
                },
            ),
            AppError::Resolution(msg) => {
                tracing::error!("File resolution failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "FILE_RESOLUTION_FAILED",
                        message: msg,
                    },
                )
            }
            AppError::Analysis(detail) => {
                tracing::error!("Analysis failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "ANALYSIS_FAILED",
                        message: "Audio analysis failed".into(),
                    },
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(name) => {
                AppError::NotFound(format!("Could not find uploaded file {name}"))
            }
            StorageError::InvalidFilename(_) => AppError::Validation("Invalid filename".into()),
            StorageError::SizeLimitExceeded { limit, .. } => {
                AppError::Validation(format!("File exceeds maximum size of {limit} bytes"))
            }
            StorageError::Io(e) => AppError::Internal(format!("Storage IO error: {e}")),
        }
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::MissingInput(path) => {
                tracing::warn!(path = %path.display(), "Analysis input missing on disk");
                AppError::NotFound("Could not find the uploaded audio for this song".into())
            }
            other => AppError::Analysis(other.to_string()),
        }
    }
}

impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::SongNotFound(id) => {
                AppError::NotFound(format!("Could not find song with id {id}"))
            }
            ResolveError::FileNotFound(id) => {
                AppError::NotFound(format!("Could not find file with id {id}"))
            }
            e @ ResolveError::IndexOutOfRange { .. } => AppError::Resolution(e.to_string()),
            ResolveError::Storage(e) => e.into(),
            ResolveError::Analysis(e) => e.into(),
            ResolveError::Db(e) => e.into(),
        }
    }
}
