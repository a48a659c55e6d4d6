use serde::Serialize;
use serde_json::Value;

use crate::entity::song;
use crate::error::AppError;

/// Validated body of `POST /api/songs`.
#[derive(Debug, PartialEq, Eq, utoipa::ToSchema)]
pub struct CreateSongRequest {
    /// Song ID to create.
    #[schema(example = 1)]
    pub id: i32,
    /// Reference to a previously uploaded file.
    pub file: FileRef,
}

#[derive(Debug, PartialEq, Eq, utoipa::ToSchema)]
pub struct FileRef {
    /// ID returned by `POST /api/files`.
    #[schema(example = 3)]
    pub id: i32,
}

impl CreateSongRequest {
    /// Check a raw JSON body against the song schema, reporting the first
    /// violation the way a JSON-schema validator would.
    pub fn from_value(body: &Value) -> Result<Self, AppError> {
        let object = body
            .as_object()
            .ok_or_else(|| AppError::Validation(format!("{body} is not of type 'object'")))?;

        for key in ["file", "id"] {
            if !object.contains_key(key) {
                return Err(AppError::Validation(format!(
                    "'{key}' is a required property"
                )));
            }
        }

        let id = integer_field(&object["id"], "id")?;

        let file = object["file"].as_object().ok_or_else(|| {
            AppError::Validation(format!("{} is not of type 'object'", object["file"]))
        })?;
        let file_id = file
            .get("id")
            .ok_or_else(|| AppError::Validation("'id' is a required property".into()))?;
        let file_id = integer_field(file_id, "file.id")?;

        Ok(Self {
            id,
            file: FileRef { id: file_id },
        })
    }
}

fn integer_field(value: &Value, name: &str) -> Result<i32, AppError> {
    value
        .as_i64()
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| AppError::Validation(format!("{value} is not of type 'integer' ({name})")))
}

/// Response DTO for a single song.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SongResponse {
    #[schema(example = 1)]
    pub id: i32,
    /// ID of the associated file.
    #[schema(example = 3)]
    pub file: i32,
}

impl From<song::Model> for SongResponse {
    fn from(model: song::Model) -> Self {
        Self {
            id: model.id,
            file: model.file_id,
        }
    }
}
