use serde::Serialize;

use crate::entity::file;

/// Response DTO for an uploaded file.
#[derive(Serialize, utoipa::ToSchema)]
pub struct FileResponse {
    #[schema(example = 1)]
    pub id: i32,
    /// Sanitized filename the upload is stored under.
    #[schema(example = "test.txt")]
    pub filename: String,
    /// Download route for the stored bytes.
    #[schema(example = "/uploads/test.txt")]
    pub path: String,
}

impl From<file::Model> for FileResponse {
    fn from(model: file::Model) -> Self {
        Self {
            id: model.id,
            path: upload_path(&model.filename),
            filename: model.filename,
        }
    }
}

pub fn upload_path(filename: &str) -> String {
    format!("/uploads/{filename}")
}
