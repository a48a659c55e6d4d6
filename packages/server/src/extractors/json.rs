use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// A `Json<T>` wrapper that converts rejections into `AppError`, ensuring
/// clients always receive structured JSON error responses.
///
/// A missing or non-JSON `Content-Type` becomes 415; any other body problem
/// becomes a validation error.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| match e {
                JsonRejection::MissingJsonContentType(_) => {
                    AppError::UnsupportedMediaType("application/json")
                }
                other => AppError::Validation(other.body_text()),
            })?;
        Ok(AppJson(value))
    }
}
