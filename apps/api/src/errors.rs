use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::SessionError;
use crate::llm_client::GenerationError;
use crate::posts::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Server-side variants log their detail and answer with a fixed message;
/// provider and database errors never reach the caller.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Generation unavailable: {0}")]
    GenerationUnavailable(GenerationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Session lookup failed: {0}")]
    Session(#[from] SessionError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::GenerationUnavailable(_)
            | AppError::Storage(_)
            | AppError::Session(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = match &self {
            AppError::InvalidRequest(msg) => ("INVALID_REQUEST", msg.clone()),
            AppError::Unauthorized => ("UNAUTHORIZED", "Unauthorized".to_string()),
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone()),
            AppError::GenerationUnavailable(e) => {
                tracing::error!("Generation error: {e}");
                (
                    "GENERATION_UNAVAILABLE",
                    "Failed to generate content".to_string(),
                )
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                ("STORAGE_ERROR", "A storage error occurred".to_string())
            }
            AppError::Session(e) => {
                tracing::error!("Session error: {e}");
                ("SESSION_ERROR", "Could not verify session".to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (self.status(), body).into_response()
    }
}
