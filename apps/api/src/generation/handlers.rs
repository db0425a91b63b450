//! Axum route handlers for the Generation API.

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::errors::AppError;
use crate::generation::generator::{generate_posts, GenerateBody};
use crate::models::post::GenerationResult;
use crate::state::AppState;

/// POST /generate
///
/// Validates the request, then prompt → model → extraction. Returns the posts
/// directly; nothing is saved.
pub async fn handle_generate(
    State(state): State<AppState>,
    body: Result<Json<GenerateBody>, JsonRejection>,
) -> Result<Json<GenerationResult>, AppError> {
    let Json(body) = body?;
    let request = body.validate()?;

    let result = generate_posts(state.generator.as_ref(), &request)
        .await
        .map_err(AppError::GenerationUnavailable)?;

    Ok(Json(result))
}
