//! Axum route handlers for the saved-posts API.
//!
//! Every handler takes `AuthUser` first, so an unauthenticated request is
//! rejected before the body is read or the store is touched.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::generation::generator::DEFAULT_TONE;
use crate::models::post::{GeneratedPost, NewSavedPost, SavedPost};
use crate::posts::store::{normalize_limit, ListFilter};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Body of `POST /posts`. A client-supplied `isFavorite` is ignored; new
/// records always start unfavorited.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostBody {
    pub topic: Option<String>,
    pub tone: Option<String>,
    pub target_audience: Option<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub generated_posts: Vec<GeneratedPost>,
}

impl CreatePostBody {
    fn into_new_post(self) -> Result<NewSavedPost, AppError> {
        let topic = self
            .topic
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::InvalidRequest("Topic is required".to_string()))?;

        Ok(NewSavedPost {
            topic,
            tone: self
                .tone
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TONE.to_string()),
            target_audience: self.target_audience.filter(|a| !a.trim().is_empty()),
            platforms: self.platforms,
            generated_posts: self.generated_posts,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    pub limit: Option<String>,
    pub favorite: Option<String>,
}

impl ListPostsQuery {
    fn filter(&self) -> ListFilter {
        ListFilter {
            favorites_only: self.favorite.as_deref() == Some("true"),
            limit: normalize_limit(self.limit.as_deref()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteBody {
    pub is_favorite: bool,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub success: bool,
    pub post: SavedPost,
}

#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub posts: Vec<SavedPost>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /posts
pub async fn handle_create_post(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    body: Result<Json<CreatePostBody>, JsonRejection>,
) -> Result<Json<PostResponse>, AppError> {
    let Json(body) = body?;
    let new_post = body.into_new_post()?;

    let post = state.posts.create(&owner, new_post).await?;

    Ok(Json(PostResponse {
        success: true,
        post,
    }))
}

/// GET /posts?limit=&favorite=
///
/// `limit` defaults to 50 and is capped at 100, so `?limit=200` returns at
/// most 100 records. A missing, non-numeric or non-positive limit takes the
/// default.
pub async fn handle_list_posts(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Query(params): Query<ListPostsQuery>,
) -> Result<Json<PostListResponse>, AppError> {
    let posts = state.posts.list(&owner, params.filter()).await?;
    Ok(Json(PostListResponse { posts }))
}

/// PATCH /posts/:id/favorite
pub async fn handle_set_favorite(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
    body: Result<Json<FavoriteBody>, JsonRejection>,
) -> Result<Json<PostResponse>, AppError> {
    let id = parse_post_id(&id)?;
    let Json(body) = body?;

    let post = state
        .posts
        .set_favorite(&owner, id, body.is_favorite)
        .await?
        .ok_or_else(post_not_found)?;

    info!("Post {id} favorite set to {}", body.is_favorite);
    Ok(Json(PostResponse {
        success: true,
        post,
    }))
}

/// DELETE /posts/:id/favorite (also mounted at DELETE /posts/:id)
pub async fn handle_delete_post(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = parse_post_id(&id)?;

    if !state.posts.delete(&owner, id).await? {
        return Err(post_not_found());
    }

    Ok(Json(DeleteResponse { success: true }))
}

/// A malformed id is reported exactly like an unknown one.
fn parse_post_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| post_not_found())
}

fn post_not_found() -> AppError {
    AppError::NotFound("Post not found".to_string())
}
