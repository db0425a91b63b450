pub mod health;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::generation::handlers as generation;
use crate::posts::handlers as posts;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Generation API
        .route("/generate", post(generation::handle_generate))
        // Saved posts API
        .route(
            "/posts",
            get(posts::handle_list_posts).post(posts::handle_create_post),
        )
        .route(
            "/posts/:id/favorite",
            patch(posts::handle_set_favorite).delete(posts::handle_delete_post),
        )
        .route("/posts/:id", delete(posts::handle_delete_post))
        .with_state(state)
}
