use std::sync::Arc;

use crate::auth::SessionResolver;
use crate::config::Config;
use crate::llm_client::TextGenerator;
use crate::posts::store::PostStore;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Every external collaborator is a trait object built in `main`, so tests
/// can hand the router fakes instead.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn TextGenerator>,
    pub posts: Arc<dyn PostStore>,
    pub sessions: Arc<dyn SessionResolver>,
    pub config: Config,
}
