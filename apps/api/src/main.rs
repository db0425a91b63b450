mod auth;
mod config;
mod db;
mod errors;
mod generation;
mod llm_client;
mod models;
mod posts;
mod routes;
mod state;
#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::RedisSessionStore;
use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::llm_client::GeminiClient;
use crate::posts::store::PgPostStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Postcraft API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    // Initialize Redis-backed session lookup
    let redis = redis::Client::open(config.redis_url.clone())?;
    let sessions = RedisSessionStore::connect(&redis)
        .await
        .context("Failed to connect to Redis")?;
    info!("Redis session store connected");

    // Initialize generation client
    let gemini = GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        config.generation_timeout_secs.map(Duration::from_secs),
    )
    .context("Failed to build generation client")?;
    info!("Generation client initialized (model: {})", gemini.model());

    // Build app state
    let state = AppState {
        generator: Arc::new(gemini),
        posts: Arc::new(PgPostStore::new(db)),
        sessions: Arc::new(sessions),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
