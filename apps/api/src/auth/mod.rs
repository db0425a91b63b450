//! Caller identity.
//!
//! Sign-in itself happens elsewhere; this service only maps a session token
//! to the owner id the identity provider stored for it. The token is read
//! from the session cookie or an `Authorization: Bearer` header.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap,
    },
};
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use thiserror::Error;
use tracing::debug;

use crate::errors::AppError;
use crate::models::post::OwnerId;
use crate::state::AppState;

const SESSION_KEY_PREFIX: &str = "session:";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Resolves session tokens to owner identities.
///
/// Carried in `AppState` as `Arc<dyn SessionResolver>`.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// `Ok(None)` for unknown or expired tokens.
    async fn resolve(&self, token: &str) -> Result<Option<OwnerId>, SessionError>;
}

/// Session lookup against the shared Redis session store, where the identity
/// provider writes `session:<token>` → owner id.
///
/// Holds one multiplexed connection opened at startup; each lookup works on a
/// clone of it.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: MultiplexedConnection,
}

impl RedisSessionStore {
    pub async fn connect(client: &redis::Client) -> Result<Self, SessionError> {
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl SessionResolver for RedisSessionStore {
    async fn resolve(&self, token: &str) -> Result<Option<OwnerId>, SessionError> {
        let mut conn = self.conn.clone();
        let owner: Option<String> = conn.get(format!("{SESSION_KEY_PREFIX}{token}")).await?;
        Ok(owner.filter(|o| !o.is_empty()).map(OwnerId::new))
    }
}

/// Extractor for the authenticated caller. Rejects with `401` when no token is
/// present or the token does not resolve.
#[derive(Debug, Clone)]
pub struct AuthUser(pub OwnerId);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers, &state.config.session_cookie_name)
            .ok_or(AppError::Unauthorized)?;

        match state.sessions.resolve(&token).await? {
            Some(owner) => Ok(AuthUser(owner)),
            None => {
                debug!("Rejected request with unknown session token");
                Err(AppError::Unauthorized)
            }
        }
    }
}

/// Pulls the session token from the named cookie, falling back to a bearer
/// token.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let from_cookie = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim().to_string());

    let from_bearer = || {
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string())
    };

    from_cookie
        .or_else(from_bearer)
        .filter(|token| !token.is_empty())
}
