//! Fakes for the external collaborators in `AppState`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::auth::{SessionError, SessionResolver};
use crate::config::Config;
use crate::llm_client::{GenerationError, TextGenerator};
use crate::models::post::{NewSavedPost, OwnerId, SavedPost};
use crate::posts::store::{ListFilter, OwnerScope, PostStore, StoreError};
use crate::state::AppState;

pub const ALICE_TOKEN: &str = "alice-token";
pub const BOB_TOKEN: &str = "bob-token";

/// Generator that returns a canned reply (or fails) and records its calls.
pub struct FakeGenerator {
    reply: Option<String>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl FakeGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// Fails every call with `GenerationError::EmptyContent`.
    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        self.reply.clone().ok_or(GenerationError::EmptyContent)
    }
}

/// Post store held in memory. Applies the same `OwnerScope` filter as the
/// Postgres store and counts every call made to it.
#[derive(Default)]
pub struct InMemoryPostStore {
    posts: Mutex<Vec<SavedPost>>,
    calls: AtomicUsize,
    failing: bool,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operation fails with a database error.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Inserts a record directly, bypassing owner assignment.
    pub fn seed(&self, owner: &str, topic: &str, is_favorite: bool) -> SavedPost {
        let now = Utc::now();
        let post = SavedPost {
            id: Uuid::new_v4(),
            owner_id: OwnerId::new(owner),
            topic: topic.to_string(),
            tone: "professional".to_string(),
            target_audience: None,
            platforms: vec!["twitter".to_string()],
            generated_posts: vec![],
            is_favorite,
            created_at: now,
            updated_at: now,
        };
        self.posts.lock().unwrap().push(post.clone());
        post
    }

    pub fn all(&self) -> Vec<SavedPost> {
        self.posts.lock().unwrap().clone()
    }

    fn enter(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn create(&self, owner: &OwnerId, post: NewSavedPost) -> Result<SavedPost, StoreError> {
        self.enter()?;
        let now = Utc::now();
        let saved = SavedPost {
            id: Uuid::new_v4(),
            owner_id: owner.clone(),
            topic: post.topic,
            tone: post.tone,
            target_audience: post.target_audience,
            platforms: post.platforms,
            generated_posts: post.generated_posts,
            is_favorite: false,
            created_at: now,
            updated_at: now,
        };
        self.posts.lock().unwrap().push(saved.clone());
        Ok(saved)
    }

    async fn list(
        &self,
        owner: &OwnerId,
        filter: ListFilter,
    ) -> Result<Vec<SavedPost>, StoreError> {
        self.enter()?;
        let scope = OwnerScope::new(owner);
        let mut posts: Vec<SavedPost> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|p| scope.permits(p))
            .filter(|p| !filter.favorites_only || p.is_favorite)
            .cloned()
            .collect();
        // Stable: equal timestamps keep newest-inserted first.
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts.truncate(filter.limit as usize);
        Ok(posts)
    }

    async fn set_favorite(
        &self,
        owner: &OwnerId,
        id: Uuid,
        is_favorite: bool,
    ) -> Result<Option<SavedPost>, StoreError> {
        self.enter()?;
        let scope = OwnerScope::new(owner);
        let mut posts = self.posts.lock().unwrap();
        Ok(posts
            .iter_mut()
            .find(|p| p.id == id && scope.permits(p))
            .map(|p| {
                p.is_favorite = is_favorite;
                p.updated_at = Utc::now();
                p.clone()
            }))
    }

    async fn delete(&self, owner: &OwnerId, id: Uuid) -> Result<bool, StoreError> {
        self.enter()?;
        let scope = OwnerScope::new(owner);
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| !(p.id == id && scope.permits(p)));
        Ok(posts.len() < before)
    }
}

/// Fixed token → owner table: `alice-token` → `alice`, `bob-token` → `bob`.
pub struct StaticSessions {
    tokens: HashMap<String, OwnerId>,
}

impl Default for StaticSessions {
    fn default() -> Self {
        Self {
            tokens: HashMap::from([
                (ALICE_TOKEN.to_string(), OwnerId::new("alice")),
                (BOB_TOKEN.to_string(), OwnerId::new("bob")),
            ]),
        }
    }
}

#[async_trait]
impl SessionResolver for StaticSessions {
    async fn resolve(&self, token: &str) -> Result<Option<OwnerId>, SessionError> {
        Ok(self.tokens.get(token).cloned())
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        redis_url: "redis://unused".to_string(),
        gemini_api_key: "unused".to_string(),
        gemini_model: "gemini-test".to_string(),
        generation_timeout_secs: None,
        session_cookie_name: "session_token".to_string(),
        port: 0,
        rust_log: "debug".to_string(),
    }
}

pub fn test_state(generator: Arc<FakeGenerator>, posts: Arc<InMemoryPostStore>) -> AppState {
    AppState {
        generator,
        posts,
        sessions: Arc::new(StaticSessions::default()),
        config: test_config(),
    }
}
