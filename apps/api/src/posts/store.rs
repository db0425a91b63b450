//! Saved-post persistence.
//!
//! Every read and write is scoped to one owner. The scoping lives in
//! `OwnerScope` and nowhere else: statements are started from
//! `OwnerScope::select`/`update`/`delete`, which already carry the
//! `owner_id` filter, so a query cannot be built without it.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::post::{NewSavedPost, OwnerId, SavedPost, SavedPostRow};

/// Page size when the caller gives no usable limit.
pub const DEFAULT_LIST_LIMIT: i64 = 50;
/// Upper bound on any requested page size.
pub const MAX_LIST_LIMIT: i64 = 100;

const SAVED_POST_COLUMNS: &str = "id, owner_id, topic, tone, target_audience, platforms, \
     generated_posts, is_favorite, created_at, updated_at";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Options for listing an owner's posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListFilter {
    pub favorites_only: bool,
    pub limit: i64,
}

impl Default for ListFilter {
    fn default() -> Self {
        Self {
            favorites_only: false,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

/// Storage backend for saved posts.
///
/// Carried in `AppState` as `Arc<dyn PostStore>`. Implementations must never
/// return or touch a record whose owner differs from `owner`; a record owned by
/// someone else is indistinguishable from a missing one.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create(&self, owner: &OwnerId, post: NewSavedPost) -> Result<SavedPost, StoreError>;

    /// Newest first.
    async fn list(&self, owner: &OwnerId, filter: ListFilter)
        -> Result<Vec<SavedPost>, StoreError>;

    /// Returns the updated record, or `None` if `owner` has no post `id`.
    async fn set_favorite(
        &self,
        owner: &OwnerId,
        id: Uuid,
        is_favorite: bool,
    ) -> Result<Option<SavedPost>, StoreError>;

    /// Returns `false` if `owner` has no post `id`.
    async fn delete(&self, owner: &OwnerId, id: Uuid) -> Result<bool, StoreError>;
}

/// The owner filter shared by every saved-post operation.
#[derive(Debug, Clone, Copy)]
pub struct OwnerScope<'a> {
    owner: &'a OwnerId,
}

impl<'a> OwnerScope<'a> {
    pub fn new(owner: &'a OwnerId) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> &OwnerId {
        self.owner
    }

    /// `SELECT <columns> FROM saved_posts WHERE owner_id = $1`
    pub fn select(&self) -> QueryBuilder<'static, Postgres> {
        self.scoped(format!("SELECT {SAVED_POST_COLUMNS} FROM saved_posts"))
    }

    /// `UPDATE saved_posts SET <assignments> WHERE owner_id = $n`
    ///
    /// `set` pushes the assignments, binding any values it needs, before the
    /// owner filter is appended.
    pub fn update(
        &self,
        set: impl FnOnce(&mut QueryBuilder<'static, Postgres>),
    ) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("UPDATE saved_posts SET ");
        set(&mut qb);
        self.push_filter(&mut qb);
        qb
    }

    /// `DELETE FROM saved_posts WHERE owner_id = $1`
    pub fn delete(&self) -> QueryBuilder<'static, Postgres> {
        self.scoped("DELETE FROM saved_posts".to_string())
    }

    /// In-process form of the same filter.
    pub fn permits(&self, post: &SavedPost) -> bool {
        post.owner_id == *self.owner
    }

    fn scoped(&self, head: String) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(head);
        self.push_filter(&mut qb);
        qb
    }

    fn push_filter(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        qb.push(" WHERE owner_id = ")
            .push_bind(self.owner.as_str().to_owned());
    }
}

/// Clamps a requested page size into `1..=MAX_LIST_LIMIT`, falling back to the
/// default for anything unusable.
pub fn normalize_limit(raw: Option<&str>) -> i64 {
    match raw.and_then(|v| v.trim().parse::<i64>().ok()) {
        Some(n) if n >= 1 => n.min(MAX_LIST_LIMIT),
        _ => DEFAULT_LIST_LIMIT,
    }
}

/// PostgreSQL-backed store over the `saved_posts` table.
#[derive(Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn create(&self, owner: &OwnerId, post: NewSavedPost) -> Result<SavedPost, StoreError> {
        let scope = OwnerScope::new(owner);
        let sql = format!(
            r#"
            INSERT INTO saved_posts
                (id, owner_id, topic, tone, target_audience, platforms, generated_posts)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {SAVED_POST_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, SavedPostRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(scope.owner().as_str())
            .bind(&post.topic)
            .bind(&post.tone)
            .bind(&post.target_audience)
            .bind(&post.platforms)
            .bind(Json(&post.generated_posts))
            .fetch_one(&self.pool)
            .await?;

        info!("Saved post {} for owner {}", row.id, owner);
        Ok(row.into())
    }

    async fn list(
        &self,
        owner: &OwnerId,
        filter: ListFilter,
    ) -> Result<Vec<SavedPost>, StoreError> {
        let scope = OwnerScope::new(owner);
        let mut qb = scope.select();
        if filter.favorites_only {
            qb.push(" AND is_favorite = TRUE");
        }
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(filter.limit);

        let rows = qb
            .build_query_as::<SavedPostRow>()
            .fetch_all(&self.pool)
            .await?;

        let posts: Vec<SavedPost> = rows.into_iter().map(SavedPost::from).collect();
        debug_assert!(posts.iter().all(|p| scope.permits(p)));
        Ok(posts)
    }

    async fn set_favorite(
        &self,
        owner: &OwnerId,
        id: Uuid,
        is_favorite: bool,
    ) -> Result<Option<SavedPost>, StoreError> {
        let mut qb = OwnerScope::new(owner).update(|qb| {
            qb.push("is_favorite = ")
                .push_bind(is_favorite)
                .push(", updated_at = NOW()");
        });
        qb.push(" AND id = ").push_bind(id);
        qb.push(format!(" RETURNING {SAVED_POST_COLUMNS}"));

        let row = qb
            .build_query_as::<SavedPostRow>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(SavedPost::from))
    }

    async fn delete(&self, owner: &OwnerId, id: Uuid) -> Result<bool, StoreError> {
        let mut qb = OwnerScope::new(owner).delete();
        qb.push(" AND id = ").push_bind(id);
        let result = qb.build().execute(&self.pool).await?;

        if result.rows_affected() > 0 {
            info!("Deleted post {id} for owner {owner}");
        }
        Ok(result.rows_affected() > 0)
    }
}
