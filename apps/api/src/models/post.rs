use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Opaque, stable identifier of an authenticated user as handed out by the
/// session provider. Never parsed or interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One platform-specific draft produced by the model.
///
/// `platform` is echoed back from the model as free text, not checked against
/// the requested platforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPost {
    pub platform: String,
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hashtags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub best_time: String,
}

/// Output of one generation run. `posts` is always present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub posts: Vec<GeneratedPost>,
}

/// Models sometimes send `null` where a field is merely absent.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl GenerationResult {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A persisted generation result owned by exactly one identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPost {
    pub id: Uuid,
    pub owner_id: OwnerId,
    pub topic: String,
    pub tone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    pub platforms: Vec<String>,
    pub generated_posts: Vec<GeneratedPost>,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied by the caller when saving a result. Owner, id, favorite
/// flag and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSavedPost {
    pub topic: String,
    pub tone: String,
    pub target_audience: Option<String>,
    pub platforms: Vec<String>,
    pub generated_posts: Vec<GeneratedPost>,
}

/// Row shape of the `saved_posts` table.
#[derive(Debug, Clone, FromRow)]
pub struct SavedPostRow {
    pub id: Uuid,
    pub owner_id: String,
    pub topic: String,
    pub tone: String,
    pub target_audience: Option<String>,
    pub platforms: Vec<String>,
    pub generated_posts: Json<Vec<GeneratedPost>>,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SavedPostRow> for SavedPost {
    fn from(row: SavedPostRow) -> Self {
        SavedPost {
            id: row.id,
            owner_id: OwnerId(row.owner_id),
            topic: row.topic,
            tone: row.tone,
            target_audience: row.target_audience,
            platforms: row.platforms,
            generated_posts: row.generated_posts.0,
            is_favorite: row.is_favorite,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
