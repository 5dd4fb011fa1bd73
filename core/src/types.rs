//! Domain DTOs for the Rumo API.
//!
//! # Design
//! These types mirror the service's JSON schema field for field, including
//! its camelCase names. The mock-server crate defines its own copies so the
//! integration tests catch schema drift between the two.
//!
//! `Interaction` (read side) carries a typed `InteractionType`, while
//! `UserEvent` (the acknowledgement of a submitted event) carries the type as
//! a free-form string. Both shapes are kept because the service reports them
//! differently.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Maximum number of content entries the service accepts per submission.
///
/// Not enforced client-side: larger batches are sent as-is and the service
/// decides what to do with them.
pub const MAX_SUBMISSION_BATCH: usize = 2000;

/// A piece of content in a source's catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub id: String,
    #[serde(default)]
    pub label: String,
    /// Category groups (e.g. `"genres"`) to weighted category entries.
    #[serde(default)]
    pub categories: HashMap<String, Vec<Category>>,
    #[serde(default)]
    pub filters: Filters,
}

impl Content {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            categories: HashMap::new(),
            filters: Filters::default(),
        }
    }

    /// Append a weighted category to `group`, creating the group if needed.
    pub fn with_category(
        mut self,
        group: impl Into<String>,
        id: impl Into<String>,
        weight: f64,
    ) -> Self {
        self.categories
            .entry(group.into())
            .or_default()
            .push(Category::new(id, weight));
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(key, value);
        self
    }
}

/// A weighted category entry. The weight is caller-defined and used by the
/// service for weighted similarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    #[serde(default)]
    pub weight: f64,
}

impl Category {
    pub fn new(id: impl Into<String>, weight: f64) -> Self {
        Self { id: id.into(), weight }
    }
}

/// Free-form key/value filters attached to a content piece.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filters(pub BTreeMap<String, Value>);

impl Filters {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Identifies a user within a source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    pub source: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// The kinds of user interaction the service understands.
///
/// Serialized, displayed, and placed in URL paths as the literal variant
/// name (`RateLike`, never a numeric code).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
pub enum InteractionType {
    Click,
    Play,
    Watch,
    Bookmark,
    Preview,
    Purchase,
    RateLike,
    RateDislike,
}

/// A recorded interaction, as listed by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub key: Key,
    #[serde(rename = "type")]
    pub interaction_type: InteractionType,
    #[serde(rename = "contentId")]
    pub content_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Acknowledgement returned after submitting a user event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEvent {
    pub key: Key,
    /// One of the `InteractionType` names, as reported by the service.
    #[serde(rename = "type")]
    pub interaction_type: String,
    #[serde(rename = "contentId")]
    pub content_id: String,
    pub timestamp: DateTime<Utc>,
}

impl UserEvent {
    /// Parse the reported type. Returns `None` for names this client does
    /// not know.
    pub fn interaction_type(&self) -> Option<InteractionType> {
        self.interaction_type.parse().ok()
    }
}

/// A ranked list of recommended content. `content` keeps the order the
/// service returned; it is never re-sorted client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    #[serde(default)]
    pub content: Vec<RecommendedContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedContent {
    pub id: String,
    /// Relevance in `[0.0, 1.0]`.
    pub score: f64,
}

/// Acknowledgement of a content submission. Fields the client does not model
/// are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub content: Vec<Content>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Submission {
    /// Ids of the content the service acknowledged, in response order.
    pub fn content_ids(&self) -> impl Iterator<Item = &str> {
        self.content.iter().map(|c| c.id.as_str())
    }
}

/// Summary of a source's catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub content: Vec<Content>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
