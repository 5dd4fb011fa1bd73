//! In-memory implementation of the Rumo API.
//!
//! Serves every endpoint the client uses, keyed by source, behind the same
//! `x-api-key` check as the real service. State lives for the lifetime of the
//! router and is lost on restart.

pub mod similarity;

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{DefaultBodyLimit, Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

use similarity::{rank, score, vector, Algorithm};

pub const API_KEY_HEADER: &str = "x-api-key";

pub const INTERACTION_TYPES: [&str; 8] = [
    "Click",
    "Play",
    "Watch",
    "Bookmark",
    "Preview",
    "Purchase",
    "RateLike",
    "RateDislike",
];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub categories: HashMap<String, Vec<Category>>,
    #[serde(default)]
    pub filters: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    #[serde(default)]
    pub weight: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub source: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Served both as a listed interaction and as the acknowledgement of a
/// submitted event; the wire shape is the same.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub key: Key,
    #[serde(rename = "type")]
    pub interaction_type: String,
    #[serde(rename = "contentId")]
    pub content_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Submission {
    pub source: String,
    pub content: Vec<Content>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Summary {
    pub source: String,
    pub count: usize,
    pub content: Vec<Content>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scored {
    pub id: String,
    pub score: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    pub content: Vec<Scored>,
}

/// Query parameters accepted by the read endpoints. `at` is accepted and
/// ignored since the store keeps only the latest version of each content.
#[derive(Debug, Default, Deserialize)]
pub struct ReadParams {
    pub catalogs: Option<String>,
    pub at: Option<String>,
    pub take: Option<i64>,
    pub algo: Option<String>,
}

impl ReadParams {
    /// Category groups named by `catalogs`, if any were given.
    fn groups(&self) -> Option<HashSet<String>> {
        let groups: HashSet<String> = self
            .catalogs
            .as_deref()?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        (!groups.is_empty()).then_some(groups)
    }
}

#[derive(Debug, Default)]
pub struct SourceData {
    pub content: BTreeMap<String, Content>,
    pub interactions: Vec<Interaction>,
}

#[derive(Debug)]
pub struct AppState {
    api_key: String,
    sources: RwLock<HashMap<String, SourceData>>,
}

pub type Db = Arc<AppState>;

pub fn app(api_key: impl Into<String>) -> Router {
    let db: Db = Arc::new(AppState {
        api_key: api_key.into(),
        sources: RwLock::new(HashMap::new()),
    });
    Router::new()
        .route("/{source}", get(get_summary).post(submit_content))
        .route("/{source}/", get(get_summary).post(submit_content))
        .route("/{source}/content/{id}", get(get_content))
        .route("/{source}/content/{id}/similar", get(get_similar))
        .route("/{source}/users/{user_id}/interactions", get(list_interactions))
        .route("/{source}/users/{user_id}/recommendation", get(get_recommendation))
        .route(
            "/{source}/users/{user_id}/{interaction_type}/{content_id}",
            post(submit_user_event),
        )
        .route_layer(middleware::from_fn_with_state(db.clone(), require_api_key))
        // Full 2000-entry batches of real content exceed the 2 MB default.
        .layer(DefaultBodyLimit::disable())
        .with_state(db)
}

pub async fn run(listener: TcpListener, api_key: impl Into<String>) -> Result<(), std::io::Error> {
    axum::serve(listener, app(api_key)).await
}

async fn require_api_key(
    State(db): State<Db>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let supplied = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    if supplied != Some(db.api_key.as_str()) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(req).await)
}

async fn submit_content(
    State(db): State<Db>,
    Path(source): Path<String>,
    Json(content): Json<Vec<Content>>,
) -> (StatusCode, Json<Submission>) {
    let mut sources = db.sources.write().await;
    let data = sources.entry(source.clone()).or_default();
    for item in &content {
        data.content.insert(item.id.clone(), item.clone());
    }
    debug!(%source, submitted = content.len(), total = data.content.len(), "content stored");
    (StatusCode::CREATED, Json(Submission { source, content }))
}

async fn get_summary(State(db): State<Db>, Path(source): Path<String>) -> Json<Summary> {
    let sources = db.sources.read().await;
    let content: Vec<Content> = sources
        .get(&source)
        .map(|d| d.content.values().cloned().collect())
        .unwrap_or_default();
    Json(Summary {
        source,
        count: content.len(),
        content,
    })
}

async fn get_content(
    State(db): State<Db>,
    Path((source, id)): Path<(String, String)>,
    Query(params): Query<ReadParams>,
) -> Result<Json<Content>, StatusCode> {
    let sources = db.sources.read().await;
    let content = sources
        .get(&source)
        .and_then(|d| d.content.get(&id))
        .ok_or(StatusCode::NOT_FOUND)?;
    match params.groups() {
        Some(groups) if !content.categories.keys().any(|g| groups.contains(g)) => {
            Err(StatusCode::NOT_FOUND)
        }
        _ => Ok(Json(content.clone())),
    }
}

async fn get_similar(
    State(db): State<Db>,
    Path((source, id)): Path<(String, String)>,
    Query(params): Query<ReadParams>,
) -> Result<Json<Recommendation>, StatusCode> {
    let sources = db.sources.read().await;
    let data = sources.get(&source).ok_or(StatusCode::NOT_FOUND)?;
    let target = data.content.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    if data.content.len() < 2 {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let groups = params.groups();
    let algorithm = Algorithm::from_param(params.algo.as_deref());
    let target = vector(target, groups.as_ref());
    let scored = data
        .content
        .values()
        .filter(|c| c.id != id)
        .map(|c| Scored {
            id: c.id.clone(),
            score: score(algorithm, &target, &vector(c, groups.as_ref())),
        })
        .collect();

    Ok(Json(Recommendation {
        id,
        content: rank(scored, params.take),
    }))
}

async fn submit_user_event(
    State(db): State<Db>,
    Path((source, user_id, interaction_type, content_id)): Path<(String, String, String, String)>,
) -> Result<Json<Interaction>, StatusCode> {
    if !INTERACTION_TYPES.contains(&interaction_type.as_str()) {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut sources = db.sources.write().await;
    let data = sources.get_mut(&source).ok_or(StatusCode::NOT_FOUND)?;
    if !data.content.contains_key(&content_id) {
        return Err(StatusCode::NOT_FOUND);
    }

    let interaction = Interaction {
        key: Key { source, user_id },
        interaction_type,
        content_id,
        timestamp: Utc::now(),
    };
    debug!(
        user = %interaction.key.user_id,
        kind = %interaction.interaction_type,
        content = %interaction.content_id,
        "interaction recorded"
    );
    data.interactions.push(interaction.clone());
    Ok(Json(interaction))
}

async fn list_interactions(
    State(db): State<Db>,
    Path((source, user_id)): Path<(String, String)>,
    Query(params): Query<ReadParams>,
) -> Json<Vec<Interaction>> {
    let sources = db.sources.read().await;
    let Some(data) = sources.get(&source) else {
        return Json(Vec::new());
    };
    let groups = params.groups();
    let in_catalogs = |content_id: &str| match &groups {
        None => true,
        Some(groups) => data
            .content
            .get(content_id)
            .is_some_and(|c| c.categories.keys().any(|g| groups.contains(g))),
    };
    Json(
        data.interactions
            .iter()
            .filter(|i| i.key.user_id == user_id && in_catalogs(&i.content_id))
            .cloned()
            .collect(),
    )
}

async fn get_recommendation(
    State(db): State<Db>,
    Path((source, user_id)): Path<(String, String)>,
    Query(params): Query<ReadParams>,
) -> Json<Recommendation> {
    let sources = db.sources.read().await;
    let Some(data) = sources.get(&source) else {
        return Json(Recommendation {
            id: user_id,
            content: Vec::new(),
        });
    };

    let groups = params.groups();
    let algorithm = Algorithm::from_param(params.algo.as_deref());
    let seen: HashSet<&str> = data
        .interactions
        .iter()
        .filter(|i| i.key.user_id == user_id)
        .map(|i| i.content_id.as_str())
        .collect();
    let profile: Vec<_> = seen
        .iter()
        .filter_map(|id| data.content.get(*id))
        .map(|c| vector(c, groups.as_ref()))
        .collect();

    let scored = if profile.is_empty() {
        Vec::new()
    } else {
        data.content
            .values()
            .filter(|c| !seen.contains(c.id.as_str()))
            .map(|c| {
                let candidate = vector(c, groups.as_ref());
                let best = profile
                    .iter()
                    .map(|p| score(algorithm, p, &candidate))
                    .fold(0.0, f64::max);
                Scored {
                    id: c.id.clone(),
                    score: best,
                }
            })
            .collect()
    };

    Json(Recommendation {
        id: user_id,
        content: rank(scored, params.take),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_defaults_optional_fields() {
        let content: Content = serde_json::from_str(r#"{"id":"1"}"#).unwrap();
        assert_eq!(content.id, "1");
        assert!(content.label.is_empty());
        assert!(content.categories.is_empty());
        assert!(content.filters.is_empty());
    }

    #[test]
    fn content_rejects_missing_id() {
        let result: Result<Content, _> = serde_json::from_str(r#"{"label":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn interaction_uses_camel_case_fields() {
        let interaction = Interaction {
            key: Key {
                source: "s".to_string(),
                user_id: "u".to_string(),
            },
            interaction_type: "Play".to_string(),
            content_id: "c".to_string(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&interaction).unwrap();
        assert_eq!(json["key"]["userId"], "u");
        assert_eq!(json["type"], "Play");
        assert_eq!(json["contentId"], "c");
    }

    #[test]
    fn catalogs_param_splits_on_commas() {
        let params = ReadParams {
            catalogs: Some("genre, mood,,".to_string()),
            ..ReadParams::default()
        };
        let groups = params.groups().unwrap();
        assert_eq!(groups.len(), 2);
        assert!(groups.contains("mood"));
        assert!(ReadParams::default().groups().is_none());
    }
}
