//! Client for the Rumo content recommendation API.
//!
//! # Overview
//! Submit a catalog of content, record what users do with it, and ask the
//! service for similar content or personalized recommendations. Every call is
//! scoped to one *source* (tenant) and authenticated with an API key.
//!
//! # Design
//! - `RumoClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network, so the wire mapping is testable in
//!   isolation and usable with any HTTP stack.
//! - `Rumo` is the blocking façade: one method per remote operation, each a
//!   single round trip with no retries.
//! - Optional query parameters are passed as one options struct per
//!   operation; see `options`.
//!
//! ```no_run
//! use rumo_core::{InteractionType, RecommendationOptions, Rumo};
//!
//! let rumo = Rumo::new("https://beta.api.rumo.co/", "my-key", "movies")?;
//! rumo.submit_user_event("user-1", InteractionType::Watch, "42")?;
//! let options = RecommendationOptions::default().take(5);
//! let rec = rumo.get_personalized_recommendation("user-1", &options)?;
//! for item in rec.content {
//!     println!("{} {:.3}", item.id, item.score);
//! }
//! # Ok::<(), rumo_core::ApiError>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod options;
pub mod rumo;
pub mod types;

pub use client::{RumoClient, API_KEY_HEADER};
pub use config::RumoConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use options::{
    ContentOptions, InteractionOptions, RecommendationOptions, SimilarOptions, ALGO_COSINE,
    ALGO_JACCARD,
};
pub use rumo::Rumo;
pub use types::{
    Category, Content, Filters, Interaction, InteractionType, Key, Recommendation,
    RecommendedContent, Submission, Summary, UserEvent, MAX_SUBMISSION_BATCH,
};
