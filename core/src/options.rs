//! Optional query parameters for the read operations.
//!
//! Each operation takes one options struct. `Default` means "send no query
//! parameters". A field that is `None`, or that holds a value the service
//! would treat as absent (`take <= 0`, blank `at`/`algo`, empty `catalogs`),
//! is left off the request entirely.

use chrono::NaiveDate;

/// Jaccard index over category ids (ignores weights).
pub const ALGO_JACCARD: &str = "jaccard";
/// Cosine similarity over weighted categories.
pub const ALGO_COSINE: &str = "cosine";

pub(crate) type QueryPairs = Vec<(String, String)>;

/// Options for `get_content`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentOptions {
    /// Catalogs to filter by.
    pub catalogs: Option<Vec<String>>,
    /// Upload date to filter by, `YYYY-MM-DD`.
    pub at: Option<String>,
}

impl ContentOptions {
    pub fn catalogs<I, S>(mut self, catalogs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.catalogs = Some(catalogs.into_iter().map(Into::into).collect());
        self
    }

    pub fn at(mut self, at: impl Into<String>) -> Self {
        self.at = Some(at.into());
        self
    }

    pub fn at_date(self, date: NaiveDate) -> Self {
        self.at(format_date(date))
    }

    pub(crate) fn to_query(&self) -> QueryPairs {
        let mut query = Vec::new();
        push_catalogs(&mut query, &self.catalogs);
        push_text(&mut query, "at", &self.at);
        query
    }
}

/// Options for `get_similar_content`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimilarOptions {
    pub catalogs: Option<Vec<String>>,
    pub at: Option<String>,
    /// Number of recommendations to return. Ignored unless positive.
    pub take: Option<i32>,
}

impl SimilarOptions {
    pub fn catalogs<I, S>(mut self, catalogs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.catalogs = Some(catalogs.into_iter().map(Into::into).collect());
        self
    }

    pub fn at(mut self, at: impl Into<String>) -> Self {
        self.at = Some(at.into());
        self
    }

    pub fn at_date(self, date: NaiveDate) -> Self {
        self.at(format_date(date))
    }

    pub fn take(mut self, take: i32) -> Self {
        self.take = Some(take);
        self
    }

    pub(crate) fn to_query(&self) -> QueryPairs {
        let mut query = Vec::new();
        push_catalogs(&mut query, &self.catalogs);
        push_text(&mut query, "at", &self.at);
        push_take(&mut query, self.take);
        query
    }
}

/// Options for `list_interactions`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionOptions {
    pub catalogs: Option<Vec<String>>,
}

impl InteractionOptions {
    pub fn catalogs<I, S>(mut self, catalogs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.catalogs = Some(catalogs.into_iter().map(Into::into).collect());
        self
    }

    pub(crate) fn to_query(&self) -> QueryPairs {
        let mut query = Vec::new();
        push_catalogs(&mut query, &self.catalogs);
        query
    }
}

/// Options for `get_personalized_recommendation`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationOptions {
    pub catalogs: Option<Vec<String>>,
    /// Number of recommendations to return. Ignored unless positive.
    pub take: Option<i32>,
    /// Recommendation algorithm, e.g. `ALGO_JACCARD` or `ALGO_COSINE`.
    pub algo: Option<String>,
}

impl RecommendationOptions {
    pub fn catalogs<I, S>(mut self, catalogs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.catalogs = Some(catalogs.into_iter().map(Into::into).collect());
        self
    }

    pub fn take(mut self, take: i32) -> Self {
        self.take = Some(take);
        self
    }

    pub fn algo(mut self, algo: impl Into<String>) -> Self {
        self.algo = Some(algo.into());
        self
    }

    pub(crate) fn to_query(&self) -> QueryPairs {
        let mut query = Vec::new();
        push_catalogs(&mut query, &self.catalogs);
        push_take(&mut query, self.take);
        push_text(&mut query, "algo", &self.algo);
        query
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn push_catalogs(query: &mut QueryPairs, catalogs: &Option<Vec<String>>) {
    if let Some(catalogs) = catalogs {
        if !catalogs.is_empty() {
            query.push(("catalogs".to_string(), catalogs.join(",")));
        }
    }
}

fn push_text(query: &mut QueryPairs, name: &str, value: &Option<String>) {
    if let Some(value) = value {
        let value = value.trim();
        if !value.is_empty() {
            query.push((name.to_string(), value.to_string()));
        }
    }
}

fn push_take(query: &mut QueryPairs, take: Option<i32>) {
    if let Some(take) = take.filter(|n| *n > 0) {
        query.push(("take".to_string(), take.to_string()));
    }
}
