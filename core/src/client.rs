//! Stateless HTTP request builder and response parser for the Rumo API.
//!
//! # Design
//! `RumoClient` holds only the derived tenant base URL and the API key, and
//! carries no mutable state between calls. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. `Rumo` runs the round trip in between;
//! callers with their own HTTP stack can do the same.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;

use crate::config::RumoConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::options::{ContentOptions, InteractionOptions, RecommendationOptions, SimilarOptions};
use crate::types::{
    Content, Interaction, InteractionType, Recommendation, Submission, Summary, UserEvent,
};

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Everything except RFC 3986 unreserved characters gets escaped, so an id
/// never spills into a neighbouring path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Request builder and response parser bound to one source.
#[derive(Clone)]
pub struct RumoClient {
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for RumoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RumoClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl RumoClient {
    /// Bind to `source` under the service root `url`.
    ///
    /// The tenant base URL is `url + source + "/"`; a missing trailing slash
    /// on `url` is added first.
    pub fn new(url: &str, api_key: &str, source: &str) -> Result<Self, ApiError> {
        let url = require("url", url)?;
        let api_key = require("api_key", api_key)?;
        let source = require("source", source.trim().trim_matches('/'))?;
        if api_key.chars().any(|c| c.is_control()) {
            return Err(ApiError::Config("api_key contains control characters".to_string()));
        }

        let mut base_url = url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        base_url.push_str(source);
        base_url.push('/');

        Ok(Self {
            base_url,
            api_key: api_key.to_string(),
        })
    }

    /// Like `new`, and also rejects a zero timeout.
    pub fn from_config(config: &RumoConfig) -> Result<Self, ApiError> {
        if config.timeout_secs == 0 {
            return Err(ApiError::Config("timeout_secs must be greater than zero".to_string()));
        }
        Self::new(&config.url, &config.api_key, &config.source)
    }

    /// Tenant base URL, always ending in `/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -- content -----------------------------------------------------------

    /// POST the whole batch as a JSON array. Batches over
    /// `MAX_SUBMISSION_BATCH` are not rejected here.
    pub fn build_submit_content(&self, content: &[Content]) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(content).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut req = self.request(HttpMethod::Post, String::new(), Vec::new());
        req.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        req.body = Some(body);
        Ok(req)
    }

    pub fn build_get_catalog_summary(&self) -> HttpRequest {
        self.request(HttpMethod::Get, String::new(), Vec::new())
    }

    pub fn build_get_content(&self, content_id: &str, options: &ContentOptions) -> HttpRequest {
        let path = format!("content/{}", segment(content_id));
        self.request(HttpMethod::Get, path, options.to_query())
    }

    pub fn build_get_similar_content(
        &self,
        content_id: &str,
        options: &SimilarOptions,
    ) -> HttpRequest {
        let path = format!("content/{}/similar", segment(content_id));
        self.request(HttpMethod::Get, path, options.to_query())
    }

    // -- users -------------------------------------------------------------

    /// POST with no body; the interaction type is the literal variant name.
    pub fn build_submit_user_event(
        &self,
        user_id: &str,
        interaction_type: InteractionType,
        content_id: &str,
    ) -> HttpRequest {
        let path = format!(
            "users/{}/{}/{}",
            segment(user_id),
            interaction_type.as_ref(),
            segment(content_id)
        );
        self.request(HttpMethod::Post, path, Vec::new())
    }

    pub fn build_list_interactions(
        &self,
        user_id: &str,
        options: &InteractionOptions,
    ) -> HttpRequest {
        let path = format!("users/{}/interactions", segment(user_id));
        self.request(HttpMethod::Get, path, options.to_query())
    }

    pub fn build_get_personalized_recommendation(
        &self,
        user_id: &str,
        options: &RecommendationOptions,
    ) -> HttpRequest {
        let path = format!("users/{}/recommendation", segment(user_id));
        self.request(HttpMethod::Get, path, options.to_query())
    }

    // -- parsing -----------------------------------------------------------

    pub fn parse_submit_content(&self, response: HttpResponse) -> Result<Submission, ApiError> {
        parse_json(response)
    }

    pub fn parse_get_catalog_summary(&self, response: HttpResponse) -> Result<Summary, ApiError> {
        parse_json(response)
    }

    pub fn parse_get_content(&self, response: HttpResponse) -> Result<Content, ApiError> {
        parse_json(response)
    }

    pub fn parse_get_similar_content(
        &self,
        response: HttpResponse,
    ) -> Result<Recommendation, ApiError> {
        parse_json(response)
    }

    pub fn parse_submit_user_event(&self, response: HttpResponse) -> Result<UserEvent, ApiError> {
        parse_json(response)
    }

    pub fn parse_list_interactions(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Interaction>, ApiError> {
        parse_json(response)
    }

    pub fn parse_get_personalized_recommendation(
        &self,
        response: HttpResponse,
    ) -> Result<Recommendation, ApiError> {
        parse_json(response)
    }

    fn request(
        &self,
        method: HttpMethod,
        path: String,
        query: Vec<(String, String)>,
    ) -> HttpRequest {
        HttpRequest {
            method,
            url: format!("{}{path}", self.base_url),
            query,
            headers: vec![(API_KEY_HEADER.to_string(), self.api_key.clone())],
            body: None,
        }
    }
}

fn require<'a>(name: &str, value: &'a str) -> Result<&'a str, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::Config(format!("{name} must not be empty")));
    }
    Ok(value)
}

fn segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

/// Map non-2xx statuses to `ApiError::Http`, then deserialize the body.
fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}
