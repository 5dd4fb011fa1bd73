//! Blocking façade that executes `RumoClient` requests over HTTP.
//!
//! Each method is one round trip: build, send with `ureq`, parse. Status
//! codes are handed to the parser as data (`http_status_as_error(false)`),
//! so remote failures surface as `ApiError::Http` with the body intact.

use std::time::Duration;

use tracing::{debug, warn};

use crate::client::RumoClient;
use crate::config::RumoConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::options::{ContentOptions, InteractionOptions, RecommendationOptions, SimilarOptions};
use crate::types::{
    Content, Interaction, InteractionType, Recommendation, Submission, Summary, UserEvent,
};

/// Client for one source on the Rumo service.
///
/// Cheap to clone; clones share the connection pool. Safe to use from many
/// threads at once since nothing mutable is shared.
#[derive(Debug, Clone)]
pub struct Rumo {
    client: RumoClient,
    agent: ureq::Agent,
    timeout: Duration,
}

impl Rumo {
    pub fn new(url: &str, api_key: &str, source: &str) -> Result<Self, ApiError> {
        Self::from_config(&RumoConfig::new(url, api_key, source))
    }

    pub fn from_config(config: &RumoConfig) -> Result<Self, ApiError> {
        let client = RumoClient::from_config(config)?;
        Ok(Self::with_client(client, config.timeout()))
    }

    /// Wrap an existing request builder.
    pub fn with_client(client: RumoClient, timeout: Duration) -> Self {
        Self {
            agent: build_agent(timeout),
            client,
            timeout,
        }
    }

    /// Copy of this client whose requests give up after `timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self::with_client(self.client.clone(), timeout)
    }

    pub fn client(&self) -> &RumoClient {
        &self.client
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Submit or overwrite content. The service keeps the most recent entry
    /// per id and expects at most `MAX_SUBMISSION_BATCH` entries per call;
    /// that limit is the caller's to respect.
    pub fn submit_content(&self, content: &[Content]) -> Result<Submission, ApiError> {
        let req = self.client.build_submit_content(content)?;
        self.client.parse_submit_content(self.execute(req)?)
    }

    pub fn get_catalog_summary(&self) -> Result<Summary, ApiError> {
        let req = self.client.build_get_catalog_summary();
        self.client.parse_get_catalog_summary(self.execute(req)?)
    }

    pub fn get_content(
        &self,
        content_id: &str,
        options: &ContentOptions,
    ) -> Result<Content, ApiError> {
        let req = self.client.build_get_content(content_id, options);
        self.client.parse_get_content(self.execute(req)?)
    }

    /// Content similar to `content_id`. The service needs at least two
    /// content pieces in the source to answer.
    pub fn get_similar_content(
        &self,
        content_id: &str,
        options: &SimilarOptions,
    ) -> Result<Recommendation, ApiError> {
        let req = self.client.build_get_similar_content(content_id, options);
        self.client.parse_get_similar_content(self.execute(req)?)
    }

    pub fn submit_user_event(
        &self,
        user_id: &str,
        interaction_type: InteractionType,
        content_id: &str,
    ) -> Result<UserEvent, ApiError> {
        let req = self
            .client
            .build_submit_user_event(user_id, interaction_type, content_id);
        self.client.parse_submit_user_event(self.execute(req)?)
    }

    pub fn list_interactions(
        &self,
        user_id: &str,
        options: &InteractionOptions,
    ) -> Result<Vec<Interaction>, ApiError> {
        let req = self.client.build_list_interactions(user_id, options);
        self.client.parse_list_interactions(self.execute(req)?)
    }

    pub fn get_personalized_recommendation(
        &self,
        user_id: &str,
        options: &RecommendationOptions,
    ) -> Result<Recommendation, ApiError> {
        let req = self
            .client
            .build_get_personalized_recommendation(user_id, options);
        self.client
            .parse_get_personalized_recommendation(self.execute(req)?)
    }

    /// Send `req` and return whatever the server answered, 4xx/5xx included.
    pub fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = req.method.as_str(), url = %req.url, query = ?req.query, "sending request");

        let result = match req.method {
            HttpMethod::Get => prepare(self.agent.get(&req.url), &req).call(),
            HttpMethod::Post => {
                let builder = prepare(self.agent.post(&req.url), &req);
                match req.body.as_deref() {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| self.transport_error(&req, e))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        // No size cap: a catalog summary carries every piece of content.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_string()
            .map_err(|e| self.transport_error(&req, e))?;

        let response = HttpResponse { status, headers, body };
        if response.is_success() {
            debug!(status, url = %req.url, "response received");
        } else {
            warn!(status, url = %req.url, body = %response.body, "request rejected");
        }
        Ok(response)
    }

    fn transport_error(&self, req: &HttpRequest, err: ureq::Error) -> ApiError {
        warn!(method = req.method.as_str(), url = %req.url, error = %err, "transport failure");
        match err {
            ureq::Error::Timeout(_) => ApiError::Timeout(self.timeout),
            other => ApiError::Transport(other.to_string()),
        }
    }
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(Some(timeout))
        .build()
        .new_agent()
}

/// Apply headers and query pairs; ureq percent-encodes the query values.
fn prepare<B>(mut builder: ureq::RequestBuilder<B>, req: &HttpRequest) -> ureq::RequestBuilder<B> {
    for (name, value) in &req.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    for (name, value) in &req.query {
        builder = builder.query(name, value);
    }
    builder
}
