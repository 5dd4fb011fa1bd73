//! Error types for the Rumo API client.
//!
//! # Design
//! Each variant is one failure category: configuration, transport, remote
//! status, and payload (de)serialization. Non-2xx responses keep the raw
//! status code and body so callers can inspect what the service said. 404 has
//! no variant of its own; use `ApiError::is_not_found`.

use std::time::Duration;

use thiserror::Error;

/// Errors returned by `RumoClient`, `Rumo`, and `RumoConfig`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid connection configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The request never produced a response (connection, DNS, TLS, I/O).
    #[error("transport error: {0}")]
    Transport(String),

    /// The request exceeded the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The service answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status of a remote error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<figment::Error> for ApiError {
    fn from(err: figment::Error) -> Self {
        ApiError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_displays_status_and_body() {
        let err = ApiError::Http {
            status: 403,
            body: "bad key".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 403: bad key");
        assert_eq!(err.status(), Some(403));
        assert!(!err.is_not_found());
    }

    #[test]
    fn not_found_is_detected_from_status() {
        let err = ApiError::Http {
            status: 404,
            body: String::new(),
        };
        assert!(err.is_not_found());
        assert_eq!(ApiError::Transport("refused".into()).status(), None);
    }

    #[test]
    fn timeout_displays_duration() {
        let err = ApiError::Timeout(Duration::from_secs(2));
        assert_eq!(err.to_string(), "request timed out after 2s");
    }
}
