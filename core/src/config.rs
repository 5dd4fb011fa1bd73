//! Connection configuration, loaded with Figment.
//!
//! Merge order (later overrides earlier):
//! 1. Compiled defaults
//! 2. `./rumo.toml`, or an explicit path
//! 3. `RUMO_*` environment variables (`RUMO_URL`, `RUMO_API_KEY`,
//!    `RUMO_SOURCE`, `RUMO_TIMEOUT_SECS`)
//!
//! Loading does not validate field contents; `RumoClient::from_config` does.

use std::path::Path;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub const DEFAULT_URL: &str = "https://beta.api.rumo.co/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Everything needed to reach one source on the Rumo service.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RumoConfig {
    /// Root URL of the service. The source is appended to it.
    pub url: String,
    pub api_key: String,
    /// Tenant namespace; created by the service on first submission.
    pub source: String,
    pub timeout_secs: u64,
}

impl Default for RumoConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            api_key: String::new(),
            source: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// Keeps the API key out of logs and panic messages.
impl std::fmt::Debug for RumoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RumoConfig")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("source", &self.source)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl RumoConfig {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            source: source.into(),
            ..Self::default()
        }
    }

    /// Load from `./rumo.toml` (if present) with `RUMO_*` overrides.
    pub fn load() -> Result<Self, ApiError> {
        Ok(Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file("rumo.toml"))
            .merge(env_provider())
            .extract()?)
    }

    /// Load from a specific TOML file with `RUMO_*` overrides.
    pub fn load_from_path(path: &Path) -> Result<Self, ApiError> {
        Ok(Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(env_provider())
            .extract()?)
    }

    /// Parse a TOML document only, with no file lookup or env overrides.
    pub fn from_toml_str(toml: &str) -> Result<Self, ApiError> {
        Ok(Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml))
            .extract()?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `RUMO_*` variables for the known fields only, so unrelated variables
/// sharing the prefix do not trip `deny_unknown_fields`.
fn env_provider() -> Env {
    Env::prefixed("RUMO_").only(&["url", "api_key", "source", "timeout_secs"])
}
