//! Generation-service configuration with sensible defaults.
//!
//! [`RagConfig`] captures where prompts are sent and how long a turn may
//! wait, and converts itself into a [`GenerationClient`] via
//! [`build_client`](RagConfig::build_client). Binaries layer environment
//! variables ([`from_env`](RagConfig::from_env)) and then CLI flags on top of
//! the defaults.

use std::time::Duration;

use crate::client::GenerationClient;
use crate::error::{ConfigError, GenerationError};

/// Default `generateContent` endpoint.
pub const DEFAULT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

pub const ENV_ENDPOINT: &str = "SAGE_ENDPOINT";
pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_TIMEOUT_SECS: &str = "SAGE_TIMEOUT_SECS";

/// Configuration for the generation client.
#[derive(Debug, Clone, PartialEq)]
pub struct RagConfig {
    /// Endpoint receiving the POST. Default: [`DEFAULT_ENDPOINT`].
    pub endpoint: String,
    /// Sent as `x-goog-api-key` when present. Default: `None`.
    pub api_key: Option<String>,
    /// Per-request timeout. Default: 120 seconds.
    pub timeout: Duration,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RagConfig {
    /// Defaults overlaid with `SAGE_ENDPOINT`, `GEMINI_API_KEY` and
    /// `SAGE_TIMEOUT_SECS` when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            config = config.with_endpoint(endpoint)?;
        }
        if let Some(key) = lookup(ENV_API_KEY).filter(|k| !k.trim().is_empty()) {
            config = config.with_api_key(key);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config = config.with_timeout(parse_timeout_secs(&raw)?);
        }
        Ok(config)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Result<Self, ConfigError> {
        let endpoint = endpoint.into();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::InvalidEndpoint(endpoint));
        }
        self.endpoint = endpoint;
        Ok(self)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a [`GenerationClient`] from this config.
    pub fn build_client(&self) -> Result<GenerationClient, GenerationError> {
        GenerationClient::new(self.endpoint.clone(), self.api_key.clone(), self.timeout)
    }
}

/// Parse a positive number of seconds.
pub fn parse_timeout_secs(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}
