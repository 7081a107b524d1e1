//! Error types for the retrieval pipeline.
//!
//! Only the generation call can fail at runtime. Corpus and configuration
//! errors are startup failures reported by the binaries before any turn runs.

use std::path::PathBuf;

/// Failure of a single generation round trip.
///
/// The message carries enough detail for diagnostics. It is logged, never
/// shown verbatim to the user.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Network, timeout, or body-read failure from the HTTP client.
    #[error("request failed: {0}")]
    Request(String),
    /// The service answered with a non-success status.
    #[error("generation service HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// The service answered 2xx with a body that is not JSON.
    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Request(err.to_string())
    }
}

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        GenerationError::Parse(err.to_string())
    }
}

/// Errors from constructing or loading a [`Corpus`](crate::corpus::Corpus).
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("corpus must contain at least one passage")]
    Empty,
    #[error("failed to read corpus file '{path}': {message}")]
    Io { path: PathBuf, message: String },
    #[error("failed to parse corpus: {0}")]
    Parse(String),
}

/// Invalid configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid timeout '{0}': expected a positive number of seconds")]
    InvalidTimeout(String),
    #[error("invalid endpoint '{0}': expected an http(s) URL")]
    InvalidEndpoint(String),
}
