//! HTTP client for the text-generation service.
//!
//! One turn is one POST: the augmented prompt goes out as the only content
//! entry, and the first candidate's first text part comes back. There is no
//! retry and no streaming. A 2xx response whose body lacks the expected
//! shape degrades to [`NO_RESPONSE_FALLBACK`] rather than failing.

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::error::GenerationError;

/// Sampling temperature sent with every request.
pub const GENERATION_TEMPERATURE: f32 = 0.7;

/// Reply used when the service answers successfully but without usable text.
pub const NO_RESPONSE_FALLBACK: &str = "No response found.";

/// JSON pointer to the generated text in a `generateContent` response.
const REPLY_POINTER: &str = "/candidates/0/content/parts/0/text";

// ── Request types ──────────────────────────────────────────────────

/// `generateContent` request body.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateRequest {
    /// A single user turn carrying `prompt`, at the fixed temperature.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.into(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: GENERATION_TEMPERATURE,
            },
        }
    }
}

#[derive(Serialize, Debug)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Serialize, Debug)]
pub struct Part {
    pub text: String,
}

#[derive(Serialize, Debug)]
pub struct GenerationConfig {
    pub temperature: f32,
}

// ── Response handling ──────────────────────────────────────────────

/// Pull the reply text out of a parsed response body.
///
/// Returns [`NO_RESPONSE_FALLBACK`] when the candidate path is missing, is
/// not a string, or is empty.
pub fn extract_reply(body: &serde_json::Value) -> String {
    match body.pointer(REPLY_POINTER).and_then(|v| v.as_str()) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => {
            warn!("Generation response had no candidate text; using fallback reply");
            NO_RESPONSE_FALLBACK.to_string()
        }
    }
}

// ── Generator trait ────────────────────────────────────────────────

/// Boxed future returned by [`TextGenerator::generate`].
pub type GenerationFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, GenerationError>> + Send + 'a>>;

/// Anything that can turn a prompt into generated text.
///
/// [`GenerationClient`] is the production implementation; tests drive the
/// conversation controller with scripted implementations.
pub trait TextGenerator: Send + Sync {
    fn generate<'a>(&'a self, prompt: &'a str) -> GenerationFuture<'a>;
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for a `generateContent`-style endpoint.
pub struct GenerationClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl GenerationClient {
    /// Create a client for `endpoint` with a per-request timeout.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("sage-rag/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send `prompt` and return the generated reply.
    pub async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = GenerateRequest::from_prompt(prompt);
        debug!(
            "Generation request: endpoint={}, prompt={} chars, temp={}",
            self.endpoint,
            prompt.len(),
            body.generation_config.temperature,
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(&body).map_or(0, |s| s.len())
        );

        let start = Instant::now();

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("x-goog-api-key", key);
        }
        let resp = request.send().await?;

        let status = resp.status();
        let text = resp.text().await?;

        debug!(
            "Generation response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: serde_json::Value = serde_json::from_str(&text)?;
        Ok(extract_reply(&parsed))
    }
}

impl TextGenerator for GenerationClient {
    fn generate<'a>(&'a self, prompt: &'a str) -> GenerationFuture<'a> {
        Box::pin(self.complete(prompt))
    }
}
