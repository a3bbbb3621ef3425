//! Core model-client trait and provider error types
//!
//! The correction loop depends on exactly one external capability: turn a
//! prompt into completion text. Everything provider-specific lives behind
//! the `ModelClient` trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;

/// Sampling parameters for a completion call.
///
/// The loop wants deterministic, rule-following output, so the default
/// temperature is low.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 4096,
        }
    }
}

impl SamplingConfig {
    /// Override the max token budget
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Errors that can occur while talking to the model provider
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Missing API key: environment variable {env_var} not set")]
    MissingApiKey { env_var: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Provider returned an empty completion")]
    EmptyResponse,
}

/// Stateless model client - each call is independent (fresh context)
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Single completion request (blocking until complete).
    ///
    /// Must never resolve to empty text: an empty completion is a
    /// `ProviderError::EmptyResponse`.
    async fn complete(
        &self,
        prompt: &str,
        sampling: &SamplingConfig,
    ) -> std::result::Result<String, ProviderError>;
}

/// Mock client that replays scripted responses, in order.
///
/// Used by unit and integration tests to drive the loop without network
/// access. Running out of scripted responses is an `InvalidResponse` error.
pub struct MockModelClient {
    responses: Mutex<Vec<String>>,
    calls: Mutex<Vec<String>>,
}

impl MockModelClient {
    /// Create a mock that will return the given responses in order
    pub fn new(responses: Vec<String>) -> Self {
        let mut responses = responses;
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Number of completion calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Prompts received, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn complete(
        &self,
        prompt: &str,
        _sampling: &SamplingConfig,
    ) -> std::result::Result<String, ProviderError> {
        self.calls.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| ProviderError::InvalidResponse("mock exhausted".to_string()))
    }
}

/// Mock client that always fails with an API error.
pub struct FailingModelClient;

#[async_trait]
impl ModelClient for FailingModelClient {
    async fn complete(
        &self,
        _prompt: &str,
        _sampling: &SamplingConfig,
    ) -> std::result::Result<String, ProviderError> {
        Err(ProviderError::ApiError {
            status: 503,
            message: "service unavailable".to_string(),
        })
    }
}
