//! Error types for Architect
//!
//! Centralized error handling using thiserror. Lint findings are *not*
//! errors: they are data that drive the correction loop (see `lint`).

use thiserror::Error;

use crate::llm::ProviderError;

/// All error types that can terminate a generation request
#[derive(Debug, Error)]
pub enum ArchitectError {
    /// Bad or missing design-token definitions (fatal, pre-loop)
    #[error("Config error: {0}")]
    Config(String),

    /// Prompt-injection phrase detected while the sanitizer runs in strict mode
    #[error("Injection detected: {0}")]
    InjectionDetected(String),

    /// Model-provider failure (transport, timeout, empty response)
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The caller cancelled the request mid-loop
    #[error("Request cancelled")]
    Cancelled,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Architect operations
pub type Result<T> = std::result::Result<T, ArchitectError>;
