//! Model client layer - the single external capability the loop depends on
//!
//! This module provides:
//! - `ModelClient` trait for provider abstraction
//! - `AnthropicClient` implementation
//! - `SamplingConfig` for low-randomness generation
//! - Mock clients for tests

pub mod anthropic;
pub mod client;

pub use anthropic::{AnthropicClient, AnthropicConfig};
pub use client::{FailingModelClient, MockModelClient, ModelClient, ProviderError, SamplingConfig};
