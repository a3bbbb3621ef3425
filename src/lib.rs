//! Architect - guided component generation with a bounded correction loop
//!
//! Architect turns a natural-language UI request into a design-token-compliant
//! Angular component by iterating a Generate -> Validate -> Correct cycle
//! until the deterministic linter passes or the iteration ceiling is hit.

pub mod config;
pub mod error;
pub mod feedback;
pub mod generator;
pub mod lint;
pub mod llm;
pub mod runner;
pub mod sanitize;
pub mod server;
pub mod tokens;

pub use error::{ArchitectError, Result};
