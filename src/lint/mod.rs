//! Deterministic linter - the pass/fail oracle of the correction loop
//!
//! Two independent passes, both always run so a single report carries every
//! finding: structural syntax checks and design-token compliance. Findings
//! are data consumed by the feedback composer, never raised as errors.

pub mod finding;
pub mod syntax;
pub mod token_pass;

pub use finding::{Finding, FindingKind};

use crate::tokens::DesignTokenSet;

/// Runs both lint passes against a candidate
#[derive(Debug, Clone, Copy, Default)]
pub struct Linter;

impl Linter {
    pub fn new() -> Self {
        Self
    }

    /// Lint a candidate against the session token set.
    ///
    /// Syntax findings come first, then token violations, each in discovery
    /// order. An empty candidate yields exactly one syntax finding and skips
    /// the token pass (nothing to scan).
    pub fn lint(&self, candidate: &str, tokens: &DesignTokenSet) -> Vec<Finding> {
        if candidate.trim().is_empty() {
            return vec![Finding::syntax("generator returned an empty candidate", "")];
        }

        let mut findings = syntax::check(candidate);
        findings.extend(token_pass::check(candidate, tokens));
        findings
    }
}
