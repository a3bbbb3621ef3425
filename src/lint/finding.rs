//! Finding data model - deterministic defects reported by the linter
//!
//! Findings are recoverable data, not errors: the loop resolves them by
//! composing feedback and retrying.

use serde::{Deserialize, Serialize};

use crate::tokens::TokenCategory;

/// Kind of defect a finding reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Structural malformation (unbalanced brackets, missing declaration, ...)
    Syntax,
    /// A literal style value not present in the design-token set
    TokenViolation,
}

impl FindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingKind::Syntax => "syntax",
            FindingKind::TokenViolation => "token-violation",
        }
    }
}

impl std::fmt::Display for FindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single deterministic defect in a candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    /// Human-readable description of the defect
    pub message: String,
    /// The offending literal or snippet, empty when not applicable
    pub evidence: String,
    /// The token category the violation belongs to; `None` for syntax findings
    #[serde(default)]
    pub category: Option<TokenCategory>,
}

impl Finding {
    /// Create a syntax finding
    pub fn syntax(message: impl Into<String>, evidence: impl Into<String>) -> Self {
        Self {
            kind: FindingKind::Syntax,
            message: message.into(),
            evidence: evidence.into(),
            category: None,
        }
    }

    /// Create a token-violation finding carrying the offending literal and
    /// the category whose allowed values it must be replaced with
    pub fn token_violation(message: impl Into<String>, evidence: impl Into<String>, category: TokenCategory) -> Self {
        Self {
            kind: FindingKind::TokenViolation,
            message: message.into(),
            evidence: evidence.into(),
            category: Some(category),
        }
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.evidence.is_empty() {
            write!(f, "[{}] {}", self.kind, self.message)
        } else {
            write!(f, "[{}] {} (evidence: {})", self.kind, self.message, self.evidence)
        }
    }
}
