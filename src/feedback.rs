//! Feedback composition - turns findings into a corrective instruction block
//!
//! Specificity is what makes the bounded retry loop converge: every line
//! names the exact defect or literal and what to replace it with, never a
//! vague "fix the errors".

use crate::lint::{Finding, FindingKind};
use crate::tokens::DesignTokenSet;

/// Composes the correction block appended to the next generation request
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedbackComposer;

impl FeedbackComposer {
    pub fn new() -> Self {
        Self
    }

    /// Render findings as a corrective instruction block.
    ///
    /// Deterministic and stable: syntax findings before token findings, each
    /// kind in discovery order, one line per finding. Empty findings produce
    /// an empty string.
    pub fn compose(&self, findings: &[Finding], tokens: &DesignTokenSet) -> String {
        if findings.is_empty() {
            return String::new();
        }

        let mut block = String::from(
            "CRITICAL: your previous output failed validation. Fix every issue below \
             and output the complete corrected component:\n",
        );

        for finding in findings.iter().filter(|f| f.kind == FindingKind::Syntax) {
            block.push_str(&format!("- [syntax] {}; produce a structurally complete component\n", finding.message));
        }

        for finding in findings.iter().filter(|f| f.kind == FindingKind::TokenViolation) {
            // The violated category rides on the finding itself.
            let allowed = finding.category.map(|c| tokens.values(c)).unwrap_or(&[]);
            if allowed.is_empty() {
                block.push_str(&format!(
                    "- [token] replace '{}' with an approved design-token value\n",
                    finding.evidence
                ));
            } else {
                block.push_str(&format!(
                    "- [token] replace '{}' with one of the allowed values: {}\n",
                    finding.evidence,
                    allowed.join(", ")
                ));
            }
        }

        block
    }
}
