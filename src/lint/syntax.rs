//! Structural syntax pass
//!
//! Heuristic checks for the minimum shape of a standalone Angular component:
//! balanced brackets, terminated quotes/templates, and the required
//! declaration constructs. This is deliberately not a grammar parse; it
//! catches gross malformation (truncated output, missing decorator) and
//! yields one finding per defect category.

use crate::lint::finding::Finding;

/// Bracket pairs checked independently by count
const BRACKET_PAIRS: [(char, char, &str); 3] = [
    ('{', '}', "curly braces"),
    ('[', ']', "square brackets"),
    ('(', ')', "parentheses"),
];

/// Run every structural rule against the candidate
pub fn check(candidate: &str) -> Vec<Finding> {
    let mut findings = Vec::new();

    for (open, close, name) in BRACKET_PAIRS {
        if let Some(finding) = check_balance(candidate, open, close, name) {
            findings.push(finding);
        }
    }

    if let Some(finding) = check_quote_parity(candidate, '`', "backtick template literal") {
        findings.push(finding);
    }
    if let Some(finding) = check_quote_parity(candidate, '"', "double quote") {
        findings.push(finding);
    }

    findings.extend(check_required_constructs(candidate));
    findings
}

/// Count-based balance check; counting is naive about strings and comments,
/// which is acceptable for catching truncated generations.
fn check_balance(candidate: &str, open: char, close: char, name: &str) -> Option<Finding> {
    let opens = candidate.chars().filter(|c| *c == open).count();
    let closes = candidate.chars().filter(|c| *c == close).count();
    if opens != closes {
        Some(Finding::syntax(
            format!("unbalanced {}: {} opening vs {} closing", name, opens, closes),
            format!("{}{}", open, close),
        ))
    } else {
        None
    }
}

/// An odd number of quote characters means an unterminated string or template
fn check_quote_parity(candidate: &str, quote: char, name: &str) -> Option<Finding> {
    let count = candidate.chars().filter(|c| *c == quote).count();
    if count % 2 != 0 {
        Some(Finding::syntax(
            format!("unterminated {} ({} occurrences)", name, count),
            quote.to_string(),
        ))
    } else {
        None
    }
}

/// Presence checks for the constructs every standalone component needs
fn check_required_constructs(candidate: &str) -> Vec<Finding> {
    let mut findings = Vec::new();

    if !candidate.contains("@Component") {
        findings.push(Finding::syntax(
            "missing @Component decorator, required for Angular components",
            "@Component",
        ));
    }
    if !candidate.contains("selector:") {
        findings.push(Finding::syntax("component missing 'selector' definition", "selector:"));
    }
    if !candidate.contains("template:") && !candidate.contains("templateUrl:") {
        findings.push(Finding::syntax(
            "component missing 'template' or 'templateUrl'",
            "template:",
        ));
    }
    if !candidate.contains("export class") {
        findings.push(Finding::syntax(
            "missing exported component class declaration",
            "export class",
        ));
    }

    findings
}
