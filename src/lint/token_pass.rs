//! Token-compliance pass
//!
//! Scans the candidate for literal style values (hex colors, px/rem literals
//! next to radius- and spacing-like property names, quoted font families)
//! and checks each against the design-token set. Intentionally conservative:
//! literals in comments or dead markup are still flagged, because the loop
//! retries on false positives but a missed violation ships.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::lint::finding::Finding;
use crate::tokens::{DesignTokenSet, TokenCategory};

// Longest alternative first so #ff000080 matches as 8 digits, not 6 plus
// a trailing pair. 4 and 8 digit forms carry an alpha channel.
static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#[0-9a-fA-F]{8}\b|#[0-9a-fA-F]{6}\b|#[0-9a-fA-F]{4}\b|#[0-9a-fA-F]{3}\b").unwrap()
});

// CSS declarations: border-radius: 12px
static CSS_RADIUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)border-radius\s*:\s*([0-9]*\.?[0-9]+(?:px|rem))").unwrap());

// Tailwind arbitrary values: rounded-[12px], rounded-tl-[8px]
static TAILWIND_RADIUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)rounded(?:-[a-z]+)*-\[([0-9]*\.?[0-9]+(?:px|rem))\]").unwrap());

// CSS declarations: padding: 16px, margin-top: 8px, gap: 4px
static CSS_SPACING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:padding|margin|gap)(?:-[a-z]+)?\s*:\s*([0-9]*\.?[0-9]+(?:px|rem))").unwrap()
});

// Tailwind arbitrary values: p-[8px], mx-[16px], gap-[4px], space-x-[8px]
static TAILWIND_SPACING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:[pm][trblxyse]?|gap|space-[xy])-\[([0-9]*\.?[0-9]+(?:px|rem))\]").unwrap()
});

// Quoted font-family names: font-family: 'Inter'
static FONT_FAMILY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)font-family\s*:\s*['"]([^'"]+)['"]"#).unwrap());

/// Scan the candidate and report every disallowed literal, in discovery
/// order, deduplicated per distinct literal within a category.
pub fn check(candidate: &str, tokens: &DesignTokenSet) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut seen: HashSet<(TokenCategory, String)> = HashSet::new();

    for m in HEX_COLOR.find_iter(candidate) {
        report(
            m.as_str(),
            TokenCategory::Color,
            "unauthorized color",
            tokens,
            &mut seen,
            &mut findings,
        );
    }

    for caps in CSS_RADIUS.captures_iter(candidate).chain(TAILWIND_RADIUS.captures_iter(candidate)) {
        report(
            &caps[1],
            TokenCategory::Radius,
            "unauthorized border radius",
            tokens,
            &mut seen,
            &mut findings,
        );
    }

    // Spacing is optional in the token document; without a baseline there is
    // nothing to compare against.
    if tokens.has_category(TokenCategory::Spacing) {
        for caps in CSS_SPACING.captures_iter(candidate).chain(TAILWIND_SPACING.captures_iter(candidate)) {
            report(
                &caps[1],
                TokenCategory::Spacing,
                "unauthorized spacing value",
                tokens,
                &mut seen,
                &mut findings,
            );
        }
    }

    for caps in FONT_FAMILY.captures_iter(candidate) {
        report(
            &caps[1],
            TokenCategory::Font,
            "unauthorized font family",
            tokens,
            &mut seen,
            &mut findings,
        );
    }

    findings
}

fn report(
    literal: &str,
    category: TokenCategory,
    label: &str,
    tokens: &DesignTokenSet,
    seen: &mut HashSet<(TokenCategory, String)>,
    findings: &mut Vec<Finding>,
) {
    if tokens.allowed(category, literal) {
        return;
    }
    let key = (category, literal.to_ascii_lowercase());
    if !seen.insert(key) {
        return;
    }
    findings.push(Finding::token_violation(
        format!("{} '{}', use a value from the {} tokens", label, literal, category),
        literal,
        category,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::DesignTokenStore;
    use std::sync::Arc;

    fn test_tokens() -> Arc<DesignTokenSet> {
        DesignTokenStore::from_json(
            r##"{
                "tokens": {
                    "colors": { "primary": "#6366f1", "bg": "#0f172a" },
                    "radius": { "sm": "8px", "md": "12px" },
                    "fonts": { "body": "Inter" },
                    "spacing": { "sm": "8px", "md": "16px" }
                }
            }"##,
        )
        .unwrap()
    }

    #[test]
    fn test_compliant_candidate_is_clean() {
        let tokens = test_tokens();
        let candidate = r#"
            <div style="background: #0f172a; border-radius: 12px; padding: 16px">
                <button class="bg-[#6366f1] rounded-[8px] p-[8px]">Go</button>
            </div>
        "#;
        assert!(check(candidate, &tokens).is_empty());
    }

    #[test]
    fn test_disallowed_hex_color_flagged_with_evidence() {
        let tokens = test_tokens();
        let findings = check(r#"<div style="background: #ff0000">x</div>"#, &tokens);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].evidence, "#ff0000");
        assert!(findings[0].message.contains("colors"));
    }

    #[test]
    fn test_short_hex_flagged() {
        let tokens = test_tokens();
        let findings = check("color: #f00;", &tokens);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].evidence, "#f00");
    }

    #[test]
    fn test_alpha_hex_flagged_whole() {
        // An allowed color with an alpha channel appended is a different
        // literal and must be caught as one 8-digit match.
        let tokens = test_tokens();
        let findings = check("background: #6366f180;", &tokens);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].evidence, "#6366f180");
    }

    #[test]
    fn test_short_alpha_hex_flagged() {
        let tokens = test_tokens();
        let findings = check("color: #f008;", &tokens);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].evidence, "#f008");
    }

    #[test]
    fn test_violation_carries_category() {
        let tokens = test_tokens();
        let findings = check("background: #ff0000; border-radius: 20px;", &tokens);
        assert_eq!(findings[0].category, Some(TokenCategory::Color));
        assert_eq!(findings[1].category, Some(TokenCategory::Radius));
    }

    #[test]
    fn test_duplicate_literal_reported_once() {
        let tokens = test_tokens();
        let candidate = "background: #ff0000; border: 1px solid #FF0000; fill: #ff0000";
        let findings = check(candidate, &tokens);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_distinct_violations_all_reported_in_order() {
        let tokens = test_tokens();
        let candidate = "background: #ff0000; color: #00ff00";
        let findings = check(candidate, &tokens);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].evidence, "#ff0000");
        assert_eq!(findings[1].evidence, "#00ff00");
    }

    #[test]
    fn test_css_radius_violation() {
        let tokens = test_tokens();
        let findings = check("border-radius: 20px;", &tokens);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].evidence, "20px");
        assert!(findings[0].message.contains("radius"));
    }

    #[test]
    fn test_tailwind_radius_violation() {
        let tokens = test_tokens();
        let findings = check(r#"<div class="rounded-[20px]">"#, &tokens);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].evidence, "20px");
    }

    #[test]
    fn test_spacing_violation() {
        let tokens = test_tokens();
        let findings = check("padding: 13px; margin-top: 16px;", &tokens);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].evidence, "13px");
    }

    #[test]
    fn test_spacing_skipped_without_category() {
        let no_spacing = DesignTokenStore::from_json(
            r##"{
                "tokens": {
                    "colors": { "primary": "#6366f1" },
                    "radius": { "sm": "8px" },
                    "fonts": { "body": "Inter" }
                }
            }"##,
        )
        .unwrap();
        assert!(check("padding: 999px;", &no_spacing).is_empty());
    }

    #[test]
    fn test_font_family_violation() {
        let tokens = test_tokens();
        let findings = check("font-family: 'Comic Sans MS';", &tokens);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].evidence, "Comic Sans MS");
    }

    #[test]
    fn test_allowed_font_passes() {
        let tokens = test_tokens();
        assert!(check(r#"font-family: "Inter";"#, &tokens).is_empty());
    }

    #[test]
    fn test_literal_in_comment_still_flagged() {
        let tokens = test_tokens();
        let findings = check("// old color was #ff0000", &tokens);
        assert_eq!(findings.len(), 1);
    }
}
