//! Design-token store - the immutable compliance baseline for a session
//!
//! Tokens are loaded once from a JSON document, flattened into per-category
//! value sets, and shared read-only (`Arc<DesignTokenSet>`) across requests.
//! The loop never mutates them.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ArchitectError, Result};

/// A style-value category the linter checks compliance for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenCategory {
    Color,
    Radius,
    Font,
    Spacing,
    Opacity,
}

impl TokenCategory {
    /// Categories that must be present and non-empty in every document
    pub const REQUIRED: [TokenCategory; 3] = [TokenCategory::Color, TokenCategory::Radius, TokenCategory::Font];

    /// All known categories, in document order
    pub const ALL: [TokenCategory; 5] = [
        TokenCategory::Color,
        TokenCategory::Radius,
        TokenCategory::Font,
        TokenCategory::Spacing,
        TokenCategory::Opacity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenCategory::Color => "colors",
            TokenCategory::Radius => "radius",
            TokenCategory::Font => "fonts",
            TokenCategory::Spacing => "spacing",
            TokenCategory::Opacity => "opacity",
        }
    }

    /// Accepted document keys for this category
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            TokenCategory::Color => &["colors", "color"],
            TokenCategory::Radius => &["radius", "radii", "border-radius"],
            TokenCategory::Font => &["fonts", "font", "font-family"],
            TokenCategory::Spacing => &["spacing", "space"],
            TokenCategory::Opacity => &["opacity", "opacities"],
        }
    }
}

impl std::fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable set of allowed literal style values, keyed by category.
///
/// Values are stored both raw (for prompt/feedback rendering) and normalized
/// (for membership checks).
#[derive(Debug, Clone)]
pub struct DesignTokenSet {
    values: HashMap<TokenCategory, Vec<String>>,
    normalized: HashMap<TokenCategory, Vec<String>>,
    equivalents: HashMap<String, String>,
}

impl DesignTokenSet {
    /// Normalized membership check for a literal in a category.
    ///
    /// Hex colors compare case-insensitively with 3-digit shorthand expanded.
    /// Unit literals compare by exact normalized string; `8px` equals `0.5rem`
    /// only when the document's `equivalents` table says so.
    pub fn allowed(&self, category: TokenCategory, literal: &str) -> bool {
        let norm = normalize(literal);
        let Some(set) = self.normalized.get(&category) else {
            return false;
        };
        if set.iter().any(|v| *v == norm) {
            return true;
        }
        // Equivalence table is symmetric: either side of a pair maps to the other.
        if let Some(eq) = self.lookup_equivalent(&norm) {
            return set.iter().any(|v| *v == eq);
        }
        false
    }

    /// Whether the set carries values for a category at all
    pub fn has_category(&self, category: TokenCategory) -> bool {
        self.values.get(&category).is_some_and(|v| !v.is_empty())
    }

    /// Raw allowed values for a category, in document order
    pub fn values(&self, category: TokenCategory) -> &[String] {
        self.values.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Serialize the set as a JSON object for prompt embedding
    pub fn to_prompt_json(&self) -> Value {
        let mut doc = serde_json::Map::new();
        for category in TokenCategory::ALL {
            if let Some(values) = self.values.get(&category) {
                if !values.is_empty() {
                    doc.insert(category.as_str().to_string(), Value::from(values.clone()));
                }
            }
        }
        Value::Object(doc)
    }

    fn lookup_equivalent(&self, norm: &str) -> Option<String> {
        if let Some(v) = self.equivalents.get(norm) {
            return Some(v.clone());
        }
        self.equivalents
            .iter()
            .find(|(_, v)| v.as_str() == norm)
            .map(|(k, _)| k.clone())
    }
}

/// Loads design-token documents into immutable `DesignTokenSet`s
pub struct DesignTokenStore;

impl DesignTokenStore {
    /// Load a token document from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Arc<DesignTokenSet>> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Parse a token document from a JSON string
    pub fn from_json(content: &str) -> Result<Arc<DesignTokenSet>> {
        let doc: Value = serde_json::from_str(content)?;

        // Categories live under a top-level "tokens" key or at the root.
        let root = match doc.get("tokens") {
            Some(Value::Object(_)) => &doc["tokens"],
            _ => &doc,
        };
        let root = root
            .as_object()
            .ok_or_else(|| ArchitectError::Config("token document must be a JSON object".to_string()))?;

        let mut values = HashMap::new();
        let mut normalized = HashMap::new();

        for category in TokenCategory::ALL {
            let entry = category.aliases().iter().find_map(|alias| root.get(*alias));
            let Some(entry) = entry else {
                if TokenCategory::REQUIRED.contains(&category) {
                    return Err(ArchitectError::Config(format!(
                        "token document missing required category '{}'",
                        category
                    )));
                }
                continue;
            };

            let mut leaves = Vec::new();
            flatten(entry, &mut leaves);
            if leaves.is_empty() {
                // An empty category is never a silent allow-all.
                return Err(ArchitectError::Config(format!("token category '{}' is empty", category)));
            }

            normalized.insert(category, leaves.iter().map(|v| normalize(v)).collect());
            values.insert(category, leaves);
        }

        let equivalents = doc
            .get("equivalents")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (normalize(k), normalize(v))))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Arc::new(DesignTokenSet {
            values,
            normalized,
            equivalents,
        }))
    }

    /// Built-in token document used when no path is configured
    pub fn default_set() -> Arc<DesignTokenSet> {
        // The embedded document is known-good; a parse failure here is a bug.
        Self::from_json(DEFAULT_TOKEN_DOCUMENT).unwrap_or_else(|e| panic!("embedded token document invalid: {}", e))
    }
}

/// Default design system: dark slate background, indigo/purple accents
const DEFAULT_TOKEN_DOCUMENT: &str = r##"{
  "tokens": {
    "colors": {
      "background": "#0f172a",
      "surface": "#1e293b",
      "primary": "#6366f1",
      "accent": "#a855f7",
      "text": "#f8fafc",
      "muted": "#94a3b8"
    },
    "radius": {
      "sm": "8px",
      "md": "12px",
      "lg": "16px"
    },
    "fonts": {
      "body": "Inter",
      "mono": "JetBrains Mono"
    },
    "spacing": {
      "xs": "4px",
      "sm": "8px",
      "md": "16px",
      "lg": "24px",
      "xl": "32px"
    },
    "opacity": {
      "faint": "0.1",
      "soft": "0.7",
      "hover": "0.9"
    }
  }
}"##;

/// Collect leaf string/number values from a (possibly nested) category entry
fn flatten(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for v in map.values() {
                flatten(v, out);
            }
        }
        Value::Array(items) => {
            for v in items {
                flatten(v, out);
            }
        }
        Value::String(s) => out.push(s.clone()),
        Value::Number(n) => out.push(n.to_string()),
        _ => {}
    }
}

/// Canonical form for membership comparison: trimmed, lowercased, with
/// 3-digit hex shorthand expanded to 6 digits.
fn normalize(literal: &str) -> String {
    let lower = literal.trim().to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix('#') {
        if hex.len() == 3 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            let expanded: String = hex.chars().flat_map(|c| [c, c]).collect();
            return format!("#{}", expanded);
        }
    }
    lower
}
