//! Deterministic cache key derivation from request parameters
//!
//! A search with different filters is a different logical request, so keys
//! are derived from the full parameter set, not just the paper identifier.
//! Parameters are normalized (trimmed, whitespace-collapsed, lowercased) and
//! stably ordered so that equivalent queries issued with parameters in a
//! different order produce the same key.

use std::collections::BTreeMap;

/// Builder for a cache key identifying one logical upstream request.
///
/// # Example
/// ```
/// use arxscout::cache::Signature;
///
/// let key = Signature::new("search")
///     .param("q", "Transformer  Attention")
///     .param("cat", "cs.LG")
///     .key();
/// assert_eq!(key, "search:cat=cs.lg&q=transformer attention");
/// ```
#[derive(Debug, Clone)]
pub struct Signature {
    kind: String,
    params: BTreeMap<String, String>,
}

impl Signature {
    /// Creates a signature for the given request kind (e.g. "search",
    /// "citations").
    pub fn new(kind: &str) -> Self {
        Self {
            kind: normalize(kind),
            params: BTreeMap::new(),
        }
    }

    /// Adds a normalized parameter. Re-adding the same name overwrites.
    pub fn param(mut self, name: &str, value: &str) -> Self {
        self.params.insert(normalize(name), normalize(value));
        self
    }

    /// Adds a parameter only if the value is present.
    pub fn opt_param(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.param(name, v),
            None => self,
        }
    }

    /// Returns the final key: `kind:name=value&name=value` with parameters
    /// in lexicographic order.
    pub fn key(&self) -> String {
        if self.params.is_empty() {
            return self.kind.clone();
        }
        let params: Vec<String> = self
            .params
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        format!("{}:{}", self.kind, params.join("&"))
    }
}

/// Trims, collapses internal whitespace, and lowercases.
fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
