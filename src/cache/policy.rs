//! TTL classes and expiry policy for cached responses

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Category of a cached response, determining how long it stays valid.
///
/// Paper metadata is near-immutable (title, authors, and abstract don't
/// change once published), while citation counts and search results drift
/// over time and must refresh sooner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TtlClass {
    /// Paper metadata from the arXiv export API
    Metadata,
    /// Search and listing results
    Search,
    /// Citation counts from Semantic Scholar
    Citations,
    /// Reference lists from Semantic Scholar
    References,
    /// Full-text content fetched through Jina Reader
    Content,
}

/// Expiry durations per TTL class, plus the grace margin used by
/// [`ResponseCache::purge_expired`](super::ResponseCache::purge_expired).
///
/// The defaults follow the upstream refresh rates: citation and reference
/// data is considered fresh for 7 days, search results for a day, and paper
/// metadata effectively forever (one year). All durations are configurable
/// rather than hard-coded because the upstream services document no exact
/// refresh cadence.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    /// TTL for paper metadata
    pub metadata: Duration,
    /// TTL for search results
    pub search: Duration,
    /// TTL for citation counts
    pub citations: Duration,
    /// TTL for reference lists
    pub references: Duration,
    /// TTL for full-text content
    pub content: Duration,
    /// Extra margin past the TTL before `purge_expired` removes an entry
    pub grace: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            metadata: Duration::days(365),
            search: Duration::days(1),
            citations: Duration::days(7),
            references: Duration::days(7),
            content: Duration::days(30),
            grace: Duration::days(7),
        }
    }
}

impl CachePolicy {
    /// Returns the TTL for the given class.
    pub fn ttl(&self, class: TtlClass) -> Duration {
        match class {
            TtlClass::Metadata => self.metadata,
            TtlClass::Search => self.search,
            TtlClass::Citations => self.citations,
            TtlClass::References => self.references,
            TtlClass::Content => self.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_citation_ttl_is_seven_days() {
        let policy = CachePolicy::default();
        assert_eq!(policy.ttl(TtlClass::Citations), Duration::days(7));
        assert_eq!(policy.ttl(TtlClass::References), Duration::days(7));
    }

    #[test]
    fn test_metadata_outlives_search() {
        let policy = CachePolicy::default();
        assert!(policy.ttl(TtlClass::Metadata) > policy.ttl(TtlClass::Search));
    }

    #[test]
    fn test_ttl_class_serializes_as_snake_case() {
        let json = serde_json::to_string(&TtlClass::Citations).unwrap();
        assert_eq!(json, "\"citations\"");

        let parsed: TtlClass = serde_json::from_str("\"metadata\"").unwrap();
        assert_eq!(parsed, TtlClass::Metadata);
    }
}
