//! File-backed store mapping request signatures to cached payloads
//!
//! Each entry is one JSON file in an XDG-compliant cache directory
//! (`~/.cache/arxscout/` on Linux). Entries are complete independent
//! payloads written atomically (temp file + rename), so concurrent
//! invocations never observe a partially written entry and last write wins
//! on overlapping keys.

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{CachePolicy, TtlClass};

/// One cached response as persisted on disk.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    /// The logical request key this entry answers
    key: String,
    /// Opaque serialized response body
    payload: String,
    /// When the entry was written
    stored_at: DateTime<Utc>,
    /// Category determining the expiry duration
    ttl_class: TtlClass,
}

/// Summary of the cache contents, for `cache stats`.
#[derive(Debug, Serialize)]
pub struct CacheStats {
    /// Number of entries physically present
    pub entries: usize,
    /// Number of those entries already past their TTL
    pub expired: usize,
    /// Total size of the stored files in bytes
    pub total_bytes: u64,
    /// Directory holding the cache
    pub dir: PathBuf,
}

/// Persistent response cache with per-class TTL expiry.
///
/// The cache is the sole source of truth for "have we already fetched this":
/// an entry past its TTL is reported as a miss even while it is still
/// physically present, until [`purge_expired`](Self::purge_expired) removes
/// it. Every storage error is swallowed (logged at debug/warn level) and
/// reported as a miss, so an unavailable disk degrades the tool to
/// always-fetch rather than failure.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    cache_dir: PathBuf,
    policy: CachePolicy,
}

impl ResponseCache {
    /// Opens the cache in the XDG-compliant user cache directory.
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g. no
    /// home directory); callers treat that the same as a disabled cache.
    pub fn open() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "arxscout")?;
        Some(Self::open_at(project_dirs.cache_dir().to_path_buf()))
    }

    /// Opens the cache at a specific directory with the default policy.
    pub fn open_at(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            policy: CachePolicy::default(),
        }
    }

    /// Replaces the expiry policy.
    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the stored payload for `key` if present and unexpired.
    ///
    /// Expired entries are left in place (lazy purge); unreadable or
    /// malformed entries are deleted and reported as a miss.
    pub fn get(&self, key: &str) -> Option<String> {
        let path = self.entry_path(key);
        let content = fs::read_to_string(&path).ok()?;
        let entry: CacheEntry = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                debug!("removing malformed cache entry {}: {e}", path.display());
                let _ = fs::remove_file(&path);
                return None;
            }
        };

        let age = Utc::now() - entry.stored_at;
        if age >= self.policy.ttl(entry.ttl_class) {
            debug!("cache expired: {key}");
            return None;
        }

        debug!("cache hit: {key}");
        Some(entry.payload)
    }

    /// Stores `payload` under `key`, overwriting any previous entry and
    /// resetting its timestamp.
    ///
    /// Never fails: storage errors are logged and the caller proceeds
    /// without caching.
    pub fn put(&self, key: &str, payload: &str, ttl_class: TtlClass) {
        if let Err(e) = self.try_put(key, payload, ttl_class) {
            warn!("cache write failed for {key}: {e}");
        }
    }

    /// Deserializes the payload for `key` as JSON.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let payload = self.get(key)?;
        match serde_json::from_str(&payload) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("cached payload for {key} no longer deserializes: {e}");
                let _ = fs::remove_file(self.entry_path(key));
                None
            }
        }
    }

    /// Serializes `value` as JSON and stores it under `key`.
    pub fn put_json<T: Serialize>(&self, key: &str, value: &T, ttl_class: TtlClass) {
        match serde_json::to_string(value) {
            Ok(payload) => self.put(key, &payload, ttl_class),
            Err(e) => warn!("cache serialization failed for {key}: {e}"),
        }
    }

    /// Removes entries whose age exceeds their TTL plus the grace margin.
    ///
    /// Entries within their validity window are unaffected. Safe to run
    /// concurrently with `get`/`put` because every entry is an independent
    /// file. Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut removed = 0;
        for path in self.entry_files() {
            let keep = fs::read_to_string(&path)
                .ok()
                .and_then(|content| serde_json::from_str::<CacheEntry>(&content).ok())
                .map(|entry| now - entry.stored_at < self.policy.ttl(entry.ttl_class) + self.policy.grace)
                .unwrap_or(false);
            if !keep && fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
        removed
    }

    /// Removes all entries. Returns the number removed.
    pub fn clear(&self) -> usize {
        let mut removed = 0;
        for path in self.entry_files() {
            if fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
        removed
    }

    /// Reports entry count, expired count, and total size.
    pub fn stats(&self) -> CacheStats {
        let now = Utc::now();
        let mut stats = CacheStats {
            entries: 0,
            expired: 0,
            total_bytes: 0,
            dir: self.cache_dir.clone(),
        };
        for path in self.entry_files() {
            stats.entries += 1;
            if let Ok(meta) = fs::metadata(&path) {
                stats.total_bytes += meta.len();
            }
            let expired = fs::read_to_string(&path)
                .ok()
                .and_then(|content| serde_json::from_str::<CacheEntry>(&content).ok())
                .map(|entry| now - entry.stored_at >= self.policy.ttl(entry.ttl_class))
                .unwrap_or(true);
            if expired {
                stats.expired += 1;
            }
        }
        stats
    }

    fn try_put(&self, key: &str, payload: &str, ttl_class: TtlClass) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir)?;

        let entry = CacheEntry {
            key: key.to_string(),
            payload: payload.to_string(),
            stored_at: Utc::now(),
            ttl_class,
        };
        let json = serde_json::to_string(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        // Write through a temp file and rename so readers never see a
        // partial entry.
        let mut tmp = tempfile::NamedTempFile::new_in(&self.cache_dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(self.entry_path(key))
            .map_err(|e| e.error)?;
        Ok(())
    }

    /// Maps a key to its file path. The sanitized prefix keeps file names
    /// readable; the hash suffix keeps distinct keys from colliding after
    /// sanitization or truncation.
    fn entry_path(&self, key: &str) -> PathBuf {
        let sanitized: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
            .take(80)
            .collect();

        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        self.cache_dir
            .join(format!("{sanitized}-{:016x}.json", hasher.finish()))
    }

    fn entry_files(&self) -> Vec<PathBuf> {
        let Ok(read_dir) = fs::read_dir(&self.cache_dir) else {
            return Vec::new();
        };
        read_dir
            .filter_map(|res| res.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn create_test_cache() -> (ResponseCache, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = ResponseCache::open_at(temp_dir.path().to_path_buf());
        (cache, temp_dir)
    }

    /// Policy where everything is already expired, for simulating clock
    /// advance without sleeping.
    fn expired_policy() -> CachePolicy {
        CachePolicy {
            metadata: Duration::zero(),
            search: Duration::zero(),
            citations: Duration::zero(),
            references: Duration::zero(),
            content: Duration::zero(),
            grace: Duration::zero(),
        }
    }

    #[test]
    fn test_get_unknown_key_is_miss() {
        let (cache, _temp_dir) = create_test_cache();
        assert!(cache.get("search:q=nothing").is_none());
    }

    #[test]
    fn test_put_then_get_returns_payload() {
        let (cache, _temp_dir) = create_test_cache();
        cache.put("paper:2301.00001", "{\"title\":\"x\"}", TtlClass::Metadata);
        assert_eq!(
            cache.get("paper:2301.00001").as_deref(),
            Some("{\"title\":\"x\"}")
        );
    }

    #[test]
    fn test_overwrite_returns_latest_payload() {
        let (cache, _temp_dir) = create_test_cache();
        cache.put("citations:2301.00001", "v1", TtlClass::Citations);
        cache.put("citations:2301.00001", "v2", TtlClass::Citations);
        assert_eq!(cache.get("citations:2301.00001").as_deref(), Some("v2"));
    }

    #[test]
    fn test_expired_entry_is_miss_but_still_stored() {
        let (cache, temp_dir) = create_test_cache();
        cache.put("search:q=transformer&cat=cs.lg", "payload_A", TtlClass::Search);

        let expired = ResponseCache::open_at(temp_dir.path().to_path_buf())
            .with_policy(expired_policy());
        assert!(expired.get("search:q=transformer&cat=cs.lg").is_none());

        // The record is physically present until purged.
        assert_eq!(expired.stats().entries, 1);
    }

    #[test]
    fn test_malformed_entry_is_miss_and_deleted() {
        let (cache, temp_dir) = create_test_cache();
        cache.put("paper:2301.00001", "ok", TtlClass::Metadata);

        // Corrupt the single entry file on disk.
        let path = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();
        std::fs::write(&path, "{ not json").unwrap();

        assert!(cache.get("paper:2301.00001").is_none());
        assert!(!path.exists(), "malformed entry should be removed");
    }

    #[test]
    fn test_purge_removes_only_entries_past_grace() {
        let (cache, temp_dir) = create_test_cache();
        cache.put("citations:2301.00001", "42", TtlClass::Citations);
        cache.put("search:q=fresh", "results", TtlClass::Search);

        // With the default policy nothing is past TTL + grace.
        assert_eq!(cache.purge_expired(), 0);
        assert_eq!(cache.stats().entries, 2);

        // With a zero policy everything is.
        let expired = ResponseCache::open_at(temp_dir.path().to_path_buf())
            .with_policy(expired_policy());
        assert_eq!(expired.purge_expired(), 2);
        assert_eq!(expired.stats().entries, 0);
    }

    #[test]
    fn test_purge_keeps_entries_within_validity_window() {
        let (cache, temp_dir) = create_test_cache();
        cache.put("paper:2301.00001", "meta", TtlClass::Metadata);

        // Search TTL of zero but a metadata TTL of a year: a purge must not
        // touch the still-valid metadata entry.
        let mixed = ResponseCache::open_at(temp_dir.path().to_path_buf()).with_policy(CachePolicy {
            search: Duration::zero(),
            grace: Duration::zero(),
            ..CachePolicy::default()
        });
        mixed.put("search:q=stale", "old", TtlClass::Search);

        assert_eq!(mixed.purge_expired(), 1);
        assert_eq!(mixed.get("paper:2301.00001").as_deref(), Some("meta"));
    }

    #[test]
    fn test_clear_removes_everything() {
        let (cache, _temp_dir) = create_test_cache();
        cache.put("a", "1", TtlClass::Search);
        cache.put("b", "2", TtlClass::Citations);
        assert_eq!(cache.clear(), 2);
        assert!(cache.get("a").is_none());
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_json_roundtrip() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Payload {
            count: u64,
        }

        let (cache, _temp_dir) = create_test_cache();
        cache.put_json("citations:2301.00001", &Payload { count: 7 }, TtlClass::Citations);
        let back: Payload = cache.get_json("citations:2301.00001").unwrap();
        assert_eq!(back, Payload { count: 7 });
    }

    #[test]
    fn test_distinct_keys_map_to_distinct_files() {
        let (cache, _temp_dir) = create_test_cache();
        // Same sanitized prefix, different raw keys.
        cache.put("search:q=a b", "one", TtlClass::Search);
        cache.put("search:q=a_b", "two", TtlClass::Search);
        assert_eq!(cache.get("search:q=a b").as_deref(), Some("one"));
        assert_eq!(cache.get("search:q=a_b").as_deref(), Some("two"));
        assert_eq!(cache.stats().entries, 2);
    }

    #[test]
    fn test_write_failure_fails_open() {
        // Point the cache at a path that cannot be a directory.
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("occupied");
        std::fs::write(&file_path, "not a dir").unwrap();

        let cache = ResponseCache::open_at(file_path.join("sub"));
        cache.put("k", "v", TtlClass::Search);
        assert!(cache.get("k").is_none());
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_stats_counts_expired() {
        let (_, temp_dir) = create_test_cache();
        let cache = ResponseCache::open_at(temp_dir.path().to_path_buf()).with_policy(CachePolicy {
            search: Duration::zero(),
            ..CachePolicy::default()
        });
        cache.put("search:q=old", "x", TtlClass::Search);
        cache.put("paper:2301.00001", "y", TtlClass::Metadata);

        let stats = cache.stats();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.expired, 1);
        assert!(stats.total_bytes > 0);
    }
}
