use crate::models::SourceResult;
use dashmap::DashMap;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

#[derive(Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    source: String,
    subject: String,
}

struct CacheEntry {
    result: SourceResult,
    expires_at: Instant,
}

/// (source, subject) keyed cache of source results.
///
/// Shields the rate limiter and the network from duplicate lookups. Expiry is
/// lazy: a read past TTL is a miss and evicts the stale entry. The unit of
/// update is the whole `SourceResult`; the sharded map never exposes a
/// partially written value.
pub struct SourceCache {
    entries: DashMap<CacheKey, CacheEntry>,
    enabled: bool,
}

impl SourceCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            entries: DashMap::new(),
            enabled,
        }
    }

    /// Cached result for (source, subject), or a miss. Stale entries are
    /// evicted on the way out.
    pub fn get(&self, source: &str, subject: &str) -> Option<SourceResult> {
        if !self.enabled {
            return None;
        }

        let key = CacheKey {
            source: source.to_string(),
            subject: subject.to_string(),
        };

        if let Some(entry) = self.entries.get(&key) {
            if Instant::now() < entry.expires_at {
                trace!(source = %source, subject = %subject, "Cache hit");
                return Some(entry.result.clone());
            }
            drop(entry);
            self.entries.remove(&key);
            debug!(source = %source, subject = %subject, "Evicted stale cache entry");
        }
        None
    }

    /// Cache a result. Expiry is reset from the moment of write.
    pub fn put(&self, source: &str, subject: &str, result: SourceResult, ttl: Duration) {
        if !self.enabled {
            return;
        }

        let key = CacheKey {
            source: source.to_string(),
            subject: subject.to_string(),
        };
        self.entries.insert(
            key,
            CacheEntry {
                result,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Sweep expired entries. Optional; reads already treat them as misses.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| now < entry.expires_at);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let total_entries = self.entries.len();
        let live_entries = self
            .entries
            .iter()
            .filter(|entry| now < entry.expires_at)
            .count();

        CacheStats {
            total_entries,
            live_entries,
            expired_entries: total_entries - live_entries,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub live_entries: usize,
    pub expired_entries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldMap;
    use serde_json::json;

    fn result_for(source: &str) -> SourceResult {
        let mut fields = FieldMap::new();
        fields.insert("host_name".to_string(), json!("HostCo"));
        SourceResult::success(source.to_string(), fields, 5)
    }

    #[test]
    fn test_hit_within_ttl() {
        let cache = SourceCache::new(true);
        cache.put("ip-geo", "example.com", result_for("ip-geo"), Duration::from_secs(60));

        let hit = cache.get("ip-geo", "example.com").unwrap();
        assert_eq!(hit.source, "ip-geo");
        assert_eq!(hit.fields.get("host_name"), Some(&json!("HostCo")));
    }

    #[test]
    fn test_zero_ttl_is_immediate_miss() {
        let cache = SourceCache::new(true);
        cache.put("ip-geo", "example.com", result_for("ip-geo"), Duration::ZERO);

        assert!(cache.get("ip-geo", "example.com").is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_miss_and_evicted() {
        let cache = SourceCache::new(true);
        cache.put(
            "ip-geo",
            "example.com",
            result_for("ip-geo"),
            Duration::from_millis(40),
        );

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(cache.get("ip-geo", "example.com").is_none());
        assert_eq!(cache.stats().total_entries, 0);
    }

    #[test]
    fn test_keys_are_per_source() {
        let cache = SourceCache::new(true);
        cache.put("ip-geo", "example.com", result_for("ip-geo"), Duration::from_secs(60));

        assert!(cache.get("whois", "example.com").is_none());
        assert!(cache.get("ip-geo", "other.com").is_none());
    }

    #[test]
    fn test_disabled_cache_never_hits() {
        let cache = SourceCache::new(false);
        cache.put("ip-geo", "example.com", result_for("ip-geo"), Duration::from_secs(60));

        assert!(cache.get("ip-geo", "example.com").is_none());
        assert_eq!(cache.stats().total_entries, 0);
    }

    #[test]
    fn test_put_replaces_whole_value() {
        let cache = SourceCache::new(true);
        cache.put("ip-geo", "example.com", result_for("ip-geo"), Duration::from_secs(60));

        let mut fields = FieldMap::new();
        fields.insert("cdn".to_string(), json!("EdgeNet"));
        cache.put(
            "ip-geo",
            "example.com",
            SourceResult::success("ip-geo".to_string(), fields, 7),
            Duration::from_secs(60),
        );

        let hit = cache.get("ip-geo", "example.com").unwrap();
        assert!(hit.fields.contains_key("cdn"));
        assert!(!hit.fields.contains_key("host_name"));
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let cache = SourceCache::new(true);
        cache.put("a", "example.com", result_for("a"), Duration::from_millis(10));
        cache.put("b", "example.com", result_for("b"), Duration::from_secs(60));

        tokio::time::sleep(Duration::from_millis(30)).await;
        cache.purge_expired();

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.live_entries, 1);
        assert_eq!(stats.expired_entries, 0);
    }
}
