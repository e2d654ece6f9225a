//! Two-tier cache for saved searches and favorites
//!
//! Shields the hosted database from redundant reads. Every entry lives in a
//! process-local memory tier and a durable key/value tier; reads go memory
//! first, writes go to both tiers immediately (write-through). Expiry is
//! checked lazily on read, there is no background eviction.

pub mod clock;
pub mod kv;
pub mod layered;
pub mod memory;
pub mod persistent;

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use clock::{Clock, SystemClock};
pub use kv::{KvStore, SqliteKvStore};
pub use layered::Cache;
pub use persistent::CacheStats;

/// Storage key prefix shared by every persistent cache record
pub const CACHE_PREFIX: &str = "flightwatcher_cache_";

/// Age after which the quota sweep removes a persistent record, whatever its key
pub const STALE_SWEEP_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// The closed set of cached record collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKey {
    Favorites,
    Searches,
}

impl CacheKey {
    pub const ALL: [CacheKey; 2] = [CacheKey::Favorites, CacheKey::Searches];

    /// Time-to-live for this collection.
    ///
    /// Favorites are edited more often than searches, so they expire sooner.
    pub fn ttl(self) -> Duration {
        match self {
            CacheKey::Favorites => Duration::from_secs(5 * 60),
            CacheKey::Searches => Duration::from_secs(10 * 60),
        }
    }

    /// TTL in epoch milliseconds, matching `CacheEntry::timestamp`
    pub fn ttl_millis(self) -> i64 {
        self.ttl().as_millis() as i64
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CacheKey::Favorites => "favorites",
            CacheKey::Searches => "searches",
        }
    }

    /// Durable storage key: prefix + key + "_" + user id
    pub fn storage_key(self, user_id: &str) -> String {
        format!("{}{}_{}", CACHE_PREFIX, self.as_str(), user_id)
    }

    /// Recover the collection from a durable storage key.
    ///
    /// Unknown suffixes fall back to `Searches`, the longer TTL.
    pub fn from_storage_key(storage_key: &str) -> Self {
        let rest = storage_key.strip_prefix(CACHE_PREFIX).unwrap_or(storage_key);
        if rest.starts_with("favorites_") {
            CacheKey::Favorites
        } else {
            CacheKey::Searches
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cached record set with its ownership and freshness metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    pub data: T,
    /// Epoch milliseconds when the entry was written
    pub timestamp: i64,
    pub user_id: String,
    /// False while the matching remote write is still unconfirmed
    #[serde(default = "default_synced")]
    pub synced: bool,
}

fn default_synced() -> bool {
    true
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, user_id: &str, synced: bool, now: i64) -> Self {
        Self {
            data,
            timestamp: now,
            user_id: user_id.to_string(),
            synced,
        }
    }

    pub fn age(&self, now: i64) -> i64 {
        now - self.timestamp
    }

    /// An entry is usable while `now - timestamp <= ttl`.
    pub fn is_expired(&self, key: CacheKey, now: i64) -> bool {
        self.age(now) > key.ttl_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_per_key() {
        assert_eq!(CacheKey::Favorites.ttl(), Duration::from_secs(300));
        assert_eq!(CacheKey::Searches.ttl(), Duration::from_secs(600));
        assert_eq!(CacheKey::Favorites.ttl_millis(), 300_000);
    }

    #[test]
    fn test_storage_key_namespacing() {
        assert_eq!(
            CacheKey::Favorites.storage_key("u1"),
            "flightwatcher_cache_favorites_u1"
        );
        assert_ne!(
            CacheKey::Favorites.storage_key("u1"),
            CacheKey::Searches.storage_key("u1")
        );
        assert_ne!(
            CacheKey::Searches.storage_key("u1"),
            CacheKey::Searches.storage_key("u2")
        );
    }

    #[test]
    fn test_key_from_storage_key() {
        assert_eq!(
            CacheKey::from_storage_key("flightwatcher_cache_favorites_abc"),
            CacheKey::Favorites
        );
        assert_eq!(
            CacheKey::from_storage_key("flightwatcher_cache_searches_abc"),
            CacheKey::Searches
        );
        assert_eq!(
            CacheKey::from_storage_key("flightwatcher_cache_unknown"),
            CacheKey::Searches
        );
    }

    #[test]
    fn test_entry_expiry_boundary() {
        let entry = CacheEntry::new(1, "u1", true, 1_000);
        let ttl = CacheKey::Favorites.ttl_millis();

        assert!(!entry.is_expired(CacheKey::Favorites, 1_000 + ttl));
        assert!(entry.is_expired(CacheKey::Favorites, 1_000 + ttl + 1));
    }

    #[test]
    fn test_entry_wire_format() {
        let entry = CacheEntry::new(vec!["f1"], "u1", false, 42);
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["userId"], "u1");
        assert_eq!(json["timestamp"], 42);
        assert_eq!(json["synced"], false);

        let legacy: CacheEntry<Vec<String>> =
            serde_json::from_str(r#"{"data":["f1"],"timestamp":42,"userId":"u1"}"#).unwrap();
        assert!(legacy.synced);
    }
}
