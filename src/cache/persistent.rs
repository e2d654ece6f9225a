//! Durable cache tier over a key/value store
//!
//! Records survive restarts. Expired, foreign and corrupted records are all
//! reported as misses and removed on read. Storage failures never reach the
//! caller: the cache is an optimization, the remote database is the truth.

use std::sync::Arc;

use serde_json::Value;

use super::kv::KvStore;
use super::{CACHE_PREFIX, CacheEntry, CacheKey, STALE_SWEEP_AGE};

/// Persistent tier with namespaced keys `flightwatcher_cache_<key>_<user>`.
pub struct PersistentTier<S: KvStore> {
    store: Arc<S>,
}

/// Why a stored record was rejected on read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    Corrupt,
    Expired,
    ForeignUser,
}

/// Statistics about the persistent cache records
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    pub corrupt_entries: usize,
    pub total_size_bytes: usize,
    pub oldest_entry: Option<i64>,
    pub newest_entry: Option<i64>,
}

impl<S: KvStore> PersistentTier<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn get(&self, user_id: &str, key: CacheKey, now: i64) -> Option<CacheEntry<Value>> {
        let storage_key = key.storage_key(user_id);

        let raw = match self.store.get_item(&storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Persistent cache read failed for {}: {}", storage_key, e);
                return None;
            }
        };

        match Self::check(&raw, user_id, key, now) {
            Ok(entry) => Some(entry),
            Err(rejection) => {
                match rejection {
                    Rejection::Corrupt => {
                        log::warn!("Discarding corrupted cache record {}", storage_key)
                    }
                    Rejection::Expired => log::debug!("Persistent cache expired: {}", storage_key),
                    Rejection::ForeignUser => {
                        log::debug!("Persistent cache owner mismatch: {}", storage_key)
                    }
                }
                self.remove(&storage_key);
                None
            }
        }
    }

    fn check(
        raw: &str,
        user_id: &str,
        key: CacheKey,
        now: i64,
    ) -> Result<CacheEntry<Value>, Rejection> {
        let entry: CacheEntry<Value> =
            serde_json::from_str(raw).map_err(|_| Rejection::Corrupt)?;
        if entry.is_expired(key, now) {
            return Err(Rejection::Expired);
        }
        if entry.user_id != user_id {
            return Err(Rejection::ForeignUser);
        }
        Ok(entry)
    }

    /// Store an entry. On failure, sweep day-old records and retry once.
    pub fn set(&self, user_id: &str, key: CacheKey, entry: &CacheEntry<Value>, now: i64) {
        let storage_key = key.storage_key(user_id);
        let serialized = match serde_json::to_string(entry) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("Failed to serialize cache entry {}: {}", storage_key, e);
                return;
            }
        };

        let Err(first) = self.store.set_item(&storage_key, &serialized) else {
            return;
        };
        log::warn!("Persistent cache write failed for {}: {}", storage_key, first);

        let removed = self.sweep_older_than(now, STALE_SWEEP_AGE.as_millis() as i64);
        log::debug!("Swept {} stale cache records before retry", removed);

        if let Err(e) = self.store.set_item(&storage_key, &serialized) {
            log::warn!("Giving up on persistent cache write for {}: {}", storage_key, e);
        }
    }

    pub fn clear(&self, user_id: &str, key: CacheKey) {
        self.remove(&key.storage_key(user_id));
    }

    fn remove(&self, storage_key: &str) {
        if let Err(e) = self.store.remove_item(storage_key) {
            log::warn!("Failed to remove cache record {}: {}", storage_key, e);
        }
    }

    fn cache_keys(&self) -> Vec<String> {
        match self.store.keys() {
            Ok(keys) => keys
                .into_iter()
                .filter(|k| k.starts_with(CACHE_PREFIX))
                .collect(),
            Err(e) => {
                log::warn!("Failed to list cache records: {}", e);
                Vec::new()
            }
        }
    }

    /// Stored timestamp of a raw record, `None` if the record is unreadable
    fn timestamp_of(raw: &str) -> Option<i64> {
        serde_json::from_str::<Value>(raw)
            .ok()?
            .get("timestamp")?
            .as_i64()
    }

    /// Remove every cache record, for every user, older than `max_age` millis.
    ///
    /// Unreadable records count as infinitely old. Returns the number removed.
    pub fn sweep_older_than(&self, now: i64, max_age: i64) -> usize {
        let mut removed = 0;
        for storage_key in self.cache_keys() {
            let raw = match self.store.get_item(&storage_key) {
                Ok(Some(raw)) => raw,
                _ => continue,
            };
            let stale = match Self::timestamp_of(&raw) {
                Some(ts) => now - ts > max_age,
                None => true,
            };
            if stale {
                self.remove(&storage_key);
                removed += 1;
            }
        }
        removed
    }

    /// Remove records past the TTL of their own collection, and corrupt ones.
    pub fn clean_expired(&self, now: i64) -> usize {
        let mut removed = 0;
        for storage_key in self.cache_keys() {
            let raw = match self.store.get_item(&storage_key) {
                Ok(Some(raw)) => raw,
                _ => continue,
            };
            let key = CacheKey::from_storage_key(&storage_key);
            let expired = match Self::timestamp_of(&raw) {
                Some(ts) => now - ts > key.ttl_millis(),
                None => {
                    log::warn!("Discarding corrupted cache record {}", storage_key);
                    true
                }
            };
            if expired {
                self.remove(&storage_key);
                removed += 1;
            }
        }
        removed
    }

    /// Remove every cache record for every user.
    pub fn clear_all(&self) -> usize {
        let keys = self.cache_keys();
        for storage_key in &keys {
            self.remove(storage_key);
        }
        keys.len()
    }

    pub fn stats(&self, now: i64) -> CacheStats {
        let mut stats = CacheStats::default();
        for storage_key in self.cache_keys() {
            let Ok(Some(raw)) = self.store.get_item(&storage_key) else {
                continue;
            };
            stats.total_entries += 1;
            stats.total_size_bytes += storage_key.len() + raw.len();

            let key = CacheKey::from_storage_key(&storage_key);
            match Self::timestamp_of(&raw) {
                None => stats.corrupt_entries += 1,
                Some(ts) if now - ts > key.ttl_millis() => stats.expired_entries += 1,
                Some(ts) => {
                    stats.valid_entries += 1;
                    stats.oldest_entry = Some(stats.oldest_entry.map_or(ts, |o| o.min(ts)));
                    stats.newest_entry = Some(stats.newest_entry.map_or(ts, |n| n.max(ts)));
                }
            }
        }
        stats
    }
}
