//! Cache façade combining the memory and persistent tiers

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::clock::{Clock, SystemClock};
use super::kv::KvStore;
use super::memory::MemoryTier;
use super::persistent::{CacheStats, PersistentTier};
use super::{CacheEntry, CacheKey};

/// Two-tier write-through cache.
///
/// Reads try memory first, then the persistent tier, repopulating memory on a
/// persistent hit. Writes go to both tiers. No operation returns an error: any
/// storage failure degrades to a miss.
pub struct Cache<S: KvStore> {
    memory: MemoryTier,
    persistent: PersistentTier<S>,
    clock: Arc<dyn Clock>,
}

impl<S: KvStore> Cache<S> {
    /// Open a cache over `store`, removing expired records left by earlier runs.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        let cache = Self {
            memory: MemoryTier::new(),
            persistent: PersistentTier::new(store),
            clock,
        };
        let removed = cache.clean_expired_caches();
        if removed > 0 {
            log::debug!("Removed {} expired cache records on open", removed);
        }
        cache
    }

    /// Backing key/value store, shared with the local record fallback
    pub fn store(&self) -> &Arc<S> {
        self.persistent.store()
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Full valid entry for `(key, user)`, including its `synced` flag.
    pub fn get_entry(&self, key: CacheKey, user_id: &str) -> Option<CacheEntry<Value>> {
        let now = self.clock.now_millis();

        if let Some(entry) = self.memory.get(user_id, key, now) {
            log::debug!("Cache hit (memory): {} for {}", key, user_id);
            return Some(entry);
        }

        if let Some(entry) = self.persistent.get(user_id, key, now) {
            log::debug!("Cache hit (persistent): {} for {}", key, user_id);
            self.memory.set(user_id, key, entry.clone());
            return Some(entry);
        }

        log::debug!("Cache miss: {} for {}", key, user_id);
        None
    }

    /// Cached data for `(key, user)`, or `None` on miss.
    ///
    /// Data that no longer deserializes into `T` is also a miss.
    pub fn get_from_cache<T: DeserializeOwned>(&self, key: CacheKey, user_id: &str) -> Option<T> {
        let entry = self.get_entry(key, user_id)?;
        match serde_json::from_value(entry.data) {
            Ok(data) => Some(data),
            Err(e) => {
                log::warn!("Cached {} for {} has unexpected shape: {}", key, user_id, e);
                None
            }
        }
    }

    /// Write `data` to both tiers, stamped with the current time.
    pub fn set_cache<T: Serialize>(&self, key: CacheKey, data: &T, user_id: &str, synced: bool) {
        let value = match serde_json::to_value(data) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("Failed to serialize {} for cache: {}", key, e);
                return;
            }
        };

        let now = self.clock.now_millis();
        let entry = CacheEntry::new(value, user_id, synced, now);
        self.persistent.set(user_id, key, &entry, now);
        self.memory.set(user_id, key, entry);
        log::debug!("Cache set: {} for {} (synced: {})", key, user_id, synced);
    }

    pub fn invalidate_cache(&self, key: CacheKey, user_id: &str) {
        self.memory.clear(user_id, key);
        self.persistent.clear(user_id, key);
        log::debug!("Cache invalidated: {} for {}", key, user_id);
    }

    /// Invalidate every key for one user.
    pub fn invalidate_all_cache(&self, user_id: &str) {
        for key in CacheKey::ALL {
            self.invalidate_cache(key, user_id);
        }
    }

    pub fn is_cache_valid(&self, key: CacheKey, user_id: &str) -> bool {
        self.get_entry(key, user_id).is_some()
    }

    /// Remove persistent records past their TTL, and corrupt ones
    pub fn clean_expired_caches(&self) -> usize {
        self.persistent.clean_expired(self.clock.now_millis())
    }

    /// Remove persistent records older than `max_age_millis`, for all users
    pub fn sweep_older_than(&self, max_age_millis: i64) -> usize {
        self.persistent
            .sweep_older_than(self.clock.now_millis(), max_age_millis)
    }

    /// Remove every persistent cache record. Memory is dropped with the process.
    pub fn clear_all(&self) -> usize {
        self.persistent.clear_all()
    }

    pub fn stats(&self) -> CacheStats {
        self.persistent.stats(self.clock.now_millis())
    }
}
