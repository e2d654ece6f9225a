//! Process-local cache tier

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use super::{CacheEntry, CacheKey};

type UserEntries = HashMap<CacheKey, CacheEntry<Value>>;

/// Volatile per-user map of cache entries. Lost when the process exits.
#[derive(Default)]
pub struct MemoryTier {
    users: Mutex<HashMap<String, UserEntries>>,
}

impl MemoryTier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a live entry, evicting it first if it has expired.
    pub fn get(&self, user_id: &str, key: CacheKey, now: i64) -> Option<CacheEntry<Value>> {
        let mut users = self.users.lock().ok()?;
        let entries = users.get_mut(user_id)?;
        let entry = entries.get(&key)?;

        if entry.is_expired(key, now) {
            log::debug!("Memory cache expired: {} for {}", key, user_id);
            entries.remove(&key);
            return None;
        }

        Some(entry.clone())
    }

    pub fn set(&self, user_id: &str, key: CacheKey, entry: CacheEntry<Value>) {
        if let Ok(mut users) = self.users.lock() {
            users
                .entry(user_id.to_string())
                .or_default()
                .insert(key, entry);
        }
    }

    pub fn clear(&self, user_id: &str, key: CacheKey) {
        if let Ok(mut users) = self.users.lock()
            && let Some(entries) = users.get_mut(user_id)
        {
            entries.remove(&key);
        }
    }

    /// Whether a slot is occupied, expired or not
    #[cfg(test)]
    pub fn contains(&self, user_id: &str, key: CacheKey) -> bool {
        self.users
            .lock()
            .map(|users| users.get(user_id).is_some_and(|e| e.contains_key(&key)))
            .unwrap_or(false)
    }
}
