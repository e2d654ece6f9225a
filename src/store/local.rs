//! Records kept only on this machine
//!
//! Used for every record while signed out, and for the data that never has a
//! remote counterpart (excluded destinations, new results, local flags). Keys
//! and JSON layouts match the web app's local storage.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::KvStore;
use crate::client::models::{NewResult, SavedFavorite, SavedSearch};
use crate::error::{Result, StorageError};

pub const SEARCHES_KEY: &str = "flightwatcher_saved_searches";
pub const FAVORITES_KEY: &str = "flightwatcher_favorites";
pub const EXCLUDED_DESTINATIONS_KEY: &str = "flightwatcher_excluded_destinations";
pub const DEV_MODE_KEY: &str = "flightwatcher_dev_mode";
pub const NEW_RESULTS_KEY: &str = "flightwatcher_new_results";
pub const AUTO_EXPORT_KEY: &str = "flightwatcher_auto_export_enabled";
pub const LAST_EXPORT_KEY: &str = "flightwatcher_last_export_at";

/// Excluded destination codes per departure airport
pub type ExcludedDestinations = BTreeMap<String, Vec<String>>;

/// Latest new results per search id
pub type NewResults = BTreeMap<String, NewResult>;

/// Typed access to the local record keys
pub struct LocalStore<S: KvStore> {
    store: Arc<S>,
}

impl<S: KvStore> LocalStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Read a JSON value, or its default when the key is absent
    fn read<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        match self.store.get_item(key)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                StorageError::Serialization(format!("Local record {} is unreadable: {}", key, e))
                    .into()
            }),
            None => Ok(T::default()),
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value).map_err(StorageError::from)?;
        self.store.set_item(key, &raw)?;
        Ok(())
    }

    pub fn searches(&self) -> Result<Vec<SavedSearch>> {
        self.read(SEARCHES_KEY)
    }

    pub fn save_searches(&self, searches: &[SavedSearch]) -> Result<()> {
        self.write(SEARCHES_KEY, &searches)
    }

    pub fn remove_searches(&self) -> Result<()> {
        self.store.remove_item(SEARCHES_KEY)?;
        Ok(())
    }

    pub fn favorites(&self) -> Result<Vec<SavedFavorite>> {
        self.read(FAVORITES_KEY)
    }

    pub fn save_favorites(&self, favorites: &[SavedFavorite]) -> Result<()> {
        self.write(FAVORITES_KEY, &favorites)
    }

    pub fn remove_favorites(&self) -> Result<()> {
        self.store.remove_item(FAVORITES_KEY)?;
        Ok(())
    }

    pub fn excluded_destinations(&self) -> Result<ExcludedDestinations> {
        self.read(EXCLUDED_DESTINATIONS_KEY)
    }

    pub fn set_excluded_destinations(&self, airport: &str, codes: Vec<String>) -> Result<()> {
        let mut all = self.excluded_destinations()?;
        all.insert(airport.to_string(), codes);
        self.write(EXCLUDED_DESTINATIONS_KEY, &all)
    }

    pub fn new_results(&self) -> Result<NewResults> {
        self.read(NEW_RESULTS_KEY)
    }

    pub fn put_new_result(&self, result: NewResult) -> Result<()> {
        let mut all = self.new_results()?;
        all.insert(result.search_id.clone(), result);
        self.write(NEW_RESULTS_KEY, &all)
    }

    pub fn remove_new_result(&self, search_id: &str) -> Result<()> {
        let mut all = self.new_results()?;
        all.remove(search_id);
        self.write(NEW_RESULTS_KEY, &all)
    }

    pub fn dev_mode(&self) -> Result<bool> {
        self.read(DEV_MODE_KEY)
    }

    pub fn set_dev_mode(&self, enabled: bool) -> Result<()> {
        self.write(DEV_MODE_KEY, &enabled)
    }

    pub fn auto_export_enabled(&self) -> Result<bool> {
        self.read(AUTO_EXPORT_KEY)
    }

    pub fn set_auto_export_enabled(&self, enabled: bool) -> Result<()> {
        self.write(AUTO_EXPORT_KEY, &enabled)
    }

    /// Epoch millis of the last automatic export
    pub fn last_export_at(&self) -> Result<Option<i64>> {
        self.read(LAST_EXPORT_KEY)
    }

    pub fn set_last_export_at(&self, millis: i64) -> Result<()> {
        self.write(LAST_EXPORT_KEY, &Some(millis))
    }

    /// Whether any searches or favorites are stored locally
    pub fn has_records(&self) -> Result<bool> {
        Ok(!self.searches()?.is_empty() || !self.favorites()?.is_empty())
    }
}
