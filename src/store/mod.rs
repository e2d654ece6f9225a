//! Record store for saved searches and favorites
//!
//! `FlightStore` is what commands talk to. While signed in, reads are
//! cache-aside over the remote database and writes are optimistic: the cache
//! is updated first with `synced = false`, then reconciled with the remote
//! result. While signed out, every record lives in the local store.

pub mod export;
pub mod local;
pub mod migration;
pub mod pending;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::{Cache, CacheKey, KvStore};
use crate::client::FlightStoreApi;
use crate::client::models::{
    DEFAULT_CHECK_INTERVAL_SECS, FavoritePatch, LOCAL_CHECK_INTERVAL_SECS, NewResult,
    SavedFavorite, SavedSearch, ScanRequest, SearchPatch, Trip,
};
use crate::error::{Error, Result};

pub use export::ExportData;
pub use local::{ExcludedDestinations, LocalStore, NewResults};
pub use migration::MigrationReport;
pub use pending::{PendingWrite, WriteOutcome};

/// The signed-in side of the store
struct Remote<A> {
    api: Arc<A>,
    user_id: String,
}

/// Saved searches, favorites and local-only records for one user
pub struct FlightStore<A: FlightStoreApi, S: KvStore> {
    remote: Option<Remote<A>>,
    cache: Arc<Cache<S>>,
    local: LocalStore<S>,
    use_cache: bool,
    export_dir: Option<PathBuf>,
}

impl<A: FlightStoreApi, S: KvStore> FlightStore<A, S> {
    /// A store for a signed-out user: local records only
    pub fn signed_out(cache: Arc<Cache<S>>) -> Self {
        let local = LocalStore::new(Arc::clone(cache.store()));
        Self {
            remote: None,
            cache,
            local,
            use_cache: true,
            export_dir: None,
        }
    }

    /// A store backed by the remote database for `user_id`
    pub fn signed_in(cache: Arc<Cache<S>>, api: Arc<A>, user_id: &str) -> Self {
        let mut store = Self::signed_out(cache);
        store.remote = Some(Remote {
            api,
            user_id: user_id.to_string(),
        });
        store
    }

    /// Bypass the cache for reads and writes
    pub fn without_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }

    /// Directory for automatic exports; auto-export stays off without one
    pub fn with_export_dir(mut self, dir: PathBuf) -> Self {
        self.export_dir = Some(dir);
        self
    }

    pub fn user_id(&self) -> Option<&str> {
        self.remote.as_ref().map(|r| r.user_id.as_str())
    }

    pub fn is_signed_in(&self) -> bool {
        self.remote.is_some()
    }

    pub fn cache(&self) -> &Cache<S> {
        &self.cache
    }

    pub fn local(&self) -> &LocalStore<S> {
        &self.local
    }

    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.cache.now_millis()).unwrap_or_else(Utc::now)
    }

    // ========================================================================
    // Cache plumbing
    // ========================================================================

    fn cached<T: DeserializeOwned>(&self, key: CacheKey, user_id: &str) -> Option<T> {
        if !self.use_cache {
            return None;
        }
        self.cache.get_from_cache(key, user_id)
    }

    fn cache_put<T: Serialize>(&self, key: CacheKey, user_id: &str, data: &T, synced: bool) {
        if self.use_cache {
            self.cache.set_cache(key, data, user_id, synced);
        }
    }

    /// Apply `next` to the cache as unconfirmed
    fn begin<T: Serialize>(&self, key: CacheKey, user_id: &str, next: T) -> PendingWrite<T> {
        self.cache_put(key, user_id, &next, false);
        PendingWrite::new(next)
    }

    /// Settle a failed remote write, refetching only when a cache needs it
    async fn fail_write<T, F>(
        &self,
        pending: PendingWrite<T>,
        error: Error,
        refetch: F,
    ) -> WriteOutcome<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        if self.use_cache {
            pending.fail(error, refetch).await
        } else {
            pending.abandon(error)
        }
    }

    /// Write the outcome of an optimistic update back to the cache
    fn reconcile<T: Serialize>(
        &self,
        key: CacheKey,
        user_id: &str,
        outcome: WriteOutcome<T>,
    ) -> Result<T> {
        match outcome {
            WriteOutcome::Confirmed(data) => {
                self.cache_put(key, user_id, &data, true);
                Ok(data)
            }
            WriteOutcome::Failed {
                error,
                refetched: Some(data),
            } => {
                log::debug!("Write failed, cache reset from remote: {}", key);
                self.cache_put(key, user_id, &data, true);
                Err(error)
            }
            WriteOutcome::Failed {
                error,
                refetched: None,
            } => {
                if self.use_cache {
                    self.cache.invalidate_cache(key, user_id);
                }
                Err(error)
            }
        }
    }

    /// Current searches to apply an optimistic change to: cache, else remote
    async fn search_base(&self, remote: &Remote<A>) -> Result<Vec<SavedSearch>> {
        match self.cached(CacheKey::Searches, &remote.user_id) {
            Some(list) => Ok(list),
            None => remote.api.list_searches(&remote.user_id).await,
        }
    }

    async fn favorite_base(&self, remote: &Remote<A>) -> Result<Vec<SavedFavorite>> {
        match self.cached(CacheKey::Favorites, &remote.user_id) {
            Some(list) => Ok(list),
            None => remote.api.list_favorites(&remote.user_id).await,
        }
    }

    // ========================================================================
    // Saved searches
    // ========================================================================

    /// Saved searches, newest first.
    ///
    /// An empty or failing remote list falls back to local records.
    pub async fn get_saved_searches(&self) -> Result<Vec<SavedSearch>> {
        let Some(remote) = &self.remote else {
            return self.local.searches();
        };

        if let Some(list) = self.cached(CacheKey::Searches, &remote.user_id) {
            return Ok(list);
        }

        match remote.api.list_searches(&remote.user_id).await {
            Ok(list) if list.is_empty() => {
                let local = self.local.searches()?;
                if local.is_empty() {
                    self.cache_put(CacheKey::Searches, &remote.user_id, &list, true);
                } else {
                    log::debug!("No remote searches, using {} local ones", local.len());
                }
                Ok(if local.is_empty() { list } else { local })
            }
            Ok(list) => {
                self.cache_put(CacheKey::Searches, &remote.user_id, &list, true);
                Ok(list)
            }
            Err(e) => {
                log::warn!("Failed to load searches, using local records: {}", e);
                self.local.searches()
            }
        }
    }

    pub async fn get_saved_search(&self, id: &str) -> Result<Option<SavedSearch>> {
        Ok(self
            .get_saved_searches()
            .await?
            .into_iter()
            .find(|s| s.id == id))
    }

    pub async fn save_search(
        &self,
        name: &str,
        request: ScanRequest,
        auto_check: bool,
        interval_secs: Option<u64>,
    ) -> Result<SavedSearch> {
        let now = self.now();
        let draft = SavedSearch {
            id: now.timestamp_millis().to_string(),
            name: name.to_string(),
            request,
            created_at: now,
            last_used: None,
            auto_check_enabled: auto_check,
            auto_check_interval_seconds: interval_secs,
            last_check_results: None,
            last_checked_at: None,
        };

        let Some(remote) = &self.remote else {
            let mut searches = self.local.searches()?;
            searches.push(draft.clone());
            self.local.save_searches(&searches)?;
            self.auto_export().await;
            return Ok(draft);
        };

        let mut pending_row = draft.clone();
        pending_row.id = format!("pending-{}", draft.id);
        let mut next = self.search_base(remote).await?;
        next.insert(0, pending_row.clone());
        let pending = self.begin(CacheKey::Searches, &remote.user_id, next);

        let (outcome, stored) = match remote.api.insert_search(&remote.user_id, &draft).await {
            Ok(stored) => {
                let confirmed = stored.clone();
                let outcome = pending.confirm(|list| {
                    list.into_iter()
                        .map(|s| if s.id == pending_row.id { confirmed.clone() } else { s })
                        .collect()
                });
                (outcome, Some(stored))
            }
            Err(e) => {
                let outcome = self
                    .fail_write(pending, e, remote.api.list_searches(&remote.user_id))
                    .await;
                (outcome, None)
            }
        };

        self.reconcile(CacheKey::Searches, &remote.user_id, outcome)?;
        self.auto_export().await;
        stored.ok_or_else(|| Error::Other("Search was not stored".to_string()))
    }

    pub async fn delete_search(&self, id: &str) -> Result<()> {
        let Some(remote) = &self.remote else {
            let mut searches = self.local.searches()?;
            searches.retain(|s| s.id != id);
            self.local.save_searches(&searches)?;
            self.auto_export().await;
            return Ok(());
        };

        let mut next = self.search_base(remote).await?;
        next.retain(|s| s.id != id);
        let pending = self.begin(CacheKey::Searches, &remote.user_id, next);

        let outcome = match remote.api.delete_search(&remote.user_id, id).await {
            Ok(()) => pending.confirm(|list| list),
            Err(e) => {
                self.fail_write(pending, e, remote.api.list_searches(&remote.user_id))
                    .await
            }
        };

        self.reconcile(CacheKey::Searches, &remote.user_id, outcome)?;
        self.auto_export().await;
        Ok(())
    }

    /// Apply a patch to one search, remotely and in the cache
    async fn patch_remote_search(
        &self,
        remote: &Remote<A>,
        id: &str,
        patch: &SearchPatch,
    ) -> Result<()> {
        let mut next = self.search_base(remote).await?;
        if let Some(search) = next.iter_mut().find(|s| s.id == id) {
            patch.apply(search);
        }
        let pending = self.begin(CacheKey::Searches, &remote.user_id, next);

        let outcome = match remote.api.update_search(&remote.user_id, id, patch).await {
            Ok(()) => pending.confirm(|list| list),
            Err(e) => {
                self.fail_write(pending, e, remote.api.list_searches(&remote.user_id))
                    .await
            }
        };

        self.reconcile(CacheKey::Searches, &remote.user_id, outcome)?;
        Ok(())
    }

    fn patch_local_search(&self, id: &str, patch: &SearchPatch) -> Result<()> {
        let mut searches = self.local.searches()?;
        if let Some(search) = searches.iter_mut().find(|s| s.id == id) {
            patch.apply(search);
        }
        self.local.save_searches(&searches)
    }

    /// Record a use of a search: stamp `last_used` and bump the remote counter
    pub async fn update_search_last_used(&self, id: &str) -> Result<()> {
        let mut patch = SearchPatch {
            last_used: Some(self.now()),
            ..Default::default()
        };

        let Some(remote) = &self.remote else {
            return self.patch_local_search(id, &patch);
        };

        let times_used = match remote.api.search_times_used(&remote.user_id, id).await {
            Ok(n) => n,
            Err(e) => {
                log::debug!("Could not read times_used for {}: {}", id, e);
                0
            }
        };
        patch.times_used = Some(times_used.saturating_add(1));
        self.patch_remote_search(remote, id, &patch).await
    }

    pub async fn update_search_auto_check(
        &self,
        id: &str,
        enabled: bool,
        interval_secs: Option<u64>,
    ) -> Result<()> {
        match &self.remote {
            Some(remote) => {
                let patch = SearchPatch {
                    auto_check_enabled: Some(enabled),
                    check_interval_seconds: interval_secs,
                    ..Default::default()
                };
                self.patch_remote_search(remote, id, &patch).await?;
            }
            None => {
                let mut searches = self.local.searches()?;
                if let Some(search) = searches.iter_mut().find(|s| s.id == id) {
                    search.auto_check_enabled = enabled;
                    search.auto_check_interval_seconds = Some(
                        interval_secs
                            .or(search.auto_check_interval_seconds)
                            .unwrap_or(LOCAL_CHECK_INTERVAL_SECS),
                    );
                }
                self.local.save_searches(&searches)?;
            }
        }
        self.auto_export().await;
        Ok(())
    }

    pub async fn update_search_last_check_results(&self, id: &str, trips: Vec<Trip>) -> Result<()> {
        let patch = SearchPatch {
            last_check_results: Some(trips),
            last_checked_at: Some(self.now()),
            ..Default::default()
        };
        match &self.remote {
            Some(remote) => self.patch_remote_search(remote, id, &patch).await,
            None => self.patch_local_search(id, &patch),
        }
    }

    pub async fn get_active_auto_checks(&self) -> Result<Vec<SavedSearch>> {
        let searches = self.get_saved_searches().await?;
        Ok(searches.into_iter().filter(|s| s.auto_check_enabled).collect())
    }

    /// Enabled auto-checks whose interval has elapsed at `now`
    pub async fn get_due_auto_checks(&self, now: DateTime<Utc>) -> Result<Vec<SavedSearch>> {
        let default_interval = if self.is_signed_in() {
            DEFAULT_CHECK_INTERVAL_SECS
        } else {
            LOCAL_CHECK_INTERVAL_SECS
        };
        let searches = self.get_active_auto_checks().await?;
        Ok(searches
            .into_iter()
            .filter(|s| s.is_due(now, default_interval))
            .collect())
    }

    // ========================================================================
    // Favorites
    // ========================================================================

    /// Favorites, newest first. A failing remote list falls back to local records.
    pub async fn get_favorites(&self) -> Result<Vec<SavedFavorite>> {
        let Some(remote) = &self.remote else {
            return self.local.favorites();
        };

        if let Some(list) = self.cached(CacheKey::Favorites, &remote.user_id) {
            return Ok(list);
        }

        match remote.api.list_favorites(&remote.user_id).await {
            Ok(list) => {
                if list.is_empty() && self.local.has_records()? {
                    log::warn!("No remote favorites; local records exist, run `flightwatcher migrate`");
                }
                self.cache_put(CacheKey::Favorites, &remote.user_id, &list, true);
                Ok(list)
            }
            Err(e) => {
                log::warn!("Failed to load favorites, using local records: {}", e);
                self.local.favorites()
            }
        }
    }

    pub async fn save_favorite(&self, trip: Trip, request: ScanRequest) -> Result<SavedFavorite> {
        let now = self.now();
        let draft = SavedFavorite {
            id: now.timestamp_millis().to_string(),
            trip,
            search_request: request,
            created_at: now,
            last_checked: None,
            is_still_valid: true,
            archived: false,
        };

        let Some(remote) = &self.remote else {
            let mut favorites = self.local.favorites()?;
            favorites.push(draft.clone());
            self.local.save_favorites(&favorites)?;
            self.auto_export().await;
            return Ok(draft);
        };

        let mut pending_row = draft.clone();
        pending_row.id = format!("pending-{}", draft.id);
        let mut next = self.favorite_base(remote).await?;
        next.insert(0, pending_row.clone());
        let pending = self.begin(CacheKey::Favorites, &remote.user_id, next);

        let (outcome, stored) = match remote.api.insert_favorite(&remote.user_id, &draft).await {
            Ok(stored) => {
                // Keep the trip as sent; the stored row may drop fields
                let mut confirmed = stored.clone();
                confirmed.trip = draft.trip.clone();
                let kept = confirmed.clone();
                let outcome = pending.confirm(|list| {
                    list.into_iter()
                        .map(|f| if f.id == pending_row.id { kept.clone() } else { f })
                        .collect()
                });
                (outcome, Some(confirmed))
            }
            Err(e) => {
                let outcome = self
                    .fail_write(pending, e, remote.api.list_favorites(&remote.user_id))
                    .await;
                (outcome, None)
            }
        };

        self.reconcile(CacheKey::Favorites, &remote.user_id, outcome)?;
        self.auto_export().await;
        stored.ok_or_else(|| Error::Other("Favorite was not stored".to_string()))
    }

    pub async fn delete_favorite(&self, id: &str) -> Result<()> {
        let Some(remote) = &self.remote else {
            let mut favorites = self.local.favorites()?;
            favorites.retain(|f| f.id != id);
            self.local.save_favorites(&favorites)?;
            self.auto_export().await;
            return Ok(());
        };

        let mut next = self.favorite_base(remote).await?;
        next.retain(|f| f.id != id);
        let pending = self.begin(CacheKey::Favorites, &remote.user_id, next);

        let outcome = match remote.api.delete_favorite(&remote.user_id, id).await {
            Ok(()) => pending.confirm(|list| list),
            Err(e) => {
                self.fail_write(pending, e, remote.api.list_favorites(&remote.user_id))
                    .await
            }
        };

        self.reconcile(CacheKey::Favorites, &remote.user_id, outcome)?;
        self.auto_export().await;
        Ok(())
    }

    /// Whether a trip with the same flights is already a favorite
    pub async fn is_favorite(&self, trip: &Trip) -> Result<bool> {
        let favorites = self.get_favorites().await?;
        Ok(favorites.iter().any(|f| f.trip.same_flights(trip)))
    }

    async fn patch_favorite(&self, id: &str, patch: &FavoritePatch) -> Result<()> {
        let Some(remote) = &self.remote else {
            let mut favorites = self.local.favorites()?;
            if let Some(favorite) = favorites.iter_mut().find(|f| f.id == id) {
                patch.apply(favorite);
            }
            return self.local.save_favorites(&favorites);
        };

        let mut next = self.favorite_base(remote).await?;
        if let Some(favorite) = next.iter_mut().find(|f| f.id == id) {
            patch.apply(favorite);
        }
        let pending = self.begin(CacheKey::Favorites, &remote.user_id, next);

        let outcome = match remote.api.update_favorite(&remote.user_id, id, patch).await {
            Ok(()) => pending.confirm(|list| list),
            Err(e) => {
                self.fail_write(pending, e, remote.api.list_favorites(&remote.user_id))
                    .await
            }
        };

        self.reconcile(CacheKey::Favorites, &remote.user_id, outcome)?;
        Ok(())
    }

    pub async fn update_favorite_status(&self, id: &str, still_valid: bool) -> Result<()> {
        let patch = FavoritePatch {
            is_available: Some(still_valid),
            last_availability_check: Some(self.now()),
            ..Default::default()
        };
        self.patch_favorite(id, &patch).await?;
        self.auto_export().await;
        Ok(())
    }

    /// Flip the archived flag, returning the new value
    pub async fn toggle_favorite_archived(&self, id: &str) -> Result<bool> {
        let current = match &self.remote {
            Some(remote) => remote.api.favorite_archived(&remote.user_id, id).await?,
            None => self
                .local
                .favorites()?
                .iter()
                .find(|f| f.id == id)
                .map(|f| f.archived)
                .unwrap_or(false),
        };

        let patch = FavoritePatch {
            is_archived: Some(!current),
            ..Default::default()
        };
        self.patch_favorite(id, &patch).await?;
        self.auto_export().await;
        Ok(!current)
    }

    pub async fn get_archived_favorites(&self) -> Result<Vec<SavedFavorite>> {
        let favorites = self.get_favorites().await?;
        Ok(favorites.into_iter().filter(|f| f.archived).collect())
    }

    pub async fn get_active_favorites(&self) -> Result<Vec<SavedFavorite>> {
        let favorites = self.get_favorites().await?;
        Ok(favorites.into_iter().filter(|f| !f.archived).collect())
    }

    // ========================================================================
    // Local-only records
    // ========================================================================

    pub async fn save_excluded_destinations(&self, airport: &str, codes: Vec<String>) -> Result<()> {
        self.local.set_excluded_destinations(airport, codes)?;
        self.auto_export().await;
        Ok(())
    }

    pub fn get_excluded_destinations(&self) -> Result<ExcludedDestinations> {
        self.local.excluded_destinations()
    }

    pub fn get_excluded_destinations_for_airport(&self, airport: &str) -> Result<Vec<String>> {
        Ok(self
            .local
            .excluded_destinations()?
            .remove(airport)
            .unwrap_or_default())
    }

    pub async fn save_new_results(
        &self,
        search_id: &str,
        search_name: &str,
        trips: Vec<Trip>,
        is_test: bool,
    ) -> Result<()> {
        self.local.put_new_result(NewResult {
            search_id: search_id.to_string(),
            search_name: search_name.to_string(),
            trips,
            timestamp: self.now(),
            is_test,
        })?;
        self.auto_export().await;
        Ok(())
    }

    pub fn get_new_results(&self) -> Result<NewResults> {
        self.local.new_results()
    }

    pub fn get_new_results_for_search(&self, search_id: &str) -> Result<Option<NewResult>> {
        Ok(self.local.new_results()?.remove(search_id))
    }

    pub fn clear_new_results(&self, search_id: &str) -> Result<()> {
        self.local.remove_new_result(search_id)
    }

    pub fn get_dev_mode(&self) -> Result<bool> {
        self.local.dev_mode()
    }

    pub fn set_dev_mode(&self, enabled: bool) -> Result<()> {
        self.local.set_dev_mode(enabled)
    }

    pub fn get_auto_export_enabled(&self) -> Result<bool> {
        self.local.auto_export_enabled()
    }

    pub fn set_auto_export_enabled(&self, enabled: bool) -> Result<()> {
        self.local.set_auto_export_enabled(enabled)
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Drop every cached record of the signed-in user
    pub fn logout(&self) {
        if let Some(remote) = &self.remote {
            self.cache.invalidate_all_cache(&remote.user_id);
            log::debug!("Cleared cache for {}", remote.user_id);
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::cache::clock::ManualClock;
    use crate::cache::kv::SpyKvStore;
    use crate::client::MockSupabaseClient;
    use crate::client::models::{DateWindow, Flight};
    use chrono::TimeZone;

    pub const START: i64 = 1_735_689_600_000; // 2025-01-01T00:00:00Z

    pub struct Harness {
        pub store: Arc<SpyKvStore>,
        pub clock: Arc<ManualClock>,
        pub cache: Arc<Cache<SpyKvStore>>,
        pub api: Arc<MockSupabaseClient>,
    }

    impl Harness {
        pub async fn new(api: MockSupabaseClient) -> Self {
            let store = Arc::new(SpyKvStore::new());
            let clock = Arc::new(ManualClock::new(START));
            let cache = Arc::new(Cache::with_clock(Arc::clone(&store), clock.clone()));
            Self {
                store,
                clock,
                cache,
                api: Arc::new(api),
            }
        }

        pub fn signed_in(&self) -> FlightStore<MockSupabaseClient, SpyKvStore> {
            FlightStore::signed_in(Arc::clone(&self.cache), Arc::clone(&self.api), "u1")
        }

        pub fn signed_out(&self) -> FlightStore<MockSupabaseClient, SpyKvStore> {
            FlightStore::signed_out(Arc::clone(&self.cache))
        }
    }

    pub fn request(airport: &str) -> ScanRequest {
        ScanRequest {
            departure_airport: Some(airport.to_string()),
            outbound_dates: vec![DateWindow {
                date: "2025-03-01".to_string(),
                earliest: Some("06:00".to_string()),
                latest: None,
            }],
            return_dates: vec![DateWindow {
                date: "2025-03-04".to_string(),
                earliest: None,
                latest: None,
            }],
            ..Default::default()
        }
    }

    pub fn search(id: &str, day: u32) -> SavedSearch {
        SavedSearch {
            id: id.to_string(),
            name: format!("Search {}", id),
            request: request("BVA"),
            created_at: Utc.with_ymd_and_hms(2024, 12, day, 0, 0, 0).unwrap(),
            last_used: None,
            auto_check_enabled: false,
            auto_check_interval_seconds: Some(3600),
            last_check_results: None,
            last_checked_at: None,
        }
    }

    pub fn trip(outbound: &str, inbound: &str) -> Trip {
        Trip {
            outbound: Flight {
                flight_number: outbound.to_string(),
                origin: "BVA".to_string(),
                destination: "BCN".to_string(),
                destination_full: "Barcelona".to_string(),
                departure_time: "2025-03-01T07:00:00Z".to_string(),
                price: 19.99,
                currency: "EUR".to_string(),
                ..Default::default()
            },
            inbound: Flight {
                flight_number: inbound.to_string(),
                origin: "BCN".to_string(),
                destination: "BVA".to_string(),
                departure_time: "2025-03-04T21:00:00Z".to_string(),
                price: 24.50,
                currency: "EUR".to_string(),
                ..Default::default()
            },
            total_price: 44.49,
            destination_code: "BCN".to_string(),
        }
    }

    pub fn favorite(id: &str, day: u32) -> SavedFavorite {
        SavedFavorite {
            id: id.to_string(),
            trip: trip(&format!("FR{}", day), &format!("FR{}", day + 100)),
            search_request: request("BVA"),
            created_at: Utc.with_ymd_and_hms(2024, 12, day, 0, 0, 0).unwrap(),
            last_checked: None,
            is_still_valid: true,
            archived: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::client::MockSupabaseClient;
    use crate::error::ApiError;
    use std::time::Duration;

    #[tokio::test]
    async fn test_searches_are_read_through_the_cache() {
        let h = Harness::new(
            MockSupabaseClient::new()
                .with_searches(vec![search("s1", 1), search("s2", 2)])
                .await,
        )
        .await;
        let store = h.signed_in();

        let first = store.get_saved_searches().await.unwrap();
        let second = store.get_saved_searches().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0].id, "s2", "newest first");
        assert_eq!(h.api.calls().await.list_searches, 1);
    }

    #[tokio::test]
    async fn test_expired_cache_hits_remote_again() {
        let h = Harness::new(MockSupabaseClient::new().with_favorites(vec![favorite("f1", 1)]).await).await;
        let store = h.signed_in();

        store.get_favorites().await.unwrap();
        h.clock.advance(Duration::from_secs(6 * 60));
        store.get_favorites().await.unwrap();

        assert_eq!(h.api.calls().await.list_favorites, 2);
    }

    #[tokio::test]
    async fn test_without_cache_always_hits_remote() {
        let h = Harness::new(MockSupabaseClient::new().with_searches(vec![search("s1", 1)]).await).await;
        let store = h.signed_in().without_cache();

        store.get_saved_searches().await.unwrap();
        store.get_saved_searches().await.unwrap();

        assert_eq!(h.api.calls().await.list_searches, 2);
        assert!(!h.cache.is_cache_valid(CacheKey::Searches, "u1"));
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_to_local() {
        let h = Harness::new(
            MockSupabaseClient::new()
                .with_error(ApiError::ServerError("down".into()))
                .await,
        )
        .await;
        h.signed_out()
            .local()
            .save_searches(&[search("local-1", 1)])
            .unwrap();

        let searches = h.signed_in().get_saved_searches().await.unwrap();

        assert_eq!(searches.len(), 1);
        assert_eq!(searches[0].id, "local-1");
        assert!(!h.cache.is_cache_valid(CacheKey::Searches, "u1"));
    }

    #[tokio::test]
    async fn test_empty_remote_searches_fall_back_to_local() {
        let h = Harness::new(MockSupabaseClient::new()).await;
        h.signed_out()
            .local()
            .save_searches(&[search("local-1", 1)])
            .unwrap();

        let searches = h.signed_in().get_saved_searches().await.unwrap();
        assert_eq!(searches[0].id, "local-1");
    }

    #[tokio::test]
    async fn test_save_search_confirms_with_server_row() {
        let h = Harness::new(MockSupabaseClient::new().with_searches(vec![search("s1", 1)]).await).await;
        let store = h.signed_in();
        store.get_saved_searches().await.unwrap();

        let saved = store
            .save_search("Ski trip", request("GVA"), true, Some(7200))
            .await
            .unwrap();

        assert_eq!(saved.id, "mock-1");
        let entry = h.cache.get_entry(CacheKey::Searches, "u1").unwrap();
        assert!(entry.synced);
        let cached: Vec<SavedSearch> = serde_json::from_value(entry.data).unwrap();
        assert_eq!(cached.len(), 2);
        assert_eq!(cached[0].id, "mock-1");
        assert_eq!(cached[0].request.departure_airport.as_deref(), Some("GVA"));
        // Served from cache, no extra list call
        assert_eq!(h.api.calls().await.list_searches, 1);
    }

    #[tokio::test]
    async fn test_failed_write_resets_cache_from_remote() {
        let h = Harness::new(MockSupabaseClient::new().with_searches(vec![search("s1", 1)]).await).await;
        let store = h.signed_in();
        store.get_saved_searches().await.unwrap();

        h.api.fail_next(ApiError::Forbidden).await;
        let err = store.delete_search("s1").await.unwrap_err();

        assert!(matches!(err, Error::Api(ApiError::Forbidden)));
        let entry = h.cache.get_entry(CacheKey::Searches, "u1").unwrap();
        assert!(entry.synced);
        let cached: Vec<SavedSearch> = serde_json::from_value(entry.data).unwrap();
        assert_eq!(cached.len(), 1, "the optimistic delete was rolled back");
    }

    #[tokio::test]
    async fn test_failed_write_and_refetch_invalidates_cache() {
        let h = Harness::new(MockSupabaseClient::new().with_favorites(vec![favorite("f1", 1)]).await).await;
        let store = h.signed_in();
        store.get_favorites().await.unwrap();

        h.api.fail_next(ApiError::ServerError("down".into())).await;
        h.api.fail_next(ApiError::ServerError("still down".into())).await;
        assert!(store.delete_favorite("f1").await.is_err());

        assert!(!h.cache.is_cache_valid(CacheKey::Favorites, "u1"));
        assert_eq!(h.api.stored_favorites().await.len(), 1);
    }

    #[tokio::test]
    async fn test_update_last_used_increments_counter() {
        let h = Harness::new(MockSupabaseClient::new().with_searches(vec![search("s1", 1)]).await).await;
        let store = h.signed_in();

        store.update_search_last_used("s1").await.unwrap();
        store.update_search_last_used("s1").await.unwrap();

        assert_eq!(h.api.times_used("s1").await, 2);
        let cached = store.get_saved_search("s1").await.unwrap().unwrap();
        assert!(cached.last_used.is_some());
    }

    #[tokio::test]
    async fn test_auto_check_and_due_searches() {
        let h = Harness::new(
            MockSupabaseClient::new()
                .with_searches(vec![search("s1", 1), search("s2", 2)])
                .await,
        )
        .await;
        let store = h.signed_in();

        store
            .update_search_auto_check("s1", true, Some(600))
            .await
            .unwrap();
        let active = store.get_active_auto_checks().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].auto_check_interval_seconds, Some(600));

        let now = store.now();
        assert_eq!(store.get_due_auto_checks(now).await.unwrap().len(), 1);

        store
            .update_search_last_check_results("s1", vec![trip("FR1", "FR2")])
            .await
            .unwrap();
        assert!(store.get_due_auto_checks(now).await.unwrap().is_empty());
        let later = now + chrono::Duration::seconds(600);
        assert_eq!(store.get_due_auto_checks(later).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_signed_out_records_stay_local() {
        let h = Harness::new(MockSupabaseClient::new()).await;
        let store = h.signed_out();

        let saved = store
            .save_search("Local", request("BVA"), false, None)
            .await
            .unwrap();
        assert_eq!(saved.id, START.to_string());

        store
            .update_search_auto_check(&saved.id, true, None)
            .await
            .unwrap();
        let searches = store.get_saved_searches().await.unwrap();
        assert!(searches[0].auto_check_enabled);
        assert_eq!(searches[0].auto_check_interval_seconds, Some(300));

        store.delete_search(&saved.id).await.unwrap();
        assert!(store.get_saved_searches().await.unwrap().is_empty());
        assert_eq!(h.api.calls().await.total(), 0);
    }

    #[tokio::test]
    async fn test_favorites_lifecycle() {
        let h = Harness::new(MockSupabaseClient::new()).await;
        let store = h.signed_in();

        let fav = store
            .save_favorite(trip("FR1", "FR2"), request("BVA"))
            .await
            .unwrap();
        assert!(store.is_favorite(&trip("FR1", "FR2")).await.unwrap());
        assert!(!store.is_favorite(&trip("FR1", "FR3")).await.unwrap());

        assert!(store.toggle_favorite_archived(&fav.id).await.unwrap());
        assert_eq!(store.get_archived_favorites().await.unwrap().len(), 1);
        assert!(store.get_active_favorites().await.unwrap().is_empty());

        store.update_favorite_status(&fav.id, false).await.unwrap();
        let stored = h.api.stored_favorites().await;
        assert!(!stored[0].is_still_valid);
        assert!(stored[0].archived);

        store.delete_favorite(&fav.id).await.unwrap();
        assert!(store.get_favorites().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_signed_out_toggle_archived() {
        let h = Harness::new(MockSupabaseClient::new()).await;
        let store = h.signed_out();
        let fav = store
            .save_favorite(trip("FR1", "FR2"), request("BVA"))
            .await
            .unwrap();

        assert!(store.toggle_favorite_archived(&fav.id).await.unwrap());
        assert!(!store.toggle_favorite_archived(&fav.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_local_only_records() {
        let h = Harness::new(MockSupabaseClient::new()).await;
        let store = h.signed_in();

        store
            .save_excluded_destinations("BVA", vec!["LIS".into()])
            .await
            .unwrap();
        assert_eq!(store.get_excluded_destinations_for_airport("BVA").unwrap(), vec!["LIS"]);
        assert!(store.get_excluded_destinations_for_airport("CDG").unwrap().is_empty());

        store
            .save_new_results("s1", "Weekend", vec![trip("FR1", "FR2")], false)
            .await
            .unwrap();
        assert_eq!(store.get_new_results_for_search("s1").unwrap().unwrap().trips.len(), 1);
        store.clear_new_results("s1").unwrap();
        assert!(store.get_new_results().unwrap().is_empty());
        assert_eq!(h.api.calls().await.total(), 0);
    }

    #[tokio::test]
    async fn test_logout_clears_user_cache() {
        let h = Harness::new(MockSupabaseClient::new().with_searches(vec![search("s1", 1)]).await).await;
        let store = h.signed_in();
        store.get_saved_searches().await.unwrap();
        store.get_favorites().await.unwrap();

        store.logout();

        assert!(!h.cache.is_cache_valid(CacheKey::Searches, "u1"));
        assert!(!h.cache.is_cache_valid(CacheKey::Favorites, "u1"));
    }
}
