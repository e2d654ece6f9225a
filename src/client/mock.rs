//! Mock Supabase client for testing
//!
//! Keeps tables in memory so record-store tests can exercise the full
//! read/write cycle without making real API calls.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;

use super::api::{AuthApi, FavoriteApi, ProfileApi, SearchApi};
use super::models::{FavoritePatch, SavedFavorite, SavedSearch, SearchPatch, Session};
use crate::error::{ApiError, Result};

/// Mock API client for testing.
///
/// Configure initial rows and failures via builder methods, then use in tests.
///
/// # Example
/// ```ignore
/// let mock = MockSupabaseClient::new()
///     .with_searches(vec![search("s1")])
///     .await
///     .with_error(ApiError::ServerError("down".into()))
///     .await;
/// ```
#[derive(Default)]
pub struct MockSupabaseClient {
    searches: Arc<Mutex<Vec<SavedSearch>>>,
    favorites: Arc<Mutex<Vec<SavedFavorite>>>,
    times_used: Arc<Mutex<HashMap<String, u32>>>,
    /// `None` means no profile row
    migration_completed: Arc<Mutex<Option<bool>>>,
    /// Errors returned by the next calls, one per call
    errors: Arc<Mutex<VecDeque<ApiError>>>,
    next_id: Arc<Mutex<usize>>,
    /// Track number of calls for verification
    call_count: Arc<Mutex<CallCounts>>,
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub sign_in: usize,
    pub refresh_session: usize,
    pub list_searches: usize,
    pub insert_search: usize,
    pub insert_searches: usize,
    pub update_search: usize,
    pub delete_search: usize,
    pub search_times_used: usize,
    pub list_favorites: usize,
    pub insert_favorite: usize,
    pub insert_favorites: usize,
    pub update_favorite: usize,
    pub delete_favorite: usize,
    pub favorite_archived: usize,
    pub migration_completed: usize,
    pub mark_migration_completed: usize,
}

impl CallCounts {
    /// Get total number of API calls made.
    pub fn total(&self) -> usize {
        self.sign_in
            + self.refresh_session
            + self.list_searches
            + self.insert_search
            + self.insert_searches
            + self.update_search
            + self.delete_search
            + self.search_times_used
            + self.list_favorites
            + self.insert_favorite
            + self.insert_favorites
            + self.update_favorite
            + self.delete_favorite
            + self.favorite_archived
            + self.migration_completed
            + self.mark_migration_completed
    }
}

impl MockSupabaseClient {
    /// Create a new mock client with empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_searches(self, searches: Vec<SavedSearch>) -> Self {
        *self.searches.lock().await = searches;
        self
    }

    pub async fn with_favorites(self, favorites: Vec<SavedFavorite>) -> Self {
        *self.favorites.lock().await = favorites;
        self
    }

    pub async fn with_profile(self, migration_completed: Option<bool>) -> Self {
        *self.migration_completed.lock().await = migration_completed;
        self
    }

    /// Queue an error for the next call. Each queued error is consumed once.
    pub async fn with_error(self, error: ApiError) -> Self {
        self.errors.lock().await.push_back(error);
        self
    }

    /// Queue an error on an already-built mock
    pub async fn fail_next(&self, error: ApiError) {
        self.errors.lock().await.push_back(error);
    }

    pub async fn calls(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    pub async fn stored_searches(&self) -> Vec<SavedSearch> {
        self.searches.lock().await.clone()
    }

    pub async fn stored_favorites(&self) -> Vec<SavedFavorite> {
        self.favorites.lock().await.clone()
    }

    pub async fn profile(&self) -> Option<bool> {
        *self.migration_completed.lock().await
    }

    pub async fn times_used(&self, id: &str) -> u32 {
        self.times_used.lock().await.get(id).copied().unwrap_or(0)
    }

    async fn record(&self, bump: impl FnOnce(&mut CallCounts)) -> Result<()> {
        bump(&mut *self.call_count.lock().await);
        match self.errors.lock().await.pop_front() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    async fn allocate_id(&self) -> String {
        let mut next = self.next_id.lock().await;
        *next += 1;
        format!("mock-{}", next)
    }
}

fn not_found(table: &str, id: &str) -> crate::error::Error {
    ApiError::NotFound(format!("{} {}", table, id)).into()
}

#[async_trait]
impl AuthApi for MockSupabaseClient {
    async fn sign_in(&self, email: &str, _password: &str) -> Result<Session> {
        self.record(|c| c.sign_in += 1).await?;
        Ok(Session {
            access_token: "mock-access".to_string(),
            refresh_token: "mock-refresh".to_string(),
            user_id: "mock-user".to_string(),
            email: Some(email.to_string()),
            expires_at: Utc::now() + Duration::hours(1),
        })
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session> {
        self.record(|c| c.refresh_session += 1).await?;
        Ok(Session {
            access_token: "mock-access-refreshed".to_string(),
            refresh_token: refresh_token.to_string(),
            user_id: "mock-user".to_string(),
            email: None,
            expires_at: Utc::now() + Duration::hours(1),
        })
    }
}

#[async_trait]
impl SearchApi for MockSupabaseClient {
    async fn list_searches(&self, _user_id: &str) -> Result<Vec<SavedSearch>> {
        self.record(|c| c.list_searches += 1).await?;
        let mut searches = self.searches.lock().await.clone();
        searches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(searches)
    }

    async fn insert_search(&self, _user_id: &str, draft: &SavedSearch) -> Result<SavedSearch> {
        self.record(|c| c.insert_search += 1).await?;
        let mut stored = draft.clone();
        stored.id = self.allocate_id().await;
        stored.created_at = Utc::now();
        self.searches.lock().await.push(stored.clone());
        Ok(stored)
    }

    async fn insert_searches(&self, _user_id: &str, drafts: &[SavedSearch]) -> Result<usize> {
        self.record(|c| c.insert_searches += 1).await?;
        for draft in drafts {
            let mut stored = draft.clone();
            stored.id = self.allocate_id().await;
            self.searches.lock().await.push(stored);
        }
        Ok(drafts.len())
    }

    async fn update_search(&self, _user_id: &str, id: &str, patch: &SearchPatch) -> Result<()> {
        self.record(|c| c.update_search += 1).await?;
        let mut searches = self.searches.lock().await;
        let search = searches
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| not_found("saved_searches", id))?;
        patch.apply(search);
        if let Some(times) = patch.times_used {
            self.times_used.lock().await.insert(id.to_string(), times);
        }
        Ok(())
    }

    async fn delete_search(&self, _user_id: &str, id: &str) -> Result<()> {
        self.record(|c| c.delete_search += 1).await?;
        self.searches.lock().await.retain(|s| s.id != id);
        Ok(())
    }

    async fn search_times_used(&self, _user_id: &str, id: &str) -> Result<u32> {
        self.record(|c| c.search_times_used += 1).await?;
        Ok(self.times_used(id).await)
    }
}

#[async_trait]
impl FavoriteApi for MockSupabaseClient {
    async fn list_favorites(&self, _user_id: &str) -> Result<Vec<SavedFavorite>> {
        self.record(|c| c.list_favorites += 1).await?;
        let mut favorites = self.favorites.lock().await.clone();
        favorites.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(favorites)
    }

    async fn insert_favorite(
        &self,
        _user_id: &str,
        draft: &SavedFavorite,
    ) -> Result<SavedFavorite> {
        self.record(|c| c.insert_favorite += 1).await?;
        let mut stored = draft.clone();
        stored.id = self.allocate_id().await;
        stored.created_at = Utc::now();
        self.favorites.lock().await.push(stored.clone());
        Ok(stored)
    }

    async fn insert_favorites(&self, _user_id: &str, drafts: &[SavedFavorite]) -> Result<usize> {
        self.record(|c| c.insert_favorites += 1).await?;
        for draft in drafts {
            let mut stored = draft.clone();
            stored.id = self.allocate_id().await;
            self.favorites.lock().await.push(stored);
        }
        Ok(drafts.len())
    }

    async fn update_favorite(
        &self,
        _user_id: &str,
        id: &str,
        patch: &FavoritePatch,
    ) -> Result<()> {
        self.record(|c| c.update_favorite += 1).await?;
        let mut favorites = self.favorites.lock().await;
        let favorite = favorites
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| not_found("favorites", id))?;
        patch.apply(favorite);
        Ok(())
    }

    async fn delete_favorite(&self, _user_id: &str, id: &str) -> Result<()> {
        self.record(|c| c.delete_favorite += 1).await?;
        self.favorites.lock().await.retain(|f| f.id != id);
        Ok(())
    }

    async fn favorite_archived(&self, _user_id: &str, id: &str) -> Result<bool> {
        self.record(|c| c.favorite_archived += 1).await?;
        self.favorites
            .lock()
            .await
            .iter()
            .find(|f| f.id == id)
            .map(|f| f.archived)
            .ok_or_else(|| not_found("favorites", id))
    }
}

#[async_trait]
impl ProfileApi for MockSupabaseClient {
    async fn migration_completed(&self, _user_id: &str) -> Result<Option<bool>> {
        self.record(|c| c.migration_completed += 1).await?;
        Ok(self.profile().await)
    }

    async fn mark_migration_completed(&self, _user_id: &str) -> Result<()> {
        self.record(|c| c.mark_migration_completed += 1).await?;
        *self.migration_completed.lock().await = Some(true);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queued_errors_are_consumed_in_order() {
        let mock = MockSupabaseClient::new()
            .with_error(ApiError::ServerError("down".into()))
            .await;

        assert!(mock.list_searches("u1").await.is_err());
        assert!(mock.list_searches("u1").await.is_ok());
        assert_eq!(mock.calls().await.list_searches, 2);
        assert_eq!(mock.calls().await.total(), 2);
    }

    #[tokio::test]
    async fn test_mark_migration_creates_profile() {
        let mock = MockSupabaseClient::new();
        assert_eq!(mock.migration_completed("u1").await.unwrap(), None);

        mock.mark_migration_completed("u1").await.unwrap();
        assert_eq!(mock.migration_completed("u1").await.unwrap(), Some(true));
    }
}
