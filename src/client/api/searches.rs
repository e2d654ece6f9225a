//! Saved search API trait

use async_trait::async_trait;

use crate::client::models::{SavedSearch, SearchPatch};
use crate::error::Result;

/// Operations on the `saved_searches` table.
///
/// Every call is scoped to one user; row-level security rejects the rest.
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// List a user's searches, newest first
    async fn list_searches(&self, user_id: &str) -> Result<Vec<SavedSearch>>;

    /// Insert one search and return the stored row.
    ///
    /// The draft's id and creation time are replaced by the database's.
    async fn insert_search(&self, user_id: &str, draft: &SavedSearch) -> Result<SavedSearch>;

    /// Bulk insert, returning the number of rows written
    async fn insert_searches(&self, user_id: &str, drafts: &[SavedSearch]) -> Result<usize>;

    async fn update_search(&self, user_id: &str, id: &str, patch: &SearchPatch) -> Result<()>;

    async fn delete_search(&self, user_id: &str, id: &str) -> Result<()>;

    /// Current value of the `times_used` counter
    async fn search_times_used(&self, user_id: &str, id: &str) -> Result<u32>;
}
