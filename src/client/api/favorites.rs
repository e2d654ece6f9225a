//! Favorite API trait

use async_trait::async_trait;

use crate::client::models::{FavoritePatch, SavedFavorite};
use crate::error::Result;

/// Operations on the `favorites` table
#[async_trait]
pub trait FavoriteApi: Send + Sync {
    /// List a user's favorites, newest first
    async fn list_favorites(&self, user_id: &str) -> Result<Vec<SavedFavorite>>;

    async fn insert_favorite(&self, user_id: &str, draft: &SavedFavorite)
    -> Result<SavedFavorite>;

    /// Bulk insert, returning the number of rows written
    async fn insert_favorites(&self, user_id: &str, drafts: &[SavedFavorite]) -> Result<usize>;

    async fn update_favorite(&self, user_id: &str, id: &str, patch: &FavoritePatch)
    -> Result<()>;

    async fn delete_favorite(&self, user_id: &str, id: &str) -> Result<()>;

    /// Current archived flag of one favorite, read fresh from the database
    async fn favorite_archived(&self, user_id: &str, id: &str) -> Result<bool>;
}
