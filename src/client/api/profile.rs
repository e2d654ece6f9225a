//! User profile API trait

use async_trait::async_trait;

use crate::error::Result;

/// Operations on the `user_profiles` table
#[async_trait]
pub trait ProfileApi: Send + Sync {
    /// Migration flag of the user's profile, `None` when no profile exists
    async fn migration_completed(&self, user_id: &str) -> Result<Option<bool>>;

    /// Create or update the profile with the migration flag set
    async fn mark_migration_completed(&self, user_id: &str) -> Result<()>;
}
