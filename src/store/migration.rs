//! One-time upload of local records after the first sign-in

use serde::Serialize;

use super::FlightStore;
use crate::cache::{CacheKey, KvStore};
use crate::client::FlightStoreApi;
use crate::error::Result;

/// Result of a local-to-remote migration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MigrationReport {
    pub success: bool,
    pub searches_migrated: usize,
    pub favorites_migrated: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<A: FlightStoreApi, S: KvStore> FlightStore<A, S> {
    /// Whether the signed-in user still has to migrate local records.
    ///
    /// A missing profile or a failed lookup counts as not migrated.
    pub async fn needs_migration(&self) -> bool {
        let Some(remote) = &self.remote else {
            return false;
        };
        match remote.api.migration_completed(&remote.user_id).await {
            Ok(Some(done)) => !done,
            Ok(None) => true,
            Err(e) => {
                log::debug!("Migration status lookup failed: {}", e);
                true
            }
        }
    }

    /// Upload local searches and favorites to the signed-in account.
    ///
    /// Failures are reported in the returned `MigrationReport`; only local
    /// storage errors are returned as `Err`.
    pub async fn migrate_local_to_remote(&self) -> Result<MigrationReport> {
        let Some(remote) = &self.remote else {
            return Ok(MigrationReport {
                error: Some("Not signed in".to_string()),
                ..Default::default()
            });
        };

        let searches = self.local.searches()?;
        let favorites = self.local.favorites()?;
        let has_local = !searches.is_empty() || !favorites.is_empty();

        if !has_local && !self.needs_migration().await {
            log::debug!("Nothing to migrate for {}", remote.user_id);
            return Ok(MigrationReport {
                success: true,
                ..Default::default()
            });
        }

        let mut report = MigrationReport::default();

        if !searches.is_empty() {
            match remote.api.insert_searches(&remote.user_id, &searches).await {
                Ok(n) => {
                    report.searches_migrated = n;
                    self.local.remove_searches()?;
                    if self.use_cache {
                        self.cache.invalidate_cache(CacheKey::Searches, &remote.user_id);
                    }
                }
                Err(e) => {
                    report.error = Some(format!("Search migration failed: {}", e));
                    return Ok(report);
                }
            }
        }

        if !favorites.is_empty() {
            match remote
                .api
                .insert_favorites(&remote.user_id, &favorites)
                .await
            {
                Ok(n) => {
                    report.favorites_migrated = n;
                    self.local.remove_favorites()?;
                    if self.use_cache {
                        self.cache.invalidate_cache(CacheKey::Favorites, &remote.user_id);
                    }
                }
                Err(e) => {
                    report.error = Some(format!("Favorite migration failed: {}", e));
                    return Ok(report);
                }
            }
        }

        if let Err(e) = remote.api.mark_migration_completed(&remote.user_id).await {
            report.error = Some(format!("Could not record migration: {}", e));
            return Ok(report);
        }

        log::info!(
            "Migrated {} searches and {} favorites",
            report.searches_migrated,
            report.favorites_migrated
        );
        report.success = true;
        Ok(report)
    }
}
