//! JSON backups of every user record

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FlightStore;
use super::local::{ExcludedDestinations, NewResults};
use crate::cache::KvStore;
use crate::client::FlightStoreApi;
use crate::client::models::{SavedFavorite, SavedSearch};
use crate::error::{Result, StorageError};

pub const EXPORT_VERSION: &str = "1.0";

/// Minimum gap between two automatic exports
pub const AUTO_EXPORT_THROTTLE_MILLIS: i64 = 30_000;

/// Backup document, readable by the web app's import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub searches: Vec<SavedSearch>,
    pub favorites: Vec<SavedFavorite>,
    pub excluded_destinations: ExcludedDestinations,
    pub new_results: NewResults,
    pub dev_mode: bool,
}

impl<A: FlightStoreApi, S: KvStore> FlightStore<A, S> {
    /// Collect every record visible to the current user
    pub async fn export_all_data(&self) -> Result<ExportData> {
        Ok(ExportData {
            version: EXPORT_VERSION.to_string(),
            export_date: self.now(),
            searches: self.get_saved_searches().await?,
            favorites: self.get_favorites().await?,
            excluded_destinations: self.local.excluded_destinations()?,
            new_results: self.local.new_results()?,
            dev_mode: self.local.dev_mode()?,
        })
    }

    /// Write a backup into `dir`, returning the file written
    pub async fn write_export(&self, dir: &Path) -> Result<PathBuf> {
        let data = self.export_all_data().await?;
        let file_name = format!(
            "flightwatcher_backup_{}_{}.json",
            data.export_date.format("%Y-%m-%d"),
            data.export_date.timestamp_millis()
        );
        let json = serde_json::to_string_pretty(&data).map_err(StorageError::from)?;

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(file_name);
        tokio::fs::write(&path, json).await?;
        log::debug!("Exported records to {}", path.display());
        Ok(path)
    }

    /// Export after a mutation when enabled and not throttled. Never fails.
    pub(crate) async fn auto_export(&self) {
        let Some(dir) = &self.export_dir else {
            return;
        };
        match self.local.auto_export_enabled() {
            Ok(true) => {}
            Ok(false) => return,
            Err(e) => {
                log::warn!("Auto-export flag unreadable: {}", e);
                return;
            }
        }

        let now = self.cache.now_millis();
        if let Ok(Some(last)) = self.local.last_export_at()
            && now - last < AUTO_EXPORT_THROTTLE_MILLIS
        {
            log::debug!("Auto-export skipped, last one {} ms ago", now - last);
            return;
        }

        if let Err(e) = self.local.set_last_export_at(now) {
            log::warn!("Failed to record auto-export time: {}", e);
        }
        if let Err(e) = self.write_export(dir).await {
            log::warn!("Auto-export failed: {}", e);
        }
    }
}
