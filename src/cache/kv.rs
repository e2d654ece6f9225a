//! Durable key/value storage backing the persistent cache tier
//!
//! The cache and the signed-out fallback records share one string-to-string
//! store, the same way the web app shares browser local storage.

use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::StorageError;

/// Schema version - increment to trigger nuke-and-rebuild
const SCHEMA_VERSION: i32 = 1;

type Result<T> = std::result::Result<T, StorageError>;

/// String key/value storage with local-storage semantics.
pub trait KvStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, failing with `QuotaExceeded` when the store is full.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    fn remove_item(&self, key: &str) -> Result<()>;

    /// Every stored key, in no particular order
    fn keys(&self) -> Result<Vec<String>>;
}

/// SQLite-backed key/value store with an optional byte quota
pub struct SqliteKvStore {
    conn: Mutex<Connection>,
    path: PathBuf,
    quota_bytes: Option<usize>,
}

impl SqliteKvStore {
    /// Open or create the store at the default XDG cache location
    pub fn open() -> Result<Self> {
        let dir = Self::data_dir()?;
        Self::open_at(&dir)
    }

    /// Get the store directory (~/.cache/flightwatcher on Linux)
    pub fn data_dir() -> Result<PathBuf> {
        let base = dirs::cache_dir().ok_or(StorageError::NoHome)?;
        Ok(base.join("flightwatcher"))
    }

    /// Open the store inside a specific directory (for testing)
    pub fn open_at(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .map_err(|e| StorageError::Io(format!("Failed to create store dir: {}", e)))?;

        let db_path = dir.join("store.db");
        let conn = Connection::open(&db_path)?;

        // Check schema version - nuke if mismatched
        let version: i32 = conn
            .pragma_query_value(None, "user_version", |r| r.get(0))
            .unwrap_or(0);

        if version != 0 && version != SCHEMA_VERSION {
            log::info!(
                "Store schema version mismatch ({} != {}), rebuilding",
                version,
                SCHEMA_VERSION
            );
            drop(conn);
            std::fs::remove_file(&db_path)
                .map_err(|e| StorageError::Io(format!("Failed to remove store: {}", e)))?;
            return Self::open_at(dir);
        }

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            );
            "#,
        )?;

        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: db_path,
            quota_bytes: None,
        })
    }

    /// Bound the total size of stored keys and values
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota_bytes = Some(bytes);
        self
    }

    /// Path of the SQLite database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total bytes of keys and values currently stored
    pub fn total_bytes(&self) -> Result<usize> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockPoisoned)?;
        let total: i64 = conn.query_row(
            "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0) FROM kv",
            [],
            |r| r.get(0),
        )?;
        Ok(total as usize)
    }
}

impl KvStore for SqliteKvStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockPoisoned)?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |r| r.get(0))
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockPoisoned)?;

        if let Some(limit) = self.quota_bytes {
            let others: i64 = conn.query_row(
                "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0) FROM kv WHERE key != ?1",
                [key],
                |r| r.get(0),
            )?;
            let used = others as usize + key.len() + value.len();
            if used > limit {
                return Err(StorageError::QuotaExceeded { used, limit });
            }
        }

        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockPoisoned)?;
        conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockPoisoned)?;
        let mut stmt = conn.prepare("SELECT key FROM kv")?;
        let keys = stmt
            .query_map([], |r| r.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

#[cfg(test)]
pub use spy::SpyKvStore;
