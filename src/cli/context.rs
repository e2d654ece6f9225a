//! Command execution context
//!
//! Provides a unified context for command execution: config loading, the
//! local store, the record cache and, when signed in, the Supabase client.

use std::path::PathBuf;
use std::sync::Arc;

use crate::cache::{Cache, SqliteKvStore};
use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::client::SupabaseClient;
use crate::config::Config;
use crate::error::Result;
use crate::store::FlightStore;

/// The record store as wired for the CLI
pub type Store = FlightStore<SupabaseClient, SqliteKvStore>;

/// Context for command execution containing config, store and runtime options.
pub struct CommandContext {
    /// Loaded configuration with environment overrides applied
    pub config: Config,
    /// Config path override, for saving back
    config_path: Option<String>,
    /// Signed-in client, absent when signed out
    pub client: Option<Arc<SupabaseClient>>,
    pub cache: Arc<Cache<SqliteKvStore>>,
    pub store: Store,
    pub format: OutputFormat,
}

impl CommandContext {
    /// Create a command context.
    ///
    /// A missing config file means signed-out, local-only mode. A session is
    /// used only when the Supabase project is configured too.
    pub async fn new(opts: &GlobalOptions) -> Result<Self> {
        let config = Config::load_or_default_at(opts.config_ref())?;

        let kv = Arc::new(SqliteKvStore::open()?);
        let cache = Arc::new(Cache::new(kv));

        let (client, store) = match (config.supabase(), &config.session) {
            (Ok((url, key)), Some(session)) => {
                let client = Arc::new(SupabaseClient::new(url, key)?);
                client.set_session(session.clone()).await;
                log::debug!("Signed in as {}", session.user_id);
                let store =
                    FlightStore::signed_in(Arc::clone(&cache), Arc::clone(&client), &session.user_id);
                (Some(client), store)
            }
            (Err(_), Some(_)) => {
                log::warn!("Session found but Supabase is not configured; using local records");
                (None, FlightStore::signed_out(Arc::clone(&cache)))
            }
            _ => (None, FlightStore::signed_out(Arc::clone(&cache))),
        };

        let mut store = store.with_export_dir(Self::export_dir()?);
        if opts.no_cache {
            store = store.without_cache();
        }
        if config.preferences.auto_export && !store.get_auto_export_enabled()? {
            store.set_auto_export_enabled(true)?;
        }

        Ok(Self {
            config,
            config_path: opts.config.clone(),
            client,
            cache,
            store,
            format: opts.format,
        })
    }

    /// Where backups are written by default
    pub fn export_dir() -> Result<PathBuf> {
        Ok(SqliteKvStore::data_dir()?.join("exports"))
    }

    pub fn save_config(&self) -> Result<()> {
        self.config.save_at(self.config_path.as_deref())
    }

    /// Persist a session refreshed while the command ran
    pub async fn finish(mut self) -> Result<()> {
        let Some(client) = &self.client else {
            return Ok(());
        };
        if let Some(session) = client.refreshed_session().await {
            log::debug!("Saving refreshed session");
            self.config.session = Some(session);
            self.save_config()?;
        }
        Ok(())
    }
}
