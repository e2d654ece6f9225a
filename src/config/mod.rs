//! Configuration management for FlightWatcher

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::client::models::{DEFAULT_AIRPORT, Session};
use crate::error::{ConfigError, Result};

/// Environment variable overriding the Supabase project URL
pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";

/// Environment variable overriding the Supabase anon key
pub const SUPABASE_ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Supabase project URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supabase_url: Option<String>,

    /// Supabase anon (public) key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supabase_anon_key: Option<String>,

    /// Signed-in session, absent when signed out
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,

    /// User preferences
    #[serde(default)]
    pub preferences: Preferences,
}

/// User preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Departure airport used when a search does not name one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_airport: Option<String>,

    /// OurAirports-style CSV used by `airport search`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airports_csv: Option<PathBuf>,

    /// Write a JSON backup after every change
    #[serde(default)]
    pub auto_export: bool,
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".flightwatcher").join("config.yaml"))
    }

    /// The given path, or the default one
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration, applying environment overrides
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        let mut config = Self::load_from(&Self::resolve_path(path)?)?;
        config.apply_env();
        Ok(config)
    }

    /// Like `load_at`, but a missing file yields the default configuration
    pub fn load_or_default_at(path: Option<&str>) -> Result<Self> {
        let mut config = match Self::load_from(&Self::resolve_path(path)?) {
            Ok(config) => config,
            Err(crate::error::Error::Config(ConfigError::NotFound)) => Self::default(),
            Err(e) => return Err(e),
        };
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific path, without overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Save configuration to the given or default path
    pub fn save_at(&self, path: Option<&str>) -> Result<()> {
        self.save_to(&Self::resolve_path(path)?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(path, contents)?;

        // Holds tokens: owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Override Supabase settings from the environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(SUPABASE_URL_ENV).ok(),
            std::env::var(SUPABASE_ANON_KEY_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, url: Option<String>, anon_key: Option<String>) {
        if let Some(url) = url.filter(|u| !u.is_empty()) {
            self.supabase_url = Some(url);
        }
        if let Some(key) = anon_key.filter(|k| !k.is_empty()) {
            self.supabase_anon_key = Some(key);
        }
    }

    /// Supabase URL and anon key, both required
    pub fn supabase(&self) -> Result<(&str, &str)> {
        match (&self.supabase_url, &self.supabase_anon_key) {
            (Some(url), Some(key)) => Ok((url.as_str(), key.as_str())),
            _ => Err(ConfigError::MissingSupabase.into()),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    /// Check if the session token is expired or will expire soon (within 5 minutes)
    pub fn is_token_expired(&self) -> bool {
        match &self.session {
            None => true,
            Some(session) => session.is_expired(),
        }
    }

    pub fn default_airport(&self) -> &str {
        self.preferences
            .default_airport
            .as_deref()
            .unwrap_or(DEFAULT_AIRPORT)
    }
}
