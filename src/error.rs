//! Error types for the FlightWatcher CLI

use std::time::Duration;
use thiserror::Error;

/// Result type alias for FlightWatcher operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    Other(String),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

/// Supabase API errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed. Run `flightwatcher login` to sign in again.")]
    Unauthorized,

    #[error("Access denied. Row-level security rejected the request.")]
    Forbidden,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded. Retry after {0:?}")]
    RateLimit(Duration),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Access token expired or invalid")]
    InvalidToken,

    #[error("Sign-in rejected: {0}")]
    InvalidCredentials(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to Supabase".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found. Run `flightwatcher init` to set up.")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),

    #[error("Supabase project not configured. Run `flightwatcher init` or set SUPABASE_URL.")]
    MissingSupabase,

    #[error("Not signed in. Run `flightwatcher login` first.")]
    NotSignedIn,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Local durable store errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage quota exceeded ({used} of {limit} bytes)")]
    QuotaExceeded { used: usize, limit: usize },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("Storage I/O error: {0}")]
    Io(String),

    #[error("Could not determine a local data directory")]
    NoHome,
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// A database row that could not be mapped to a local record
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Cannot map {table} row: field `{field}` {reason}")]
pub struct MappingError {
    pub table: &'static str,
    pub field: &'static str,
    pub reason: String,
}

impl MappingError {
    pub fn missing(table: &'static str, field: &'static str) -> Self {
        Self {
            table,
            field,
            reason: "is missing".to_string(),
        }
    }

    pub fn invalid(table: &'static str, field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            table,
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_unauthorized_message() {
        let err = ApiError::Unauthorized;
        assert!(err.to_string().contains("flightwatcher login"));
    }

    #[test]
    fn test_api_error_not_found() {
        let err = ApiError::NotFound("saved_searches 42".to_string());
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_api_error_rate_limit() {
        let err = ApiError::RateLimit(Duration::from_secs(30));
        let msg = err.to_string();
        assert!(msg.contains("Rate limit"));
        assert!(msg.contains("30"));
    }

    #[test]
    fn test_config_error_not_signed_in() {
        let err = ConfigError::NotSignedIn;
        assert!(err.to_string().contains("flightwatcher login"));
    }

    #[test]
    fn test_storage_quota_message() {
        let err = StorageError::QuotaExceeded {
            used: 2048,
            limit: 1024,
        };
        let msg = err.to_string();
        assert!(msg.contains("2048"));
        assert!(msg.contains("1024"));
    }

    #[test]
    fn test_mapping_error_message() {
        let err = MappingError::missing("favorites", "outbound_flight");
        assert_eq!(
            err.to_string(),
            "Cannot map favorites row: field `outbound_flight` is missing"
        );
    }

    #[test]
    fn test_error_from_api_error() {
        let err: Error = ApiError::Unauthorized.into();

        match err {
            Error::Api(ApiError::Unauthorized) => (),
            _ => panic!("Expected Error::Api(ApiError::Unauthorized)"),
        }
    }

    #[test]
    fn test_error_from_mapping_error() {
        let err: Error = MappingError::missing("saved_searches", "id").into();

        match err {
            Error::Mapping(m) => assert_eq!(m.field, "id"),
            _ => panic!("Expected Error::Mapping"),
        }
    }

    #[test]
    fn test_config_error_from_yaml_error() {
        let yaml_str = "invalid: [yaml: content";
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let config_err: ConfigError = yaml_err.into();

        match config_err {
            ConfigError::ParseError(_) => (),
            _ => panic!("Expected ConfigError::ParseError"),
        }
    }
}
