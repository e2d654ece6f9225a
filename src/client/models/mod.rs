//! FlightWatcher data models
//!
//! Rust field names are English; serde renames carry the web app's JSON names
//! so local data and exports stay interchangeable with it.

mod auth;
mod flight;
mod saved;

pub use auth::Session;
pub use flight::{DateWindow, Flight, ScanRequest, Trip};
pub use saved::{FavoritePatch, NewResult, SavedFavorite, SavedSearch, SearchPatch};

/// Departure airport used when a search does not name one
pub const DEFAULT_AIRPORT: &str = "BVA";

/// Per-segment budget ceiling used when a search does not set one
pub const DEFAULT_BUDGET: f64 = 200.0;

/// Outbound flights considered per scan when a search does not set a cap
pub const DEFAULT_OUTBOUND_LIMIT: u32 = 50;

/// Auto-check interval for searches stored remotely
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 3600;

/// Auto-check interval for searches stored locally
pub const LOCAL_CHECK_INTERVAL_SECS: u64 = 300;
