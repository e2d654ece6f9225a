//! Display model implementations for table and JSON output
//!
//! Display models transform stored records into CLI-friendly formats
//! with appropriate column names and serialization.

mod airport;
mod common;
mod favorite;
mod search;

pub use airport::AirportDisplay;
pub use favorite::{FavoriteDisplay, TripDisplay};
pub use search::{NewResultDisplay, SearchDisplay};
