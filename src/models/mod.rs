//! Display models for CLI output
//!
//! Converts records into rows with column names suited to tables and JSON.

pub mod display;

pub use display::{
    AirportDisplay, FavoriteDisplay, NewResultDisplay, SearchDisplay, TripDisplay,
};
