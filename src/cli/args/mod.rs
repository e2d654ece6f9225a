//! Shared CLI argument types
//!
//! Reusable argument structs that can be flattened into commands using
//! `#[command(flatten)]`.

mod common;
mod global;
mod request;

pub use common::{OutputFormat, Toggle};
pub use global::GlobalOptions;
pub use request::{RequestArgs, parse_window};
