//! API trait definitions split by responsibility
//!
//! This module organizes the Supabase surface into focused sub-traits:
//! - [`AuthApi`] - Sign-in and token refresh
//! - [`SearchApi`] - The `saved_searches` table
//! - [`FavoriteApi`] - The `favorites` table
//! - [`ProfileApi`] - The `user_profiles` table
//!
//! The [`FlightStoreApi`](super::FlightStoreApi) super-trait combines all four.

mod auth;
mod favorites;
mod profile;
mod searches;

pub use auth::AuthApi;
pub use favorites::FavoriteApi;
pub use profile::ProfileApi;
pub use searches::SearchApi;
