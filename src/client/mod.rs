//! Supabase API client

pub mod api;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod rows;
pub mod supabase;

pub use api::{AuthApi, FavoriteApi, ProfileApi, SearchApi};
#[cfg(test)]
pub use mock::MockSupabaseClient;
pub use supabase::SupabaseClient;

/// Everything the record store needs from the hosted database
pub trait FlightStoreApi: AuthApi + SearchApi + FavoriteApi + ProfileApi {}

impl<T> FlightStoreApi for T where T: AuthApi + SearchApi + FavoriteApi + ProfileApi {}
