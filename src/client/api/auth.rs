//! Authentication API trait

use async_trait::async_trait;

use crate::client::models::Session;
use crate::error::Result;

/// Authentication operations for Supabase Auth
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Sign in with email and password
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// Exchange a refresh token for a new session
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session>;
}
