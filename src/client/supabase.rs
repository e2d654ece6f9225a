//! Supabase REST and Auth client implementation

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client as HttpClient, Method, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::RwLock;

use super::api::{AuthApi, FavoriteApi, ProfileApi, SearchApi};
use super::models::{FavoritePatch, SavedFavorite, SavedSearch, SearchPatch, Session};
use super::rows::{
    self, FAVORITES_TABLE, PROFILES_TABLE, SEARCHES_TABLE, favorite_from_row, search_from_row,
};
use crate::error::{ApiError, ConfigError, Result};

/// Rate limit: 10 requests per second
const RATE_LIMIT_PER_SECOND: u32 = 10;

const PREFER_REPRESENTATION: &str = "return=representation";
const PREFER_MINIMAL: &str = "return=minimal";
const PREFER_UPSERT: &str = "resolution=merge-duplicates,return=minimal";

/// Decode the `exp` claim of a JWT without verifying it
fn jwt_expiry(token: &str) -> Result<DateTime<Utc>> {
    use base64::{Engine as _, engine::general_purpose};

    #[derive(Deserialize)]
    struct JwtPayload {
        exp: i64, // Unix timestamp
    }

    // JWT format: header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(ApiError::InvalidToken.into());
    }

    let payload_bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to decode JWT payload: {}", e)))?;

    let payload: JwtPayload = serde_json::from_slice(&payload_bytes)
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JWT payload: {}", e)))?;

    DateTime::from_timestamp(payload.exp, 0).ok_or_else(|| {
        ApiError::InvalidResponse("Invalid JWT expiration timestamp".to_string()).into()
    })
}

/// `col=eq.value` filter
fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

/// Supabase API client
pub struct SupabaseClient {
    http: HttpClient,
    base_url: String,
    anon_key: String,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    auth_state: Arc<RwLock<AuthState>>,
}

/// Internal authentication state
#[derive(Debug, Clone, Default)]
struct AuthState {
    session: Option<Session>,
    /// Set when the session was refreshed and should be saved
    refreshed: bool,
}

impl SupabaseClient {
    /// Create a client for the project at `base_url`
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let quota = Quota::per_second(
            NonZeroU32::new(RATE_LIMIT_PER_SECOND).unwrap_or(NonZeroU32::MIN),
        );
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            rate_limiter,
            auth_state: Arc::new(RwLock::new(AuthState::default())),
        })
    }

    /// Use an existing session for authenticated requests
    pub async fn set_session(&self, session: Session) {
        let mut state = self.auth_state.write().await;
        state.session = Some(session);
    }

    pub async fn session(&self) -> Option<Session> {
        self.auth_state.read().await.session.clone()
    }

    /// The current session if it was refreshed since the client was created
    pub async fn refreshed_session(&self) -> Option<Session> {
        let state = self.auth_state.read().await;
        if state.refreshed {
            state.session.clone()
        } else {
            None
        }
    }

    async fn store_refreshed(&self, session: Session) {
        let mut state = self.auth_state.write().await;
        state.session = Some(session);
        state.refreshed = true;
    }

    /// Exchange the stored refresh token for a new session
    async fn force_refresh(&self) -> Result<String> {
        let refresh_token = {
            let state = self.auth_state.read().await;
            let session = state.session.as_ref().ok_or(ConfigError::NotSignedIn)?;
            session.refresh_token.clone()
        };

        log::debug!("Refreshing Supabase session");
        let session = self.refresh_session(&refresh_token).await?;
        let token = session.access_token.clone();
        self.store_refreshed(session).await;
        Ok(token)
    }

    /// Get the current access token, refreshing if necessary
    async fn valid_token(&self) -> Result<String> {
        let expired = {
            let state = self.auth_state.read().await;
            match &state.session {
                None => return Err(ConfigError::NotSignedIn.into()),
                Some(session) => session.is_expired(),
            }
        };

        if expired {
            return self.force_refresh().await;
        }

        let state = self.auth_state.read().await;
        state
            .session
            .as_ref()
            .map(|s| s.access_token.clone())
            .ok_or_else(|| ConfigError::NotSignedIn.into())
    }

    /// Map a non-success response to an API error
    async fn error_for_status(response: Response) -> ApiError {
        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::FORBIDDEN => ApiError::Forbidden,
            StatusCode::NOT_FOUND => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Resource not found".to_string());
                ApiError::NotFound(error_msg)
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                ApiError::RateLimit(Duration::from_secs(retry_after))
            }
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Bad request".to_string());
                ApiError::BadRequest(error_msg)
            }
            status if status.is_server_error() => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("Server error: {}", status));
                ApiError::ServerError(error_msg)
            }
            _ => ApiError::InvalidResponse(format!("Unexpected status code: {}", status)),
        }
    }

    /// Make an authenticated PostgREST request and return the response body.
    ///
    /// A 401 before the recorded expiry triggers one refresh and one retry.
    async fn rest(
        &self,
        method: Method,
        table: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
        prefer: Option<&str>,
    ) -> Result<String> {
        let mut allow_refresh = true;
        loop {
            let response = self
                .send_rest(method.clone(), table, query, body, prefer)
                .await?;

            let status = response.status();
            if status.is_success() {
                return response.text().await.map_err(|e| {
                    ApiError::InvalidResponse(format!("Failed to read response: {}", e)).into()
                });
            }

            if status == StatusCode::UNAUTHORIZED && allow_refresh {
                allow_refresh = false;
                self.force_refresh().await?;
                continue;
            }

            return Err(Self::error_for_status(response).await.into());
        }
    }

    async fn send_rest(
        &self,
        method: Method,
        table: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
        prefer: Option<&str>,
    ) -> Result<Response> {
        // Apply rate limiting
        self.rate_limiter.until_ready().await;

        let token = self.valid_token().await?;

        let url = format!("{}/rest/v1/{}", self.base_url, table);
        let mut request = self
            .http
            .request(method.clone(), &url)
            .query(query)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", token));
        if let Some(prefer) = prefer {
            request = request.header("Prefer", prefer);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        log::debug!("{} {}", method, url);
        Ok(request.send().await.map_err(ApiError::from)?)
    }

    async fn rest_json<T: DeserializeOwned>(
        &self,
        method: Method,
        table: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
        prefer: Option<&str>,
    ) -> Result<T> {
        let text = self.rest(method, table, query, body, prefer).await?;
        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse response: {}", e)).into()
        })
    }

    /// Query string selecting one row of a user's table
    fn owned_row(user_id: &str, id: &str) -> Vec<(&'static str, String)> {
        vec![("id", eq(id)), ("user_id", eq(user_id))]
    }

    /// Fetch a single column of one owned row
    async fn owned_column(
        &self,
        table: &'static str,
        column: &'static str,
        user_id: &str,
        id: &str,
    ) -> Result<Value> {
        let mut query = Self::owned_row(user_id, id);
        query.push(("select", column.to_string()));

        let rows: Vec<Value> = self
            .rest_json(Method::GET, table, &query, None, None)
            .await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("{} {}", table, id)))?;
        Ok(row.get(column).cloned().unwrap_or(Value::Null))
    }

    /// Map rows, skipping (and logging) the ones that do not map
    fn map_rows<T>(
        rows: Vec<Value>,
        map: impl Fn(&Value) -> std::result::Result<T, crate::error::MappingError>,
    ) -> Vec<T> {
        rows.iter()
            .filter_map(|row| match map(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("Skipping row: {}", e);
                    None
                }
            })
            .collect()
    }

    /// POST to the token endpoint and build a session from the reply
    async fn token_request(&self, grant_type: &str, body: Value) -> Result<Session> {
        // Apply rate limiting
        self.rate_limiter.until_ready().await;

        #[derive(Deserialize)]
        struct TokenUser {
            id: String,
            #[serde(default)]
            email: Option<String>,
        }

        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
            refresh_token: String,
            #[serde(default)]
            expires_at: Option<i64>,
            user: TokenUser,
        }

        let url = format!("{}/auth/v1/token", self.base_url);
        let response = self
            .http
            .post(&url)
            .query(&[("grant_type", grant_type)])
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            let text = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| {
                    v.get("error_description")
                        .or_else(|| v.get("msg"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .unwrap_or(text);
            return Err(ApiError::InvalidCredentials(reason).into());
        }
        if !status.is_success() {
            return Err(Self::error_for_status(response).await.into());
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to read response: {}", e)))?;

        let token: TokenResponse = serde_json::from_str(&response_text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse token response: {}", e))
        })?;

        let expires_at = match token.expires_at.and_then(|ts| DateTime::from_timestamp(ts, 0)) {
            Some(at) => at,
            None => jwt_expiry(&token.access_token)?,
        };

        Ok(Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            user_id: token.user.id,
            email: token.user.email,
            expires_at,
        })
    }
}

#[async_trait]
impl AuthApi for SupabaseClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        self.token_request("password", json!({"email": email, "password": password}))
            .await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session> {
        self.token_request("refresh_token", json!({"refresh_token": refresh_token}))
            .await
    }
}

#[async_trait]
impl SearchApi for SupabaseClient {
    async fn list_searches(&self, user_id: &str) -> Result<Vec<SavedSearch>> {
        let query = [
            ("select", "*".to_string()),
            ("user_id", eq(user_id)),
            ("order", "created_at.desc".to_string()),
        ];
        let rows: Vec<Value> = self
            .rest_json(Method::GET, SEARCHES_TABLE, &query, None, None)
            .await?;
        Ok(Self::map_rows(rows, search_from_row))
    }

    async fn insert_search(&self, user_id: &str, draft: &SavedSearch) -> Result<SavedSearch> {
        let body = rows::search_to_row(user_id, draft);
        let inserted: Vec<Value> = self
            .rest_json(
                Method::POST,
                SEARCHES_TABLE,
                &[],
                Some(&body),
                Some(PREFER_REPRESENTATION),
            )
            .await?;
        let row = inserted
            .first()
            .ok_or_else(|| ApiError::InvalidResponse("Insert returned no row".to_string()))?;
        Ok(search_from_row(row)?)
    }

    async fn insert_searches(&self, user_id: &str, drafts: &[SavedSearch]) -> Result<usize> {
        if drafts.is_empty() {
            return Ok(0);
        }
        let body = Value::Array(
            drafts
                .iter()
                .map(|d| rows::search_to_row(user_id, d))
                .collect(),
        );
        self.rest(
            Method::POST,
            SEARCHES_TABLE,
            &[],
            Some(&body),
            Some(PREFER_MINIMAL),
        )
        .await?;
        Ok(drafts.len())
    }

    async fn update_search(&self, user_id: &str, id: &str, patch: &SearchPatch) -> Result<()> {
        let body = serde_json::to_value(patch)?;
        self.rest(
            Method::PATCH,
            SEARCHES_TABLE,
            &Self::owned_row(user_id, id),
            Some(&body),
            Some(PREFER_MINIMAL),
        )
        .await?;
        Ok(())
    }

    async fn delete_search(&self, user_id: &str, id: &str) -> Result<()> {
        self.rest(
            Method::DELETE,
            SEARCHES_TABLE,
            &Self::owned_row(user_id, id),
            None,
            None,
        )
        .await?;
        Ok(())
    }

    async fn search_times_used(&self, user_id: &str, id: &str) -> Result<u32> {
        let value = self
            .owned_column(SEARCHES_TABLE, "times_used", user_id, id)
            .await?;
        Ok(value
            .as_u64()
            .map_or(0, |n| u32::try_from(n).unwrap_or(u32::MAX)))
    }
}

#[async_trait]
impl FavoriteApi for SupabaseClient {
    async fn list_favorites(&self, user_id: &str) -> Result<Vec<SavedFavorite>> {
        let query = [
            ("select", "*".to_string()),
            ("user_id", eq(user_id)),
            ("order", "created_at.desc".to_string()),
        ];
        let rows: Vec<Value> = self
            .rest_json(Method::GET, FAVORITES_TABLE, &query, None, None)
            .await?;
        Ok(Self::map_rows(rows, favorite_from_row))
    }

    async fn insert_favorite(
        &self,
        user_id: &str,
        draft: &SavedFavorite,
    ) -> Result<SavedFavorite> {
        let body = rows::favorite_to_row(user_id, draft);
        let inserted: Vec<Value> = self
            .rest_json(
                Method::POST,
                FAVORITES_TABLE,
                &[],
                Some(&body),
                Some(PREFER_REPRESENTATION),
            )
            .await?;
        let row = inserted
            .first()
            .ok_or_else(|| ApiError::InvalidResponse("Insert returned no row".to_string()))?;
        Ok(favorite_from_row(row)?)
    }

    async fn insert_favorites(&self, user_id: &str, drafts: &[SavedFavorite]) -> Result<usize> {
        if drafts.is_empty() {
            return Ok(0);
        }
        let body = Value::Array(
            drafts
                .iter()
                .map(|d| rows::favorite_to_row(user_id, d))
                .collect(),
        );
        self.rest(
            Method::POST,
            FAVORITES_TABLE,
            &[],
            Some(&body),
            Some(PREFER_MINIMAL),
        )
        .await?;
        Ok(drafts.len())
    }

    async fn update_favorite(
        &self,
        user_id: &str,
        id: &str,
        patch: &FavoritePatch,
    ) -> Result<()> {
        let body = serde_json::to_value(patch)?;
        self.rest(
            Method::PATCH,
            FAVORITES_TABLE,
            &Self::owned_row(user_id, id),
            Some(&body),
            Some(PREFER_MINIMAL),
        )
        .await?;
        Ok(())
    }

    async fn delete_favorite(&self, user_id: &str, id: &str) -> Result<()> {
        self.rest(
            Method::DELETE,
            FAVORITES_TABLE,
            &Self::owned_row(user_id, id),
            None,
            None,
        )
        .await?;
        Ok(())
    }

    async fn favorite_archived(&self, user_id: &str, id: &str) -> Result<bool> {
        let value = self
            .owned_column(FAVORITES_TABLE, "is_archived", user_id, id)
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }
}

#[async_trait]
impl ProfileApi for SupabaseClient {
    async fn migration_completed(&self, user_id: &str) -> Result<Option<bool>> {
        let query = [
            ("select", "migration_completed".to_string()),
            ("id", eq(user_id)),
        ];
        let rows: Vec<Value> = self
            .rest_json(Method::GET, PROFILES_TABLE, &query, None, None)
            .await?;
        Ok(rows.first().map(|row| {
            row.get("migration_completed")
                .and_then(Value::as_bool)
                .unwrap_or(false)
        }))
    }

    async fn mark_migration_completed(&self, user_id: &str) -> Result<()> {
        let body = json!({
            "id": user_id,
            "migration_completed": true,
            "last_active": Utc::now(),
        });
        self.rest(
            Method::POST,
            PROFILES_TABLE,
            &[],
            Some(&body),
            Some(PREFER_UPSERT),
        )
        .await?;
        Ok(())
    }
}
