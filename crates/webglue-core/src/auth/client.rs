//! Client for the hosted backend's password authentication endpoint.
//!
//! `PocketBaseClient` is constructed once per session and handed to
//! whatever needs it; there is no process-wide instance.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::store::{AuthRecord, AuthStore};
use crate::error::ApiError;

/// Base URL the backend listens on when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8090";

/// Auth collection used for end-user logins
pub const USERS_COLLECTION: &str = "users";

/// HTTP request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// The external authentication collaborator as seen by the auth bridge.
pub trait AuthBackend: Send + Sync {
    /// Authenticate against the backend, updating `auth_store` on success.
    fn auth_with_password(
        &self,
        identity: &str,
        password: &str,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn auth_store(&self) -> &AuthStore;
}

#[derive(Debug, Serialize)]
struct PasswordAuthRequest<'a> {
    identity: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
    record: Option<AuthRecord>,
}

/// HTTP client for a PocketBase-style backend.
/// Clone is cheap and clones share both the connection pool and the auth store.
#[derive(Clone)]
pub struct PocketBaseClient {
    client: Client,
    base_url: String,
    auth_collection: String,
    store: Arc<AuthStore>,
}

impl PocketBaseClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_collection: USERS_COLLECTION.to_string(),
            store: Arc::new(AuthStore::new()),
        })
    }

    /// Use a different auth collection for `AuthBackend::auth_with_password`.
    pub fn with_auth_collection(mut self, collection: impl Into<String>) -> Self {
        self.auth_collection = collection.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Operations scoped to a single collection.
    pub fn collection<'a>(&'a self, name: &'a str) -> RecordService<'a> {
        RecordService { client: self, name }
    }

    pub fn auth_store(&self) -> &AuthStore {
        &self.store
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }
}

impl AuthBackend for PocketBaseClient {
    async fn auth_with_password(&self, identity: &str, password: &str) -> Result<(), ApiError> {
        self.collection(&self.auth_collection)
            .auth_with_password(identity, password)
            .await
            .map(|_| ())
    }

    fn auth_store(&self) -> &AuthStore {
        &self.store
    }
}

/// Collection-scoped requests, e.g. `client.collection("users")`.
pub struct RecordService<'a> {
    client: &'a PocketBaseClient,
    name: &'a str,
}

impl RecordService<'_> {
    /// Authenticate with identity (username or email) and password.
    ///
    /// On success the token and record are saved into the client's auth store
    /// and the record is returned.
    pub async fn auth_with_password(
        &self,
        identity: &str,
        password: &str,
    ) -> Result<Option<AuthRecord>, ApiError> {
        let url = format!(
            "{}/api/collections/{}/auth-with-password",
            self.client.base_url, self.name
        );
        debug!(collection = self.name, "Sending password authentication request");

        let response = self
            .client
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(&PasswordAuthRequest { identity, password })
            .send()
            .await?;

        let response = PocketBaseClient::check_response(response).await?;

        let auth: AuthResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse auth response: {}", e)))?;

        self.client.store.save(auth.token, auth.record.clone());
        Ok(auth.record)
    }
}
