//! Credential store: API key, bearer token and the login exchange.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::instrument;
use url::Url;

use crate::error::{AuthError, TvdbError};
use crate::transport::Transport;

/// Path of the login endpoint, relative to the base URL.
const LOGIN_PATH: &str = "login";

/// Body of `POST /login`.
#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    apikey: &'a str,
}

/// Response of `POST /login`.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    data: LoginData,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    #[serde(default)]
    token: String,
}

/// Holds the API key and the current bearer token.
///
/// The token is lock-guarded so that a single store can be shared between
/// concurrent callers. Refreshes are serialized by a second lock; see
/// [`CredentialStore::refresh_rejected`].
#[allow(clippy::module_name_repetitions)]
pub struct CredentialStore {
    /// API key sent to the login endpoint.
    api_key: String,
    /// Absolute URL of the login endpoint.
    login_url: Url,
    /// Transport used for the login exchange.
    transport: Transport,
    /// Token from the most recent successful login.
    token: RwLock<Option<String>>,
    /// Serializes refreshes.
    refresh_lock: Mutex<()>,
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("api_key", &"<redacted>")
            .field("login_url", &self.login_url.as_str())
            .finish_non_exhaustive()
    }
}

impl CredentialStore {
    /// Creates a store without a token.
    ///
    /// # Errors
    ///
    /// Returns [`TvdbError::InvalidPath`] if the login URL cannot be built
    /// from `base_url`.
    pub fn new(
        api_key: impl Into<String>,
        base_url: &Url,
        transport: Transport,
    ) -> Result<Self, TvdbError> {
        let login_url = base_url
            .join(LOGIN_PATH)
            .map_err(|source| TvdbError::InvalidPath {
                path: String::from(LOGIN_PATH),
                source,
            })?;

        Ok(Self {
            api_key: api_key.into(),
            login_url,
            transport,
            token: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Exchanges the API key for a bearer token and stores it.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the request fails, the status is not 200,
    /// the body cannot be decoded, or the token is empty. The stored token is
    /// left untouched on failure.
    #[instrument(skip_all)]
    pub async fn login(&self) -> Result<(), AuthError> {
        let request = LoginRequest {
            apikey: &self.api_key,
        };

        tracing::debug!(url = %self.login_url, "TVDB login request");

        let response = self
            .transport
            .send(|| {
                self.transport
                    .http_client()
                    .post(self.login_url.clone())
                    .json(&request)
            })
            .await
            .map_err(AuthError::Network)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(AuthError::Status {
                code: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(AuthError::Network)?;
        let login: LoginResponse = serde_json::from_slice(&body).map_err(AuthError::Decode)?;

        if login.data.token.is_empty() {
            return Err(AuthError::EmptyToken);
        }

        *self.token.write().await = Some(login.data.token);
        tracing::debug!("TVDB login succeeded");
        Ok(())
    }

    /// Re-runs [`login`](Self::login). The API has no separate refresh
    /// endpoint.
    ///
    /// # Errors
    ///
    /// Same as [`login`](Self::login); the previous token stays in place.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        self.login().await
    }

    /// Refreshes after the server rejected `rejected`.
    ///
    /// If another caller already replaced the rejected token while this one
    /// waited for the refresh lock, no login is made. When the refresh fails
    /// the rejected token is cleared so it is never sent again.
    pub(crate) async fn refresh_rejected(&self, rejected: Option<&str>) -> Result<(), AuthError> {
        let _guard = self.refresh_lock.lock().await;

        let current = self.token().await;
        if current.is_some() && current.as_deref() != rejected {
            tracing::debug!("Token already refreshed by another request");
            return Ok(());
        }

        match self.refresh().await {
            Ok(()) => Ok(()),
            Err(e) => {
                let mut token = self.token.write().await;
                if token.as_deref() == rejected {
                    *token = None;
                }
                Err(e)
            }
        }
    }

    /// Current token, if any.
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Current token formatted as a bearer credential.
    pub async fn auth_header_value(&self) -> Option<String> {
        self.token
            .read()
            .await
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| format!("Bearer {t}"))
    }

    /// True iff a non-empty token is held.
    pub async fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .await
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }

    /// Drops the current token.
    pub async fn invalidate(&self) {
        *self.token.write().await = None;
    }

    #[cfg(test)]
    pub(crate) async fn set_token(&self, token: &str) {
        *self.token.write().await = Some(String::from(token));
    }
}
