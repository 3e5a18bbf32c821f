//! Authenticated request pipeline.
//!
//! Attaches the bearer token to every request, and on a 401 refreshes the
//! token once and replays the request once.

use std::sync::Arc;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use tracing::instrument;
use url::Url;

use crate::auth::CredentialStore;
use crate::error::{Result, TvdbError};
use crate::transport::Transport;

/// Sends requests on behalf of one session.
#[derive(Debug)]
pub struct Pipeline {
    /// Retrying HTTP sender.
    transport: Transport,
    /// Shared credentials.
    credentials: Arc<CredentialStore>,
    /// Base URL all paths are resolved against (ends with `/`).
    base_url: Url,
}

impl Pipeline {
    /// Creates a pipeline over `transport` using `credentials`.
    #[must_use]
    pub const fn new(
        transport: Transport,
        credentials: Arc<CredentialStore>,
        base_url: Url,
    ) -> Self {
        Self {
            transport,
            credentials,
            base_url,
        }
    }

    /// Shared credential store.
    #[must_use]
    pub const fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves `path` (with or without a leading `/`) against the base URL.
    fn url_for(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|source| TvdbError::InvalidPath {
                path: String::from(path),
                source,
            })
    }

    /// Performs an authenticated request.
    ///
    /// A 401 triggers one token refresh followed by exactly one replay; the
    /// replayed response is returned whatever its status. Other responses are
    /// returned unmodified.
    ///
    /// # Errors
    ///
    /// - [`TvdbError::InvalidPath`] if `path` cannot be resolved.
    /// - [`TvdbError::Network`] if no response was obtained.
    /// - [`TvdbError::Refresh`] if the refresh after a 401 fails.
    #[instrument(skip_all, fields(method = %method, path = %path))]
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Response> {
        let url = self.url_for(path)?;

        let token = self.credentials.token().await;
        let response = self
            .send(&method, &url, path, token.as_deref(), body.as_deref())
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::warn!(%method, path, "Unauthorized (401), refreshing token");
        self.credentials
            .refresh_rejected(token.as_deref())
            .await
            .map_err(|source| TvdbError::Refresh {
                method: method.clone(),
                path: String::from(path),
                source,
            })?;

        let token = self.credentials.token().await;
        self.send(&method, &url, path, token.as_deref(), body.as_deref())
            .await
    }

    /// Sends one request through the transport.
    async fn send(
        &self,
        method: &Method,
        url: &Url,
        path: &str,
        token: Option<&str>,
        body: Option<&[u8]>,
    ) -> Result<Response> {
        tracing::debug!(%method, %url, "TVDB API request");

        self.transport
            .send(|| {
                let mut request = self
                    .transport
                    .http_client()
                    .request(method.clone(), url.clone())
                    .header(ACCEPT, "application/json");
                if let Some(token) = token {
                    request = request.bearer_auth(token);
                }
                if let Some(body) = body {
                    request = request
                        .header(CONTENT_TYPE, "application/json")
                        .body(body.to_vec());
                }
                request
            })
            .await
            .map_err(|source| TvdbError::Network {
                method: method.clone(),
                path: String::from(path),
                source,
            })
    }
}
