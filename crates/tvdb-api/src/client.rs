//! `TvdbClient` - TVDB API client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use crate::api::LocalTvdbApi;
use crate::auth::CredentialStore;
use crate::error::{AuthError, Result, TvdbError};
use crate::pipeline::Pipeline;
use crate::transport::{RetryPolicy, Transport};
use crate::types::{
    Artwork, Envelope, Episode, Movie, Paged, Person, SearchResult, Season, SeasonType, Series,
    SeriesEpisodes, SeriesEpisodesData,
};

/// Default base URL for TVDB API v4.
pub const DEFAULT_BASE_URL: &str = "https://api4.thetvdb.com/v4/";

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent.
const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// TVDB API client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TvdbClient {
    /// Authenticated request pipeline.
    pipeline: Pipeline,
}

/// Builder for `TvdbClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TvdbClientBuilder {
    base_url: Option<Url>,
    api_key: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    retry_policy: Option<RetryPolicy>,
}

impl TvdbClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            user_agent: None,
            timeout: None,
            retry_policy: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the User-Agent (default: `tvdb-api/<version>`).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the per-request timeout (default: 30s).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the transport retry policy (default: 3 retries, 1s..5s).
    #[must_use]
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Builds the client without contacting the server.
    ///
    /// The client holds no token until [`TvdbClient::login`] is called or the
    /// first request is answered with 401.
    ///
    /// # Errors
    ///
    /// - `api_key` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<TvdbClient> {
        let api_key = self.api_key.ok_or(TvdbError::MissingApiKey)?;

        let mut base_url = if let Some(url) = self.base_url {
            url
        } else {
            Url::parse(DEFAULT_BASE_URL).map_err(|source| TvdbError::InvalidPath {
                path: String::from(DEFAULT_BASE_URL),
                source,
            })?
        };
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| String::from(DEFAULT_USER_AGENT));

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .gzip(true)
            .build()
            .map_err(TvdbError::Build)?;

        let transport = Transport::new(http_client, self.retry_policy.unwrap_or_default());
        let credentials = CredentialStore::new(api_key, &base_url, transport.clone())?;

        Ok(TvdbClient {
            pipeline: Pipeline::new(transport, Arc::new(credentials), base_url),
        })
    }

    /// Builds the client and logs in.
    ///
    /// # Errors
    ///
    /// Returns the build error, or [`TvdbError::Auth`] if the login fails.
    pub async fn connect(self) -> Result<TvdbClient> {
        let client = self.build()?;
        client.login().await?;
        Ok(client)
    }
}

impl TvdbClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> TvdbClientBuilder {
        TvdbClientBuilder::new()
    }

    /// Shared credential store.
    #[must_use]
    pub const fn credentials(&self) -> &Arc<CredentialStore> {
        self.pipeline.credentials()
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        self.pipeline.base_url()
    }

    /// Logs in and stores the token.
    ///
    /// # Errors
    ///
    /// Returns [`TvdbError::Auth`] if the login fails.
    pub async fn login(&self) -> Result<()> {
        self.credentials().login().await.map_err(TvdbError::from)
    }

    /// Performs an authenticated request and returns the raw response.
    ///
    /// # Errors
    ///
    /// See [`Pipeline::execute`].
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Response> {
        self.pipeline.execute(method, path, body).await
    }

    /// GETs `path` and decodes the whole body into `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not 200, or the
    /// body does not match `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request_json(Method::GET, path, None).await
    }

    /// POSTs `body` as JSON to `path` and decodes the whole response into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`TvdbError::Encode`] if `body` cannot be serialized, otherwise
    /// the same errors as [`get_json`](Self::get_json).
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let bytes = serde_json::to_vec(body).map_err(|source| TvdbError::Encode {
            method: Method::POST,
            path: String::from(path),
            source,
        })?;
        self.request_json(Method::POST, path, Some(bytes)).await
    }

    /// GETs `path` and returns the `data` member of the envelope.
    ///
    /// # Errors
    ///
    /// Same as [`get_json`](Self::get_json).
    pub async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_json::<Envelope<T>>(path)
            .await
            .map(|envelope| envelope.data)
    }

    /// POSTs `body` to `path` and returns the `data` member of the envelope.
    ///
    /// # Errors
    ///
    /// Same as [`post_json`](Self::post_json).
    pub async fn post_data<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post_json::<B, Envelope<T>>(path, body)
            .await
            .map(|envelope| envelope.data)
    }

    /// GETs a list endpoint and returns its payload together with `links`.
    ///
    /// # Errors
    ///
    /// Same as [`get_json`](Self::get_json).
    pub async fn get_paged<T: DeserializeOwned>(&self, path: &str) -> Result<Paged<T>> {
        self.get_json(path).await
    }

    /// Sends the request through the pipeline, checks for HTTP 200 and
    /// decodes the body.
    #[instrument(skip_all)]
    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<T> {
        let response = self.pipeline.execute(method.clone(), path, body).await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(AuthError::Unauthorized {
                path: String::from(path),
            }
            .into());
        }
        if status != StatusCode::OK {
            return Err(TvdbError::UnexpectedStatus {
                method,
                path: String::from(path),
                code: status.as_u16(),
            });
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(source) => {
                return Err(TvdbError::Network {
                    method,
                    path: String::from(path),
                    source,
                });
            }
        };
        tracing::debug!(%method, path, body_len = body.len(), "Response body received");

        serde_json::from_slice(&body).map_err(|source| TvdbError::Decode {
            method,
            path: String::from(path),
            source,
        })
    }
}

impl LocalTvdbApi for TvdbClient {
    #[instrument(skip_all)]
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        let path = format!("search?query={encoded}");
        self.get_data(&path).await
    }

    #[instrument(skip_all)]
    async fn series(&self, id: u64) -> Result<Series> {
        self.get_data(&format!("series/{id}")).await
    }

    #[instrument(skip_all)]
    async fn series_episodes(
        &self,
        series_id: u64,
        season_type: SeasonType,
        page: u32,
    ) -> Result<SeriesEpisodes> {
        let path = format!("series/{series_id}/episodes/{season_type}?page={page}");
        self.get_paged::<SeriesEpisodesData>(&path)
            .await
            .map(SeriesEpisodes::from)
    }

    #[instrument(skip_all)]
    async fn episode(&self, id: u64) -> Result<Episode> {
        self.get_data(&format!("episodes/{id}")).await
    }

    #[instrument(skip_all)]
    async fn series_seasons(&self, series_id: u64) -> Result<Vec<Season>> {
        self.get_data(&format!("series/{series_id}/seasons")).await
    }

    #[instrument(skip_all)]
    async fn movie(&self, id: u64) -> Result<Movie> {
        self.get_data(&format!("movies/{id}")).await
    }

    #[instrument(skip_all)]
    async fn person(&self, id: u64) -> Result<Person> {
        self.get_data(&format!("people/{id}")).await
    }

    #[instrument(skip_all)]
    async fn artwork(&self, id: u64) -> Result<Artwork> {
        self.get_data(&format!("artwork/{id}")).await
    }
}
