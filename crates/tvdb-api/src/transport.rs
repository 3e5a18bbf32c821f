//! HTTP transport with bounded retry for transient failures.
//!
//! Retries here are independent of authentication: a 401 is returned to
//! the caller untouched and handled by the pipeline.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};

/// Default maximum number of retries after the first attempt.
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default wait before the first retry.
const DEFAULT_WAIT_MIN: Duration = Duration::from_secs(1);

/// Default ceiling for the wait between retries.
const DEFAULT_WAIT_MAX: Duration = Duration::from_secs(5);

/// Retry settings for [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    max_retries: u32,
    /// Wait before the first retry; doubled for every further retry.
    wait_min: Duration,
    /// Upper bound for any single wait.
    wait_max: Duration,
    /// Response statuses treated as transient.
    retryable_statuses: Vec<StatusCode>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_WAIT_MIN, DEFAULT_WAIT_MAX)
    }
}

impl RetryPolicy {
    /// Creates a policy retrying connection errors, 429 and 5xx (except 501).
    #[must_use]
    pub fn new(max_retries: u32, wait_min: Duration, wait_max: Duration) -> Self {
        Self {
            max_retries,
            wait_min,
            wait_max: wait_max.max(wait_min),
            retryable_statuses: vec![
                StatusCode::TOO_MANY_REQUESTS,
                StatusCode::INTERNAL_SERVER_ERROR,
                StatusCode::BAD_GATEWAY,
                StatusCode::SERVICE_UNAVAILABLE,
                StatusCode::GATEWAY_TIMEOUT,
            ],
        }
    }

    /// A policy that never retries.
    #[must_use]
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO, Duration::ZERO)
    }

    /// Replaces the set of statuses treated as transient.
    #[must_use]
    pub fn with_retryable_statuses(
        mut self,
        statuses: impl IntoIterator<Item = StatusCode>,
    ) -> Self {
        self.retryable_statuses = statuses.into_iter().collect();
        self
    }

    /// Maximum number of retries after the first attempt.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Whether a response with `status` should be retried.
    #[must_use]
    pub fn is_retryable_status(&self, status: StatusCode) -> bool {
        self.retryable_statuses.contains(&status)
    }

    /// Wait before retry number `retry` (0-based): `wait_min * 2^retry`,
    /// capped at `wait_max`.
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.checked_pow(retry).unwrap_or(u32::MAX);
        self.wait_min
            .checked_mul(factor)
            .map_or(self.wait_max, |wait| wait.min(self.wait_max))
    }
}

/// Returns true for transport errors worth another attempt.
fn is_transient(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout()
}

/// Reads a `Retry-After` header given in seconds.
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// HTTP sender applying a [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct Transport {
    /// Underlying HTTP client.
    http_client: Client,
    /// Retry settings.
    policy: RetryPolicy,
}

impl Transport {
    /// Wraps an HTTP client with the given retry policy.
    #[must_use]
    pub const fn new(http_client: Client, policy: RetryPolicy) -> Self {
        Self {
            http_client,
            policy,
        }
    }

    /// Underlying HTTP client, used to start request builders.
    #[must_use]
    pub const fn http_client(&self) -> &Client {
        &self.http_client
    }

    /// Active retry policy.
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Sends the request produced by `build_request`, rebuilding it for
    /// every retry.
    ///
    /// Connection errors, timeouts and retryable statuses are retried up to
    /// `max_retries` times. When retries are exhausted the last response is
    /// returned as-is, or the last transport error is returned.
    ///
    /// # Errors
    ///
    /// Returns the transport error of the final attempt.
    pub async fn send(
        &self,
        build_request: impl Fn() -> RequestBuilder,
    ) -> Result<Response, reqwest::Error> {
        let mut retry = 0u32;
        loop {
            match build_request().send().await {
                Ok(response) => {
                    let status = response.status();
                    if retry >= self.policy.max_retries || !self.policy.is_retryable_status(status)
                    {
                        return Ok(response);
                    }
                    let wait = retry_after(&response).map_or_else(
                        || self.policy.backoff(retry),
                        |d| d.min(self.policy.wait_max),
                    );
                    tracing::warn!(
                        retry = retry.saturating_add(1),
                        max_retries = self.policy.max_retries,
                        code = status.as_u16(),
                        wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                        "Transient response status, retrying"
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(e) => {
                    if retry >= self.policy.max_retries || !is_transient(&e) {
                        return Err(e);
                    }
                    let wait = self.policy.backoff(retry);
                    tracing::warn!(
                        retry = retry.saturating_add(1),
                        max_retries = self.policy.max_retries,
                        error = %e,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(wait).await;
                }
            }
            retry = retry.saturating_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(1), Duration::from_millis(5))
    }

    #[test]
    fn test_default_policy() {
        // Arrange & Act
        let policy = RetryPolicy::default();

        // Assert
        assert_eq!(policy.max_retries(), 3);
        assert_eq!(policy.backoff(0), Duration::from_secs(1));
        assert!(policy.is_retryable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!policy.is_retryable_status(StatusCode::NOT_IMPLEMENTED));
        assert!(!policy.is_retryable_status(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn test_backoff_grows_and_is_capped() {
        // Arrange
        let policy = RetryPolicy::default();

        // Act & Assert
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
        assert_eq!(policy.backoff(3), Duration::from_secs(5));
        assert_eq!(policy.backoff(40), Duration::from_secs(5));
    }

    #[test]
    fn test_custom_retryable_statuses() {
        // Arrange & Act
        let policy = RetryPolicy::default().with_retryable_statuses([StatusCode::CONFLICT]);

        // Assert
        assert!(policy.is_retryable_status(StatusCode::CONFLICT));
        assert!(!policy.is_retryable_status(StatusCode::SERVICE_UNAVAILABLE));
    }

    #[tokio::test]
    async fn test_retries_transient_status_then_succeeds() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(503))
            .up_to_n_times(1)
            .expect(1)
            .mount(&mock_server)
            .await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&mock_server)
            .await;
        let transport = Transport::new(Client::new(), fast_policy(3));
        let url = format!("{}/ping", mock_server.uri());

        // Act
        let response = transport
            .send(|| transport.http_client().get(&url))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_persistent_transient_status_is_returned_after_retries() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(502))
            .expect(3)
            .mount(&mock_server)
            .await;
        let transport = Transport::new(Client::new(), fast_policy(2));
        let url = format!("{}/ping", mock_server.uri());

        // Act
        let response = transport
            .send(|| transport.http_client().get(&url))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_unauthorized_is_not_retried() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(401))
            .expect(1)
            .mount(&mock_server)
            .await;
        let transport = Transport::new(Client::new(), fast_policy(3));
        let url = format!("{}/ping", mock_server.uri());

        // Act
        let response = transport
            .send(|| transport.http_client().get(&url))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_connection_error_surfaces_after_retries() {
        // Arrange: bind then drop a listener so the port refuses connections
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let transport = Transport::new(Client::new(), fast_policy(2));
        let url = format!("http://{addr}/ping");

        // Act
        let result = transport.send(|| transport.http_client().get(&url)).await;

        // Assert
        let err = result.unwrap_err();
        assert!(err.is_connect());
    }
}
