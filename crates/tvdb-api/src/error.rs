//! Error types for the TVDB client.

use reqwest::Method;
use thiserror::Error;

/// Errors raised while talking to the TVDB API.
#[derive(Debug, Error)]
#[allow(clippy::module_name_repetitions)]
pub enum TvdbError {
    /// Transport failure before any response was obtained
    /// (retries exhausted for transient failures).
    #[error("{method} {path}: request failed: {source}")]
    Network {
        /// HTTP method of the failed request.
        method: Method,
        /// Request path relative to the base URL.
        path: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Login or refresh was rejected or malformed.
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// The token refresh triggered by a 401 failed; the request was not
    /// replayed.
    #[error("{method} {path}: token refresh failed: {source}")]
    Refresh {
        /// HTTP method of the rejected request.
        method: Method,
        /// Request path relative to the base URL.
        path: String,
        /// Login failure.
        #[source]
        source: AuthError,
    },

    /// A resource call returned something other than HTTP 200.
    #[error("{method} {path}: unexpected status code: {code}")]
    UnexpectedStatus {
        /// HTTP method of the request.
        method: Method,
        /// Request path relative to the base URL.
        path: String,
        /// HTTP status code returned by the server.
        code: u16,
    },

    /// The response body does not match the expected shape.
    #[error("{method} {path}: failed to decode response: {source}")]
    Decode {
        /// HTTP method of the request.
        method: Method,
        /// Request path relative to the base URL.
        path: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The request body could not be serialized.
    #[error("{method} {path}: failed to encode request body: {source}")]
    Encode {
        /// HTTP method of the request.
        method: Method,
        /// Request path relative to the base URL.
        path: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The path could not be joined onto the base URL.
    #[error("invalid request path: {path}")]
    InvalidPath {
        /// Offending path.
        path: String,
        /// Underlying URL error.
        #[source]
        source: url::ParseError,
    },

    /// No API key was supplied to the client builder.
    #[error("api_key is required")]
    MissingApiKey,

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

/// Authentication failures (login, refresh, persistent 401).
#[derive(Debug, Error)]
#[allow(clippy::module_name_repetitions)]
pub enum AuthError {
    /// The login request did not produce a response.
    #[error("error sending login request: {0}")]
    Network(#[source] reqwest::Error),

    /// The login endpoint answered with a non-200 status.
    #[error("login failed with status: {code}")]
    Status {
        /// HTTP status code returned by the login endpoint.
        code: u16,
    },

    /// The login response body could not be decoded.
    #[error("error decoding login response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The login response carried an empty token.
    #[error("no token received in login response")]
    EmptyToken,

    /// The server still rejected the request after one token refresh.
    #[error("{path}: still unauthorized after token refresh")]
    Unauthorized {
        /// Request path relative to the base URL.
        path: String,
    },
}

/// Convenience alias for `Result<T, TvdbError>`.
pub type Result<T> = std::result::Result<T, TvdbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_status_message_contains_context() {
        // Arrange
        let err = TvdbError::UnexpectedStatus {
            method: Method::GET,
            path: String::from("series/1"),
            code: 404,
        };

        // Act
        let msg = err.to_string();

        // Assert
        assert_eq!(msg, "GET series/1: unexpected status code: 404");
    }

    #[test]
    fn test_auth_error_converts_into_tvdb_error() {
        // Arrange & Act
        let err: TvdbError = AuthError::EmptyToken.into();

        // Assert
        assert!(matches!(err, TvdbError::Auth(AuthError::EmptyToken)));
        assert!(err.to_string().contains("no token received"));
    }
}
