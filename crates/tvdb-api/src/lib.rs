//! API client library for the TVDB v4 API.
//!
//! Handles the API-key login, attaches the bearer token to every request,
//! refreshes the token once on a 401 and decodes the typed records.

/// Endpoint trait.
pub mod api;

/// Credential store and login exchange.
pub mod auth;

/// Client, builder and typed decode helpers.
pub mod client;

/// API timestamp format.
pub mod datetime;

/// Error types.
pub mod error;

/// Authenticated request pipeline.
pub mod pipeline;

/// Retrying HTTP transport.
pub mod transport;

/// Records, envelopes and endpoint parameters.
pub mod types;

pub use api::{LocalTvdbApi, TvdbApi};
pub use client::{TvdbClient, TvdbClientBuilder};
pub use error::{AuthError, Result, TvdbError};
pub use reqwest::Method;
pub use transport::RetryPolicy;
