//! HTTP-specific error types for the MerchantOS API client.
//!
//! This module contains the error types raised by the
//! [`Connection`](crate::clients::Connection) while interpreting response
//! statuses.
//!
//! # Error Handling
//!
//! - [`EmptyResponseError`]: 204, or a 200 without the expected payload key.
//!   Enumeration uses it as its end-of-data signal.
//! - [`HttpResponseError`]: 404 and every other status of 400 and above
//! - [`MaxHttpRetriesExceededError`]: the server kept answering 503
//! - [`InvalidHttpRequestError`]: a request failed validation before sending
//! - [`HttpError`]: unified error type encompassing all of the above
//!
//! # Example
//!
//! ```rust,ignore
//! use merchantos_api::clients::HttpError;
//!
//! match connection.get("Item/12", &FilterSet::new(), None).await {
//!     Ok(item) => println!("{item}"),
//!     Err(HttpError::EmptyResponse(_)) => println!("nothing there"),
//!     Err(HttpError::Response(e)) if e.code == 404 => println!("no such item"),
//!     Err(e) => println!("request failed: {e}"),
//! }
//! ```

use thiserror::Error;

/// Error returned when a request receives a status of 400 or above.
///
/// Carries the status, reason phrase and URL for diagnostics, plus the raw
/// response body.
#[derive(Debug, Error)]
#[error("{code} {reason} @ {url}")]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// The canonical reason phrase for the status.
    pub reason: String,
    /// The full request URL.
    pub url: String,
    /// The raw response body.
    pub body: String,
}

/// Error returned when a response carries no payload.
#[derive(Debug, Error)]
#[error("empty response: {code} {reason} @ {url}")]
pub struct EmptyResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// The canonical reason phrase for the status.
    pub reason: String,
    /// The full request URL.
    pub url: String,
}

/// Error returned when the server is still rate limiting after every retry.
///
/// # Example
///
/// ```rust
/// use merchantos_api::clients::MaxHttpRetriesExceededError;
///
/// let error = MaxHttpRetriesExceededError {
///     code: 503,
///     tries: 4,
///     url: "https://api.merchantos.com/API/Account.json".to_string(),
/// };
///
/// assert!(error.to_string().contains("4"));
/// ```
#[derive(Debug, Error)]
#[error("Exceeded maximum retry count of {tries} with status {code} @ {url}")]
pub struct MaxHttpRetriesExceededError {
    /// The HTTP status code of the last response.
    pub code: u16,
    /// The number of tries that were attempted.
    pub tries: u32,
    /// The full request URL.
    pub url: String,
}

/// Error returned when an HTTP request fails validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A POST or PUT request was made without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },
}

/// Unified error type for all HTTP-related errors.
#[derive(Debug, Error)]
pub enum HttpError {
    /// A response with status 400 or above.
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// A response without the expected payload.
    #[error(transparent)]
    EmptyResponse(#[from] EmptyResponseError),

    /// Maximum retry attempts exhausted.
    #[error(transparent)]
    MaxRetries(#[from] MaxHttpRetriesExceededError),

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A success response whose body is not valid JSON.
    #[error("Invalid JSON from {url}: {source}")]
    Decode {
        /// The full request URL.
        url: String,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

impl HttpError {
    /// Returns `true` for the end-of-data condition.
    #[must_use]
    pub const fn is_empty_response(&self) -> bool {
        matches!(self, Self::EmptyResponse(_))
    }

    /// Returns `true` if the server answered 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Response(e) if e.code == 404)
    }

    /// Returns the HTTP status behind this error, if a response was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Response(e) => Some(e.code),
            Self::EmptyResponse(e) => Some(e.code),
            Self::MaxRetries(e) => Some(e.code),
            Self::InvalidRequest(_) | Self::Network(_) | Self::Decode { .. } => None,
        }
    }
}
