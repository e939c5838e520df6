//! HTTP layer for the MerchantOS API.
//!
//! This module provides the transport adapter and the account-scoped
//! connection the resource layer is built on.
//!
//! # Overview
//!
//! - [`HttpClient`]: Sends one authenticated request and returns the raw response
//! - [`HttpRequest`]: A request to be sent to the API
//! - [`HttpResponse`]: Status, reason phrase and body of a response
//! - [`HttpMethod`]: Supported HTTP methods (GET, POST, PUT, DELETE)
//! - [`Connection`]: Account bootstrap, URL resolution, rate-limit backoff and
//!   status interpretation
//! - [`HttpError`]: Errors raised by the connection
//!
//! # Retry Behavior
//!
//! The only status that is retried is **503**, which the server uses to signal
//! that the API call rate was exceeded. The connection waits `n * backoff`
//! before retry `n` and gives up after the configured number of retries
//! (3 by default) with [`HttpError::MaxRetries`].

mod connection;
mod errors;
mod http_client;
mod http_request;
mod http_response;

pub use connection::{Connection, CONTROL_PATHS};
pub use errors::{
    EmptyResponseError, HttpError, HttpResponseError, InvalidHttpRequestError,
    MaxHttpRetriesExceededError,
};
pub use http_client::{HttpClient, SDK_VERSION};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::HttpResponse;
