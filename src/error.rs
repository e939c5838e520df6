//! Error types for the MerchantOS API client.
//!
//! This module contains the error type used when building a
//! [`ClientConfig`](crate::ClientConfig) and its validated newtypes.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Errors raised while talking to the server live in
//! [`clients::HttpError`](crate::clients::HttpError) and
//! [`rest::ResourceError`](crate::rest::ResourceError).
//!
//! # Example
//!
//! ```rust
//! use merchantos_api::{ApiToken, ConfigError};
//!
//! let result = ApiToken::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyApiToken)));
//! ```

use thiserror::Error;

/// Errors that can occur while configuring the client.
///
/// Each variant provides a clear, actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// API token cannot be empty.
    #[error("API token cannot be empty. Please provide a valid MerchantOS API key.")]
    EmptyApiToken,

    /// User identifier cannot be empty.
    #[error("User id cannot be empty. Please provide the account user the token belongs to.")]
    EmptyUserId,

    /// API host is invalid.
    #[error("Invalid API host '{host}'. Expected a host name (e.g., 'api.merchantos.com') or an http(s) URL.")]
    InvalidHost {
        /// The invalid host that was provided.
        host: String,
    },

    /// Base path is invalid.
    #[error("Invalid base path '{path}'. The base path must start with '/'.")]
    InvalidBasePath {
        /// The invalid path that was provided.
        path: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },
}
