//! Configuration types for the MerchantOS API client.
//!
//! This module provides the configuration used to open a
//! [`Connection`](crate::clients::Connection) to the point-of-sale API.
//!
//! # Overview
//!
//! - [`ClientConfig`]: The configuration struct holding all client settings
//! - [`ClientConfigBuilder`]: A builder for constructing [`ClientConfig`] instances
//! - [`ApiHost`]: A validated, normalized API host
//! - [`UserId`]: The account user the token was issued to
//! - [`ApiToken`]: A validated API token with masked debug output
//!
//! # Example
//!
//! ```rust
//! use merchantos_api::{ClientConfig, ApiHost, ApiToken, UserId};
//!
//! let config = ClientConfig::builder()
//!     .host(ApiHost::new("api.merchantos.com").unwrap())
//!     .user_id(UserId::new("joey@example.com").unwrap())
//!     .api_token(ApiToken::new("apikey").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.base_path(), "/API");
//! ```

mod newtypes;

pub use newtypes::{ApiHost, ApiToken, UserId};

use std::time::Duration;

use crate::error::ConfigError;

/// Base path of the API on the host.
pub const DEFAULT_BASE_PATH: &str = "/API";

/// Base delay between attempts when the server answers 503.
///
/// The delay grows linearly: the first retry waits one unit, the second
/// two units, and so on.
pub const DEFAULT_RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(20);

/// Number of additional attempts made after a 503.
pub const DEFAULT_MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Configuration for the MerchantOS API client.
///
/// # Thread Safety
///
/// `ClientConfig` is `Clone`, `Send`, and `Sync`.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    host: ApiHost,
    base_path: String,
    user_id: UserId,
    api_token: ApiToken,
    rate_limit_backoff: Duration,
    max_rate_limit_retries: u32,
    user_agent_prefix: Option<String>,
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Returns the API host.
    #[must_use]
    pub const fn host(&self) -> &ApiHost {
        &self.host
    }

    /// Returns the base path (e.g., `/API`).
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Returns the user id.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the API token.
    #[must_use]
    pub const fn api_token(&self) -> &ApiToken {
        &self.api_token
    }

    /// Returns the base backoff applied after a 503 response.
    #[must_use]
    pub const fn rate_limit_backoff(&self) -> Duration {
        self.rate_limit_backoff
    }

    /// Returns how many extra attempts follow a 503 response.
    #[must_use]
    pub const fn max_rate_limit_retries(&self) -> u32 {
        self.max_rate_limit_retries
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

/// Builder for constructing [`ClientConfig`] instances.
///
/// Required fields are `host`, `user_id` and `api_token`.
///
/// # Defaults
///
/// - `base_path`: `/API`
/// - `rate_limit_backoff`: 20 seconds
/// - `max_rate_limit_retries`: 3
/// - `user_agent_prefix`: `None`
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    host: Option<ApiHost>,
    base_path: Option<String>,
    user_id: Option<UserId>,
    api_token: Option<ApiToken>,
    rate_limit_backoff: Option<Duration>,
    max_rate_limit_retries: Option<u32>,
    user_agent_prefix: Option<String>,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API host (required).
    #[must_use]
    pub fn host(mut self, host: ApiHost) -> Self {
        self.host = Some(host);
        self
    }

    /// Sets the base path under which the API is mounted.
    #[must_use]
    pub fn base_path(mut self, path: impl Into<String>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Sets the user id (required).
    #[must_use]
    pub fn user_id(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Sets the API token (required).
    #[must_use]
    pub fn api_token(mut self, token: ApiToken) -> Self {
        self.api_token = Some(token);
        self
    }

    /// Sets the base backoff used after a 503 response.
    #[must_use]
    pub const fn rate_limit_backoff(mut self, backoff: Duration) -> Self {
        self.rate_limit_backoff = Some(backoff);
        self
    }

    /// Sets the number of extra attempts made after a 503 response.
    #[must_use]
    pub const fn max_rate_limit_retries(mut self, retries: u32) -> Self {
        self.max_rate_limit_retries = Some(retries);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`ClientConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `host`, `user_id` or
    /// `api_token` are not set, and [`ConfigError::InvalidBasePath`] if the
    /// base path does not start with `/`.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let host = self
            .host
            .ok_or(ConfigError::MissingRequiredField { field: "host" })?;
        let user_id = self
            .user_id
            .ok_or(ConfigError::MissingRequiredField { field: "user_id" })?;
        let api_token = self
            .api_token
            .ok_or(ConfigError::MissingRequiredField { field: "api_token" })?;

        let base_path = self
            .base_path
            .unwrap_or_else(|| DEFAULT_BASE_PATH.to_string());
        if !base_path.starts_with('/') {
            return Err(ConfigError::InvalidBasePath { path: base_path });
        }
        let base_path = base_path.trim_end_matches('/').to_string();

        Ok(ClientConfig {
            host,
            base_path,
            user_id,
            api_token,
            rate_limit_backoff: self
                .rate_limit_backoff
                .unwrap_or(DEFAULT_RATE_LIMIT_BACKOFF),
            max_rate_limit_retries: self
                .max_rate_limit_retries
                .unwrap_or(DEFAULT_MAX_RATE_LIMIT_RETRIES),
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}
