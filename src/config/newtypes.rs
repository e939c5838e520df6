//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The account user an API token was issued to.
///
/// # Example
///
/// ```rust
/// use merchantos_api::UserId;
///
/// let user = UserId::new("joey@example.com").unwrap();
/// assert_eq!(user.as_ref(), "joey@example.com");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserId(String);

impl UserId {
    /// Creates a new validated user id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyUserId`] if the id is empty.
    pub fn new(user: impl Into<String>) -> Result<Self, ConfigError> {
        let user = user.into();
        if user.trim().is_empty() {
            return Err(ConfigError::EmptyUserId);
        }
        Ok(Self(user))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated MerchantOS API token.
///
/// The `Debug` implementation masks the token, displaying only
/// `ApiToken(*****)`, so it never ends up in logs.
///
/// # Example
///
/// ```rust
/// use merchantos_api::ApiToken;
///
/// let token = ApiToken::new("apikey").unwrap();
/// assert_eq!(format!("{:?}", token), "ApiToken(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Creates a new validated API token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiToken`] if the token is empty.
    pub fn new(token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = token.into();
        if token.is_empty() {
            return Err(ConfigError::EmptyApiToken);
        }
        Ok(Self(token))
    }
}

impl AsRef<str> for ApiToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(*****)")
    }
}

/// The API host, normalized to an origin URL.
///
/// # Accepted Formats
///
/// - `api.merchantos.com` - normalized to `https://api.merchantos.com`
/// - `https://api.merchantos.com` or `http://127.0.0.1:8080` - used as-is
///
/// A trailing `/` is dropped so paths can be appended directly.
///
/// # Example
///
/// ```rust
/// use merchantos_api::ApiHost;
///
/// let host = ApiHost::new("api.merchantos.com").unwrap();
/// assert_eq!(host.as_ref(), "https://api.merchantos.com");
/// assert_eq!(host.scheme(), "https");
/// assert_eq!(host.host_name(), "api.merchantos.com");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiHost {
    origin: String,
    scheme_end: usize,
}

impl ApiHost {
    /// Creates a new validated API host.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHost`] if the host is empty, contains
    /// whitespace, or uses a scheme other than `http`/`https`.
    pub fn new(host: impl Into<String>) -> Result<Self, ConfigError> {
        let host = host.into();
        let trimmed = host.trim().trim_end_matches('/');

        let origin = match trimmed.find("://") {
            Some(i) => {
                let scheme = &trimmed[..i];
                if scheme != "http" && scheme != "https" {
                    return Err(ConfigError::InvalidHost { host });
                }
                trimmed.to_string()
            }
            None => format!("https://{trimmed}"),
        };

        let scheme_end = origin.find("://").unwrap_or_default();
        let name = &origin[scheme_end + 3..];
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidHost { host });
        }

        Ok(Self { origin, scheme_end })
    }

    /// Returns the URL scheme (`http` or `https`).
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.origin[..self.scheme_end]
    }

    /// Returns the host portion, including a port if one was given.
    #[must_use]
    pub fn host_name(&self) -> &str {
        &self.origin[self.scheme_end + 3..]
    }
}

impl AsRef<str> for ApiHost {
    fn as_ref(&self) -> &str {
        &self.origin
    }
}

impl Serialize for ApiHost {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.origin)
    }
}

impl<'de> Deserialize<'de> for ApiHost {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}
