//! HTTP Basic credentials.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::config::{ApiToken, UserId};

/// Encoded Basic authentication credentials.
///
/// The `Debug` implementation masks the encoded value, since it can be
/// decoded back into the token.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    encoded: String,
}

impl BasicCredentials {
    /// Encodes `user:token` for Basic authentication.
    #[must_use]
    pub fn new(user_id: &UserId, token: &ApiToken) -> Self {
        let raw = format!("{}:{}", user_id.as_ref(), token.as_ref());
        Self {
            encoded: STANDARD.encode(raw),
        }
    }

    /// Returns the base64 credential without the scheme.
    #[must_use]
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// Returns the full `Authorization` header value.
    #[must_use]
    pub fn header_value(&self) -> String {
        format!("Basic {}", self.encoded)
    }
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BasicCredentials(*****)")
    }
}
