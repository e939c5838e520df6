//! HTTP response type for the MerchantOS API client.

/// A raw HTTP response: status, reason phrase and undecoded body.
///
/// Decoding is left to the [`Connection`](crate::clients::Connection), which
/// decides per status whether the body is a payload or diagnostics.
///
/// # Example
///
/// ```rust
/// use merchantos_api::clients::HttpResponse;
///
/// let response = HttpResponse::new(204, String::new());
/// assert_eq!(response.reason, "No Content");
/// assert!(response.is_empty());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// The canonical reason phrase for the status.
    pub reason: String,
    /// The response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Creates a response, filling in the canonical reason phrase.
    #[must_use]
    pub fn new(code: u16, body: String) -> Self {
        let reason = reqwest::StatusCode::from_u16(code)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("Unknown")
            .to_string();
        Self { code, reason, body }
    }

    /// Returns `true` for a 2xx status other than 204.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code < 300 && self.code != 204
    }

    /// Returns `true` for 204 No Content.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.code == 204
    }

    /// Returns `true` for 503, the server's rate-limit signal.
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        self.code == 503
    }
}
