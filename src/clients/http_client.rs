//! HTTP client for MerchantOS API communication.
//!
//! This module provides the [`HttpClient`] type, the transport adapter the
//! [`Connection`](crate::clients::Connection) sends its requests through.

use std::collections::HashMap;

use crate::auth::BasicCredentials;
use crate::clients::errors::HttpError;
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::ClientConfig;

/// Client version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Transport adapter for the point-of-sale API.
///
/// The client handles:
/// - Default headers (`Accept`, `Authorization`, `User-Agent`)
/// - `Content-Type: application/json` for requests with a body and for DELETE
/// - Turning a reqwest response into an [`HttpResponse`]
///
/// It sends exactly one request per call. Retrying and status interpretation
/// belong to the connection.
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`.
#[derive(Debug)]
pub struct HttpClient {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// Default headers to include in all requests.
    default_headers: HashMap<String, String>,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new HTTP client authenticated with the configured credentials.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created. This should
    /// only happen in extremely unusual circumstances (e.g., TLS initialization failure).
    ///
    /// # Example
    ///
    /// ```rust
    /// use merchantos_api::{ClientConfig, ApiHost, ApiToken, UserId};
    /// use merchantos_api::clients::HttpClient;
    ///
    /// let config = ClientConfig::builder()
    ///     .host(ApiHost::new("api.merchantos.com").unwrap())
    ///     .user_id(UserId::new("user").unwrap())
    ///     .api_token(ApiToken::new("token").unwrap())
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = HttpClient::new(&config);
    /// assert_eq!(
    ///     client.default_headers().get("Accept").map(String::as_str),
    ///     Some("application/json")
    /// );
    /// ```
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        let credentials = BasicCredentials::new(config.user_id(), config.api_token());

        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let user_agent = format!("{user_agent_prefix}MerchantOS API Library v{SDK_VERSION} | Rust");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());
        default_headers.insert("Authorization".to_string(), credentials.header_value());

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            default_headers,
        }
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Sends a single request and returns the raw response.
    ///
    /// Every status is returned as `Ok`; only validation and network
    /// failures are errors here.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidRequest`] if the request fails validation
    /// and [`HttpError::Network`] if the request cannot be sent or its body
    /// cannot be read.
    pub async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let mut req_builder = match request.http_method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
            HttpMethod::Put => self.client.put(&request.url),
            HttpMethod::Delete => self.client.delete(&request.url),
        };

        for (key, value) in &self.default_headers {
            req_builder = req_builder.header(key, value);
        }

        if request.body.is_some() || request.http_method == HttpMethod::Delete {
            req_builder = req_builder.header("Content-Type", "application/json");
        }
        if let Some(body) = &request.body {
            req_builder = req_builder.body(body.to_string());
        }

        let res = req_builder.send().await?;
        let code = res.status().as_u16();
        let body = res.text().await?;

        Ok(HttpResponse::new(code, body))
    }
}
