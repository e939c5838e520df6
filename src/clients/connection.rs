//! Account-scoped connection to the point-of-sale API.
//!
//! This module provides the [`Connection`] type, which owns the transport and
//! the resolved account root, and implements GET/PUT/POST/DELETE against
//! resource paths with one shared retry loop and one shared status policy.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::clients::errors::{
    EmptyResponseError, HttpError, HttpResponseError, MaxHttpRetriesExceededError,
};
use crate::clients::http_client::HttpClient;
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::ClientConfig;

/// Paths anchored at the API root instead of the account root.
pub const CONTROL_PATHS: [&str; 2] = ["Account", "Control"];

/// Connection to one MerchantOS account.
///
/// The account id is fetched once, in [`Connection::initialize`], and every
/// resource path is resolved under `{base_path}/Account/{account_id}`.
///
/// # Status Handling
///
/// | Status            | Outcome                                          |
/// |-------------------|--------------------------------------------------|
/// | 2xx (except 204)  | body decoded as JSON                             |
/// | 204               | [`HttpError::EmptyResponse`]                     |
/// | 503               | retried with a linearly growing delay            |
/// | 503 (exhausted)   | [`HttpError::MaxRetries`]                        |
/// | 404, other >= 400 | [`HttpError::Response`]                          |
///
/// # Example
///
/// ```rust,ignore
/// use merchantos_api::clients::Connection;
///
/// let connection = Connection::initialize(&config).await?;
/// let item = connection.get("Item/12", &Default::default(), Some("Item")).await?;
/// ```
#[derive(Debug)]
pub struct Connection {
    http_client: HttpClient,
    /// Scheme and host, e.g. `https://api.merchantos.com`.
    origin: String,
    /// API root, e.g. `/API`.
    base_path: String,
    account_id: String,
    /// Account root, e.g. `/API/Account/1234`.
    resource_base_path: String,
    rate_limit_backoff: Duration,
    max_rate_limit_retries: u32,
}

// Verify Connection is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Connection>();
};

impl Connection {
    /// Opens a connection and resolves the account id.
    ///
    /// Issues one GET against the `Account` endpoint; every later URL
    /// depends on its `accountID`.
    ///
    /// # Errors
    ///
    /// Returns the [`HttpError`] of the bootstrap call, or
    /// [`HttpError::EmptyResponse`] if the account payload has no `accountID`.
    pub async fn initialize(config: &ClientConfig) -> Result<Self, HttpError> {
        let mut connection = Self::unresolved(config);
        tracing::info!(
            "API Host: {}{}",
            connection.origin,
            connection.base_path
        );

        let url = connection.url_for("Account", &BTreeMap::new());
        let account = connection.get("Account", &BTreeMap::new(), None).await?;
        let account = match account {
            Value::Array(mut accounts) if !accounts.is_empty() => accounts.swap_remove(0),
            other => other,
        };
        let account_id = match account.get("accountID") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => {
                return Err(HttpError::EmptyResponse(EmptyResponseError {
                    code: 200,
                    reason: "OK".to_string(),
                    url,
                }))
            }
        };

        connection.set_account(&account_id);
        tracing::info!("Resource Base URL {}", connection.resource_base_path);
        Ok(connection)
    }

    /// Creates a connection for an account whose id is already known.
    ///
    /// No bootstrap request is made.
    #[must_use]
    pub fn with_account_id(config: &ClientConfig, account_id: impl AsRef<str>) -> Self {
        let mut connection = Self::unresolved(config);
        connection.set_account(account_id.as_ref());
        connection
    }

    fn unresolved(config: &ClientConfig) -> Self {
        let base_path = config.base_path().to_string();
        Self {
            http_client: HttpClient::new(config),
            origin: config.host().as_ref().to_string(),
            resource_base_path: format!("{base_path}/Account"),
            base_path,
            account_id: String::new(),
            rate_limit_backoff: config.rate_limit_backoff(),
            max_rate_limit_retries: config.max_rate_limit_retries(),
        }
    }

    fn set_account(&mut self, account_id: &str) {
        self.account_id = account_id.to_string();
        self.resource_base_path = format!("{}/Account/{}", self.base_path, account_id);
    }

    /// Returns the resolved account id.
    #[must_use]
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Returns the account root path, e.g. `/API/Account/1234`.
    #[must_use]
    pub fn resource_base_path(&self) -> &str {
        &self.resource_base_path
    }

    /// Builds the absolute URL for a resource path.
    ///
    /// `Account` and `Control` are anchored at the API root; every other path
    /// lives under the account root.
    #[must_use]
    pub fn url_for(&self, path: &str, query: &BTreeMap<String, String>) -> String {
        let root = if CONTROL_PATHS.contains(&path) {
            &self.base_path
        } else {
            &self.resource_base_path
        };
        format!(
            "{}{}/{}.json{}",
            self.origin,
            root,
            path,
            encode_query(query)
        )
    }

    /// GETs a resource path and returns the payload under the result key.
    ///
    /// The result key is `result_key` when given, otherwise `path` itself.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::EmptyResponse`] on 204 or when the key is missing,
    /// and the shared status errors otherwise.
    pub async fn get(
        &self,
        path: &str,
        query: &BTreeMap<String, String>,
        result_key: Option<&str>,
    ) -> Result<Value, HttpError> {
        let url = self.url_for(path, query);
        let response = self.send_with_backoff(HttpMethod::Get, &url, None).await?;
        let payload = Self::interpret(&response, &url)?;
        Self::extract(payload, result_key.unwrap_or(path), &response, url)
    }

    /// PUTs `updates` to a resource path and returns the whole decoded body.
    ///
    /// # Errors
    ///
    /// Returns the shared status errors.
    pub async fn update(
        &self,
        path: &str,
        updates: &Map<String, Value>,
    ) -> Result<Value, HttpError> {
        let url = self.url_for(path, &BTreeMap::new());
        tracing::debug!("Data: {}", serde_json::Value::Object(updates.clone()));
        let response = self
            .send_with_backoff(HttpMethod::Put, &url, Some(Value::Object(updates.clone())))
            .await?;
        Self::interpret(&response, &url)
    }

    /// POSTs `properties` to a collection path and returns the payload under
    /// the result key, exactly as [`get`](Self::get) does.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::EmptyResponse`] when the key is missing, and the
    /// shared status errors otherwise.
    pub async fn create(
        &self,
        path: &str,
        properties: &Map<String, Value>,
        result_key: Option<&str>,
    ) -> Result<Value, HttpError> {
        let url = self.url_for(path, &BTreeMap::new());
        tracing::debug!("Creating {}", serde_json::Value::Object(properties.clone()));
        let response = self
            .send_with_backoff(
                HttpMethod::Post,
                &url,
                Some(Value::Object(properties.clone())),
            )
            .await?;
        let payload = Self::interpret(&response, &url)?;
        Self::extract(payload, result_key.unwrap_or(path), &response, url)
    }

    /// DELETEs a resource path and returns the whole decoded body.
    ///
    /// # Errors
    ///
    /// Returns the shared status errors.
    pub async fn delete(&self, path: &str) -> Result<Value, HttpError> {
        let url = self.url_for(path, &BTreeMap::new());
        let response = self.send_with_backoff(HttpMethod::Delete, &url, None).await?;
        Self::interpret(&response, &url)
    }

    /// Sends a request, retrying while the server answers 503.
    ///
    /// Attempt `n` of the retries waits `n * rate_limit_backoff` first.
    async fn send_with_backoff(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<Value>,
    ) -> Result<HttpResponse, HttpError> {
        let mut builder = HttpRequest::builder(method, url);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        let request = builder.build()?;

        let mut retries: u32 = 0;
        loop {
            tracing::debug!("{} {}", method, url);
            let response = self.http_client.send(&request).await?;
            tracing::debug!("{} {} status {}", method, url, response.code);

            if !response.is_rate_limited() {
                return Ok(response);
            }

            if retries >= self.max_rate_limit_retries {
                return Err(HttpError::MaxRetries(MaxHttpRetriesExceededError {
                    code: response.code,
                    tries: retries + 1,
                    url: url.to_string(),
                }));
            }

            retries += 1;
            let delay = self.rate_limit_backoff * retries;
            tracing::warn!(
                "Max API call rate exceeded - waiting {:?} [try {}]",
                delay,
                retries
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Applies the status policy shared by every verb.
    fn interpret(response: &HttpResponse, url: &str) -> Result<Value, HttpError> {
        if response.is_ok() {
            if response.body.trim().is_empty() {
                return Err(Self::empty(response, url));
            }
            return serde_json::from_str(&response.body).map_err(|source| HttpError::Decode {
                url: url.to_string(),
                source,
            });
        }

        if response.is_empty() {
            return Err(Self::empty(response, url));
        }

        if response.code == 404 {
            tracing::debug!("{} returned 404 status", url);
        } else {
            match serde_json::from_str::<Value>(&response.body) {
                Ok(diagnostics) => tracing::debug!("OUTPUT {}", diagnostics),
                Err(_) => tracing::debug!("OUTPUT {}", response.body),
            }
        }

        Err(HttpError::Response(HttpResponseError {
            code: response.code,
            reason: response.reason.clone(),
            url: url.to_string(),
            body: response.body.clone(),
        }))
    }

    /// Pulls the payload out of the response envelope.
    fn extract(
        mut payload: Value,
        key: &str,
        response: &HttpResponse,
        url: String,
    ) -> Result<Value, HttpError> {
        payload
            .as_object_mut()
            .and_then(|envelope| envelope.remove(key))
            .ok_or_else(|| Self::empty(response, &url))
    }

    fn empty(response: &HttpResponse, url: &str) -> HttpError {
        HttpError::EmptyResponse(EmptyResponseError {
            code: response.code,
            reason: response.reason.clone(),
            url: url.to_string(),
        })
    }
}

/// Form-encodes a query map, including the leading `?` when non-empty.
fn encode_query(query: &BTreeMap<String, String>) -> String {
    if query.is_empty() {
        return String::new();
    }
    let pairs: Vec<String> = query
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect();
    format!("?{}", pairs.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiHost, ApiToken, UserId};

    fn connection() -> Connection {
        let config = ClientConfig::builder()
            .host(ApiHost::new("api.merchantos.com").unwrap())
            .user_id(UserId::new("user").unwrap())
            .api_token(ApiToken::new("token").unwrap())
            .build()
            .unwrap();
        Connection::with_account_id(&config, "1234")
    }

    #[test]
    fn test_resource_paths_live_under_account_root() {
        let url = connection().url_for("Item", &BTreeMap::new());
        assert_eq!(url, "https://api.merchantos.com/API/Account/1234/Item.json");
    }

    #[test]
    fn test_control_paths_live_under_api_root() {
        let connection = connection();
        assert_eq!(
            connection.url_for("Account", &BTreeMap::new()),
            "https://api.merchantos.com/API/Account.json"
        );
        assert_eq!(
            connection.url_for("Control", &BTreeMap::new()),
            "https://api.merchantos.com/API/Control.json"
        );
    }

    #[test]
    fn test_query_is_form_encoded_in_key_order() {
        let mut query = BTreeMap::new();
        query.insert("timeStamp".to_string(), ">=,2013-08-27T00:00:00+00:00".to_string());
        query.insert("limit".to_string(), "100".to_string());

        let url = connection().url_for("Sale", &query);
        assert_eq!(
            url,
            "https://api.merchantos.com/API/Account/1234/Sale.json?limit=100&timeStamp=%3E%3D%2C2013-08-27T00%3A00%3A00%2B00%3A00"
        );
    }

    #[test]
    fn test_interpret_maps_statuses() {
        let ok = HttpResponse::new(200, r#"{"Item": {"itemID": "1"}}"#.to_string());
        assert!(Connection::interpret(&ok, "u").is_ok());

        let empty = HttpResponse::new(204, String::new());
        assert!(Connection::interpret(&empty, "u").unwrap_err().is_empty_response());

        let missing = HttpResponse::new(404, String::new());
        assert!(Connection::interpret(&missing, "u").unwrap_err().is_not_found());

        let bad = HttpResponse::new(400, r#"{"message": "bad filter"}"#.to_string());
        let error = Connection::interpret(&bad, "u").unwrap_err();
        assert_eq!(error.status(), Some(400));

        let created = HttpResponse::new(201, r#"{"Item": {"itemID": "2"}}"#.to_string());
        assert!(Connection::interpret(&created, "u").is_ok());

        let blank = HttpResponse::new(200, "  ".to_string());
        assert!(Connection::interpret(&blank, "u").unwrap_err().is_empty_response());

        let redirect = HttpResponse::new(302, String::new());
        let error = Connection::interpret(&redirect, "u").unwrap_err();
        assert!(matches!(error, HttpError::Response(ref e) if e.code == 302));
    }

    #[test]
    fn test_interpret_rejects_invalid_json() {
        let garbage = HttpResponse::new(200, "<html>".to_string());
        assert!(matches!(
            Connection::interpret(&garbage, "u"),
            Err(HttpError::Decode { .. })
        ));
    }

    #[test]
    fn test_extract_missing_key_is_empty_response() {
        let response = HttpResponse::new(200, String::new());
        let error = Connection::extract(
            serde_json::json!({"@attributes": {"count": "0"}}),
            "Item",
            &response,
            "u".to_string(),
        )
        .unwrap_err();
        assert!(error.is_empty_response());
    }
}
