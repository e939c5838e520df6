//! Integration tests for the account-scoped connection.
//!
//! These tests run the connection against a simulated server and verify the
//! account bootstrap, URL resolution, the shared status policy and the 503
//! backoff loop.

use std::collections::BTreeMap;
use std::time::Duration;

use merchantos_api::clients::Connection;
use merchantos_api::{ApiClient, ApiHost, ApiToken, ClientConfig, HttpError, UserId};
use serde_json::{json, Map};
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a config pointing at the mock server, with millisecond backoff.
fn create_test_config(server: &MockServer, retries: u32) -> ClientConfig {
    ClientConfig::builder()
        .host(ApiHost::new(server.uri()).unwrap())
        .user_id(UserId::new("user").unwrap())
        .api_token(ApiToken::new("token").unwrap())
        .rate_limit_backoff(Duration::from_millis(5))
        .max_rate_limit_retries(retries)
        .build()
        .unwrap()
}

// ============================================================================
// Bootstrap
// ============================================================================

#[tokio::test]
async fn test_initialize_resolves_account_root() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/API/Account.json"))
        .and(header("Authorization", "Basic dXNlcjp0b2tlbg=="))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@attributes": {"count": "1"},
            "Account": {"accountID": "1234", "name": "Corner Shop"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let connection = assert_ok!(Connection::initialize(&create_test_config(&server, 3)).await);

    assert_eq!(connection.account_id(), "1234");
    assert_eq!(connection.resource_base_path(), "/API/Account/1234");
    assert_eq!(
        connection.url_for("Item", &BTreeMap::new()),
        format!("{}/API/Account/1234/Item.json", server.uri())
    );
}

#[tokio::test]
async fn test_client_connect_bootstraps_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/API/Account.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Account": [{"accountID": 77}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = assert_ok!(ApiClient::connect(&create_test_config(&server, 3)).await);
    let other = client.clone();

    assert_eq!(client.account_id(), "77");
    assert_eq!(other.account_id(), "77");
}

#[tokio::test]
async fn test_initialize_without_account_id_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/API/Account.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Account": {}})))
        .mount(&server)
        .await;

    let error = assert_err!(Connection::initialize(&create_test_config(&server, 3)).await);
    assert!(error.is_empty_response());
}

#[tokio::test]
async fn test_initialize_with_rejected_credentials_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/API/Account.json"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let error = assert_err!(Connection::initialize(&create_test_config(&server, 3)).await);
    assert_eq!(error.status(), Some(401));
    assert!(matches!(error, HttpError::Response(ref e) if e.body == "Unauthorized"));
}

// ============================================================================
// Verbs and status policy
// ============================================================================

#[tokio::test]
async fn test_get_encodes_query_and_extracts_result_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/API/Account/1/Item.json"))
        .and(query_param("timeStamp", ">=,2013-08-27T00:00:00+00:00"))
        .and(query_param("load_relations", "all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Item": {"itemID": "5"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let connection = Connection::with_account_id(&create_test_config(&server, 3), "1");
    let query = BTreeMap::from([
        ("timeStamp".to_string(), ">=,2013-08-27T00:00:00+00:00".to_string()),
        ("load_relations".to_string(), "all".to_string()),
    ]);

    let payload = assert_ok!(connection.get("Item", &query, None).await);
    assert_eq!(payload, json!({"itemID": "5"}));
}

#[tokio::test]
async fn test_get_with_missing_result_key_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/API/Account/1/Item.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@attributes": {"count": "0"}
        })))
        .mount(&server)
        .await;

    let connection = Connection::with_account_id(&create_test_config(&server, 3), "1");
    let error = assert_err!(connection.get("Item", &BTreeMap::new(), Some("Item")).await);
    assert!(error.is_empty_response());
}

#[tokio::test]
async fn test_no_content_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/API/Account/1/Item.json"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let connection = Connection::with_account_id(&create_test_config(&server, 3), "1");
    let error = assert_err!(connection.get("Item", &BTreeMap::new(), None).await);
    assert!(matches!(error, HttpError::EmptyResponse(ref e) if e.code == 204));
}

#[tokio::test]
async fn test_ok_with_empty_body_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/API/Account/1/Item.json"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let connection = Connection::with_account_id(&create_test_config(&server, 3), "1");
    let error = assert_err!(connection.get("Item", &BTreeMap::new(), None).await);
    assert!(matches!(error, HttpError::EmptyResponse(ref e) if e.code == 200));
}

#[tokio::test]
async fn test_update_answered_with_no_content_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/API/Account/1/Item/5.json"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let connection = Connection::with_account_id(&create_test_config(&server, 3), "1");
    let mut updates = Map::new();
    updates.insert("description".to_string(), json!("new"));

    let error = assert_err!(connection.update("Item/5", &updates).await);
    assert!(matches!(error, HttpError::EmptyResponse(ref e) if e.code == 204));
}

#[tokio::test]
async fn test_redirect_status_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/API/Account/1/Item.json"))
        .respond_with(ResponseTemplate::new(304))
        .mount(&server)
        .await;

    let connection = Connection::with_account_id(&create_test_config(&server, 3), "1");
    let error = assert_err!(connection.get("Item", &BTreeMap::new(), None).await);
    assert!(matches!(error, HttpError::Response(ref e) if e.code == 304));
}

#[tokio::test]
async fn test_not_found_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/API/Account/1/Item/999.json"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "httpCode": "404",
            "message": "Item not found."
        })))
        .mount(&server)
        .await;

    let connection = Connection::with_account_id(&create_test_config(&server, 3), "1");
    let error = assert_err!(connection.get("Item/999", &BTreeMap::new(), Some("Item")).await);
    assert!(error.is_not_found());
    assert!(error.to_string().starts_with("404 Not Found @ "));
}

#[tokio::test]
async fn test_update_sends_json_and_returns_whole_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/API/Account/1/Item/5.json"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({"description": "new"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Item": {"itemID": "5", "description": "new"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let connection = Connection::with_account_id(&create_test_config(&server, 3), "1");
    let mut updates = Map::new();
    updates.insert("description".to_string(), json!("new"));

    let body = assert_ok!(connection.update("Item/5", &updates).await);
    assert_eq!(body["Item"]["description"], "new");
}

#[tokio::test]
async fn test_control_path_is_anchored_at_api_root() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/API/Control.json"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let connection = Connection::with_account_id(&create_test_config(&server, 3), "1");
    let body = assert_ok!(connection.delete("Control").await);
    assert_eq!(body, json!({"ok": true}));
}

// ============================================================================
// Rate-limit backoff
// ============================================================================

#[tokio::test]
async fn test_single_503_is_retried_transparently() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/API/Account/1/Shop.json"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/API/Account/1/Shop.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Shop": {"shopID": "1", "name": "Main"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let connection = Connection::with_account_id(&create_test_config(&server, 3), "1");
    let shop = assert_ok!(connection.get("Shop", &BTreeMap::new(), None).await);
    assert_eq!(shop["name"], "Main");
}

#[tokio::test]
async fn test_exhausted_503_reports_max_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/API/Account/1/Shop.json"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let connection = Connection::with_account_id(&create_test_config(&server, 2), "1");
    let error = assert_err!(connection.get("Shop", &BTreeMap::new(), None).await);

    match error {
        HttpError::MaxRetries(e) => {
            assert_eq!(e.code, 503);
            assert_eq!(e.tries, 3);
            assert!(e.url.ends_with("/API/Account/1/Shop.json"));
        }
        other => panic!("Expected MaxRetries, got {other:?}"),
    }
}
