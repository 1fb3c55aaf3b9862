#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use std::sync::Arc;

use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use agrifleet_api::{ApiClient, Error, InMemoryTokenStore, Page, SessionState, TokenStore};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient, Arc<InMemoryTokenStore>) {
    let server = MockServer::start().await;
    let tokens = Arc::new(InMemoryTokenStore::with_token("test-token".to_owned().into()));
    let base_url = Url::parse(&server.uri()).unwrap();
    let store: Arc<dyn TokenStore> = tokens.clone();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url, store);
    (server, client, tokens)
}

#[derive(Debug, serde::Deserialize)]
struct Ping {
    timestamp: String,
}

// ── Request shape ───────────────────────────────────────────────────

#[tokio::test]
async fn get_attaches_bearer_token() {
    let (server, client, _tokens) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"timestamp": "2025-06-01T00:00:00Z"})),
        )
        .mount(&server)
        .await;

    let ping: Ping = client.get("api/ping").await.unwrap();
    assert_eq!(ping.timestamp, "2025-06-01T00:00:00Z");
}

#[tokio::test]
async fn get_without_token_succeeds() {
    let server = MockServer::start().await;
    let client = ApiClient::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        Arc::new(InMemoryTokenStore::new()),
    );

    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"timestamp": "2025-06-01T00:00:00Z"})),
        )
        .mount(&server)
        .await;

    let ping: Ping = client.get("api/ping").await.unwrap();
    assert_eq!(ping.timestamp, "2025-06-01T00:00:00Z");
}

#[tokio::test]
async fn get_with_params_builds_query_string() {
    let (server, client, _tokens) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/alerts"))
        .and(query_param("severity", "critical"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let alerts: Vec<serde_json::Value> = client
        .get_with_params("api/alerts", &[("severity", "critical".to_owned())])
        .await
        .unwrap();
    assert!(alerts.is_empty());
}

// ── Pagination ──────────────────────────────────────────────────────

#[tokio::test]
async fn get_paginated_parses_page_envelope() {
    let (server, client, _tokens) = setup().await;

    let envelope = json!({
        "data": [{"id": "m-1"}, {"id": "m-2"}],
        "total": 12,
        "page": 2,
        "limit": 2,
        "hasNext": true,
        "hasPrev": true
    });

    Mock::given(method("GET"))
        .and(path("/api/missions"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&envelope))
        .mount(&server)
        .await;

    let page: Page<serde_json::Value> = client
        .get_paginated("api/missions", &[("page", "2".to_owned())])
        .await
        .unwrap();

    assert_eq!(page.data.len(), 2);
    assert_eq!(page.total, 12);
    assert!(page.has_next);
    assert!(page.has_prev);
}

// ── Error normalization ─────────────────────────────────────────────

#[tokio::test]
async fn api_error_carries_server_message() {
    let (server, client, _tokens) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/robots/r-404"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "robot not found"})),
        )
        .mount(&server)
        .await;

    let result: Result<serde_json::Value, Error> = client.get("api/robots/r-404").await;

    match result {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "robot not found");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn api_error_falls_back_to_raw_body() {
    let (server, client, _tokens) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream gone"))
        .mount(&server)
        .await;

    let result: Result<serde_json::Value, Error> = client.get("api/status").await;

    match result {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "upstream gone");
            assert!(Error::Api { status, message }.is_transient());
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn deserialization_error_keeps_body() {
    let (server, client, _tokens) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/robots"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result: Result<Vec<serde_json::Value>, Error> = client.get("api/robots").await;

    match result {
        Err(Error::Deserialization { body, .. }) => assert_eq!(body, "not json"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

// ── 401 side effect ─────────────────────────────────────────────────

#[tokio::test]
async fn unauthorized_clears_token_and_expires_session() {
    let (server, client, tokens) = setup().await;
    let mut session = client.session_state();
    assert_eq!(*session.borrow(), SessionState::Active);

    Mock::given(method("GET"))
        .and(path("/api/robots"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result: Result<Vec<serde_json::Value>, Error> = client.get("api/robots").await;

    assert!(matches!(result, Err(Error::Unauthorized)));
    assert!(tokens.get().is_none(), "401 must clear the stored token");
    assert!(session.has_changed().unwrap());
    assert_eq!(*session.borrow_and_update(), SessionState::Expired);
}

#[tokio::test]
async fn reset_session_reactivates_after_expiry() {
    let (server, client, tokens) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/robots"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let _: Result<Vec<serde_json::Value>, Error> = client.get("api/robots").await;
    assert_eq!(*client.session_state().borrow(), SessionState::Expired);

    tokens.store("fresh-token".to_owned().into());
    client.reset_session();
    assert_eq!(*client.session_state().borrow(), SessionState::Active);
}

// ── Empty-body verbs ────────────────────────────────────────────────

#[tokio::test]
async fn delete_accepts_empty_response() {
    let (server, client, _tokens) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/robots/r-1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    client.delete("api/robots/r-1").await.unwrap();
}

#[tokio::test]
async fn post_empty_surfaces_validation_failure() {
    let (server, client, _tokens) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/missions/m-1/start"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"message": "no robot assigned"})),
        )
        .mount(&server)
        .await;

    let result = client
        .post_empty("api/missions/m-1/start", &json!({"robotId": "r-9"}))
        .await;

    match result {
        Err(Error::Api { status: 422, message }) => assert_eq!(message, "no robot assigned"),
        other => panic!("expected Api error, got: {other:?}"),
    }
}
