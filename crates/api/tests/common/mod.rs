#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use mspdash_api::config::ServerConfig;
use mspdash_api::router::build_app_router;
use mspdash_api::state::AppState;
use mspdash_blumira::{BlumiraClient, BlumiraConfig, CredentialStore};
use mspdash_store::AnnotationStore;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config(annotations_path: std::path::PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        annotations_path,
    }
}

/// Upstream endpoints pointed at a port nothing listens on, so any test
/// that accidentally reaches upstream fails fast with a connection error
/// instead of touching the network.
pub fn unroutable_blumira_config() -> BlumiraConfig {
    BlumiraConfig {
        auth_url: "http://127.0.0.1:1/oauth/token".to_string(),
        api_base_url: "http://127.0.0.1:1".to_string(),
    }
}

/// Build the full application router with all middleware layers, backed by
/// an annotation store in a fresh temp directory.
///
/// This goes through `build_app_router` so integration tests exercise the
/// same middleware stack (CORS, request ID, timeout, tracing, panic
/// recovery) that production uses. The returned `TempDir` must be kept
/// alive for the duration of the test.
pub fn build_test_app() -> (Router, TempDir) {
    build_test_app_with_credentials(CredentialStore::default())
}

/// Like [`build_test_app`], but with a pre-populated credential store.
pub fn build_test_app_with_credentials(credentials: CredentialStore) -> (Router, TempDir) {
    let dir = TempDir::new().expect("create temp dir");
    let (app, _) = build_test_app_in(&dir, credentials);
    (app, dir)
}

/// Build a test app whose store document lives in the given directory,
/// returning the document path (for seeding or inspecting the snapshot).
pub fn build_test_app_in(
    dir: &TempDir,
    credentials: CredentialStore,
) -> (Router, std::path::PathBuf) {
    let path = dir.path().join("blumira-finding-annotations.json");
    let config = test_config(path.clone());

    let store = Arc::new(AnnotationStore::open(&path));
    let blumira = Arc::new(BlumiraClient::new(
        unroutable_blumira_config(),
        Arc::new(credentials),
    ));

    let state = AppState {
        store,
        blumira,
        config: Arc::new(config.clone()),
    };

    (build_app_router(state, &config), path)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Issue a GET request against the app.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Issue a DELETE request against the app.
pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Issue a request with a JSON body against the app.
pub async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, body).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be valid JSON")
}

/// Assert a response has the expected status and return its JSON body.
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}
