use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Current annotation store version (0 until the first mutation).
    pub annotations_version: u64,
    /// Whether upstream credentials are configured.
    pub has_credentials: bool,
}

/// GET /health -- returns service status, store version, and whether
/// upstream credentials are configured.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        annotations_version: state.store.version(),
        has_credentials: state.blumira.credentials().status().has_credentials,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
