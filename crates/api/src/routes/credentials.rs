//! Route definitions for the credentials settings flow.

use axum::routing::get;
use axum::Router;

use crate::handlers::credentials;
use crate::state::AppState;

/// Credentials routes mounted at `/credentials`.
///
/// ```text
/// GET  /credentials -> get_status
/// POST /credentials -> set_credentials
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/credentials",
        get(credentials::get_status).post(credentials::set_credentials),
    )
}
