//! Route definition for the aggregated dashboard payload.

use axum::routing::get;
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// ```text
/// GET /dashboard -> get_dashboard
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard::get_dashboard))
}
