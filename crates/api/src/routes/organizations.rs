//! Route definition for the organizations view payload.

use axum::routing::get;
use axum::Router;

use crate::handlers::organizations;
use crate::state::AppState;

/// ```text
/// GET /organizations -> get_organizations
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/organizations", get(organizations::get_organizations))
}
