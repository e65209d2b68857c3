//! Route definitions for single-finding detail and upstream updates.

use axum::routing::get;
use axum::Router;

use crate::handlers::findings;
use crate::state::AppState;

/// Finding routes mounted at `/findings`.
///
/// ```text
/// GET   /{account_id}/{finding_id} -> get_finding (merged detail)
/// PATCH /{account_id}/{finding_id} -> update_finding (upstream write)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{account_id}/{finding_id}",
        get(findings::get_finding).patch(findings::update_finding),
    )
}
