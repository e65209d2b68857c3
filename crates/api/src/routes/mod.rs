pub mod annotations;
pub mod credentials;
pub mod dashboard;
pub mod findings;
pub mod health;
pub mod organizations;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /credentials                                GET status, POST validate + set
///
/// /dashboard                                  GET accounts + merged findings + users
///
/// /organizations                              GET enriched accounts + totals
///
/// /findings/{account_id}/{finding_id}         GET merged detail, PATCH upstream update
///
/// /annotations                                GET full snapshot + version
/// /annotations/bulk/notes                     POST bulk note
/// /annotations/bulk/assignee                  POST bulk assignee
/// /annotations/bulk/status                    POST bulk status
/// /annotations/{finding_id}                   GET, PUT (generic save), DELETE
/// /annotations/{finding_id}/notes             POST append note
/// /annotations/{finding_id}/assignee          PUT replace assignee
/// /annotations/{finding_id}/status            PUT replace local status
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(credentials::router())
        .merge(dashboard::router())
        .merge(organizations::router())
        .nest("/findings", findings::router())
        .nest("/annotations", annotations::router())
}
