//! Route definitions for the local annotation store.
//!
//! The `bulk/` routes are registered before the `{finding_id}` routes so
//! the literal segment wins over the path parameter.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::annotations;
use crate::state::AppState;

/// Annotation routes mounted at `/annotations`.
///
/// ```text
/// GET    /                        -> list (full snapshot + version)
/// POST   /bulk/notes              -> bulk_add_note
/// POST   /bulk/assignee           -> bulk_set_assignee
/// POST   /bulk/status             -> bulk_set_status
/// GET    /{finding_id}            -> get_one
/// PUT    /{finding_id}            -> save (generic save, prunes degenerate)
/// DELETE /{finding_id}            -> delete
/// POST   /{finding_id}/notes      -> add_note
/// PUT    /{finding_id}/assignee   -> set_assignee
/// PUT    /{finding_id}/status     -> set_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(annotations::list))
        .route("/bulk/notes", post(annotations::bulk_add_note))
        .route("/bulk/assignee", post(annotations::bulk_set_assignee))
        .route("/bulk/status", post(annotations::bulk_set_status))
        .route(
            "/{finding_id}",
            get(annotations::get_one)
                .put(annotations::save)
                .delete(annotations::delete),
        )
        .route("/{finding_id}/notes", post(annotations::add_note))
        .route("/{finding_id}/assignee", put(annotations::set_assignee))
        .route("/{finding_id}/status", put(annotations::set_status))
}
