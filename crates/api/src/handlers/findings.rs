//! Handlers for single-finding detail and upstream finding updates, plus
//! the merged row shape shared by every view that renders findings.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use mspdash_core::annotation::FindingAnnotation;
use mspdash_core::finding::{Finding, FindingUpdate};
use mspdash_core::merge::{closed_locally, display_assignee};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// One finding as rendered by the views: the upstream record joined with
/// its local annotation.
///
/// `display_assignee` and `closed_locally` are resolved server-side so
/// every view paints from the same merge implementation; the raw
/// `annotation` is included for the detail dialog's note log.
#[derive(Debug, Serialize)]
pub struct FindingRow {
    #[serde(flatten)]
    pub finding: Finding,
    pub annotation: Option<FindingAnnotation>,
    pub display_assignee: String,
    pub closed_locally: bool,
}

impl FindingRow {
    pub fn merge(finding: Finding, annotation: Option<FindingAnnotation>) -> Self {
        let display_assignee = display_assignee(annotation.as_ref(), &finding);
        let closed_locally = closed_locally(annotation.as_ref());
        Self {
            finding,
            annotation,
            display_assignee,
            closed_locally,
        }
    }
}

/// GET /findings/{account_id}/{finding_id} -- merged finding detail.
///
/// The annotation is re-read from the store on every request, so the
/// detail view never renders a merge older than the latest mutation.
pub async fn get_finding(
    State(state): State<AppState>,
    Path((account_id, finding_id)): Path<(String, String)>,
) -> AppResult<Json<DataResponse<FindingRow>>> {
    let finding = state
        .blumira
        .finding_detail(&account_id, &finding_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Finding {finding_id} not found")))?;

    let annotation = state.store.get(&finding_id);
    Ok(Json(DataResponse {
        data: FindingRow::merge(finding, annotation),
    }))
}

/// PATCH /findings/{account_id}/{finding_id} -- update the finding
/// upstream (status, priority, assignee, resolution, upstream notes).
///
/// This is the only write that leaves the machine; local annotations never
/// do.
pub async fn update_finding(
    State(state): State<AppState>,
    Path((account_id, finding_id)): Path<(String, String)>,
    Json(update): Json<FindingUpdate>,
) -> AppResult<Json<DataResponse<Finding>>> {
    let finding = state
        .blumira
        .update_finding(&account_id, &finding_id, &update)
        .await?;
    Ok(Json(DataResponse { data: finding }))
}
