//! Handler for the aggregated dashboard payload: accounts, the global
//! findings list (merged with local annotations), and the deduplicated
//! cross-account user list.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use mspdash_core::finding::{AccountUser, MspAccount};
use mspdash_core::types::Timestamp;

use crate::error::AppResult;
use crate::handlers::findings::FindingRow;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardMeta {
    pub accounts_count: usize,
    pub findings_count: usize,
    pub users_count: usize,
    pub annotations_version: u64,
    pub timestamp: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub accounts: Vec<MspAccount>,
    pub findings: Vec<FindingRow>,
    pub users: Vec<AccountUser>,
    pub meta: DashboardMeta,
}

/// GET /dashboard
///
/// Accounts and findings are top-level fetches: either failing fails the
/// request (with the upstream detail in the error body). The annotation
/// snapshot is read after the upstream data arrives, so rows reflect every
/// mutation committed before this request.
pub async fn get_dashboard(State(state): State<AppState>) -> AppResult<Json<DashboardResponse>> {
    let snapshot = mspdash_blumira::enrich::dashboard_snapshot(&state.blumira).await?;

    let mut annotations = state.store.all();
    let findings: Vec<FindingRow> = snapshot
        .findings
        .into_iter()
        .map(|finding| {
            let annotation = annotations.remove(&finding.finding_id);
            FindingRow::merge(finding, annotation)
        })
        .collect();

    let meta = DashboardMeta {
        accounts_count: snapshot.accounts.len(),
        findings_count: findings.len(),
        users_count: snapshot.users.len(),
        annotations_version: state.store.version(),
        timestamp: chrono::Utc::now(),
    };

    Ok(Json(DashboardResponse {
        accounts: snapshot.accounts,
        findings,
        users: snapshot.users,
        meta,
    }))
}
