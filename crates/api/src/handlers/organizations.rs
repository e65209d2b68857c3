//! Handler for the organizations view: every account enriched with its
//! findings (merged with local annotations), devices, keys, and derived
//! stats, plus the cross-account totals.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use mspdash_core::finding::{
    AccountDetails, AccountStats, AgentDevice, AgentKey, DashboardTotals, MspAccount,
};
use mspdash_core::types::Timestamp;

use crate::error::AppResult;
use crate::handlers::findings::FindingRow;
use crate::state::AppState;

/// An enriched account with its findings joined against the annotation
/// store.
#[derive(Debug, Serialize)]
pub struct OrganizationRow {
    #[serde(flatten)]
    pub account: MspAccount,
    pub details: Option<AccountDetails>,
    pub findings: Vec<FindingRow>,
    pub agent_devices: Vec<AgentDevice>,
    pub agent_keys: Vec<AgentKey>,
    pub device_meta: Option<serde_json::Value>,
    pub stats: AccountStats,
}

#[derive(Debug, Serialize)]
pub struct OrganizationsResponse {
    pub organizations: Vec<OrganizationRow>,
    pub totals: DashboardTotals,
    pub annotations_version: u64,
    pub timestamp: Timestamp,
}

/// GET /organizations
///
/// The accounts list is a top-level fetch (failure fails the request);
/// per-account enrichment runs concurrently upstream and tolerates
/// individual sub-fetch failures, so one broken account degrades to empty
/// collections instead of blanking the whole view.
pub async fn get_organizations(
    State(state): State<AppState>,
) -> AppResult<Json<OrganizationsResponse>> {
    let snapshot = mspdash_blumira::enrich::organizations_snapshot(&state.blumira).await?;

    let annotations = state.store.all();
    let organizations: Vec<OrganizationRow> = snapshot
        .organizations
        .into_iter()
        .map(|org| {
            let findings = org
                .findings
                .into_iter()
                .map(|finding| {
                    let annotation = annotations.get(&finding.finding_id).cloned();
                    FindingRow::merge(finding, annotation)
                })
                .collect();
            OrganizationRow {
                account: org.account,
                details: org.details,
                findings,
                agent_devices: org.agent_devices,
                agent_keys: org.agent_keys,
                device_meta: org.device_meta,
                stats: org.stats,
            }
        })
        .collect();

    Ok(Json(OrganizationsResponse {
        organizations,
        totals: snapshot.totals,
        annotations_version: state.store.version(),
        timestamp: chrono::Utc::now(),
    }))
}
