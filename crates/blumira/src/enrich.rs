//! Aggregation layer: composes per-account API calls into the shapes the
//! dashboard views render.
//!
//! Fan-out calls for a single account run concurrently, and an individual
//! sub-fetch failing degrades that collection to empty for that account
//! only (logged at warn level) — the overall aggregation still succeeds
//! with partial data. Top-level calls (accounts list, all-findings list)
//! propagate failure to the caller.

use futures::future::join_all;
use serde::Serialize;

use mspdash_core::finding::{
    compute_stats, AccountUser, DashboardTotals, EnrichedAccount, Finding, MspAccount,
};

use crate::client::BlumiraClient;
use crate::error::BlumiraError;

/// Everything the overview/findings views need in one fetch.
#[derive(Debug, Serialize)]
pub struct DashboardSnapshot {
    pub accounts: Vec<MspAccount>,
    pub findings: Vec<Finding>,
    pub users: Vec<AccountUser>,
}

/// Everything the organizations view needs in one fetch.
#[derive(Debug, Serialize)]
pub struct OrganizationsSnapshot {
    pub organizations: Vec<EnrichedAccount>,
    pub totals: DashboardTotals,
}

/// Fan out to one account's detail, findings, devices, and keys, and
/// compose the enriched shape. Sub-fetch failures degrade to empty.
pub async fn enrich_account(client: &BlumiraClient, account: MspAccount) -> EnrichedAccount {
    let account_id = account.account_id.clone();
    let (details, findings, devices, keys) = tokio::join!(
        client.account_detail(&account_id),
        client.account_findings(&account_id),
        client.account_devices(&account_id),
        client.account_keys(&account_id),
    );

    let details = details
        .map_err(|err| {
            tracing::warn!(account_id = %account_id, error = %err, "Failed to fetch account detail");
        })
        .ok();
    let findings = findings.unwrap_or_else(|err| {
        tracing::warn!(account_id = %account_id, error = %err, "Failed to fetch account findings");
        Vec::new()
    });
    let device_page = devices
        .map_err(|err| {
            tracing::warn!(account_id = %account_id, error = %err, "Failed to fetch agent devices");
        })
        .ok();
    let keys = keys.unwrap_or_else(|err| {
        tracing::warn!(account_id = %account_id, error = %err, "Failed to fetch agent keys");
        Vec::new()
    });

    let (devices, device_meta) = match device_page {
        Some(page) => (page.devices, page.meta),
        None => (Vec::new(), None),
    };

    let stats = compute_stats(&findings, &devices, &keys);

    EnrichedAccount {
        account,
        details,
        findings,
        agent_devices: devices,
        agent_keys: keys,
        device_meta,
        stats,
    }
}

/// Accounts + global findings + the deduplicated cross-account user list.
///
/// Accounts and findings are top-level: either failing fails the whole
/// snapshot. The per-account user fan-out is partial-failure tolerant.
pub async fn dashboard_snapshot(
    client: &BlumiraClient,
) -> Result<DashboardSnapshot, BlumiraError> {
    let accounts = client.msp_accounts().await?;
    let findings = client.all_findings().await?;
    let users = collect_users(client, &accounts).await;

    Ok(DashboardSnapshot {
        accounts,
        findings,
        users,
    })
}

/// Enrich every account concurrently and reduce the cross-account totals.
pub async fn organizations_snapshot(
    client: &BlumiraClient,
) -> Result<OrganizationsSnapshot, BlumiraError> {
    let accounts = client.msp_accounts().await?;

    let organizations = join_all(
        accounts
            .into_iter()
            .map(|account| enrich_account(client, account)),
    )
    .await;

    let mut totals = DashboardTotals::default();
    for org in &organizations {
        totals.accumulate(org);
    }

    Ok(OrganizationsSnapshot {
        organizations,
        totals,
    })
}

/// Fetch each account's users concurrently (failures degrade to empty for
/// that account), tag them with the owning org, then dedupe and sort.
async fn collect_users(client: &BlumiraClient, accounts: &[MspAccount]) -> Vec<AccountUser> {
    let per_account = join_all(accounts.iter().map(|account| async {
        match client.account_users(&account.account_id).await {
            Ok(mut users) => {
                for user in &mut users {
                    user.org_name = Some(account.name.clone());
                    user.org_id = Some(account.account_id.clone());
                }
                users
            }
            Err(err) => {
                tracing::warn!(account_id = %account.account_id, error = %err, "Failed to fetch account users");
                Vec::new()
            }
        }
    }))
    .await;

    merge_users(per_account)
}

/// Deduplicate by `user_id`-else-email (first occurrence wins) and sort by
/// display name, case-insensitively.
fn merge_users(per_account: Vec<Vec<AccountUser>>) -> Vec<AccountUser> {
    let mut seen = std::collections::HashSet::new();
    let mut users: Vec<AccountUser> = per_account
        .into_iter()
        .flatten()
        .filter(|user| seen.insert(user.dedupe_key().to_string()))
        .collect();

    users.sort_by_key(|user| user.display_name().to_lowercase());
    users
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn user(user_id: Option<&str>, email: &str, name: Option<&str>) -> AccountUser {
        let mut json = serde_json::json!({ "email": email });
        if let Some(id) = user_id {
            json["user_id"] = id.into();
        }
        if let Some(n) = name {
            json["name"] = n.into();
        }
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn merge_users_dedupes_by_user_id_first_wins() {
        let merged = merge_users(vec![
            vec![user(Some("u-1"), "a@example.com", Some("Alice"))],
            vec![user(Some("u-1"), "a@other.com", Some("Alice Dup"))],
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].email, "a@example.com");
    }

    #[test]
    fn merge_users_falls_back_to_email_key() {
        let merged = merge_users(vec![
            vec![user(None, "a@example.com", None)],
            vec![user(None, "a@example.com", None)],
            vec![user(None, "b@example.com", None)],
        ]);

        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn merge_users_sorts_by_display_name_case_insensitive() {
        let merged = merge_users(vec![vec![
            user(Some("u-1"), "z@example.com", Some("zed")),
            user(Some("u-2"), "b@example.com", Some("Bob")),
            user(Some("u-3"), "a@example.com", Some("alice")),
        ]]);

        let names: Vec<String> = merged.iter().map(|u| u.display_name()).collect();
        assert_eq!(names, ["alice", "Bob", "zed"]);
    }

    #[test]
    fn merge_users_empty_input_is_empty() {
        assert!(merge_users(vec![]).is_empty());
        assert!(merge_users(vec![vec![], vec![]]).is_empty());
    }
}
