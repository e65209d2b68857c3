//! Upstream read-only entities and derived per-account statistics.
//!
//! These structs mirror the Blumira public API wire shapes. The upstream is
//! loosely typed: most descriptive fields are optional and date fields
//! arrive as opaque strings, so they are kept as `Option<String>` / `String`
//! rather than forced into stricter types that would reject real payloads.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// A managed account as listed by the MSP accounts endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MspAccount {
    pub account_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_findings: Option<i64>,
}

/// Per-account license/usage detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountDetails {
    pub agent_count_available: i64,
    pub agent_count_used: i64,
    pub license: String,
    pub user_count: i64,
}

// ---------------------------------------------------------------------------
// Findings
// ---------------------------------------------------------------------------

/// A security-detection record, externally owned and identified by
/// `finding_id`. Immutable once fetched; superseded wholesale on refetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub finding_id: String,
    pub name: String,
    pub priority: i64,
    pub status_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
    pub type_name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_id: Option<i64>,
    pub created: String,
    pub modified: String,
    pub org_name: String,
    pub org_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
    /// Upstream-side analyst notes, unrelated to the local note log.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detector_name: Option<String>,
}

/// PATCH body for updating a finding upstream (status, priority, assignee,
/// resolution, upstream notes). Only set fields are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

/// A device reporting through an account's agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDevice {
    pub device_id: String,
    pub hostname: String,
    pub alive: String,
    pub arch: String,
    pub created: String,
    pub is_excluded: bool,
    pub is_isolated: bool,
    pub is_sleeping: bool,
    pub isolation_requested: bool,
    pub key_id: String,
    pub keyname: String,
    pub modified: String,
    pub org_id: String,
    pub plat: String,
}

impl AgentDevice {
    /// A device counts as online when it is not sleeping, isolated, or
    /// excluded.
    pub fn is_online(&self) -> bool {
        !self.is_sleeping && !self.is_isolated && !self.is_excluded
    }
}

/// An agent installation key. The upstream surfaces the key label under
/// either `key_name` or `name` depending on endpoint version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentKey {
    pub key_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// A user belonging to a managed account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Filled in during aggregation from the owning account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
}

impl AccountUser {
    /// Stable dedupe key across accounts: `user_id`, falling back to email.
    pub fn dedupe_key(&self) -> &str {
        self.user_id.as_deref().unwrap_or(&self.email)
    }

    /// Display name: `name`, else `"first last"`, else email.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref() {
            if !name.is_empty() {
                return name.to_string();
            }
        }
        let combined = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let combined = combined.trim();
        if combined.is_empty() {
            self.email.clone()
        } else {
            combined.to_string()
        }
    }
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

/// Derived counts over one account's findings, devices, and keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStats {
    pub total_findings: usize,
    pub critical_findings: usize,
    pub open_findings: usize,
    pub total_devices: usize,
    pub online_devices: usize,
    pub sleeping_devices: usize,
    pub isolated_devices: usize,
    pub excluded_devices: usize,
    pub agent_keys_count: usize,
}

/// Priority value the upstream uses for critical findings.
pub const CRITICAL_PRIORITY: i64 = 1;

/// Upstream status label for an open finding.
pub const OPEN_STATUS_NAME: &str = "Open";

/// Compute [`AccountStats`] from one account's fetched collections.
pub fn compute_stats(
    findings: &[Finding],
    devices: &[AgentDevice],
    keys: &[AgentKey],
) -> AccountStats {
    AccountStats {
        total_findings: findings.len(),
        critical_findings: findings
            .iter()
            .filter(|f| f.priority == CRITICAL_PRIORITY)
            .count(),
        open_findings: findings
            .iter()
            .filter(|f| f.status_name == OPEN_STATUS_NAME)
            .count(),
        total_devices: devices.len(),
        online_devices: devices.iter().filter(|d| d.is_online()).count(),
        sleeping_devices: devices.iter().filter(|d| d.is_sleeping).count(),
        isolated_devices: devices.iter().filter(|d| d.is_isolated).count(),
        excluded_devices: devices.iter().filter(|d| d.is_excluded).count(),
        agent_keys_count: keys.len(),
    }
}

/// An account composed with everything the organizations view renders.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedAccount {
    #[serde(flatten)]
    pub account: MspAccount,
    pub details: Option<AccountDetails>,
    pub findings: Vec<Finding>,
    pub agent_devices: Vec<AgentDevice>,
    pub agent_keys: Vec<AgentKey>,
    pub device_meta: Option<serde_json::Value>,
    pub stats: AccountStats,
}

/// Cross-account sums shown at the top of the organizations view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardTotals {
    pub total_findings: usize,
    pub critical_findings: usize,
    pub open_findings: usize,
    pub total_devices: usize,
    pub online_devices: usize,
    pub sleeping_devices: usize,
    pub isolated_devices: usize,
    pub excluded_devices: usize,
    pub total_agent_keys: usize,
    pub total_users: i64,
    pub total_agent_capacity: i64,
    pub total_agent_used: i64,
}

impl DashboardTotals {
    /// Fold one enriched account into the running totals. Accounts whose
    /// detail fetch failed contribute zero to the detail-derived sums.
    pub fn accumulate(&mut self, org: &EnrichedAccount) {
        self.total_findings += org.stats.total_findings;
        self.critical_findings += org.stats.critical_findings;
        self.open_findings += org.stats.open_findings;
        self.total_devices += org.stats.total_devices;
        self.online_devices += org.stats.online_devices;
        self.sleeping_devices += org.stats.sleeping_devices;
        self.isolated_devices += org.stats.isolated_devices;
        self.excluded_devices += org.stats.excluded_devices;
        self.total_agent_keys += org.stats.agent_keys_count;
        if let Some(details) = &org.details {
            self.total_users += details.user_count;
            self.total_agent_capacity += details.agent_count_available;
            self.total_agent_used += details.agent_count_used;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(id: &str, priority: i64, status_name: &str) -> Finding {
        serde_json::from_value(serde_json::json!({
            "finding_id": id,
            "name": "Suspicious logon",
            "priority": priority,
            "status_name": status_name,
            "type_name": "Detection",
            "created": "2024-05-01T10:00:00Z",
            "modified": "2024-05-01T10:00:00Z",
            "org_name": "Acme",
            "org_id": "org-1",
        }))
        .unwrap()
    }

    fn device(sleeping: bool, isolated: bool, excluded: bool) -> AgentDevice {
        AgentDevice {
            device_id: "dev-1".to_string(),
            hostname: "host".to_string(),
            alive: "2024-05-01T10:00:00Z".to_string(),
            arch: "x86_64".to_string(),
            created: "2024-01-01T00:00:00Z".to_string(),
            is_excluded: excluded,
            is_isolated: isolated,
            is_sleeping: sleeping,
            isolation_requested: false,
            key_id: "key-1".to_string(),
            keyname: "default".to_string(),
            modified: "2024-05-01T10:00:00Z".to_string(),
            org_id: "org-1".to_string(),
            plat: "windows".to_string(),
        }
    }

    // -- deserialization ---------------------------------------------------

    #[test]
    fn finding_tolerates_missing_optional_fields() {
        let f = finding("F-1", 2, "Open");
        assert_eq!(f.finding_id, "F-1");
        assert!(f.assigned_to.is_none());
        assert!(f.assigned_to_name.is_none());
    }

    #[test]
    fn finding_type_field_maps_to_type_id() {
        let f: Finding = serde_json::from_value(serde_json::json!({
            "finding_id": "F-1",
            "name": "n",
            "priority": 3,
            "status_name": "Open",
            "type_name": "Detection",
            "type": 10,
            "created": "c",
            "modified": "m",
            "org_name": "o",
            "org_id": "o-1",
        }))
        .unwrap();
        assert_eq!(f.type_id, Some(10));
    }

    #[test]
    fn finding_update_serializes_only_set_fields() {
        let update = FindingUpdate {
            status: Some(30),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "status": 30 }));
    }

    // -- device predicates -------------------------------------------------

    #[test]
    fn device_online_when_no_flags_set() {
        assert!(device(false, false, false).is_online());
    }

    #[test]
    fn device_offline_when_sleeping() {
        assert!(!device(true, false, false).is_online());
    }

    #[test]
    fn device_offline_when_isolated_or_excluded() {
        assert!(!device(false, true, false).is_online());
        assert!(!device(false, false, true).is_online());
    }

    // -- compute_stats -----------------------------------------------------

    #[test]
    fn stats_count_critical_and_open() {
        let findings = vec![
            finding("F-1", 1, "Open"),
            finding("F-2", 1, "Resolved"),
            finding("F-3", 3, "Open"),
        ];
        let stats = compute_stats(&findings, &[], &[]);
        assert_eq!(stats.total_findings, 3);
        assert_eq!(stats.critical_findings, 2);
        assert_eq!(stats.open_findings, 2);
    }

    #[test]
    fn stats_classify_devices_by_flag() {
        let devices = vec![
            device(false, false, false),
            device(true, false, false),
            device(false, true, false),
            device(false, false, true),
        ];
        let stats = compute_stats(&[], &devices, &[]);
        assert_eq!(stats.total_devices, 4);
        assert_eq!(stats.online_devices, 1);
        assert_eq!(stats.sleeping_devices, 1);
        assert_eq!(stats.isolated_devices, 1);
        assert_eq!(stats.excluded_devices, 1);
    }

    #[test]
    fn stats_empty_inputs_all_zero() {
        assert_eq!(compute_stats(&[], &[], &[]), AccountStats::default());
    }

    // -- users -------------------------------------------------------------

    #[test]
    fn user_dedupe_key_prefers_user_id() {
        let user: AccountUser = serde_json::from_value(serde_json::json!({
            "user_id": "u-1",
            "email": "a@example.com",
        }))
        .unwrap();
        assert_eq!(user.dedupe_key(), "u-1");
    }

    #[test]
    fn user_dedupe_key_falls_back_to_email() {
        let user: AccountUser =
            serde_json::from_value(serde_json::json!({ "email": "a@example.com" })).unwrap();
        assert_eq!(user.dedupe_key(), "a@example.com");
    }

    #[test]
    fn user_display_name_fallback_chain() {
        let full: AccountUser = serde_json::from_value(serde_json::json!({
            "email": "a@example.com", "name": "Alice A",
        }))
        .unwrap();
        assert_eq!(full.display_name(), "Alice A");

        let split: AccountUser = serde_json::from_value(serde_json::json!({
            "email": "a@example.com", "first_name": "Alice", "last_name": "Adams",
        }))
        .unwrap();
        assert_eq!(split.display_name(), "Alice Adams");

        let bare: AccountUser =
            serde_json::from_value(serde_json::json!({ "email": "a@example.com" })).unwrap();
        assert_eq!(bare.display_name(), "a@example.com");
    }

    // -- totals ------------------------------------------------------------

    #[test]
    fn totals_accumulate_stats_and_details() {
        let account = MspAccount {
            account_id: "acc-1".to_string(),
            name: "Acme".to_string(),
            open_findings: None,
        };
        let enriched = EnrichedAccount {
            account,
            details: Some(AccountDetails {
                agent_count_available: 50,
                agent_count_used: 20,
                license: "MSP".to_string(),
                user_count: 7,
            }),
            findings: vec![],
            agent_devices: vec![],
            agent_keys: vec![],
            device_meta: None,
            stats: AccountStats {
                total_findings: 4,
                critical_findings: 1,
                open_findings: 2,
                total_devices: 3,
                online_devices: 2,
                sleeping_devices: 1,
                isolated_devices: 0,
                excluded_devices: 0,
                agent_keys_count: 2,
            },
        };

        let mut totals = DashboardTotals::default();
        totals.accumulate(&enriched);
        totals.accumulate(&enriched);

        assert_eq!(totals.total_findings, 8);
        assert_eq!(totals.critical_findings, 2);
        assert_eq!(totals.total_agent_keys, 4);
        assert_eq!(totals.total_users, 14);
        assert_eq!(totals.total_agent_capacity, 100);
        assert_eq!(totals.total_agent_used, 40);
    }

    #[test]
    fn totals_skip_missing_details() {
        let enriched = EnrichedAccount {
            account: MspAccount {
                account_id: "acc-1".to_string(),
                name: "Acme".to_string(),
                open_findings: None,
            },
            details: None,
            findings: vec![],
            agent_devices: vec![],
            agent_keys: vec![],
            device_meta: None,
            stats: AccountStats::default(),
        };

        let mut totals = DashboardTotals::default();
        totals.accumulate(&enriched);
        assert_eq!(totals.total_users, 0);
        assert_eq!(totals.total_agent_capacity, 0);
    }
}
