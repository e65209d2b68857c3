//! Display-merge rules joining an upstream finding with its local
//! annotation.
//!
//! The assignee precedence is an explicit, ordered fallback chain rather
//! than scattered truthiness checks, so the contract is reviewable in one
//! place:
//!
//! 1. local annotation `assignee`, if non-empty
//! 2. upstream `assigned_to_name`
//! 3. upstream `assigned_to` (raw identifier)
//! 4. empty string (unassigned)

use crate::annotation::{FindingAnnotation, LocalStatus};
use crate::finding::Finding;

/// Resolve the assignee label a view should display for one finding row.
pub fn display_assignee(annotation: Option<&FindingAnnotation>, finding: &Finding) -> String {
    if let Some(ann) = annotation {
        if !ann.assignee.is_empty() {
            return ann.assignee.clone();
        }
    }
    if let Some(name) = finding.assigned_to_name.as_deref() {
        if !name.is_empty() {
            return name.to_string();
        }
    }
    if let Some(id) = finding.assigned_to.as_deref() {
        if !id.is_empty() {
            return id.to_string();
        }
    }
    String::new()
}

/// Whether the finding carries the "closed locally" overlay badge.
///
/// Rendered alongside the upstream `status_name`, never instead of it.
pub fn closed_locally(annotation: Option<&FindingAnnotation>) -> bool {
    annotation.is_some_and(|ann| ann.local_status == LocalStatus::Closed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
