//! Locally owned finding annotations.
//!
//! An annotation is the operator's overlay on a single upstream finding:
//! an assignee label, an append-only note log, and a local workflow status.
//! None of it is ever written back to the upstream system. Persistence and
//! mutation live in `mspdash-store`; this module defines the record shape
//! and its value semantics.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Local status
// ---------------------------------------------------------------------------

/// Operator-local workflow marker for a finding.
///
/// Independent of the upstream finding's own `status_name`: a finding can be
/// "Open" upstream and `Closed` locally at the same time, and the UI renders
/// both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalStatus {
    #[default]
    None,
    InProgress,
    Closed,
}

/// All valid local status strings.
const VALID_STATUS_STRINGS: &[&str] = &["none", "in_progress", "closed"];

impl LocalStatus {
    /// Return the status as a lowercase string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::InProgress => "in_progress",
            Self::Closed => "closed",
        }
    }

    /// Parse a status from a string slice.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "none" => Ok(Self::None),
            "in_progress" => Ok(Self::InProgress),
            "closed" => Ok(Self::Closed),
            _ => Err(CoreError::Validation(format!(
                "Invalid local status '{s}'. Must be one of: {}",
                VALID_STATUS_STRINGS.join(", ")
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Note entries
// ---------------------------------------------------------------------------

/// A single note in an annotation's log.
///
/// Entries are immutable after creation: the log is append-only, and the
/// store never reorders or deduplicates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEntry {
    pub text: String,
    /// Display name of the author (operator label, or a system label for
    /// automated notes).
    pub author: String,
    pub timestamp: Timestamp,
}

/// Default author label for notes with no explicit author (also used when
/// upgrading legacy single-string notes).
pub const DEFAULT_NOTE_AUTHOR: &str = "You";

// ---------------------------------------------------------------------------
// FindingAnnotation
// ---------------------------------------------------------------------------

/// The full local overlay record for one finding id.
///
/// At most one annotation exists per finding id; absence means "no local
/// annotation" and is rendered as empty defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingAnnotation {
    /// Free-text assignee label. Empty string means unassigned.
    pub assignee: String,
    /// Append-only note log, insertion order preserved.
    pub notes: Vec<NoteEntry>,
    #[serde(rename = "localStatus", default)]
    pub local_status: LocalStatus,
    #[serde(rename = "updatedAt")]
    pub updated_at: Timestamp,
}

impl FindingAnnotation {
    /// The get-or-default seed used for implicit creation on first write.
    pub fn empty(now: Timestamp) -> Self {
        Self {
            assignee: String::new(),
            notes: Vec::new(),
            local_status: LocalStatus::None,
            updated_at: now,
        }
    }

    /// Whether this record is degenerate: no assignee, no notes, status
    /// `none`. A degenerate record is render-equivalent to absence and may
    /// be garbage-collected by the store's generic save path.
    pub fn is_empty(&self) -> bool {
        self.assignee.is_empty() && self.notes.is_empty() && self.local_status == LocalStatus::None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- LocalStatus::as_str / from_str ------------------------------------

    #[test]
    fn status_none_round_trip() {
        assert_eq!(LocalStatus::None.as_str(), "none");
        assert_eq!(LocalStatus::from_str("none").unwrap(), LocalStatus::None);
    }

    #[test]
    fn status_in_progress_round_trip() {
        assert_eq!(LocalStatus::InProgress.as_str(), "in_progress");
        assert_eq!(
            LocalStatus::from_str("in_progress").unwrap(),
            LocalStatus::InProgress
        );
    }

    #[test]
    fn status_closed_round_trip() {
        assert_eq!(LocalStatus::Closed.as_str(), "closed");
        assert_eq!(LocalStatus::from_str("closed").unwrap(), LocalStatus::Closed);
    }

    #[test]
    fn status_invalid_rejected() {
        let err = LocalStatus::from_str("resolved").unwrap_err();
        assert!(err.to_string().contains("Invalid local status"));
    }

    #[test]
    fn status_empty_rejected() {
        assert!(LocalStatus::from_str("").is_err());
    }

    #[test]
    fn status_default_is_none() {
        assert_eq!(LocalStatus::default(), LocalStatus::None);
    }

    // -- serde wire format -------------------------------------------------

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&LocalStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
    }

    #[test]
    fn annotation_field_names_match_wire_contract() {
        let ann = FindingAnnotation::empty(chrono::Utc::now());
        let json = serde_json::to_value(&ann).unwrap();
        assert!(json.get("localStatus").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("assignee").is_some());
        assert!(json.get("notes").is_some());
    }

    #[test]
    fn annotation_missing_local_status_defaults_to_none() {
        let json = r#"{"assignee":"a","notes":[],"updatedAt":"2024-01-01T00:00:00Z"}"#;
        let ann: FindingAnnotation = serde_json::from_str(json).unwrap();
        assert_eq!(ann.local_status, LocalStatus::None);
    }

    // -- is_empty ----------------------------------------------------------

    #[test]
    fn empty_record_is_degenerate() {
        assert!(FindingAnnotation::empty(chrono::Utc::now()).is_empty());
    }

    #[test]
    fn record_with_assignee_is_not_degenerate() {
        let mut ann = FindingAnnotation::empty(chrono::Utc::now());
        ann.assignee = "alice@example.com".to_string();
        assert!(!ann.is_empty());
    }

    #[test]
    fn record_with_status_is_not_degenerate() {
        let mut ann = FindingAnnotation::empty(chrono::Utc::now());
        ann.local_status = LocalStatus::Closed;
        assert!(!ann.is_empty());
    }

    #[test]
    fn record_with_note_is_not_degenerate() {
        let now = chrono::Utc::now();
        let mut ann = FindingAnnotation::empty(now);
        ann.notes.push(NoteEntry {
            text: "checking".to_string(),
            author: DEFAULT_NOTE_AUTHOR.to_string(),
            timestamp: now,
        });
        assert!(!ann.is_empty());
    }
}
