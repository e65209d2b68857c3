//! Tolerant reading of the persisted annotation document.
//!
//! The on-disk document is a single JSON object mapping finding id to
//! annotation record. Reads must never fail: a missing file, unreadable
//! bytes, or a malformed blob all load as an empty store, and records in a
//! legacy shape are upgraded in place. The upgrade is read-time only — the
//! next write persists the current shape.
//!
//! Legacy shapes tolerated per record:
//! - `notes` as a plain string (the old singular note): upgraded to a
//!   one-element entry list with author `"You"` and the record's
//!   `updatedAt` as the note timestamp (current time if absent). An empty
//!   string upgrades to an empty list.
//! - missing `localStatus`: defaulted to `none` (unknown values likewise).
//! - missing `updatedAt`: defaulted to the current time.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::Value;

use mspdash_core::annotation::{FindingAnnotation, LocalStatus, NoteEntry, DEFAULT_NOTE_AUTHOR};

/// Load the annotation document from disk. Total: any failure yields an
/// empty map.
pub fn read_document(path: &Path) -> BTreeMap<String, FindingAnnotation> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "Failed to read annotation store, starting empty");
            return BTreeMap::new();
        }
    };
    parse_document(&raw)
}

/// Parse a raw snapshot string. Total: malformed JSON or a non-object root
/// yields an empty map; malformed individual records are dropped.
pub fn parse_document(raw: &str) -> BTreeMap<String, FindingAnnotation> {
    let root: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(error = %err, "Malformed annotation store document, starting empty");
            return BTreeMap::new();
        }
    };

    let Value::Object(entries) = root else {
        tracing::warn!("Annotation store document is not a JSON object, starting empty");
        return BTreeMap::new();
    };

    let mut map = BTreeMap::new();
    for (finding_id, value) in entries {
        match upgrade_record(value) {
            Some(annotation) => {
                map.insert(finding_id, annotation);
            }
            None => {
                tracing::warn!(finding_id = %finding_id, "Dropping malformed annotation record");
            }
        }
    }
    map
}

/// Upgrade one persisted record value to the current shape. Returns `None`
/// for values that are not objects.
fn upgrade_record(value: Value) -> Option<FindingAnnotation> {
    let obj = value.as_object()?;

    let updated_at = obj
        .get("updatedAt")
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
        .unwrap_or_else(Utc::now);

    let assignee = obj
        .get("assignee")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let notes = match obj.get("notes") {
        // Legacy shape: singular note as a plain string.
        Some(Value::String(text)) => {
            if text.is_empty() {
                Vec::new()
            } else {
                vec![NoteEntry {
                    text: text.clone(),
                    author: DEFAULT_NOTE_AUTHOR.to_string(),
                    timestamp: updated_at,
                }]
            }
        }
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect(),
        _ => Vec::new(),
    };

    let local_status = obj
        .get("localStatus")
        .and_then(Value::as_str)
        .and_then(|s| LocalStatus::from_str(s).ok())
        .unwrap_or_default();

    Some(FindingAnnotation {
        assignee,
        notes,
        local_status,
        updated_at,
    })
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- malformed documents -----------------------------------------------

    #[test]
    fn non_json_yields_empty() {
        assert!(parse_document("not json at all {{").is_empty());
    }

    #[test]
    fn non_object_root_yields_empty() {
        assert!(parse_document("[1, 2, 3]").is_empty());
        assert!(parse_document("\"just a string\"").is_empty());
    }

    #[test]
    fn missing_file_yields_empty() {
        let map = read_document(Path::new("/nonexistent/annotations.json"));
        assert!(map.is_empty());
    }

    #[test]
    fn non_object_record_is_dropped_others_kept() {
        let raw = r#"{
            "F-1": 42,
            "F-2": {"assignee": "alice", "notes": [], "localStatus": "none", "updatedAt": "2024-01-01T00:00:00Z"}
        }"#;
        let map = parse_document(raw);
        assert!(!map.contains_key("F-1"));
        assert_eq!(map["F-2"].assignee, "alice");
    }

    // -- legacy upgrade ----------------------------------------------------

    #[test]
    fn legacy_string_notes_upgraded_to_single_entry() {
        let raw = r#"{"F-1":{"assignee":"Bob","notes":"old","updatedAt":"2024-01-01T00:00:00Z"}}"#;
        let map = parse_document(raw);
        let ann = &map["F-1"];

        assert_eq!(ann.assignee, "Bob");
        assert_eq!(ann.notes.len(), 1);
        assert_eq!(ann.notes[0].text, "old");
        assert_eq!(ann.notes[0].author, "You");
        assert_eq!(ann.notes[0].timestamp, ann.updated_at);
        assert_eq!(ann.local_status, LocalStatus::None);
    }

    #[test]
    fn legacy_empty_string_notes_upgrade_to_empty_list() {
        let raw = r#"{"F-1":{"assignee":"Bob","notes":"","updatedAt":"2024-01-01T00:00:00Z"}}"#;
        let map = parse_document(raw);
        assert!(map["F-1"].notes.is_empty());
    }

    #[test]
    fn legacy_note_timestamp_defaults_to_now_when_updated_at_absent() {
        let before = Utc::now();
        let raw = r#"{"F-1":{"assignee":"","notes":"old"}}"#;
        let map = parse_document(raw);
        let ann = &map["F-1"];
        assert_eq!(ann.notes.len(), 1);
        assert!(ann.notes[0].timestamp >= before);
        assert!(ann.updated_at >= before);
    }

    #[test]
    fn missing_local_status_defaults_to_none() {
        let raw = r#"{"F-1":{"assignee":"","notes":[],"updatedAt":"2024-01-01T00:00:00Z"}}"#;
        let map = parse_document(raw);
        assert_eq!(map["F-1"].local_status, LocalStatus::None);
    }

    #[test]
    fn unknown_local_status_normalized_to_none() {
        let raw = r#"{"F-1":{"assignee":"","notes":[],"localStatus":"wontfix","updatedAt":"2024-01-01T00:00:00Z"}}"#;
        let map = parse_document(raw);
        assert_eq!(map["F-1"].local_status, LocalStatus::None);
    }

    // -- current shape round-trips unchanged -------------------------------

    #[test]
    fn current_shape_parses_losslessly() {
        let raw = r#"{
            "F-9": {
                "assignee": "alice@example.com",
                "notes": [
                    {"text": "first", "author": "You", "timestamp": "2024-02-01T08:00:00Z"},
                    {"text": "second", "author": "SOC Bot", "timestamp": "2024-02-02T08:00:00Z"}
                ],
                "localStatus": "in_progress",
                "updatedAt": "2024-02-02T08:00:00Z"
            }
        }"#;
        let map = parse_document(raw);
        let ann = &map["F-9"];

        assert_eq!(ann.assignee, "alice@example.com");
        assert_eq!(ann.notes.len(), 2);
        assert_eq!(ann.notes[0].text, "first");
        assert_eq!(ann.notes[1].author, "SOC Bot");
        assert_eq!(ann.local_status, LocalStatus::InProgress);
    }

    #[test]
    fn note_order_preserved() {
        let raw = r#"{"F-1":{"assignee":"","notes":[
            {"text": "a", "author": "You", "timestamp": "2024-02-01T08:00:00Z"},
            {"text": "b", "author": "You", "timestamp": "2024-02-01T08:00:00Z"},
            {"text": "a", "author": "You", "timestamp": "2024-02-01T08:00:00Z"}
        ],"localStatus":"none","updatedAt":"2024-02-01T08:00:00Z"}}"#;
        let map = parse_document(raw);
        let texts: Vec<&str> = map["F-1"].notes.iter().map(|n| n.text.as_str()).collect();
        // Duplicates survive: the store never deduplicates entries.
        assert_eq!(texts, ["a", "b", "a"]);
    }
}
