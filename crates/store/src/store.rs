//! The annotation store: durable key-value map from finding id to
//! [`FindingAnnotation`].
//!
//! All state lives behind one mutex; every operation acquires it for its
//! full read-modify-write, so a bulk operation applies against one
//! consistent snapshot and no partial-batch state is ever observable. The
//! lock is never held across an await point. Every mutation re-persists the
//! entire document, bumps the version counter once, and publishes one
//! [`StoreEvent`].
//!
//! All operations are total. A malformed on-disk document loads as an empty
//! store; a failed disk write is logged and the in-memory state stays
//! authoritative until the next successful write. Concurrent writers on the
//! same path (two processes) are last-write-wins over the whole snapshot —
//! an accepted limitation, not a convergence guarantee.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use tokio::sync::broadcast;

use mspdash_core::annotation::{FindingAnnotation, LocalStatus, NoteEntry};

use crate::events::{self, StoreEvent, StoreEventKind};
use crate::snapshot;

struct Inner {
    map: BTreeMap<String, FindingAnnotation>,
    version: u64,
}

/// Durable annotation store. Shared across handlers via `Arc`.
pub struct AnnotationStore {
    path: PathBuf,
    inner: Mutex<Inner>,
    events: broadcast::Sender<StoreEvent>,
}

impl AnnotationStore {
    /// Open the store backed by the document at `path`, loading whatever is
    /// there. Never fails: missing or malformed documents load as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let map = snapshot::read_document(&path);
        Self {
            path,
            inner: Mutex::new(Inner { map, version: 0 }),
            events: events::channel(),
        }
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current store version. Bumped once per mutating operation (a bulk
    /// operation counts as one).
    pub fn version(&self) -> u64 {
        self.inner.lock().expect("annotation store lock poisoned").version
    }

    /// Subscribe to change events.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    // -- reads -------------------------------------------------------------

    /// Look up one annotation. Absence means "no local annotation".
    pub fn get(&self, finding_id: &str) -> Option<FindingAnnotation> {
        let inner = self.inner.lock().expect("annotation store lock poisoned");
        inner.map.get(finding_id).cloned()
    }

    /// Snapshot copy of every annotation, for display-time joins over
    /// finding lists.
    pub fn all(&self) -> BTreeMap<String, FindingAnnotation> {
        let inner = self.inner.lock().expect("annotation store lock poisoned");
        inner.map.clone()
    }

    // -- single-record mutations ---------------------------------------------

    /// Append a note, creating the record if absent. Existing notes are
    /// always preserved.
    pub fn add_note(&self, finding_id: &str, text: &str, author: &str) -> FindingAnnotation {
        let now = Utc::now();
        self.mutate(StoreEventKind::NoteAdded, vec![finding_id.to_string()], |map| {
            let entry = map
                .entry(finding_id.to_string())
                .or_insert_with(|| FindingAnnotation::empty(now));
            entry.notes.push(NoteEntry {
                text: text.to_string(),
                author: author.to_string(),
                timestamp: now,
            });
            entry.updated_at = now;
            entry.clone()
        })
    }

    /// Replace the assignee wholesale (not merged), creating the record if
    /// absent. An empty string clears the assignment.
    pub fn set_assignee(&self, finding_id: &str, assignee: &str) -> FindingAnnotation {
        let now = Utc::now();
        self.mutate(StoreEventKind::AssigneeSet, vec![finding_id.to_string()], |map| {
            let entry = map
                .entry(finding_id.to_string())
                .or_insert_with(|| FindingAnnotation::empty(now));
            entry.assignee = assignee.to_string();
            entry.updated_at = now;
            entry.clone()
        })
    }

    /// Replace the local workflow status, creating the record if absent.
    pub fn set_local_status(&self, finding_id: &str, status: LocalStatus) -> FindingAnnotation {
        let now = Utc::now();
        self.mutate(StoreEventKind::StatusSet, vec![finding_id.to_string()], |map| {
            let entry = map
                .entry(finding_id.to_string())
                .or_insert_with(|| FindingAnnotation::empty(now));
            entry.local_status = status;
            entry.updated_at = now;
            entry.clone()
        })
    }

    /// Generic save: replace the whole record in one write.
    ///
    /// Saving a degenerate record (empty assignee, no notes, status `none`)
    /// prunes it instead — the record is deleted and `None` returned, so
    /// `get` transitions back to absent after a full clear through the edit
    /// path. Explicit [`delete`](Self::delete) is authoritative either way.
    pub fn save(
        &self,
        finding_id: &str,
        mut annotation: FindingAnnotation,
    ) -> Option<FindingAnnotation> {
        let now = Utc::now();
        self.mutate(StoreEventKind::Saved, vec![finding_id.to_string()], |map| {
            if annotation.is_empty() {
                map.remove(finding_id);
                None
            } else {
                annotation.updated_at = now;
                map.insert(finding_id.to_string(), annotation.clone());
                Some(annotation)
            }
        })
    }

    /// Remove the record entirely. Idempotent: deleting an absent record is
    /// a no-op and publishes nothing.
    pub fn delete(&self, finding_id: &str) {
        let mut inner = self.inner.lock().expect("annotation store lock poisoned");
        if inner.map.remove(finding_id).is_none() {
            return;
        }
        self.commit(
            &mut inner,
            StoreEventKind::Deleted,
            vec![finding_id.to_string()],
        );
    }

    // -- bulk mutations ----------------------------------------------------

    /// Set the assignee on every listed finding under one persisted write.
    pub fn bulk_set_assignee(&self, finding_ids: &[String], assignee: &str) -> Vec<FindingAnnotation> {
        let now = Utc::now();
        self.mutate(StoreEventKind::BulkAssigneeSet, finding_ids.to_vec(), |map| {
            finding_ids
                .iter()
                .map(|id| {
                    let entry = map
                        .entry(id.clone())
                        .or_insert_with(|| FindingAnnotation::empty(now));
                    entry.assignee = assignee.to_string();
                    entry.updated_at = now;
                    entry.clone()
                })
                .collect()
        })
    }

    /// Append a note to every listed finding under one persisted write.
    /// The batch shares a single timestamp, so batch-added notes are
    /// indistinguishable in ordering, but each finding gets its own entry.
    pub fn bulk_add_note(
        &self,
        finding_ids: &[String],
        text: &str,
        author: &str,
    ) -> Vec<FindingAnnotation> {
        let now = Utc::now();
        self.mutate(StoreEventKind::BulkNoteAdded, finding_ids.to_vec(), |map| {
            finding_ids
                .iter()
                .map(|id| {
                    let entry = map
                        .entry(id.clone())
                        .or_insert_with(|| FindingAnnotation::empty(now));
                    entry.notes.push(NoteEntry {
                        text: text.to_string(),
                        author: author.to_string(),
                        timestamp: now,
                    });
                    entry.updated_at = now;
                    entry.clone()
                })
                .collect()
        })
    }

    /// Set the local status on every listed finding under one persisted
    /// write.
    pub fn bulk_set_local_status(
        &self,
        finding_ids: &[String],
        status: LocalStatus,
    ) -> Vec<FindingAnnotation> {
        let now = Utc::now();
        self.mutate(StoreEventKind::BulkStatusSet, finding_ids.to_vec(), |map| {
            finding_ids
                .iter()
                .map(|id| {
                    let entry = map
                        .entry(id.clone())
                        .or_insert_with(|| FindingAnnotation::empty(now));
                    entry.local_status = status;
                    entry.updated_at = now;
                    entry.clone()
                })
                .collect()
        })
    }

    // -- internals ---------------------------------------------------------

    /// Run `apply` against the map under the lock, then persist, bump the
    /// version once, and publish one event.
    fn mutate<T>(
        &self,
        kind: StoreEventKind,
        finding_ids: Vec<String>,
        apply: impl FnOnce(&mut BTreeMap<String, FindingAnnotation>) -> T,
    ) -> T {
        let mut inner = self.inner.lock().expect("annotation store lock poisoned");
        let result = apply(&mut inner.map);
        self.commit(&mut inner, kind, finding_ids);
        result
    }

    /// Persist the current map, bump the version, publish the event.
    fn commit(&self, inner: &mut Inner, kind: StoreEventKind, finding_ids: Vec<String>) {
        self.persist(&inner.map);
        inner.version += 1;
        events::publish(
            &self.events,
            StoreEvent {
                kind,
                finding_ids,
                version: inner.version,
                timestamp: Utc::now(),
            },
        );
    }

    /// Write the whole document. Failures are logged, not surfaced: the
    /// in-memory map stays authoritative and the next successful write
    /// persists it.
    fn persist(&self, map: &BTreeMap<String, FindingAnnotation>) {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(err) = std::fs::create_dir_all(parent) {
                    tracing::error!(path = %self.path.display(), error = %err, "Failed to create annotation store directory");
                    return;
                }
            }
        }
        let serialized = match serde_json::to_string(map) {
            Ok(serialized) => serialized,
            Err(err) => {
                tracing::error!(error = %err, "Failed to serialize annotation store");
                return;
            }
        };
        if let Err(err) = std::fs::write(&self.path, serialized) {
            tracing::error!(path = %self.path.display(), error = %err, "Failed to write annotation store");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
