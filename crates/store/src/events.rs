//! Change notification for annotation mutations.
//!
//! Every mutating store operation publishes one [`StoreEvent`] over a
//! `tokio::sync::broadcast` channel (bulk operations publish a single event
//! covering the whole batch). Subscribers use the event — or just the
//! monotonically increasing `version` it carries — to invalidate any merged
//! view data rendered from an earlier snapshot.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

/// Which mutation produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreEventKind {
    NoteAdded,
    AssigneeSet,
    StatusSet,
    Saved,
    Deleted,
    BulkNoteAdded,
    BulkAssigneeSet,
    BulkStatusSet,
}

/// A single store mutation, as seen by subscribers.
#[derive(Debug, Clone, Serialize)]
pub struct StoreEvent {
    pub kind: StoreEventKind,
    /// Finding ids touched by the mutation (the full batch for bulk kinds).
    pub finding_ids: Vec<String>,
    /// Store version after the mutation.
    pub version: u64,
    pub timestamp: DateTime<Utc>,
}

/// Buffer capacity for the broadcast channel. Annotation edits are
/// operator-paced, so a small buffer is plenty; a lagging subscriber
/// observes `RecvError::Lagged` and should re-read the store.
pub(crate) const EVENT_CAPACITY: usize = 64;

pub(crate) fn channel() -> broadcast::Sender<StoreEvent> {
    let (sender, _) = broadcast::channel(EVENT_CAPACITY);
    sender
}

/// Publish an event to all current subscribers.
///
/// A `SendError` only means there are zero receivers, which is fine — the
/// store itself is always the source of truth.
pub(crate) fn publish(sender: &broadcast::Sender<StoreEvent>, event: StoreEvent) {
    let _ = sender.send(event);
}
