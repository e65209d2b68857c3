//! Durable, process-external annotation store.
//!
//! [`AnnotationStore`] owns the persisted overlay of operator state
//! (assignee, note log, local workflow status) keyed by finding id. All
//! other components hold at most a transient read-only copy obtained via
//! lookup; every change routes through the store's mutation operations,
//! each of which re-persists the whole snapshot and publishes a change
//! event so dependent views re-merge before their next paint.

pub mod events;
pub mod snapshot;
pub mod store;

pub use events::{StoreEvent, StoreEventKind};
pub use store::AnnotationStore;

/// Key under which the snapshot lives in the durable medium. On disk this
/// is the file stem of the store document.
pub const STORAGE_KEY: &str = "blumira-finding-annotations";
