//! Handlers for the local annotation store: the mutation surface the views
//! call for single-item and bulk actions.
//!
//! The store's operations are total, so these handlers have no failure
//! path beyond request validation: empty note text and unknown status
//! strings are rejected at this boundary (the store itself does not
//! enforce them). Every mutation response carries the store version after
//! the write so the caller re-merges before its next paint.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use mspdash_core::annotation::{
    FindingAnnotation, LocalStatus, NoteEntry, DEFAULT_NOTE_AUTHOR,
};

use crate::error::{AppError, AppResult};
use crate::response::MutationResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

/// Full-snapshot response for `GET /annotations`.
#[derive(Debug, Serialize)]
pub struct AnnotationsSnapshot {
    pub data: BTreeMap<String, FindingAnnotation>,
    pub version: u64,
}

/// Response for `GET /annotations/{finding_id}`.
#[derive(Debug, Serialize)]
pub struct AnnotationLookup {
    /// `None` means no local annotation: render empty defaults.
    pub data: Option<FindingAnnotation>,
    pub exists: bool,
    pub version: u64,
}

#[derive(Debug, Deserialize)]
pub struct AddNoteRequest {
    pub text: String,
    /// Defaults to the operator label when omitted.
    pub author: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetAssigneeRequest {
    pub assignee: String,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

/// Body for the generic save path: the whole record in one write.
#[derive(Debug, Deserialize)]
pub struct SaveAnnotationRequest {
    #[serde(default)]
    pub assignee: String,
    #[serde(default)]
    pub notes: Vec<NoteEntry>,
    #[serde(rename = "localStatus", default = "default_status")]
    pub local_status: String,
}

fn default_status() -> String {
    LocalStatus::None.as_str().to_string()
}

#[derive(Debug, Deserialize)]
pub struct BulkAddNoteRequest {
    pub finding_ids: Vec<String>,
    pub text: String,
    pub author: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkSetAssigneeRequest {
    pub finding_ids: Vec<String>,
    pub assignee: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkSetStatusRequest {
    pub finding_ids: Vec<String>,
    pub status: String,
}

fn require_note_text(text: &str) -> AppResult<()> {
    if text.trim().is_empty() {
        return Err(AppError::BadRequest("Note text must not be empty".into()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /annotations -- the full snapshot plus the current version.
pub async fn list(State(state): State<AppState>) -> Json<AnnotationsSnapshot> {
    Json(AnnotationsSnapshot {
        data: state.store.all(),
        version: state.store.version(),
    })
}

/// GET /annotations/{finding_id}
pub async fn get_one(
    State(state): State<AppState>,
    Path(finding_id): Path<String>,
) -> Json<AnnotationLookup> {
    let data = state.store.get(&finding_id);
    Json(AnnotationLookup {
        exists: data.is_some(),
        data,
        version: state.store.version(),
    })
}

// ---------------------------------------------------------------------------
// Single-record mutations
// ---------------------------------------------------------------------------

/// POST /annotations/{finding_id}/notes
pub async fn add_note(
    State(state): State<AppState>,
    Path(finding_id): Path<String>,
    Json(body): Json<AddNoteRequest>,
) -> AppResult<Json<MutationResponse<FindingAnnotation>>> {
    require_note_text(&body.text)?;
    let author = body.author.as_deref().unwrap_or(DEFAULT_NOTE_AUTHOR);

    let annotation = state.store.add_note(&finding_id, &body.text, author);
    Ok(Json(MutationResponse {
        data: annotation,
        version: state.store.version(),
    }))
}

/// PUT /annotations/{finding_id}/assignee -- wholesale replace; an empty
/// string clears the assignment.
pub async fn set_assignee(
    State(state): State<AppState>,
    Path(finding_id): Path<String>,
    Json(body): Json<SetAssigneeRequest>,
) -> Json<MutationResponse<FindingAnnotation>> {
    let annotation = state.store.set_assignee(&finding_id, &body.assignee);
    Json(MutationResponse {
        data: annotation,
        version: state.store.version(),
    })
}

/// PUT /annotations/{finding_id}/status
pub async fn set_status(
    State(state): State<AppState>,
    Path(finding_id): Path<String>,
    Json(body): Json<SetStatusRequest>,
) -> AppResult<Json<MutationResponse<FindingAnnotation>>> {
    let status = LocalStatus::from_str(&body.status)?;

    let annotation = state.store.set_local_status(&finding_id, status);
    Ok(Json(MutationResponse {
        data: annotation,
        version: state.store.version(),
    }))
}

/// PUT /annotations/{finding_id} -- generic save. Saving a degenerate
/// record (no assignee, no notes, status `none`) prunes it, so `data`
/// comes back null and a subsequent lookup reports absent.
pub async fn save(
    State(state): State<AppState>,
    Path(finding_id): Path<String>,
    Json(body): Json<SaveAnnotationRequest>,
) -> AppResult<Json<MutationResponse<Option<FindingAnnotation>>>> {
    let local_status = LocalStatus::from_str(&body.local_status)?;

    let annotation = FindingAnnotation {
        assignee: body.assignee,
        notes: body.notes,
        local_status,
        updated_at: chrono::Utc::now(),
    };
    let saved = state.store.save(&finding_id, annotation);
    Ok(Json(MutationResponse {
        data: saved,
        version: state.store.version(),
    }))
}

/// DELETE /annotations/{finding_id} -- idempotent.
pub async fn delete(
    State(state): State<AppState>,
    Path(finding_id): Path<String>,
) -> StatusCode {
    state.store.delete(&finding_id);
    StatusCode::NO_CONTENT
}

// ---------------------------------------------------------------------------
// Bulk mutations
// ---------------------------------------------------------------------------

/// POST /annotations/bulk/notes -- one note per finding, one shared
/// timestamp, one persisted write.
pub async fn bulk_add_note(
    State(state): State<AppState>,
    Json(body): Json<BulkAddNoteRequest>,
) -> AppResult<Json<MutationResponse<Vec<FindingAnnotation>>>> {
    require_note_text(&body.text)?;
    let author = body.author.as_deref().unwrap_or(DEFAULT_NOTE_AUTHOR);

    let annotations = state
        .store
        .bulk_add_note(&body.finding_ids, &body.text, author);
    Ok(Json(MutationResponse {
        data: annotations,
        version: state.store.version(),
    }))
}

/// POST /annotations/bulk/assignee
pub async fn bulk_set_assignee(
    State(state): State<AppState>,
    Json(body): Json<BulkSetAssigneeRequest>,
) -> Json<MutationResponse<Vec<FindingAnnotation>>> {
    let annotations = state
        .store
        .bulk_set_assignee(&body.finding_ids, &body.assignee);
    Json(MutationResponse {
        data: annotations,
        version: state.store.version(),
    })
}

/// POST /annotations/bulk/status
pub async fn bulk_set_status(
    State(state): State<AppState>,
    Json(body): Json<BulkSetStatusRequest>,
) -> AppResult<Json<MutationResponse<Vec<FindingAnnotation>>>> {
    let status = LocalStatus::from_str(&body.status)?;

    let annotations = state
        .store
        .bulk_set_local_status(&body.finding_ids, status);
    Ok(Json(MutationResponse {
        data: annotations,
        version: state.store.version(),
    }))
}
