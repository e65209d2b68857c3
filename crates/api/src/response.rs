//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope per project
//! conventions. Mutating annotation endpoints use [`MutationResponse`],
//! which additionally carries the store version after the mutation so
//! clients can invalidate any merged rows rendered from an earlier
//! snapshot before their next paint.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Envelope for annotation mutations: the resulting record(s) plus the
/// store version after the write.
#[derive(Debug, Serialize)]
pub struct MutationResponse<T: Serialize> {
    pub data: T,
    pub version: u64,
}
