//! Handlers for the credentials settings flow.
//!
//! Credentials gate all upstream access. The GET reports per-field
//! presence so the settings view can say exactly which half is missing;
//! the POST validates the pair against the real token endpoint before
//! storing it for the rest of the process lifetime (no persistence).

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use mspdash_blumira::CredentialStatus;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetCredentialsRequest {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Serialize)]
pub struct SetCredentialsResponse {
    pub success: bool,
    pub message: &'static str,
}

/// GET /credentials -- presence flags only, never the values.
pub async fn get_status(State(state): State<AppState>) -> Json<CredentialStatus> {
    Json(state.blumira.credentials().status())
}

/// POST /credentials -- validate against the token endpoint, then store.
///
/// A rejection by the token endpoint comes back as 502 with the upstream
/// detail; the credentials are only stored (and the cached token from any
/// previous pair invalidated) after a successful exchange.
pub async fn set_credentials(
    State(state): State<AppState>,
    Json(body): Json<SetCredentialsRequest>,
) -> AppResult<Json<SetCredentialsResponse>> {
    if body.client_id.is_empty() || body.client_secret.is_empty() {
        return Err(AppError::BadRequest(
            "client_id and client_secret are required".into(),
        ));
    }

    state
        .blumira
        .validate_credentials(&body.client_id, &body.client_secret)
        .await?;

    state
        .blumira
        .credentials()
        .set(body.client_id, body.client_secret);
    state.blumira.invalidate_token();

    Ok(Json(SetCredentialsResponse {
        success: true,
        message: "Credentials validated and set for this session",
    }))
}
