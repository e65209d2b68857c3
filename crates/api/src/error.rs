use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use mspdash_blumira::BlumiraError;
use mspdash_core::error::CoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`BlumiraError`] for upstream
/// failures, and adds HTTP-specific variants. Implements [`IntoResponse`]
/// to produce consistent JSON error responses.
///
/// Note the annotation store has no variant here: its operations are total
/// and never surface a failure to handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `mspdash_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An upstream API error from `mspdash_blumira`.
    #[error(transparent)]
    Blumira(#[from] BlumiraError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Upstream errors ---
            AppError::Blumira(err) => classify_blumira_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify an upstream error into an HTTP status, error code, and message.
///
/// - Missing credentials map to 503 with a distinct code so the UI routes
///   the operator to the settings flow rather than showing a retry.
/// - Rejected credentials and failed REST calls map to 502 carrying the
///   upstream status and body text for the operator-visible error message.
fn classify_blumira_error(err: &BlumiraError) -> (StatusCode, &'static str, String) {
    match err {
        BlumiraError::MissingCredentials => (
            StatusCode::SERVICE_UNAVAILABLE,
            "MISSING_CREDENTIALS",
            err.to_string(),
        ),
        BlumiraError::Authentication { .. } => (
            StatusCode::BAD_GATEWAY,
            "AUTHENTICATION_FAILED",
            err.to_string(),
        ),
        BlumiraError::Api { .. } => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", err.to_string()),
        BlumiraError::Request(inner) => {
            tracing::warn!(error = %inner, "Upstream request failed");
            (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_UNREACHABLE",
                err.to_string(),
            )
        }
        BlumiraError::Decode(inner) => {
            tracing::warn!(error = %inner, "Upstream response did not match expected shape");
            (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", err.to_string())
        }
    }
}
