//! HTTP endpoints.
//!
//! Each sub-module owns a single responsibility area.
//! Shared error types live here in mod.rs.

mod health;
mod heartbeat;
mod status;


use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::warn;

use vigil_rules::StatusError;

// ── Shared types ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

impl From<StatusError> for ErrorResponse {
    fn from(e: StatusError) -> Self {
        Self {
            error: e.to_string(),
        }
    }
}

pub(crate) fn status_error(e: StatusError) -> ApiError {
    let code = match &e {
        StatusError::NotFound(_) => StatusCode::NOT_FOUND,
        StatusError::InvalidComponentId(_) => StatusCode::BAD_REQUEST,
        StatusError::Store(err) => {
            warn!(error = %err, "snapshot store read failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    };
    (code, Json(e.into()))
}

// ── Re-exports ───────────────────────────────────────────────────

pub use health::{health, root};
pub use heartbeat::receive_heartbeat;
pub use status::{all_statuses, component_status};
