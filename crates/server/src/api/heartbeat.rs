//! Heartbeat ingestion.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use vigil_core::{is_valid_component_id, is_valid_level, HeartbeatSnapshot};

use crate::state::AppState;

use super::{api_error, ApiError};

#[derive(Debug, Deserialize)]
pub struct HeartbeatRequest {
    pub process_exists: bool,
    /// RFC 3339 timestamp from the component's clock.
    pub timestamp: String,
    #[serde(default)]
    pub declared_level: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HeartbeatResponse {
    pub success: bool,
    pub message: &'static str,
    pub component_id: String,
    pub received_at: String,
}

pub async fn receive_heartbeat(
    State(state): State<Arc<AppState>>,
    Path(component_id): Path<String>,
    Json(req): Json<HeartbeatRequest>,
) -> Result<Json<HeartbeatResponse>, ApiError> {
    if !is_valid_component_id(&component_id) {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "invalid component id: only letters, digits, '_' and '-' are allowed",
        ));
    }
    if let Some(level) = req.declared_level {
        if !is_valid_level(level) {
            return Err(api_error(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("declared_level {level} is outside 1..=4"),
            ));
        }
    }

    let received_at = Utc::now();
    let snapshot = HeartbeatSnapshot {
        component_id: component_id.clone(),
        process_exists: req.process_exists,
        timestamp: req.timestamp,
        declared_level: req.declared_level,
        received_at,
    };
    state
        .snapshots
        .record_heartbeat(&component_id, &snapshot)
        .await
        .map_err(|e| {
            warn!(component_id = %component_id, error = %e, "failed to store heartbeat");
            api_error(StatusCode::SERVICE_UNAVAILABLE, format!("failed to store heartbeat: {e}"))
        })?;
    debug!(component_id = %component_id, process_exists = snapshot.process_exists, "heartbeat received");

    Ok(Json(HeartbeatResponse {
        success: true,
        message: "Heartbeat received",
        component_id,
        received_at: received_at.with_timezone(&state.offset).to_rfc3339(),
    }))
}
