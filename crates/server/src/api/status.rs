//! Aggregated status reads.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;

use vigil_core::{ComponentStatus, StatusOverview};

use crate::state::AppState;

use super::{status_error, ApiError};

pub async fn all_statuses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusOverview>, ApiError> {
    state
        .status
        .all_statuses(Utc::now())
        .await
        .map(Json)
        .map_err(status_error)
}

pub async fn component_status(
    State(state): State<Arc<AppState>>,
    Path(component_id): Path<String>,
) -> Result<Json<ComponentStatus>, ApiError> {
    state
        .status
        .component_status(&component_id, Utc::now())
        .await
        .map(Json)
        .map_err(status_error)
}
