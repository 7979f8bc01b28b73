//! Service banner and health endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use crate::state::{AppState, DriverSnapshot};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize)]
pub struct ServiceHealth {
    pub store: StoreHealth,
    pub driver: DriverSnapshot,
}

#[derive(Serialize)]
pub struct StoreHealth {
    pub backend: String,
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub services: ServiceHealth,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let store = state.snapshots.store();
    let ping = store.ping().await;
    let status = if ping.is_ok() { "ok" } else { "degraded" };
    Json(HealthResponse {
        status,
        version: VERSION,
        services: ServiceHealth {
            store: StoreHealth {
                backend: store.backend_name().to_string(),
                reachable: ping.is_ok(),
                error: ping.err().map(|e| e.to_string()),
            },
            driver: state.driver.snapshot().await,
        },
    })
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "vigil",
        "version": VERSION,
        "endpoints": {
            "health": "/health",
            "heartbeat": "/api/v1/heartbeat/{component_id}",
            "status": "/api/v1/status",
            "component_status": "/api/v1/status/{component_id}",
        }
    }))
}
