//! Server startup: plan loading, store connection, state assembly.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tracing::{info, warn};

use vigil_core::Config;
use vigil_rules::MonitorPlan;
use vigil_storage::open_store;

use crate::state::AppState;

/// Load and validate both plan files. Any problem is fatal.
pub fn load_plan(config: &Config) -> anyhow::Result<MonitorPlan> {
    let monitor = &config.monitor;
    let offset = monitor.offset()?;
    let plan = MonitorPlan::load(
        &monitor.file_monitor_plan_path,
        &monitor.level_schedule_path,
        Utc::now().with_timezone(&offset),
    )
    .context("invalid monitor plan")?;
    if plan.is_empty() {
        warn!("monitor plan is empty, ticks will evaluate nothing");
    }
    Ok(plan)
}

/// Build the shared state: plan, snapshot store, engine and status service.
pub async fn build_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let offset = config.monitor.offset()?;
    let plan = load_plan(&config)?;

    let store = open_store(&config.store)
        .await
        .context("failed to open snapshot store")?;
    // An unreachable store is not fatal; reads and writes report it per request.
    match store.ping().await {
        Ok(()) => info!(backend = store.backend_name(), "snapshot store reachable"),
        Err(e) => warn!(backend = store.backend_name(), error = %e, "snapshot store ping failed"),
    }

    Ok(Arc::new(AppState::assemble(config, plan, store, offset)))
}
