//! In-process tick driver.
//!
//! Calls the engine's `evaluate_tick` on a fixed interval. Ticks never
//! overlap: the next one starts only after the previous one returns, and
//! missed ticks are delayed rather than bunched.

use std::sync::Arc;

use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use vigil_rules::TickReport;

use crate::state::AppState;

/// Run one tick now and record it.
pub async fn run_tick(state: &AppState) -> TickReport {
    let report = state.engine.evaluate_tick(Utc::now()).await;
    if !report.is_clean() {
        warn!(
            timed_out = ?report.timed_out,
            write_failures = ?report.write_failures,
            "tick finished with problems"
        );
    }
    state.driver.record(report.clone()).await;
    report
}

/// Main driver loop. Spawned as a tokio task.
pub async fn run_driver(state: Arc<AppState>) {
    let every = state.config.monitor.tick_interval();
    let plan = state.engine.plan();
    info!(
        "Tick driver active: {} file component(s), {} level component(s), every {}s",
        plan.file_components.len(),
        plan.level_components.len(),
        every.as_secs()
    );

    state.driver.set_running(true);
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        run_tick(&state).await;
    }
}
