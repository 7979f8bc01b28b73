//! Heartbeat loop with optional data-file updates and crash simulation.

use std::path::PathBuf;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};

use crate::client::{HeartbeatClient, HeartbeatPayload, SimError};
use crate::feeder;

#[derive(Debug, Clone)]
pub struct Scenario {
    pub component_id: String,
    pub declared_level: Option<i64>,
    pub heartbeat_interval: Duration,
    /// Stop after this many heartbeats; run until interrupted when `None`.
    pub max_iterations: Option<u64>,
    /// Report `process_exists = false` from this heartbeat count on.
    pub crash_after: Option<u64>,
    pub data_file: Option<PathBuf>,
    pub file_interval: Duration,
}

impl Scenario {
    /// Whether heartbeat number `sent` (zero-based) reports a dead process.
    pub fn crashed_at(&self, sent: u64) -> bool {
        self.crash_after.is_some_and(|n| sent >= n)
    }

    pub fn finished_at(&self, sent: u64) -> bool {
        self.max_iterations.is_some_and(|n| sent >= n)
    }
}

/// Summary returned when the loop ends.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub heartbeats_sent: u64,
    pub heartbeats_failed: u64,
    pub rows_written: u64,
}

/// Run the scenario until `max_iterations` is reached or ctrl-c arrives.
///
/// Transport and file errors are logged; the loop keeps going.
pub async fn run(scenario: Scenario, client: HeartbeatClient) -> Result<RunSummary, SimError> {
    if let Some(path) = &scenario.data_file {
        feeder::ensure_file(path)?;
    }

    let mut heartbeat_ticker = time::interval(scenario.heartbeat_interval);
    heartbeat_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut file_ticker = time::interval(scenario.file_interval);
    file_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut summary = RunSummary::default();
    let mut attempts = 0u64;

    info!(
        component_id = %scenario.component_id,
        url = %client.url(),
        interval_secs = scenario.heartbeat_interval.as_secs_f64(),
        "simulator started"
    );

    loop {
        if scenario.finished_at(attempts) {
            info!(attempts, "max iterations reached");
            break;
        }

        tokio::select! {
            _ = heartbeat_ticker.tick() => {
                let crashed = scenario.crashed_at(attempts);
                if crashed && scenario.crash_after == Some(attempts) {
                    warn!(component_id = %scenario.component_id, "simulating crash");
                }
                let payload = HeartbeatPayload::now(!crashed, scenario.declared_level);
                attempts += 1;
                match client.send(&payload).await {
                    Ok(()) => {
                        summary.heartbeats_sent += 1;
                        info!(
                            seq = attempts,
                            process_exists = payload.process_exists,
                            declared_level = ?payload.declared_level,
                            "heartbeat sent"
                        );
                    }
                    Err(e) => {
                        summary.heartbeats_failed += 1;
                        warn!(seq = attempts, error = %e, "heartbeat failed");
                    }
                }
            }
            _ = file_ticker.tick(), if scenario.data_file.is_some() => {
                if let Some(path) = &scenario.data_file {
                    match feeder::append_row(path, summary.rows_written) {
                        Ok(_) => {
                            summary.rows_written += 1;
                            info!(path = %path.display(), rows = summary.rows_written, "data file updated");
                        }
                        Err(e) => warn!(path = %path.display(), error = %e, "data file update failed"),
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }

    Ok(summary)
}
