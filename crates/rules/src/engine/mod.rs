//! Tick evaluation: runs every configured component through the file and
//! level evaluators and writes the resulting snapshots.
//!
//! The engine owns no schedule. A driver (the server's background loop, a
//! one-shot CLI invocation, or an external cron daemon) calls
//! [`ComplianceEngine::evaluate_tick`] whenever a tick is due.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use futures::future::{join, join_all};
use serde::Serialize;
use tracing::{debug, info, warn};

use vigil_core::{ComponentFileStatus, LevelStatus};
use vigil_storage::{Snapshots, StoreError};

use crate::files::{degraded_component_files, evaluate_component_files};
use crate::level::{degraded_level, evaluate_level, DeclaredLevelObserver, LevelObserver};
use crate::plan::{FileComponent, LevelComponent, MonitorPlan};

#[cfg(test)]
mod tests;

/// Per-component evaluation budget.
pub const DEFAULT_EVALUATION_TIMEOUT: Duration = Duration::from_secs(10);

pub const ALERT_TIMED_OUT: &str = "evaluation timed out";

/// Summary of one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub checked_at: DateTime<FixedOffset>,
    /// Components evaluated for file freshness.
    pub file_components: usize,
    /// Components evaluated for level compliance.
    pub level_components: usize,
    /// Components for which at least one evaluation hit the timeout.
    pub timed_out: Vec<String>,
    /// Components for which at least one snapshot write failed.
    pub write_failures: Vec<String>,
}

impl TickReport {
    /// No timeouts and no failed writes.
    pub fn is_clean(&self) -> bool {
        self.timed_out.is_empty() && self.write_failures.is_empty()
    }
}

/// Blocking evaluation of one component's files.
type FileEvaluator = fn(&FileComponent, DateTime<FixedOffset>) -> ComponentFileStatus;

struct Outcome {
    component_id: String,
    timed_out: bool,
    write_failed: bool,
}

/// Evaluates the monitor plan and records snapshots.
pub struct ComplianceEngine {
    plan: Arc<MonitorPlan>,
    snapshots: Snapshots,
    observer: Arc<dyn LevelObserver>,
    offset: FixedOffset,
    timeout: Duration,
    evaluate_files: FileEvaluator,
}

impl ComplianceEngine {
    /// `offset` is the local offset in which cadences and time-of-day rules
    /// are evaluated.
    pub fn new(plan: MonitorPlan, snapshots: Snapshots, offset: FixedOffset) -> Self {
        Self {
            plan: Arc::new(plan),
            snapshots,
            observer: Arc::new(DeclaredLevelObserver),
            offset,
            timeout: DEFAULT_EVALUATION_TIMEOUT,
            evaluate_files: evaluate_component_files,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn LevelObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_file_evaluator(mut self, evaluate_files: FileEvaluator) -> Self {
        self.evaluate_files = evaluate_files;
        self
    }

    pub fn plan(&self) -> &MonitorPlan {
        &self.plan
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Evaluate every configured component once at `now`.
    ///
    /// Components run concurrently, each under its own timeout. Neither a
    /// timeout nor a failed write aborts the tick; both are logged and
    /// listed in the report.
    pub async fn evaluate_tick(&self, now: DateTime<Utc>) -> TickReport {
        let checked_at = now.with_timezone(&self.offset);

        let files = join_all(
            self.plan
                .file_components
                .iter()
                .map(|c| self.run_file_component(c, checked_at)),
        );
        let levels = join_all(
            self.plan
                .level_components
                .iter()
                .map(|c| self.run_level_component(c, checked_at)),
        );
        let (files, levels) = join(files, levels).await;

        let mut timed_out = Vec::new();
        let mut write_failures = Vec::new();
        for outcome in files.iter().chain(levels.iter()) {
            if outcome.timed_out {
                timed_out.push(outcome.component_id.clone());
            }
            if outcome.write_failed {
                write_failures.push(outcome.component_id.clone());
            }
        }
        for ids in [&mut timed_out, &mut write_failures] {
            ids.sort();
            ids.dedup();
        }

        let report = TickReport {
            checked_at,
            file_components: files.len(),
            level_components: levels.len(),
            timed_out,
            write_failures,
        };
        info!(
            checked_at = %report.checked_at,
            file_components = report.file_components,
            level_components = report.level_components,
            timed_out = report.timed_out.len(),
            write_failures = report.write_failures.len(),
            "compliance tick complete"
        );
        report
    }

    async fn run_file_component(
        &self,
        component: &FileComponent,
        now: DateTime<FixedOffset>,
    ) -> Outcome {
        let id = component.component_id.as_str();

        // Filesystem metadata calls block; keep them off the async workers.
        let owned = component.clone();
        let evaluate_files = self.evaluate_files;
        let task = tokio::task::spawn_blocking(move || evaluate_files(&owned, now));

        let (status, timed_out) = match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(status)) => (status, false),
            Ok(Err(e)) => {
                warn!(component_id = %id, error = %e, "file evaluation failed");
                let alert = format!("evaluation failed: {e}");
                (degraded_component_files(component, now, &alert), false)
            }
            Err(_) => {
                warn!(component_id = %id, timeout = ?self.timeout, "file evaluation timed out");
                (degraded_component_files(component, now, ALERT_TIMED_OUT), true)
            }
        };
        log_file_status(&status);

        let write_failed = self
            .write(id, "file status", self.snapshots.record_file_status(id, &status))
            .await;
        Outcome {
            component_id: id.to_string(),
            timed_out,
            write_failed,
        }
    }

    async fn run_level_component(
        &self,
        component: &LevelComponent,
        now: DateTime<FixedOffset>,
    ) -> Outcome {
        let id = component.component_id.as_str();

        let evaluation = async {
            let declared = match self.snapshots.heartbeat(id).await {
                Ok(heartbeat) => heartbeat.and_then(|h| h.declared_level),
                Err(e) => {
                    warn!(component_id = %id, error = %e, "heartbeat read failed, evaluating without declared level");
                    None
                }
            };
            evaluate_level(id, &component.schedule, declared, self.observer.as_ref(), now)
        };

        let (status, timed_out) = match tokio::time::timeout(self.timeout, evaluation).await {
            Ok(status) => (status, false),
            Err(_) => {
                warn!(component_id = %id, timeout = ?self.timeout, "level evaluation timed out");
                (degraded_level(id, &component.schedule, now, ALERT_TIMED_OUT), true)
            }
        };
        log_level_status(&status);

        let write_failed = self
            .write(id, "level status", self.snapshots.record_level_status(id, &status))
            .await;
        Outcome {
            component_id: id.to_string(),
            timed_out,
            write_failed,
        }
    }

    /// Await a snapshot write under the evaluation timeout. Returns `true` on failure.
    async fn write(
        &self,
        component_id: &str,
        what: &str,
        op: impl Future<Output = Result<(), StoreError>>,
    ) -> bool {
        match tokio::time::timeout(self.timeout, op).await {
            Ok(Ok(())) => false,
            Ok(Err(e)) => {
                warn!(component_id = %component_id, error = %e, "failed to write {what}");
                true
            }
            Err(_) => {
                warn!(component_id = %component_id, "timed out writing {what}");
                true
            }
        }
    }
}

fn log_file_status(status: &ComponentFileStatus) {
    for obs in status.observations().filter(|o| !o.compliant) {
        debug!(
            component_id = %status.component_id,
            path = %obs.path,
            role = %obs.role,
            alert = obs.alert.as_deref().unwrap_or(""),
            "file non-compliant"
        );
    }
}

fn log_level_status(status: &LevelStatus) {
    if !status.compliant {
        debug!(
            component_id = %status.component_id,
            expected = status.expected_level,
            observed = status.observed_level,
            rule = status.matched_rule_name.as_deref().unwrap_or("-"),
            "level non-compliant"
        );
    }
}
