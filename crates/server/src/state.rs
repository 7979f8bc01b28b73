//! Shared application state for handlers, the tick driver and startup.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::FixedOffset;
use serde::Serialize;
use tokio::sync::RwLock;

use vigil_core::Config;
use vigil_rules::{ComplianceEngine, HeartbeatPolicy, MonitorPlan, StatusService, TickReport};
use vigil_storage::{SnapshotStore, Snapshots};

pub struct AppState {
    pub config: Config,
    pub offset: FixedOffset,
    pub snapshots: Snapshots,
    pub engine: Arc<ComplianceEngine>,
    pub status: StatusService,
    pub driver: DriverStatus,
}

impl AppState {
    /// Wire the engine and status service around one snapshot store.
    pub fn assemble(
        config: Config,
        plan: MonitorPlan,
        store: Arc<dyn SnapshotStore>,
        offset: FixedOffset,
    ) -> Self {
        let monitor = &config.monitor;
        let snapshots = Snapshots::new(store).with_heartbeat_ttl(monitor.heartbeat_ttl());
        let engine = ComplianceEngine::new(plan, snapshots.clone(), offset)
            .with_timeout(monitor.evaluation_timeout());
        let status = StatusService::new(
            snapshots.clone(),
            HeartbeatPolicy::new(monitor.heartbeat_interval()),
            offset,
        );
        Self {
            config,
            offset,
            snapshots,
            engine: Arc::new(engine),
            status,
            driver: DriverStatus::default(),
        }
    }
}

// ── Driver status ─────────────────────────────────────────────────

/// Progress of the in-process tick driver, surfaced on `/health`.
#[derive(Default)]
pub struct DriverStatus {
    running: AtomicBool,
    ticks: AtomicU64,
    last_report: RwLock<Option<TickReport>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DriverSnapshot {
    pub running: bool,
    pub ticks: u64,
    pub last_tick: Option<TickReport>,
}

impl DriverStatus {
    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub async fn record(&self, report: TickReport) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        *self.last_report.write().await = Some(report);
    }

    pub async fn snapshot(&self) -> DriverSnapshot {
        DriverSnapshot {
            running: self.is_running(),
            ticks: self.ticks.load(Ordering::Relaxed),
            last_tick: self.last_report.read().await.clone(),
        }
    }
}
