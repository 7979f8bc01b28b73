//! Tests for tick evaluation.

use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use tempfile::TempDir;

use vigil_core::{FileRole, HeartbeatSnapshot};
use vigil_storage::{MemoryStore, SnapshotStore, Snapshots, StoreError};

use super::*;
use crate::cadence::Cadence;
use crate::plan::{FileSpec, LevelSchedule, ScheduleRule};
use crate::time_range::TimeRange;

/// Delegates to a [`MemoryStore`], except that heartbeat reads never complete.
struct StallingHeartbeats(MemoryStore);

#[async_trait]
impl SnapshotStore for StallingHeartbeats {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if key.starts_with("heartbeat:") {
            std::future::pending::<()>().await;
        }
        self.0.get(key).await
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), StoreError> {
        self.0.set(key, value, ttl).await
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.0.keys_with_prefix(prefix).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "stalling"
    }
}

/// Rejects writes for one component ID.
struct RejectingWrites {
    inner: MemoryStore,
    reject: &'static str,
    rejected: AtomicUsize,
}

#[async_trait]
impl SnapshotStore for RejectingWrites {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), StoreError> {
        if key.ends_with(self.reject) {
            self.rejected.fetch_add(1, Ordering::SeqCst);
            return Err(StoreError::Backend("connection reset".into()));
        }
        self.inner.set(key, value, ttl).await
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.inner.keys_with_prefix(prefix).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "rejecting"
    }
}

fn offset() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).unwrap()
}

fn local(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).unwrap()
}

fn utc(s: &str) -> DateTime<Utc> {
    local(s).with_timezone(&Utc)
}

fn touch(path: &Path, modified: DateTime<FixedOffset>) {
    let file = File::create(path).unwrap();
    let mtime: SystemTime = modified.with_timezone(&Utc).into();
    file.set_modified(mtime).unwrap();
}

fn file_spec(path: &Path, role: FileRole) -> FileSpec {
    FileSpec {
        path: path.to_path_buf(),
        role,
        cadence: Cadence::parse("*/5 * * * *").unwrap(),
        grace_period: TimeDelta::seconds(60),
    }
}

fn trading_schedule() -> LevelSchedule {
    LevelSchedule {
        rules: vec![ScheduleRule {
            name: Some("session".into()),
            range: TimeRange::parse("09:00", "15:00").unwrap(),
            expected_level: 4,
        }],
        default_level: 1,
    }
}

fn level_plan(ids: &[&str]) -> MonitorPlan {
    MonitorPlan {
        file_components: vec![],
        level_components: ids
            .iter()
            .map(|id| LevelComponent {
                component_id: id.to_string(),
                schedule: trading_schedule(),
            })
            .collect(),
    }
}

fn heartbeat(id: &str, declared_level: Option<i64>) -> HeartbeatSnapshot {
    HeartbeatSnapshot {
        component_id: id.into(),
        process_exists: true,
        timestamp: "2025-01-06T10:07:00+08:00".into(),
        declared_level,
        received_at: utc("2025-01-06T10:07:00+08:00"),
    }
}

#[tokio::test]
async fn empty_plan_produces_empty_report() {
    let snapshots = Snapshots::new(Arc::new(MemoryStore::new()));
    let engine = ComplianceEngine::new(MonitorPlan::default(), snapshots.clone(), offset());

    let report = engine.evaluate_tick(utc("2025-01-06T10:07:30+08:00")).await;
    assert_eq!(report.file_components, 0);
    assert_eq!(report.level_components, 0);
    assert!(report.is_clean());
    assert_eq!(report.checked_at, local("2025-01-06T10:07:30+08:00"));
    assert!(snapshots.component_ids().await.unwrap().is_empty());
}

#[tokio::test]
async fn writes_file_status_per_component() {
    let dir = TempDir::new().expect("create tempdir");
    let fresh = dir.path().join("orders.csv");
    touch(&fresh, local("2025-01-06T10:06:00+08:00"));

    let plan = MonitorPlan {
        file_components: vec![
            FileComponent {
                component_id: "feeder".into(),
                input_files: vec![],
                output_files: vec![file_spec(&fresh, FileRole::Output)],
            },
            FileComponent {
                component_id: "trader".into(),
                input_files: vec![
                    file_spec(&fresh, FileRole::Input),
                    file_spec(&dir.path().join("missing.csv"), FileRole::Input),
                ],
                output_files: vec![],
            },
        ],
        level_components: vec![],
    };
    let snapshots = Snapshots::new(Arc::new(MemoryStore::new()));
    let engine = ComplianceEngine::new(plan, snapshots.clone(), offset());

    let report = engine.evaluate_tick(utc("2025-01-06T10:07:30+08:00")).await;
    assert_eq!(report.file_components, 2);
    assert!(report.is_clean());

    let feeder = snapshots.file_status("feeder").await.unwrap().unwrap();
    assert!(feeder.overall_file_health);
    assert_eq!(feeder.checked_at, local("2025-01-06T10:07:30+08:00"));

    let trader = snapshots.file_status("trader").await.unwrap().unwrap();
    assert!(!trader.overall_file_health);
    assert!(trader.input_files[0].compliant);
    assert_eq!(trader.input_files[1].alert.as_deref(), Some("file missing"));
}

#[tokio::test]
async fn level_uses_declared_level_from_heartbeat() {
    let snapshots = Snapshots::new(Arc::new(MemoryStore::new()));
    snapshots
        .record_heartbeat("good", &heartbeat("good", Some(4)))
        .await
        .unwrap();
    snapshots
        .record_heartbeat("wrong", &heartbeat("wrong", Some(2)))
        .await
        .unwrap();

    let engine = ComplianceEngine::new(level_plan(&["good", "wrong", "silent"]), snapshots.clone(), offset());
    let report = engine.evaluate_tick(utc("2025-01-06T10:07:30+08:00")).await;
    assert_eq!(report.level_components, 3);
    assert!(report.is_clean());

    let good = snapshots.level_status("good").await.unwrap().unwrap();
    assert!(good.compliant);
    assert_eq!(good.matched_rule_name.as_deref(), Some("session"));

    let wrong = snapshots.level_status("wrong").await.unwrap().unwrap();
    assert!(!wrong.compliant);
    assert_eq!(wrong.observed_level, 2);

    let silent = snapshots.level_status("silent").await.unwrap().unwrap();
    assert!(!silent.compliant);
    assert_eq!(silent.observed_level, 0);
    assert_eq!(silent.declared_level, None);
}

#[tokio::test]
async fn rules_are_evaluated_in_configured_offset() {
    let snapshots = Snapshots::new(Arc::new(MemoryStore::new()));
    snapshots
        .record_heartbeat("a", &heartbeat("a", Some(1)))
        .await
        .unwrap();
    let engine = ComplianceEngine::new(level_plan(&["a"]), snapshots.clone(), offset());

    // 08:00 UTC is 16:00 at +08:00, outside the 09:00-15:00 session.
    engine.evaluate_tick(utc("2025-01-06T08:00:00Z")).await;
    let status = snapshots.level_status("a").await.unwrap().unwrap();
    assert_eq!(status.expected_level, 1);
    assert_eq!(status.matched_rule_name, None);
    assert!(status.compliant);
    assert_eq!(status.last_check.offset(), &offset());
}

#[tokio::test]
async fn custom_observer_is_consulted() {
    struct AlwaysFour;
    impl LevelObserver for AlwaysFour {
        fn observe_level(&self, _: &str, _: Option<u8>) -> u8 {
            4
        }
    }

    let snapshots = Snapshots::new(Arc::new(MemoryStore::new()));
    let engine = ComplianceEngine::new(level_plan(&["probe"]), snapshots.clone(), offset())
        .with_observer(Arc::new(AlwaysFour));
    engine.evaluate_tick(utc("2025-01-06T10:00:00+08:00")).await;

    let status = snapshots.level_status("probe").await.unwrap().unwrap();
    assert_eq!(status.observed_level, 4);
    assert!(status.compliant);
}

#[tokio::test(start_paused = true)]
async fn timed_out_component_gets_degraded_snapshot() {
    let store = Arc::new(StallingHeartbeats(MemoryStore::new()));
    let snapshots = Snapshots::new(store);
    let engine = ComplianceEngine::new(level_plan(&["stuck"]), snapshots.clone(), offset())
        .with_timeout(Duration::from_secs(2));

    let report = engine.evaluate_tick(utc("2025-01-06T10:00:00+08:00")).await;
    assert_eq!(report.timed_out, vec!["stuck"]);
    assert!(report.write_failures.is_empty());

    let status = snapshots.level_status("stuck").await.unwrap().unwrap();
    assert!(!status.compliant);
    assert_eq!(status.expected_level, 4);
    assert_eq!(status.alert.as_deref(), Some(ALERT_TIMED_OUT));
}

/// Blocks the calling thread for "stalled"; evaluates everything else normally.
fn stall_one(component: &FileComponent, now: DateTime<FixedOffset>) -> ComponentFileStatus {
    if component.component_id == "stalled" {
        std::thread::sleep(Duration::from_millis(500));
    }
    evaluate_component_files(component, now)
}

#[tokio::test]
async fn stalled_file_component_does_not_hold_up_others() {
    let dir = TempDir::new().expect("create tempdir");
    let fresh = dir.path().join("orders.csv");
    touch(&fresh, local("2025-01-06T10:06:00+08:00"));

    let component = |id: &str| FileComponent {
        component_id: id.into(),
        input_files: vec![file_spec(&fresh, FileRole::Input)],
        output_files: vec![file_spec(&fresh, FileRole::Output)],
    };
    let plan = MonitorPlan {
        file_components: vec![component("stalled"), component("healthy")],
        level_components: level_plan(&["healthy"]).level_components,
    };
    let snapshots = Snapshots::new(Arc::new(MemoryStore::new()));
    let engine = ComplianceEngine::new(plan, snapshots.clone(), offset())
        .with_timeout(Duration::from_millis(50))
        .with_file_evaluator(stall_one);

    let report = engine.evaluate_tick(utc("2025-01-06T10:07:30+08:00")).await;
    assert_eq!(report.timed_out, vec!["stalled"]);
    assert!(report.write_failures.is_empty());

    let stalled = snapshots.file_status("stalled").await.unwrap().unwrap();
    assert!(!stalled.overall_file_health);
    assert_eq!(stalled.observations().count(), 2);
    assert!(stalled
        .observations()
        .all(|o| !o.compliant && o.alert.as_deref() == Some(ALERT_TIMED_OUT)));

    let healthy = snapshots.file_status("healthy").await.unwrap().unwrap();
    assert!(healthy.overall_file_health);
    assert!(healthy.observations().all(|o| o.alert.is_none()));
    assert!(snapshots.level_status("healthy").await.unwrap().is_some());
}

#[tokio::test]
async fn write_failure_does_not_abort_tick() {
    let store = Arc::new(RejectingWrites {
        inner: MemoryStore::new(),
        reject: ":broken",
        rejected: AtomicUsize::new(0),
    });
    let snapshots = Snapshots::new(store.clone());
    let engine = ComplianceEngine::new(level_plan(&["broken", "fine"]), snapshots.clone(), offset());

    let report = engine.evaluate_tick(utc("2025-01-06T10:00:00+08:00")).await;
    assert_eq!(report.write_failures, vec!["broken"]);
    assert!(report.timed_out.is_empty());
    assert_eq!(store.rejected.load(Ordering::SeqCst), 1);
    assert!(snapshots.level_status("fine").await.unwrap().is_some());
    assert!(snapshots.level_status("broken").await.unwrap().is_none());
}

#[tokio::test]
async fn later_tick_overwrites_earlier() {
    let snapshots = Snapshots::new(Arc::new(MemoryStore::new()));
    let engine = ComplianceEngine::new(level_plan(&["a"]), snapshots.clone(), offset());

    engine.evaluate_tick(utc("2025-01-06T10:00:00+08:00")).await;
    engine.evaluate_tick(utc("2025-01-06T16:00:00+08:00")).await;

    let status = snapshots.level_status("a").await.unwrap().unwrap();
    assert_eq!(status.last_check, local("2025-01-06T16:00:00+08:00"));
    assert_eq!(status.expected_level, 1);
}
