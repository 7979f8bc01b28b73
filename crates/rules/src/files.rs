//! File freshness evaluation against expected update cadences.

use std::fs;
use std::io;

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};

use vigil_core::{ComponentFileStatus, FileObservation};

use crate::plan::{FileComponent, FileSpec};

pub const ALERT_FILE_MISSING: &str = "file missing";

/// Evaluate one monitored file at `now`.
///
/// Filesystem failures never propagate: a missing file and an unreadable one
/// both become non-compliant observations carrying an alert.
pub fn evaluate_file(spec: &FileSpec, now: DateTime<FixedOffset>) -> FileObservation {
    let meta = match fs::metadata(&spec.path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return absent(spec, now, ALERT_FILE_MISSING.to_string());
        }
        Err(e) => return absent(spec, now, access_alert(&e)),
    };
    match meta.modified() {
        Ok(mtime) => {
            let last_modified = DateTime::<Utc>::from(mtime).with_timezone(now.offset());
            assess_freshness(spec, last_modified, meta.len(), now)
        }
        Err(e) => absent(spec, now, access_alert(&e)),
    }
}

/// Judge a known modification time against the cadence.
///
/// The file is compliant when `last_modified >= last_expected - grace_period`,
/// where `last_expected` is the most recent trigger at or before `now`.
pub fn assess_freshness(
    spec: &FileSpec,
    last_modified: DateTime<FixedOffset>,
    size: u64,
    now: DateTime<FixedOffset>,
) -> FileObservation {
    let next_expected = next_expected(spec, now);
    let mut observation = FileObservation {
        path: spec.path.display().to_string(),
        role: spec.role,
        cadence_expression: spec.cadence.expression().to_string(),
        last_modified: Some(last_modified),
        size,
        compliant: false,
        next_expected,
        alert: None,
    };

    // Plans are rejected at load when a cadence has no trigger before the load instant.
    let Some(last_expected) = spec.cadence.previous_trigger(&now) else {
        observation.alert = Some(format!(
            "cadence '{}' has no trigger at or before {}",
            spec.cadence.expression(),
            now.to_rfc3339()
        ));
        return observation;
    };

    let Some(deadline) = last_expected.checked_sub_signed(spec.grace_period) else {
        observation.alert = Some(format!(
            "grace period of {}s reaches before the earliest representable time",
            spec.grace_period.num_seconds()
        ));
        return observation;
    };
    observation.compliant = last_modified >= deadline;
    if !observation.compliant {
        let overdue = (now - last_expected).num_seconds();
        observation.alert = Some(format!(
            "file overdue by {overdue}s: last modified {}, expected update at {}, deadline {}",
            last_modified.to_rfc3339(),
            last_expected.to_rfc3339(),
            deadline.to_rfc3339(),
        ));
    }
    observation
}

/// Evaluate every input and output file of one component.
pub fn evaluate_component_files(
    component: &FileComponent,
    now: DateTime<FixedOffset>,
) -> ComponentFileStatus {
    let eval = |specs: &[FileSpec]| -> Vec<FileObservation> {
        specs.iter().map(|s| evaluate_file(s, now)).collect()
    };
    ComponentFileStatus::new(
        component.component_id.clone(),
        eval(&component.input_files),
        eval(&component.output_files),
        now,
    )
}

/// Non-compliant status for a component whose evaluation could not finish.
/// Every configured file carries `alert`.
pub fn degraded_component_files(
    component: &FileComponent,
    now: DateTime<FixedOffset>,
    alert: &str,
) -> ComponentFileStatus {
    let degrade = |specs: &[FileSpec]| -> Vec<FileObservation> {
        specs
            .iter()
            .map(|s| absent(s, now, alert.to_string()))
            .collect()
    };
    ComponentFileStatus::new(
        component.component_id.clone(),
        degrade(&component.input_files),
        degrade(&component.output_files),
        now,
    )
}

fn absent(spec: &FileSpec, now: DateTime<FixedOffset>, alert: String) -> FileObservation {
    FileObservation {
        path: spec.path.display().to_string(),
        role: spec.role,
        cadence_expression: spec.cadence.expression().to_string(),
        last_modified: None,
        size: 0,
        compliant: false,
        next_expected: next_expected(spec, now),
        alert: Some(alert),
    }
}

fn access_alert(e: &io::Error) -> String {
    format!("cannot access file: {e}")
}

fn next_expected(spec: &FileSpec, now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    // Plans are rejected at load when a cadence has no upcoming trigger.
    spec.cadence
        .next_trigger(&now)
        .unwrap_or(now + TimeDelta::seconds(1))
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::path::Path;
    use std::time::SystemTime;

    use tempfile::TempDir;

    use vigil_core::FileRole;

    use super::*;
    use crate::cadence::Cadence;

    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2025-01-06T10:07:30+08:00").unwrap()
    }

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn spec(path: &Path, cron: &str, grace_secs: i64) -> FileSpec {
        FileSpec {
            path: path.to_path_buf(),
            role: FileRole::Input,
            cadence: Cadence::parse(cron).unwrap(),
            grace_period: TimeDelta::seconds(grace_secs),
        }
    }

    fn touch(path: &Path, modified: DateTime<FixedOffset>) {
        let file = File::create(path).unwrap();
        let mtime: SystemTime = modified.with_timezone(&Utc).into();
        file.set_modified(mtime).unwrap();
    }

    #[test]
    fn fresh_file_is_compliant() {
        let dir = TempDir::new().expect("create tempdir");
        let path = dir.path().join("orders.csv");
        touch(&path, at("2025-01-06T10:06:00+08:00"));

        let obs = evaluate_file(&spec(&path, "*/5 * * * *", 60), now());
        assert!(obs.compliant);
        assert_eq!(obs.alert, None);
        assert_eq!(obs.last_modified, Some(at("2025-01-06T10:06:00+08:00")));
        assert_eq!(obs.next_expected, at("2025-01-06T10:10:00+08:00"));
        assert_eq!(obs.size, 0);
    }

    #[test]
    fn stale_file_reports_overdue_details() {
        let dir = TempDir::new().expect("create tempdir");
        let path = dir.path().join("orders.csv");
        std::fs::write(&path, b"id,qty\n").unwrap();
        let file = File::options().write(true).open(&path).unwrap();
        file.set_modified(at("2025-01-06T09:50:00+08:00").with_timezone(&Utc).into())
            .unwrap();

        let obs = evaluate_file(&spec(&path, "*/5 * * * *", 60), now());
        assert!(!obs.compliant);
        assert_eq!(obs.size, 7);
        let alert = obs.alert.unwrap();
        // now - last_expected = 10:07:30 - 10:05:00
        assert!(alert.contains("overdue by 150s"), "{alert}");
        assert!(alert.contains("2025-01-06T09:50:00+08:00"), "{alert}");
        assert!(alert.contains("2025-01-06T10:04:00+08:00"), "{alert}");
    }

    #[test]
    fn missing_file_is_non_compliant() {
        let dir = TempDir::new().expect("create tempdir");
        let obs = evaluate_file(&spec(&dir.path().join("absent.csv"), "*/5 * * * *", 60), now());
        assert!(!obs.compliant);
        assert_eq!(obs.last_modified, None);
        assert_eq!(obs.size, 0);
        assert_eq!(obs.alert.as_deref(), Some(ALERT_FILE_MISSING));
        assert_eq!(obs.next_expected, at("2025-01-06T10:10:00+08:00"));
    }

    #[test]
    fn inaccessible_path_is_recovered() {
        let dir = TempDir::new().expect("create tempdir");
        let blocker = dir.path().join("plain_file");
        std::fs::write(&blocker, b"x").unwrap();
        // A path below a regular file fails with NotADirectory, not NotFound.
        let obs = evaluate_file(&spec(&blocker.join("child.csv"), "*/5 * * * *", 60), now());
        assert!(!obs.compliant);
        assert_eq!(obs.last_modified, None);
        assert!(obs.alert.unwrap().starts_with("cannot access file:"));
    }

    #[test]
    fn deadline_is_inclusive() {
        let s = spec(Path::new("/unused"), "*/5 * * * *", 60);
        let deadline = at("2025-01-06T10:04:00+08:00");

        let on_deadline = assess_freshness(&s, deadline, 1, now());
        assert!(on_deadline.compliant);

        let just_before = assess_freshness(&s, deadline - TimeDelta::nanoseconds(1), 1, now());
        assert!(!just_before.compliant);
    }

    #[test]
    fn grace_period_shifts_deadline_earlier() {
        let s = spec(Path::new("/unused"), "*/5 * * * *", 300);
        // last_expected 10:05, grace 5 min: deadline 10:00
        assert!(assess_freshness(&s, at("2025-01-06T10:00:00+08:00"), 1, now()).compliant);
        assert!(!assess_freshness(&s, at("2025-01-06T09:59:59+08:00"), 1, now()).compliant);
    }

    #[test]
    fn unrepresentable_deadline_is_an_alert() {
        let mut s = spec(Path::new("/unused"), "*/5 * * * *", 0);
        s.grace_period = TimeDelta::seconds(9_000_000_000_000);
        let obs = assess_freshness(&s, now(), 1, now());
        assert!(!obs.compliant);
        assert!(obs.alert.unwrap().contains("grace period"));
    }

    #[test]
    fn trigger_exactly_now_counts_as_last_expected() {
        let s = spec(Path::new("/unused"), "*/5 * * * *", 0);
        let now = at("2025-01-06T10:05:00+08:00");
        assert!(assess_freshness(&s, now, 1, now).compliant);
        let obs = assess_freshness(&s, at("2025-01-06T10:04:59+08:00"), 1, now);
        assert!(!obs.compliant);
        assert_eq!(obs.next_expected, at("2025-01-06T10:10:00+08:00"));
    }

    #[test]
    fn next_expected_is_strictly_after_now() {
        let s = spec(Path::new("/unused"), "*/5 * * * *", 60);
        for t in ["2025-01-06T10:05:00+08:00", "2025-01-06T10:09:59+08:00"] {
            let now = at(t);
            assert!(assess_freshness(&s, now, 0, now).next_expected > now);
        }
    }

    #[test]
    fn five_minute_cadence_with_recent_update_is_compliant() {
        let dir = TempDir::new().expect("create tempdir");
        let path = dir.path().join("market_data.csv");
        let now = at("2025-01-06T10:09:00+08:00");
        touch(&path, now - TimeDelta::seconds(270));

        let obs = evaluate_file(&spec(&path, "*/5 * * * *", 60), now);
        assert!(obs.compliant);
        assert_eq!(obs.alert, None);
        assert!(obs.next_expected >= now + TimeDelta::seconds(30));
        assert!(obs.next_expected <= now + TimeDelta::minutes(5));
    }

    #[test]
    fn repeated_evaluation_is_identical() {
        let dir = TempDir::new().expect("create tempdir");
        let fresh = dir.path().join("fresh.csv");
        touch(&fresh, at("2025-01-06T10:06:00+08:00"));
        let stale = dir.path().join("stale.csv");
        touch(&stale, at("2025-01-06T09:00:00+08:00"));

        for path in [fresh, stale, dir.path().join("absent.csv")] {
            let s = spec(&path, "*/5 * * * *", 60);
            assert_eq!(evaluate_file(&s, now()), evaluate_file(&s, now()));
        }

        let component = FileComponent {
            component_id: "feeder".into(),
            input_files: vec![spec(&dir.path().join("fresh.csv"), "*/5 * * * *", 60)],
            output_files: vec![spec(&dir.path().join("stale.csv"), "*/5 * * * *", 60)],
        };
        assert_eq!(
            evaluate_component_files(&component, now()),
            evaluate_component_files(&component, now())
        );
    }

    #[test]
    fn component_health_is_and_of_files() {
        let dir = TempDir::new().expect("create tempdir");
        let fresh = dir.path().join("fresh.csv");
        touch(&fresh, at("2025-01-06T10:06:00+08:00"));

        let mut output = spec(&dir.path().join("missing.csv"), "*/5 * * * *", 60);
        output.role = FileRole::Output;
        let component = FileComponent {
            component_id: "trade_engine".into(),
            input_files: vec![spec(&fresh, "*/5 * * * *", 60)],
            output_files: vec![output],
        };

        let status = evaluate_component_files(&component, now());
        assert_eq!(status.component_id, "trade_engine");
        assert!(status.input_files[0].compliant);
        assert!(!status.output_files[0].compliant);
        assert_eq!(status.output_files[0].role, FileRole::Output);
        assert!(!status.overall_file_health);
        assert_eq!(status.checked_at, now());
    }

    #[test]
    fn component_without_files_is_healthy() {
        let component = FileComponent {
            component_id: "idle".into(),
            input_files: vec![],
            output_files: vec![],
        };
        assert!(evaluate_component_files(&component, now()).overall_file_health);
    }

    #[test]
    fn degraded_status_marks_every_file() {
        let component = FileComponent {
            component_id: "slow".into(),
            input_files: vec![spec(Path::new("/a"), "*/5 * * * *", 60)],
            output_files: vec![spec(Path::new("/b"), "*/5 * * * *", 60)],
        };
        let status = degraded_component_files(&component, now(), "evaluation timed out");
        assert!(!status.overall_file_health);
        assert!(status
            .observations()
            .all(|o| o.alert.as_deref() == Some("evaluation timed out") && !o.compliant));
    }
}
