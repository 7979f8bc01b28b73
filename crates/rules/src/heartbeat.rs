//! Heartbeat liveness classification.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone};

use vigil_core::{HeartbeatSnapshot, HeartbeatVerdict, StatusLevel};

/// Default interval at which components are expected to report.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Thresholds derived from the expected reporting interval `I`:
/// younger than `1.5·I` is healthy, younger than `3·I` is a warning,
/// anything older is critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatPolicy {
    interval: Duration,
}

impl Default for HeartbeatPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_HEARTBEAT_INTERVAL)
    }
}

impl HeartbeatPolicy {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn healthy_limit(&self) -> TimeDelta {
        to_delta(self.interval * 3 / 2)
    }

    fn warning_limit(&self) -> TimeDelta {
        to_delta(self.interval * 3)
    }

    /// Classify a heartbeat snapshot at `now`.
    ///
    /// A missing snapshot is `Offline`. A reported dead process is `Critical`
    /// whatever its timestamp. Otherwise an empty timestamp or one that does
    /// not parse as RFC 3339 is `Offline`. Timestamps in the future count as
    /// fresh.
    pub fn evaluate<Z: TimeZone>(
        &self,
        snapshot: Option<&HeartbeatSnapshot>,
        now: &DateTime<Z>,
    ) -> StatusLevel {
        let Some(snapshot) = snapshot else {
            return StatusLevel::Offline;
        };
        if !snapshot.process_exists {
            return StatusLevel::Critical;
        }
        let Some(reported_at) = parse_timestamp(&snapshot.timestamp) else {
            return StatusLevel::Offline;
        };

        let age = now.fixed_offset() - reported_at;
        if age < self.healthy_limit() {
            StatusLevel::Healthy
        } else if age < self.warning_limit() {
            StatusLevel::Warning
        } else {
            StatusLevel::Critical
        }
    }

    /// Liveness view for status reads.
    pub fn verdict<Z: TimeZone>(
        &self,
        snapshot: &HeartbeatSnapshot,
        now: &DateTime<Z>,
    ) -> HeartbeatVerdict {
        HeartbeatVerdict {
            component_id: snapshot.component_id.clone(),
            process_exists: snapshot.process_exists,
            last_heartbeat_at: snapshot.timestamp.clone(),
            status: self.evaluate(Some(snapshot), now),
            declared_level: snapshot.declared_level,
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw).ok()
}

fn to_delta(d: Duration) -> TimeDelta {
    TimeDelta::from_std(d).unwrap_or(TimeDelta::MAX)
}
