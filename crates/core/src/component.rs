//! Read-time views assembled from the latest snapshots.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::snapshot::{ComponentFileStatus, LevelStatus};
use crate::status::StatusLevel;

/// Component IDs are non-empty and limited to `[A-Za-z0-9_-]`.
pub fn is_valid_component_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Liveness view of a component's latest heartbeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatVerdict {
    pub component_id: String,
    pub process_exists: bool,
    pub last_heartbeat_at: String,
    pub status: StatusLevel,
    pub declared_level: Option<i64>,
}

/// Aggregated status of one component. Built on every read, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub component_id: String,
    pub heartbeat: Option<HeartbeatVerdict>,
    pub file_status: Option<ComponentFileStatus>,
    pub level_status: Option<LevelStatus>,
    pub overall_status: StatusLevel,
}

/// Every known component plus summary counts.
///
/// `critical_count` deliberately covers both `critical` and `offline`
/// components; per-component status keeps the two apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusOverview {
    pub components: Vec<ComponentStatus>,
    pub total_count: usize,
    pub healthy_count: usize,
    pub warning_count: usize,
    pub critical_count: usize,
    pub queried_at: DateTime<FixedOffset>,
}

impl StatusOverview {
    pub fn new(components: Vec<ComponentStatus>, queried_at: DateTime<FixedOffset>) -> Self {
        let count = |pred: fn(StatusLevel) -> bool| {
            components
                .iter()
                .filter(|c| pred(c.overall_status))
                .count()
        };
        let healthy_count = count(|s| s == StatusLevel::Healthy);
        let warning_count = count(|s| s == StatusLevel::Warning);
        let critical_count =
            count(|s| matches!(s, StatusLevel::Critical | StatusLevel::Offline));
        Self {
            total_count: components.len(),
            healthy_count,
            warning_count,
            critical_count,
            components,
            queried_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(id: &str, overall: StatusLevel) -> ComponentStatus {
        ComponentStatus {
            component_id: id.into(),
            heartbeat: None,
            file_status: None,
            level_status: None,
            overall_status: overall,
        }
    }

    #[test]
    fn component_id_charset() {
        assert!(is_valid_component_id("trade_engine-01"));
        assert!(!is_valid_component_id(""));
        assert!(!is_valid_component_id("a b"));
        assert!(!is_valid_component_id("../etc"));
        assert!(!is_valid_component_id("名字"));
    }

    #[test]
    fn critical_bucket_absorbs_offline() {
        let at = DateTime::parse_from_rfc3339("2025-01-06T10:00:00+08:00").unwrap();
        let overview = StatusOverview::new(
            vec![
                status("a", StatusLevel::Healthy),
                status("b", StatusLevel::Warning),
                status("c", StatusLevel::Critical),
                status("d", StatusLevel::Offline),
                status("e", StatusLevel::Unknown),
            ],
            at,
        );
        assert_eq!(overview.total_count, 5);
        assert_eq!(overview.healthy_count, 1);
        assert_eq!(overview.warning_count, 1);
        assert_eq!(overview.critical_count, 2);
        // Per-component verdicts keep offline distinct.
        assert_eq!(overview.components[3].overall_status, StatusLevel::Offline);
    }
}
