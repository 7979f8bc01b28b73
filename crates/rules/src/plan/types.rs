//! Validated, typed monitor plan.

use std::path::PathBuf;

use chrono::TimeDelta;

use vigil_core::FileRole;

use crate::cadence::Cadence;
use crate::time_range::TimeRange;

/// One monitored file with its expected update cadence.
#[derive(Debug, Clone)]
pub struct FileSpec {
    pub path: PathBuf,
    pub role: FileRole,
    pub cadence: Cadence,
    pub grace_period: TimeDelta,
}

/// Files watched on behalf of one component.
#[derive(Debug, Clone)]
pub struct FileComponent {
    pub component_id: String,
    pub input_files: Vec<FileSpec>,
    pub output_files: Vec<FileSpec>,
}

/// A named time window and the level expected inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRule {
    pub name: Option<String>,
    pub range: TimeRange,
    pub expected_level: u8,
}

/// Ordered rules plus the level expected when none matches.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSchedule {
    pub rules: Vec<ScheduleRule>,
    pub default_level: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelComponent {
    pub component_id: String,
    pub schedule: LevelSchedule,
}

/// Everything the engine evaluates on each tick. Loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct MonitorPlan {
    pub file_components: Vec<FileComponent>,
    pub level_components: Vec<LevelComponent>,
}

impl MonitorPlan {
    pub fn is_empty(&self) -> bool {
        self.file_components.is_empty() && self.level_components.is_empty()
    }

    /// Number of monitored files across all components.
    pub fn file_count(&self) -> usize {
        self.file_components
            .iter()
            .map(|c| c.input_files.len() + c.output_files.len())
            .sum()
    }
}
