//! Per-component snapshots exchanged through the snapshot store.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Latest heartbeat reported by a component.
///
/// `timestamp` is kept exactly as the component sent it and is parsed only
/// when the heartbeat is evaluated, so a malformed value still round-trips
/// through the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatSnapshot {
    pub component_id: String,
    pub process_exists: bool,
    /// RFC 3339 timestamp as reported by the component.
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub declared_level: Option<i64>,
    pub received_at: DateTime<Utc>,
}

/// Direction of a monitored file relative to its component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRole {
    Input,
    Output,
}

impl std::fmt::Display for FileRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileRole::Input => write!(f, "input"),
            FileRole::Output => write!(f, "output"),
        }
    }
}

/// Freshness verdict for one monitored file at one evaluation instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileObservation {
    pub path: String,
    pub role: FileRole,
    pub cadence_expression: String,
    pub last_modified: Option<DateTime<FixedOffset>>,
    pub size: u64,
    pub compliant: bool,
    /// Always strictly later than the evaluation instant.
    pub next_expected: DateTime<FixedOffset>,
    pub alert: Option<String>,
}

/// All file observations for one component from a single tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentFileStatus {
    pub component_id: String,
    pub input_files: Vec<FileObservation>,
    pub output_files: Vec<FileObservation>,
    /// AND of every observation's `compliant` flag; true when no files are configured.
    pub overall_file_health: bool,
    pub checked_at: DateTime<FixedOffset>,
}

impl ComponentFileStatus {
    /// Assemble a status, deriving `overall_file_health` from the observations.
    pub fn new(
        component_id: impl Into<String>,
        input_files: Vec<FileObservation>,
        output_files: Vec<FileObservation>,
        checked_at: DateTime<FixedOffset>,
    ) -> Self {
        let overall_file_health = input_files
            .iter()
            .chain(output_files.iter())
            .all(|f| f.compliant);
        Self {
            component_id: component_id.into(),
            input_files,
            output_files,
            overall_file_health,
            checked_at,
        }
    }

    /// Iterate over input and output observations together.
    pub fn observations(&self) -> impl Iterator<Item = &FileObservation> {
        self.input_files.iter().chain(self.output_files.iter())
    }
}

/// Run-level compliance verdict for one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelStatus {
    pub component_id: String,
    pub expected_level: u8,
    /// 0 when there is no credible observation.
    pub observed_level: u8,
    pub declared_level: Option<u8>,
    pub compliant: bool,
    pub matched_rule_name: Option<String>,
    pub last_check: DateTime<FixedOffset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,
}
