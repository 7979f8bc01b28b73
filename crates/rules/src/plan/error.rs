//! Error types for monitor plan loading.

use std::path::PathBuf;

/// Configuration problems detected while loading the file monitor plan or
/// the level schedule. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Plan file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse/deserialization error.
    #[error("YAML parse error in {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// Cadence expression is not a valid cron expression.
    #[error("invalid cadence '{expression}': {reason}")]
    InvalidCadence { expression: String, reason: String },

    /// Cadence parses but has no trigger before (or after) the load instant.
    #[error("cadence '{expression}' has no {direction} trigger relative to {at}")]
    UnreachableCadence {
        expression: String,
        direction: &'static str,
        at: String,
    },

    /// Time of day is not `HH:MM`.
    #[error("invalid time of day '{value}': expected HH:MM")]
    InvalidTime { value: String },

    /// Level outside `1..=4`.
    #[error("{context}: level {level} is outside 1..=4")]
    LevelOutOfRange { context: String, level: i64 },

    /// Grace period too large to represent or to subtract from a trigger.
    #[error("{context}: grace period of {seconds}s is out of range")]
    GraceOutOfRange { context: String, seconds: u64 },

    /// Component entry without a usable `component_id`.
    #[error("{plan}: component #{index} has no component_id")]
    MissingComponentId { plan: &'static str, index: usize },

    /// Component ID contains characters outside `[A-Za-z0-9_-]`.
    #[error("{plan}: invalid component_id '{id}'")]
    InvalidComponentId { plan: &'static str, id: String },

    /// Same component listed twice in one plan.
    #[error("{plan}: component '{id}' is listed more than once")]
    DuplicateComponent { plan: &'static str, id: String },

    /// Monitored file entry with an empty path.
    #[error("{context}: file path is empty")]
    EmptyPath { context: String },
}

/// Result alias for plan operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
