//! Health verdicts and run-level helpers shared by every crate.

use serde::{Deserialize, Serialize};

/// Lowest valid run level.
pub const MIN_LEVEL: u8 = 1;
/// Highest valid run level.
pub const MAX_LEVEL: u8 = 4;
/// Sentinel for "no credible observation".
pub const NO_LEVEL: u8 = 0;

/// Whether `level` is a valid run level (1..=4).
pub fn is_valid_level(level: i64) -> bool {
    (MIN_LEVEL as i64..=MAX_LEVEL as i64).contains(&level)
}

/// Narrow a raw level to a valid one, treating anything out of range as absent.
pub fn valid_level(level: Option<i64>) -> Option<u8> {
    level.filter(|l| is_valid_level(*l)).map(|l| l as u8)
}

/// Health verdict for a single signal or a whole component.
///
/// The four regular variants are totally ordered by severity
/// (`Offline < Critical < Warning < Healthy`). `Unknown` sits outside that
/// order and is only produced when there is no signal at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Offline,
    Critical,
    Warning,
    Healthy,
    Unknown,
}

impl StatusLevel {
    /// Priority used for worst-of aggregation. Lower is worse.
    pub fn priority(self) -> i8 {
        match self {
            StatusLevel::Offline => 0,
            StatusLevel::Critical => 1,
            StatusLevel::Warning => 2,
            StatusLevel::Healthy => 3,
            StatusLevel::Unknown => -1,
        }
    }

    /// Map a boolean compliance flag onto a verdict.
    pub fn from_compliance(compliant: bool) -> Self {
        if compliant {
            StatusLevel::Healthy
        } else {
            StatusLevel::Warning
        }
    }

    /// Worst of the given verdicts, or `Unknown` when there are none.
    ///
    /// `Unknown` inputs are ignored so they can never mask a real verdict.
    pub fn worst_of<I>(levels: I) -> Self
    where
        I: IntoIterator<Item = StatusLevel>,
    {
        levels
            .into_iter()
            .filter(|l| *l != StatusLevel::Unknown)
            .min_by_key(|l| l.priority())
            .unwrap_or(StatusLevel::Unknown)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusLevel::Offline => "offline",
            StatusLevel::Critical => "critical",
            StatusLevel::Warning => "warning",
            StatusLevel::Healthy => "healthy",
            StatusLevel::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
