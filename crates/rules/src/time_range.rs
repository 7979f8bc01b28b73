//! Time-of-day ranges used by level schedule rules.

use std::fmt;

use chrono::NaiveTime;

use crate::plan::ConfigError;

/// Parse a configuration time of day in `HH:MM` form.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, ConfigError> {
    let invalid = || ConfigError::InvalidTime {
        value: value.to_string(),
    };
    let (hour, minute) = value.trim().split_once(':').ok_or_else(invalid)?;
    if hour.is_empty() || minute.len() != 2 || hour.len() > 2 {
        return Err(invalid());
    }
    let hour: u32 = hour.parse().map_err(|_| invalid())?;
    let minute: u32 = minute.parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// Inclusive time-of-day range. When `start > end` the range wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Build a range from two `HH:MM` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(parse_time_of_day(start)?, parse_time_of_day(end)?))
    }

    /// Whether `t` falls within the range. Both bounds are inclusive.
    pub fn contains(&self, t: NaiveTime) -> bool {
        if self.start <= self.end {
            self.start <= t && t <= self.end
        } else {
            t >= self.start || t <= self.end
        }
    }

    pub fn wraps_midnight(&self) -> bool {
        self.start > self.end
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}
