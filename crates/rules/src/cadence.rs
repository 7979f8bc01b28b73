//! Cron cadence parsing and trigger arithmetic.

use std::str::FromStr;

use chrono::{DateTime, Duration, TimeZone, Timelike};
use cron::Schedule;

use crate::plan::ConfigError;

/// Normalize a 5-field cron expression to 6-field by prepending "0 " for seconds.
///
/// The `cron` crate requires 6 fields: `sec min hour day-of-month month day-of-week`.
/// Plans use standard 5-field cron: `min hour day-of-month month day-of-week`.
pub(crate) fn normalize_cron(cron_5field: &str) -> String {
    let trimmed = cron_5field.trim();
    let field_count = trimmed.split_whitespace().count();
    if field_count == 5 {
        format!("0 {}", trimmed)
    } else {
        // Already 6/7-field or non-standard; pass through as-is.
        trimmed.to_string()
    }
}

/// A parsed, validated cadence expression.
///
/// Both trigger functions are pure in the expression and the reference
/// instant, and work in whatever offset the reference carries.
#[derive(Debug, Clone)]
pub struct Cadence {
    expression: String,
    schedule: Schedule,
}

impl Cadence {
    /// Parse a 5-field (or 6/7-field) cron expression.
    pub fn parse(expression: &str) -> Result<Self, ConfigError> {
        let normalized = normalize_cron(expression);
        if normalized.is_empty() {
            return Err(ConfigError::InvalidCadence {
                expression: expression.to_string(),
                reason: "expression is empty".into(),
            });
        }
        let schedule =
            Schedule::from_str(&normalized).map_err(|e| ConfigError::InvalidCadence {
                expression: expression.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            expression: expression.trim().to_string(),
            schedule,
        })
    }

    /// The expression as written in configuration.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Most recent trigger at or before `reference` (second granularity).
    pub fn previous_trigger<Z: TimeZone>(&self, reference: &DateTime<Z>) -> Option<DateTime<Z>> {
        let anchor = truncate_to_second(reference);
        // A trigger exactly on the anchor second counts as "at or before".
        let one_before = anchor.clone() - Duration::seconds(1);
        if let Some(hit) = self.schedule.after(&one_before).next() {
            if hit == anchor {
                return Some(hit);
            }
        }
        self.schedule.after(&anchor).next_back()
    }

    /// Earliest trigger strictly after `reference`.
    pub fn next_trigger<Z: TimeZone>(&self, reference: &DateTime<Z>) -> Option<DateTime<Z>> {
        self.schedule
            .after(reference)
            .find(|t| t > reference)
    }
}

impl PartialEq for Cadence {
    fn eq(&self, other: &Self) -> bool {
        self.expression == other.expression
    }
}

fn truncate_to_second<Z: TimeZone>(t: &DateTime<Z>) -> DateTime<Z> {
    t.with_nanosecond(0).unwrap_or_else(|| t.clone())
}
