//! Run-level compliance against the time-of-day schedule.

use chrono::{DateTime, FixedOffset, NaiveTime};

use vigil_core::{valid_level, LevelStatus, NO_LEVEL};

use crate::plan::{LevelSchedule, ScheduleRule};

/// Source of the level a component is actually running at.
///
/// Today the only credible source is the level the component declares in
/// its own heartbeat. Implementations that probe the component directly can
/// replace [`DeclaredLevelObserver`] without touching the evaluator.
pub trait LevelObserver: Send + Sync {
    /// Observed level for `component_id`, or [`NO_LEVEL`] when unknown.
    /// `declared` is already narrowed to `1..=4`.
    fn observe_level(&self, component_id: &str, declared: Option<u8>) -> u8;
}

/// Trusts the level declared in the latest heartbeat.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredLevelObserver;

impl LevelObserver for DeclaredLevelObserver {
    fn observe_level(&self, _component_id: &str, declared: Option<u8>) -> u8 {
        declared.unwrap_or(NO_LEVEL)
    }
}

/// First rule whose range contains `time`. Order is significant.
pub fn match_rule(rules: &[ScheduleRule], time: NaiveTime) -> Option<&ScheduleRule> {
    rules.iter().find(|r| r.range.contains(time))
}

impl LevelSchedule {
    /// Expected level at `time` and the name of the rule that set it.
    pub fn expected_at(&self, time: NaiveTime) -> (u8, Option<&str>) {
        match match_rule(&self.rules, time) {
            Some(rule) => (rule.expected_level, rule.name.as_deref()),
            None => (self.default_level, None),
        }
    }
}

/// Evaluate level compliance for one component at `now`.
///
/// `declared_level` is the raw value from the heartbeat; anything outside
/// `1..=4` is treated as absent.
pub fn evaluate_level(
    component_id: &str,
    schedule: &LevelSchedule,
    declared_level: Option<i64>,
    observer: &dyn LevelObserver,
    now: DateTime<FixedOffset>,
) -> LevelStatus {
    let (expected_level, matched_rule_name) = schedule.expected_at(now.time());
    let declared_level = valid_level(declared_level);
    let observed_level = observer.observe_level(component_id, declared_level);
    LevelStatus {
        component_id: component_id.to_string(),
        expected_level,
        observed_level,
        declared_level,
        compliant: observed_level == expected_level,
        matched_rule_name: matched_rule_name.map(str::to_string),
        last_check: now,
        alert: None,
    }
}

/// Non-compliant status for a component whose evaluation could not finish.
pub fn degraded_level(
    component_id: &str,
    schedule: &LevelSchedule,
    now: DateTime<FixedOffset>,
    alert: &str,
) -> LevelStatus {
    let (expected_level, matched_rule_name) = schedule.expected_at(now.time());
    LevelStatus {
        component_id: component_id.to_string(),
        expected_level,
        observed_level: NO_LEVEL,
        declared_level: None,
        compliant: false,
        matched_rule_name: matched_rule_name.map(str::to_string),
        last_check: now,
        alert: Some(alert.to_string()),
    }
}
