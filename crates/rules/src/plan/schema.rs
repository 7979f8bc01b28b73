//! YAML document shapes for the two plan files.
//!
//! These mirror the on-disk layout one-to-one. Validation into the typed
//! plan happens in the loader.

use serde::Deserialize;

fn default_grace_period_sec() -> u64 {
    60
}

fn default_non_trading_day_level() -> i64 {
    1
}

/// `file_monitor_plan.yaml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileMonitorPlanDoc {
    #[serde(default)]
    pub components: Vec<FileComponentDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileComponentDoc {
    #[serde(default)]
    pub component_id: Option<String>,
    #[serde(default)]
    pub input_files: Vec<FileSpecDoc>,
    #[serde(default)]
    pub output_files: Vec<FileSpecDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileSpecDoc {
    pub path: String,
    pub expected_update_cron: String,
    #[serde(default = "default_grace_period_sec")]
    pub grace_period_sec: u64,
}

/// `level_schedule.yaml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LevelScheduleDoc {
    #[serde(default)]
    pub components: Vec<LevelComponentDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LevelComponentDoc {
    #[serde(default)]
    pub component_id: Option<String>,
    #[serde(default)]
    pub rules: Vec<ScheduleRuleDoc>,
    #[serde(default = "default_non_trading_day_level")]
    pub non_trading_day_level: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleRuleDoc {
    #[serde(default)]
    pub name: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub expected_level: i64,
}
