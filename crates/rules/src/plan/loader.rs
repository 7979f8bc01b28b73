//! Reading and validating the file monitor plan and the level schedule.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, TimeDelta};
use serde::de::DeserializeOwned;
use tracing::info;

use vigil_core::{is_valid_component_id, valid_level, FileRole};

use crate::cadence::Cadence;
use crate::time_range::TimeRange;

use super::error::{ConfigError, Result};
use super::schema::{
    FileComponentDoc, FileMonitorPlanDoc, FileSpecDoc, LevelComponentDoc, LevelScheduleDoc,
};
use super::types::{FileComponent, FileSpec, LevelComponent, LevelSchedule, MonitorPlan, ScheduleRule};

const FILE_PLAN: &str = "file monitor plan";
const LEVEL_PLAN: &str = "level schedule";

impl MonitorPlan {
    /// Load both plan files.
    ///
    /// `now` is the load instant, used to reject cadences that can never
    /// produce a previous or next trigger.
    pub fn load(
        file_plan_path: &Path,
        level_schedule_path: &Path,
        now: DateTime<FixedOffset>,
    ) -> Result<Self> {
        let plan = Self {
            file_components: load_file_plan(file_plan_path, now)?,
            level_components: load_level_schedule(level_schedule_path)?,
        };
        info!(
            file_components = plan.file_components.len(),
            monitored_files = plan.file_count(),
            level_components = plan.level_components.len(),
            "monitor plan loaded"
        );
        Ok(plan)
    }
}

pub fn load_file_plan(path: &Path, now: DateTime<FixedOffset>) -> Result<Vec<FileComponent>> {
    let content = read(path)?;
    parse_file_plan(&content, &path.display().to_string(), now)
}

pub fn load_level_schedule(path: &Path) -> Result<Vec<LevelComponent>> {
    let content = read(path)?;
    parse_level_schedule(&content, &path.display().to_string())
}

/// Parse and validate a file monitor plan. `origin` names the source in errors.
pub fn parse_file_plan(
    yaml: &str,
    origin: &str,
    now: DateTime<FixedOffset>,
) -> Result<Vec<FileComponent>> {
    let doc: FileMonitorPlanDoc = parse_yaml(yaml, origin)?;
    let mut seen = HashSet::new();
    doc.components
        .into_iter()
        .enumerate()
        .map(|(index, component)| {
            let id = component_id(FILE_PLAN, index, component.component_id.as_deref(), &mut seen)?;
            file_component(id, component, now)
        })
        .collect()
}

/// Parse and validate a level schedule. `origin` names the source in errors.
pub fn parse_level_schedule(yaml: &str, origin: &str) -> Result<Vec<LevelComponent>> {
    let doc: LevelScheduleDoc = parse_yaml(yaml, origin)?;
    let mut seen = HashSet::new();
    doc.components
        .into_iter()
        .enumerate()
        .map(|(index, component)| {
            let id = component_id(LEVEL_PLAN, index, component.component_id.as_deref(), &mut seen)?;
            level_component(id, component)
        })
        .collect()
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_yaml<T: DeserializeOwned + Default>(yaml: &str, origin: &str) -> Result<T> {
    // An empty file is an empty plan.
    if yaml.trim().is_empty() {
        return Ok(T::default());
    }
    serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse {
        origin: origin.to_string(),
        source,
    })
}

fn component_id(
    plan: &'static str,
    index: usize,
    raw: Option<&str>,
    seen: &mut HashSet<String>,
) -> Result<String> {
    let id = match raw.map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => return Err(ConfigError::MissingComponentId { plan, index }),
    };
    if !is_valid_component_id(&id) {
        return Err(ConfigError::InvalidComponentId { plan, id });
    }
    if !seen.insert(id.clone()) {
        return Err(ConfigError::DuplicateComponent { plan, id });
    }
    Ok(id)
}

fn file_component(
    component_id: String,
    doc: FileComponentDoc,
    now: DateTime<FixedOffset>,
) -> Result<FileComponent> {
    let specs = |docs: Vec<FileSpecDoc>, role: FileRole| -> Result<Vec<FileSpec>> {
        docs.into_iter()
            .map(|d| file_spec(&component_id, d, role, now))
            .collect()
    };
    let input_files = specs(doc.input_files, FileRole::Input)?;
    let output_files = specs(doc.output_files, FileRole::Output)?;
    Ok(FileComponent {
        component_id,
        input_files,
        output_files,
    })
}

fn file_spec(
    component_id: &str,
    doc: FileSpecDoc,
    role: FileRole,
    now: DateTime<FixedOffset>,
) -> Result<FileSpec> {
    let context = format!("{component_id} {role} file '{}'", doc.path);
    if doc.path.trim().is_empty() {
        return Err(ConfigError::EmptyPath { context });
    }

    let cadence = Cadence::parse(&doc.expected_update_cron)?;
    let unreachable = |direction| ConfigError::UnreachableCadence {
        expression: cadence.expression().to_string(),
        direction,
        at: now.to_rfc3339(),
    };
    let Some(last_expected) = cadence.previous_trigger(&now) else {
        return Err(unreachable("previous"));
    };
    if cadence.next_trigger(&now).is_none() {
        return Err(unreachable("next"));
    }

    // The deadline `last_expected - grace` must stay within the calendar.
    let grace_period = i64::try_from(doc.grace_period_sec)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .filter(|grace| last_expected.checked_sub_signed(*grace).is_some())
        .ok_or(ConfigError::GraceOutOfRange {
            context,
            seconds: doc.grace_period_sec,
        })?;

    Ok(FileSpec {
        path: PathBuf::from(doc.path),
        role,
        cadence,
        grace_period,
    })
}

fn level_component(component_id: String, doc: LevelComponentDoc) -> Result<LevelComponent> {
    let rules = doc
        .rules
        .into_iter()
        .enumerate()
        .map(|(i, rule)| {
            let context = match &rule.name {
                Some(name) => format!("{component_id} rule '{name}'"),
                None => format!("{component_id} rule #{i}"),
            };
            Ok(ScheduleRule {
                range: TimeRange::parse(&rule.start_time, &rule.end_time)?,
                expected_level: level(rule.expected_level, context)?,
                name: rule.name,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let default_level = level(
        doc.non_trading_day_level,
        format!("{component_id} non_trading_day_level"),
    )?;

    Ok(LevelComponent {
        component_id,
        schedule: LevelSchedule {
            rules,
            default_level,
        },
    })
}

fn level(value: i64, context: String) -> Result<u8> {
    valid_level(Some(value)).ok_or(ConfigError::LevelOutOfRange {
        context,
        level: value,
    })
}
