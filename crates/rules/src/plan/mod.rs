//! Monitor plan: which files each component must keep fresh, and which
//! run level each component must hold at each time of day.

mod error;
mod loader;
mod schema;
mod types;


pub use self::error::{ConfigError, Result};
pub use self::loader::{load_file_plan, load_level_schedule, parse_file_plan, parse_level_schedule};
pub use self::schema::{
    FileComponentDoc, FileMonitorPlanDoc, FileSpecDoc, LevelComponentDoc, LevelScheduleDoc,
    ScheduleRuleDoc,
};
pub use self::types::{
    FileComponent, FileSpec, LevelComponent, LevelSchedule, MonitorPlan, ScheduleRule,
};
