//! Compliance evaluation engine.
//!
//! This crate provides:
//! - Cron cadence arithmetic and time-of-day range matching
//! - Monitor plan loading and validation (file cadences, level schedules)
//! - Heartbeat, file freshness and run-level evaluators
//! - Worst-of status aggregation and the read-side status service
//! - [`ComplianceEngine::evaluate_tick`], the entry point a driver calls per tick

pub mod aggregate;
pub mod cadence;
pub mod engine;
pub mod files;
pub mod heartbeat;
pub mod level;
pub mod plan;
pub mod status;
pub mod time_range;

pub use aggregate::aggregate;
pub use cadence::Cadence;
pub use engine::{ComplianceEngine, TickReport};
pub use heartbeat::HeartbeatPolicy;
pub use level::{DeclaredLevelObserver, LevelObserver};
pub use plan::{ConfigError, MonitorPlan};
pub use status::{StatusError, StatusService};
pub use time_range::TimeRange;
