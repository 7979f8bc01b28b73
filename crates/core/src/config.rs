use std::env;
use std::path::PathBuf;
use std::time::Duration;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::VigilError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub monitor: MonitorConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `VIGIL_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("VIGIL_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            store: StoreConfig::from_env_profiled(p),
            monitor: MonitorConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:   {}:{}", self.server.host, self.server.port);
        tracing::info!("  store:    backend={}", self.store.backend);
        tracing::info!(
            "  plans:    files={}, levels={}",
            self.monitor.file_monitor_plan_path.display(),
            self.monitor.level_schedule_path.display()
        );
        tracing::info!(
            "  monitor:  utc_offset={}, tick={}s, eval_timeout={}s, heartbeat_interval={}s, heartbeat_ttl={}s",
            self.monitor.utc_offset,
            self.monitor.tick_interval_secs,
            self.monitor.evaluation_timeout_secs,
            self.monitor.heartbeat_interval_secs,
            self.monitor.heartbeat_ttl_secs,
        );
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "VIGIL_HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "VIGIL_PORT", 8000),
            cors_origin: profiled_env_or(p, "VIGIL_CORS_ORIGIN", "http://localhost:5173"),
        }
    }
}

// ── Snapshot store ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// "memory" or "redis"
    pub backend: String,
    pub redis_url: String,
}

impl StoreConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            backend: profiled_env_or(p, "VIGIL_STORE", "memory").to_lowercase(),
            redis_url: profiled_env_or(p, "REDIS_URL", "redis://localhost:6379/0"),
        }
    }
}

// ── Monitoring ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub file_monitor_plan_path: PathBuf,
    pub level_schedule_path: PathBuf,
    /// Offset in which cadences and time-of-day rules are evaluated, e.g. "+08:00".
    pub utc_offset: String,
    pub tick_interval_secs: u64,
    pub evaluation_timeout_secs: u64,
    pub heartbeat_interval_secs: u64,
    pub heartbeat_ttl_secs: u64,
}

impl MonitorConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            file_monitor_plan_path: PathBuf::from(profiled_env_or(
                p,
                "FILE_MONITOR_PLAN_PATH",
                "config/file_monitor_plan.yaml",
            )),
            level_schedule_path: PathBuf::from(profiled_env_or(
                p,
                "LEVEL_SCHEDULE_PATH",
                "config/level_schedule.yaml",
            )),
            utc_offset: profiled_env_or(p, "VIGIL_UTC_OFFSET", "+08:00"),
            tick_interval_secs: profiled_env_u64(p, "VIGIL_TICK_INTERVAL_SECS", 60),
            evaluation_timeout_secs: profiled_env_u64(p, "VIGIL_EVAL_TIMEOUT_SECS", 10),
            heartbeat_interval_secs: profiled_env_u64(p, "VIGIL_HEARTBEAT_INTERVAL_SECS", 30),
            heartbeat_ttl_secs: profiled_env_u64(p, "VIGIL_HEARTBEAT_TTL_SECS", 300),
        }
    }

    /// Parse the configured offset.
    pub fn offset(&self) -> Result<FixedOffset, VigilError> {
        parse_utc_offset(&self.utc_offset).ok_or_else(|| {
            VigilError::InvalidConfig(format!(
                "VIGIL_UTC_OFFSET '{}' is not a valid offset, expected e.g. '+08:00'",
                self.utc_offset
            ))
        })
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs.max(1))
    }

    pub fn evaluation_timeout(&self) -> Duration {
        Duration::from_secs(self.evaluation_timeout_secs.max(1))
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs.max(1))
    }

    pub fn heartbeat_ttl(&self) -> Duration {
        Duration::from_secs(self.heartbeat_ttl_secs.max(1))
    }
}

/// Parse "Z", "UTC", or a signed "HH:MM" / "HHMM" offset.
pub fn parse_utc_offset(s: &str) -> Option<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3_600 + minutes * 60))
}
