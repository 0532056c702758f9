//! Configuration types.

use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;

use crate::error::ConfigError;

/// Largest day count accepted for any window or threshold (about a century).
pub const MAX_WINDOW_DAYS: u32 = 36_500;

/// Targets the manager performance metrics are judged against.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTargets {
    /// Percentage of tasks completed.
    pub training_completion: f64,
    /// Mean survey score out of 5.
    pub satisfaction: f64,
    /// Mean days from first stage to Excel (lower is better).
    pub time_to_productivity_days: f64,
    /// Retention percentage.
    pub retention: f64,
}

impl Default for MetricTargets {
    fn default() -> Self {
        Self {
            training_completion: 90.0,
            satisfaction: 4.0,
            time_to_productivity_days: 45.0,
            retention: 90.0,
        }
    }
}

/// View engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Items due within this many days are flagged as due soon.
    pub due_soon_days: u32,
    /// Records that have not changed stage for longer than this are stalled.
    pub stall_threshold_days: u32,
    /// Trailing window for counting departures in the retention rate.
    pub retention_window_days: u32,
    /// Team members this many days into their program or fewer count as new.
    pub new_hire_days: u32,
    /// How far ahead upcoming events are listed.
    pub upcoming_event_days: u32,
    /// Maximum number of recent activity entries.
    pub recent_activity_limit: usize,
    /// Upper bound on snapshot acquisition.
    pub snapshot_timeout: Duration,
    pub targets: MetricTargets,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            due_soon_days: 3,
            stall_threshold_days: 14,
            retention_window_days: 365,
            new_hire_days: 30,
            upcoming_event_days: 14,
            recent_activity_limit: 10,
            snapshot_timeout: Duration::from_secs(5),
            targets: MetricTargets::default(),
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by any `ONBOARD_*` environment variables that are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = env_days("ONBOARD_DUE_SOON_DAYS")? {
            config.due_soon_days = v;
        }
        if let Some(v) = env_days("ONBOARD_STALL_THRESHOLD_DAYS")? {
            config.stall_threshold_days = v;
        }
        if let Some(v) = env_days("ONBOARD_RETENTION_WINDOW_DAYS")? {
            config.retention_window_days = v;
        }
        if let Some(v) = env_days("ONBOARD_NEW_HIRE_DAYS")? {
            config.new_hire_days = v;
        }
        if let Some(v) = env_days("ONBOARD_UPCOMING_EVENT_DAYS")? {
            config.upcoming_event_days = v;
        }
        if let Some(v) = env_parse("ONBOARD_RECENT_ACTIVITY_LIMIT")? {
            config.recent_activity_limit = v;
        }
        if let Some(ms) = env_parse::<u64>("ONBOARD_SNAPSHOT_TIMEOUT_MS")? {
            config.snapshot_timeout = Duration::from_millis(ms);
        }

        Ok(config)
    }

    pub fn due_soon_horizon(&self) -> TimeDelta {
        TimeDelta::days(self.due_soon_days.into())
    }

    pub fn stall_threshold(&self) -> TimeDelta {
        TimeDelta::days(self.stall_threshold_days.into())
    }

    pub fn retention_window(&self) -> TimeDelta {
        TimeDelta::days(self.retention_window_days.into())
    }

    pub fn upcoming_event_window(&self) -> TimeDelta {
        TimeDelta::days(self.upcoming_event_days.into())
    }
}

fn env_days(key: &str) -> Result<Option<u32>, ConfigError> {
    match env_parse::<u32>(key)? {
        Some(days) if days > MAX_WINDOW_DAYS => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{days} days exceeds the maximum of {MAX_WINDOW_DAYS}"),
        }),
        days => Ok(days),
    }
}

fn env_parse<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("{raw:?}: {e}"),
            }),
        Err(_) => Ok(None),
    }
}
