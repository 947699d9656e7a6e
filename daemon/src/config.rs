use lazy_static::lazy_static;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{env, time::Duration};
use thiserror::Error;

use prizepool_common::{
    config::{
        DEFAULT_PLATFORM_FEE_BPS, EXPIRY_WARNING_SECS, HISTORY_RETENTION_SECS,
        MAX_PLATFORM_FEE_BPS,
    },
    static_assert,
};

// Seconds between two scheduler ticks
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 5;
// Buffered events per subscriber before the slowest one starts lagging
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;
pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;
pub const DEFAULT_HISTORY_RETENTION_DAYS: u64 = HISTORY_RETENTION_SECS / SECONDS_PER_DAY;
// History is pruned at most once per hour
pub const PRUNE_INTERVAL: Duration = Duration::from_secs(60 * 60);

static_assert!(
    DEFAULT_TICK_INTERVAL_SECS * 2 <= EXPIRY_WARNING_SECS,
    "Expiry warning window must span several ticks"
);

// -----------------------------------------------------------------------------
// Runtime toggles
// -----------------------------------------------------------------------------
//
// Environment variables:
//   - PRIZEPOOL_DEBUG
//       "1" | "true"  => every distributed round is audited before being stored
//       (unset/other) => disabled (default)
lazy_static! {
    static ref DEBUG_MODE: bool = {
        match env::var("PRIZEPOOL_DEBUG") {
            Ok(v) => matches!(v.as_str(), "1" | "true" | "TRUE" | "True"),
            Err(_) => false,
        }
    };
}

/// Returns true if debug checks are enabled at runtime.
/// Cached at first call.
pub fn debug_mode_enabled() -> bool {
    *DEBUG_MODE
}

#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Default,
    clap::ValueEnum,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[clap(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Platform fee {bps} bps exceeds maximum {max} bps")]
    InvalidFeeBps { bps: u16, max: u16 },
    #[error("Tick interval must be at least one second")]
    ZeroTickInterval,
    #[error("Event channel capacity must be at least one")]
    ZeroEventCapacity,
}

const fn default_platform_fee_bps() -> u16 {
    DEFAULT_PLATFORM_FEE_BPS
}

const fn default_tick_interval_secs() -> u64 {
    DEFAULT_TICK_INTERVAL_SECS
}

const fn default_history_retention_days() -> u64 {
    DEFAULT_HISTORY_RETENTION_DAYS
}

const fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

/// Configuration of the daemon
#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Platform fee taken on every stake, in basis points.
    #[clap(name = "platform-fee-bps", long, default_value_t = default_platform_fee_bps())]
    #[serde(default = "default_platform_fee_bps")]
    pub platform_fee_bps: u16,

    /// Seconds between two checks of the round deadlines.
    #[clap(name = "tick-interval", long, default_value_t = default_tick_interval_secs())]
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,

    /// Finished rounds older than this many days are pruned.
    #[clap(name = "history-retention-days", long, default_value_t = default_history_retention_days())]
    #[serde(default = "default_history_retention_days")]
    pub history_retention_days: u64,

    /// Events buffered per subscriber.
    #[clap(name = "event-capacity", long, default_value_t = default_event_capacity())]
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Log level, RUST_LOG takes precedence when set.
    #[clap(name = "log-level", long, value_enum, default_value_t = LogLevel::Info)]
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            platform_fee_bps: DEFAULT_PLATFORM_FEE_BPS,
            tick_interval_secs: DEFAULT_TICK_INTERVAL_SECS,
            history_retention_days: DEFAULT_HISTORY_RETENTION_DAYS,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            log_level: LogLevel::Info,
        }
    }
}

impl DaemonConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.platform_fee_bps > MAX_PLATFORM_FEE_BPS {
            return Err(ConfigError::InvalidFeeBps {
                bps: self.platform_fee_bps,
                max: MAX_PLATFORM_FEE_BPS,
            });
        }
        if self.tick_interval_secs == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::ZeroEventCapacity);
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    pub fn history_retention_secs(&self) -> u64 {
        self.history_retention_days.saturating_mul(SECONDS_PER_DAY)
    }

    pub fn manager_config(&self) -> ManagerConfig {
        ManagerConfig {
            platform_fee_bps: self.platform_fee_bps,
            ..ManagerConfig::default()
        }
    }
}

/// Settings of the round manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerConfig {
    pub platform_fee_bps: u16,
    // Remaining time under which participants of a time-locked round are warned
    pub expiry_warning_secs: u64,
    // Audit every distributed round before storing it
    pub self_audit: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            platform_fee_bps: DEFAULT_PLATFORM_FEE_BPS,
            expiry_warning_secs: EXPIRY_WARNING_SECS,
            self_audit: debug_mode_enabled(),
        }
    }
}
