//! Engine and worker configuration
//!
//! Values come from environment variables (a `.env` file is honoured by the
//! binaries through `dotenvy`). Everything is validated up front so the
//! signal engine never has to tolerate a degenerate threshold layout.

use crate::core::scheduler::{interval_to_cron, SchedulerError};
use crate::services::hyperliquid::interval_millis;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Lowest trend window accepted; keeps N + 1 closes enough for RSI-14.
pub const MIN_TREND_WINDOW: u32 = 14;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("{0} must be between 0 and 100")]
    ThresholdOutOfRange(&'static str),

    #[error("no hysteresis gap: {entry} entry and {exit} exit thresholds must differ in the exit direction")]
    NoHysteresisGap { entry: &'static str, exit: &'static str },

    #[error("panic threshold {panic} must sit below the long entry threshold {long_entry}")]
    PanicAboveEntry { panic: f64, long_entry: f64 },

    #[error("trend window must be at least {min}, got {actual}")]
    TrendWindowTooSmall { min: u32, actual: u32 },

    #[error("buffer fraction must be finite and non-negative, got {0}")]
    InvalidBuffer(f64),

    #[error("allocation fraction must be in (0, 1], got {0}")]
    InvalidAllocation(f64),

    #[error("poll interval must be > 0")]
    ZeroPollInterval,

    #[error("poll interval of {0}s must divide a minute or be whole minutes dividing an hour")]
    UnevenPollInterval(u64),

    #[error("unsupported candle interval: {0:?}")]
    UnsupportedCandleInterval(String),

    #[error("minimum cash must be finite and non-negative, got {0}")]
    InvalidMinCash(f64),

    #[error("no symbols configured")]
    NoSymbols,
}

/// Get the deployment environment (`APP_ENV`, default "sandbox").
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

/// Momentum thresholds. Entries and exits are deliberately offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalThresholds {
    pub long_entry: f64,
    pub short_entry: f64,
    pub long_exit: f64,
    pub short_exit: f64,
    pub panic: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            long_entry: 30.0,
            short_entry: 70.0,
            long_exit: 65.0,
            short_exit: 35.0,
            panic: 15.0,
        }
    }
}

impl SignalThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("long_entry", self.long_entry),
            ("short_entry", self.short_entry),
            ("long_exit", self.long_exit),
            ("short_exit", self.short_exit),
            ("panic", self.panic),
        ];
        for (name, value) in named {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::ThresholdOutOfRange(name));
            }
        }

        if self.long_exit <= self.long_entry {
            return Err(ConfigError::NoHysteresisGap {
                entry: "long",
                exit: "long",
            });
        }
        if self.short_exit >= self.short_entry {
            return Err(ConfigError::NoHysteresisGap {
                entry: "short",
                exit: "short",
            });
        }
        if self.panic >= self.long_entry {
            return Err(ConfigError::PanicAboveEntry {
                panic: self.panic,
                long_entry: self.long_entry,
            });
        }
        Ok(())
    }
}

/// Parameters consumed by the indicator calculator, regime classifier,
/// signal engine and entry sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub trend_window: u32,
    /// Fraction above the trend line price must clear to count as BULL.
    pub buffer_fraction: f64,
    pub thresholds: SignalThresholds,
    pub allow_short: bool,
    /// Share of cash committed per entry.
    pub allocation_fraction: f64,
    /// Entries are skipped below this cash balance.
    pub min_cash: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trend_window: 200,
            buffer_fraction: 0.001,
            thresholds: SignalThresholds::default(),
            allow_short: false,
            allocation_fraction: 0.33,
            min_cash: 2000.0,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trend_window < MIN_TREND_WINDOW {
            return Err(ConfigError::TrendWindowTooSmall {
                min: MIN_TREND_WINDOW,
                actual: self.trend_window,
            });
        }
        if !self.buffer_fraction.is_finite() || self.buffer_fraction < 0.0 {
            return Err(ConfigError::InvalidBuffer(self.buffer_fraction));
        }
        if !(self.allocation_fraction > 0.0 && self.allocation_fraction <= 1.0) {
            return Err(ConfigError::InvalidAllocation(self.allocation_fraction));
        }
        if !self.min_cash.is_finite() || self.min_cash < 0.0 {
            return Err(ConfigError::InvalidMinCash(self.min_cash));
        }
        self.thresholds.validate()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let t = defaults.thresholds;
        let config = Self {
            trend_window: parse_or(&lookup, "TREND_WINDOW", defaults.trend_window)?,
            buffer_fraction: parse_or(&lookup, "BUFFER_FRACTION", defaults.buffer_fraction)?,
            thresholds: SignalThresholds {
                long_entry: parse_or(&lookup, "LONG_ENTRY", t.long_entry)?,
                short_entry: parse_or(&lookup, "SHORT_ENTRY", t.short_entry)?,
                long_exit: parse_or(&lookup, "LONG_EXIT", t.long_exit)?,
                short_exit: parse_or(&lookup, "SHORT_EXIT", t.short_exit)?,
                panic: parse_or(&lookup, "PANIC_MOMENTUM", t.panic)?,
            },
            allow_short: parse_or(&lookup, "ALLOW_SHORT", defaults.allow_short)?,
            allocation_fraction: parse_or(
                &lookup,
                "ALLOCATION_FRACTION",
                defaults.allocation_fraction,
            )?,
            min_cash: parse_or(&lookup, "MIN_CASH", defaults.min_cash)?,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Polling driver settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub poll_interval_seconds: u64,
    pub symbols: Vec<String>,
    pub candle_interval: String,
    /// Extra bars requested on top of the trend window.
    pub history_margin: usize,
    pub hyperliquid_url: String,
    pub engine: EngineConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 10,
            symbols: vec!["BTC".to_string(), "ETH".to_string(), "SOL".to_string()],
            candle_interval: "15m".to_string(),
            history_margin: 50,
            hyperliquid_url: "https://api.hyperliquid.xyz".to_string(),
            engine: EngineConfig::default(),
        }
    }
}

impl WorkerConfig {
    /// Number of candles requested per snapshot.
    pub fn history_limit(&self) -> usize {
        self.engine.trend_window as usize + 1 + self.history_margin
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match interval_to_cron(self.poll_interval_seconds) {
            Ok(_) => {}
            Err(SchedulerError::Disabled) => return Err(ConfigError::ZeroPollInterval),
            Err(_) => {
                return Err(ConfigError::UnevenPollInterval(self.poll_interval_seconds));
            }
        }
        if interval_millis(&self.candle_interval).is_none() {
            return Err(ConfigError::UnsupportedCandleInterval(
                self.candle_interval.clone(),
            ));
        }
        if self.symbols.is_empty() {
            return Err(ConfigError::NoSymbols);
        }
        self.engine.validate()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let symbols = match lookup("SYMBOLS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            None => defaults.symbols,
        };

        let config = Self {
            poll_interval_seconds: parse_or(
                &lookup,
                "POLL_INTERVAL_SECONDS",
                defaults.poll_interval_seconds,
            )?,
            symbols,
            candle_interval: lookup("CANDLE_INTERVAL").unwrap_or(defaults.candle_interval),
            history_margin: parse_or(&lookup, "HISTORY_MARGIN", defaults.history_margin)?,
            hyperliquid_url: lookup("HYPERLIQUID_API_URL").unwrap_or(defaults.hyperliquid_url),
            engine: EngineConfig::from_lookup(&lookup)?,
        };
        config.validate()?;
        Ok(config)
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}
