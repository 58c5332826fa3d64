use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CYCLE_LENGTH: i64 = 28;
pub const DEFAULT_PERIOD_LENGTH: i64 = 5;
/// Days between ovulation and the next period start.
pub const OVULATION_OFFSET: i64 = 14;
pub const FERTILE_DAYS_BEFORE: i64 = 5;
pub const FERTILE_DAYS_AFTER: i64 = 1;
pub const STATS_WINDOW: usize = 6;
pub const PREDICTION_HORIZON_DAYS: i64 = 365;
/// Intervals at or above this many days are treated as entry mistakes.
pub const MAX_CYCLE_LENGTH: i64 = 60;
/// Upper bound for every day-count setting.
pub const MAX_CONFIG_DAYS: i64 = 366;
/// Upper bound for the prediction horizon, ten years.
pub const MAX_HORIZON_DAYS: i64 = 3660;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("out of range: {0}")]
    OutOfRange(String),
}

/// Tunable constants used by every calculation in the engine.
///
/// The fertile window spans `fertile_days_before` days before ovulation to
/// `fertile_days_after` days after it. The follicular phase ends the day
/// before that window and the luteal phase starts the day after it.
///
/// Deserializing validates; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ConfigOverrides")]
pub struct EngineConfig {
    pub default_cycle_length: i64,
    pub default_period_length: i64,
    pub ovulation_offset: i64,
    pub fertile_days_before: i64,
    pub fertile_days_after: i64,
    pub stats_window: usize,
    pub prediction_horizon_days: i64,
    pub max_cycle_length: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_cycle_length: DEFAULT_CYCLE_LENGTH,
            default_period_length: DEFAULT_PERIOD_LENGTH,
            ovulation_offset: OVULATION_OFFSET,
            fertile_days_before: FERTILE_DAYS_BEFORE,
            fertile_days_after: FERTILE_DAYS_AFTER,
            stats_window: STATS_WINDOW,
            prediction_horizon_days: PREDICTION_HORIZON_DAYS,
            max_cycle_length: MAX_CYCLE_LENGTH,
        }
    }
}

/// Serialized form of [`EngineConfig`] before defaults and validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ConfigOverrides {
    default_cycle_length: Option<i64>,
    default_period_length: Option<i64>,
    ovulation_offset: Option<i64>,
    fertile_days_before: Option<i64>,
    fertile_days_after: Option<i64>,
    stats_window: Option<usize>,
    prediction_horizon_days: Option<i64>,
    max_cycle_length: Option<i64>,
}

impl TryFrom<ConfigOverrides> for EngineConfig {
    type Error = ConfigError;

    fn try_from(raw: ConfigOverrides) -> Result<Self, Self::Error> {
        let defaults = Self::default();
        let config = Self {
            default_cycle_length: raw
                .default_cycle_length
                .unwrap_or(defaults.default_cycle_length),
            default_period_length: raw
                .default_period_length
                .unwrap_or(defaults.default_period_length),
            ovulation_offset: raw.ovulation_offset.unwrap_or(defaults.ovulation_offset),
            fertile_days_before: raw
                .fertile_days_before
                .unwrap_or(defaults.fertile_days_before),
            fertile_days_after: raw
                .fertile_days_after
                .unwrap_or(defaults.fertile_days_after),
            stats_window: raw.stats_window.unwrap_or(defaults.stats_window),
            prediction_horizon_days: raw
                .prediction_horizon_days
                .unwrap_or(defaults.prediction_horizon_days),
            max_cycle_length: raw.max_cycle_length.unwrap_or(defaults.max_cycle_length),
        };
        config.validate()?;
        Ok(config)
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Reads `CYKEL_*` overrides through `get`, falling back to the defaults
    /// for anything unset. Tests pass a closure instead of touching the
    /// process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            default_cycle_length: parse_var(
                &mut get,
                "CYKEL_DEFAULT_CYCLE_LENGTH",
                defaults.default_cycle_length,
            )?,
            default_period_length: parse_var(
                &mut get,
                "CYKEL_DEFAULT_PERIOD_LENGTH",
                defaults.default_period_length,
            )?,
            ovulation_offset: parse_var(
                &mut get,
                "CYKEL_OVULATION_OFFSET",
                defaults.ovulation_offset,
            )?,
            fertile_days_before: parse_var(
                &mut get,
                "CYKEL_FERTILE_DAYS_BEFORE",
                defaults.fertile_days_before,
            )?,
            fertile_days_after: parse_var(
                &mut get,
                "CYKEL_FERTILE_DAYS_AFTER",
                defaults.fertile_days_after,
            )?,
            stats_window: parse_var(&mut get, "CYKEL_STATS_WINDOW", defaults.stats_window)?,
            prediction_horizon_days: parse_var(
                &mut get,
                "CYKEL_PREDICTION_HORIZON_DAYS",
                defaults.prediction_horizon_days,
            )?,
            max_cycle_length: parse_var(
                &mut get,
                "CYKEL_MAX_CYCLE_LENGTH",
                defaults.max_cycle_length,
            )?,
        };
        config.validate()?;
        if config != defaults {
            tracing::debug!(?config, "engine config overridden from environment");
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_days("maximum cycle length", self.max_cycle_length, 2, MAX_CONFIG_DAYS)?;
        check_days(
            "default cycle length",
            self.default_cycle_length,
            1,
            self.max_cycle_length - 1,
        )?;
        check_days(
            "default period length",
            self.default_period_length,
            1,
            self.default_cycle_length,
        )?;
        check_days(
            "ovulation offset",
            self.ovulation_offset,
            0,
            self.default_cycle_length - 1,
        )?;
        check_days(
            "fertile days before ovulation",
            self.fertile_days_before,
            0,
            MAX_CONFIG_DAYS,
        )?;
        check_days(
            "fertile days after ovulation",
            self.fertile_days_after,
            0,
            MAX_CONFIG_DAYS,
        )?;
        check_days(
            "prediction horizon",
            self.prediction_horizon_days,
            0,
            MAX_HORIZON_DAYS,
        )?;
        if self.stats_window == 0 {
            return Err(ConfigError::OutOfRange(
                "statistics window must hold at least one cycle".into(),
            ));
        }
        Ok(())
    }
}

fn check_days(name: &str, value: i64, min: i64, max: i64) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::OutOfRange(format!(
            "{name} must be between {min} and {max} days, got {value}"
        )));
    }
    Ok(())
}

fn parse_var<T, F>(get: &mut F, key: &'static str, fallback: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: FnMut(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(fallback),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
