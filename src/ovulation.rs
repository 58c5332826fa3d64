use chrono::{Duration, NaiveDate};

use crate::config::EngineConfig;
use crate::models::{Cycle, FertileWindow};

/// Ovulation day estimated from the period start: `offset` days before the
/// next expected period.
pub fn estimated_ovulation(
    period_start: NaiveDate,
    cycle_length: i64,
    config: &EngineConfig,
) -> NaiveDate {
    period_start + Duration::days(cycle_length - config.ovulation_offset)
}

/// The confirmed ovulation day if the cycle has one, the estimate otherwise.
pub fn ovulation_date(cycle: &Cycle, cycle_length: i64, config: &EngineConfig) -> NaiveDate {
    cycle
        .ovulation_date
        .unwrap_or_else(|| estimated_ovulation(cycle.period_start_date, cycle_length, config))
}

pub fn fertile_window(ovulation: NaiveDate, config: &EngineConfig) -> FertileWindow {
    FertileWindow {
        start: ovulation - Duration::days(config.fertile_days_before),
        end: ovulation + Duration::days(config.fertile_days_after),
        ovulation,
    }
}

pub fn cycle_fertile_window(
    cycle: &Cycle,
    cycle_length: i64,
    config: &EngineConfig,
) -> FertileWindow {
    fertile_window(ovulation_date(cycle, cycle_length, config), config)
}
