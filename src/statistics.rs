//! Cycle and period length statistics over the trailing window.

use crate::config::EngineConfig;
use crate::models::{rounded_mean, Cycle, CycleSummary, LengthStats};

/// Cycles ordered newest first.
pub(crate) fn newest_first(cycles: &[Cycle]) -> Vec<&Cycle> {
    let mut sorted: Vec<&Cycle> = cycles.iter().collect();
    sorted.sort_by(|a, b| b.period_start_date.cmp(&a.period_start_date));
    sorted
}

/// Days between consecutive period starts, newest interval first.
///
/// Only the `stats_window` most recent intervals are considered, so up to
/// `stats_window + 1` cycles are read. Intervals of zero or negative length,
/// or of `max_cycle_length` days and more, are dropped.
pub fn cycle_intervals(cycles: &[Cycle], config: &EngineConfig) -> Vec<i64> {
    newest_first(cycles)
        .windows(2)
        .take(config.stats_window)
        .filter_map(|pair| {
            let days = (pair[0].period_start_date - pair[1].period_start_date).num_days();
            if days <= 0 || days >= config.max_cycle_length {
                tracing::debug!(
                    days,
                    later = %pair[0].period_start_date,
                    earlier = %pair[1].period_start_date,
                    "discarding implausible cycle interval"
                );
                None
            } else {
                Some(days)
            }
        })
        .collect()
}

/// Rounded mean cycle length, or the configured default when fewer than two
/// cycles exist or every interval was discarded.
pub fn average_cycle_length(cycles: &[Cycle], config: &EngineConfig) -> i64 {
    if cycles.len() < 2 {
        return config.default_cycle_length;
    }
    rounded_mean(&cycle_intervals(cycles, config)).unwrap_or(config.default_cycle_length)
}

pub fn cycle_length_stats(cycles: &[Cycle], config: &EngineConfig) -> Option<LengthStats> {
    if cycles.len() < 2 {
        return None;
    }
    LengthStats::from_samples(&cycle_intervals(cycles, config))
}

/// Inclusive length of the period in days. Open periods count as the
/// configured default.
pub fn period_duration(cycle: &Cycle, config: &EngineConfig) -> i64 {
    match cycle.period_end_date {
        Some(end) => (end - cycle.period_start_date).num_days() + 1,
        None => config.default_period_length,
    }
}

/// Recorded period durations of the most recent cycles that have an end date.
pub fn observed_period_durations(cycles: &[Cycle], config: &EngineConfig) -> Vec<i64> {
    newest_first(cycles)
        .into_iter()
        .take(config.stats_window)
        .filter(|c| c.period_end_date.is_some())
        .map(|c| period_duration(c, config))
        .filter(|&days| {
            if days < 1 {
                tracing::debug!(days, "discarding period that ends before it starts");
                false
            } else {
                true
            }
        })
        .collect()
}

pub fn period_length_stats(cycles: &[Cycle], config: &EngineConfig) -> Option<LengthStats> {
    LengthStats::from_samples(&observed_period_durations(cycles, config))
}

/// `None` when no recent cycle has a recorded end date.
pub fn average_period_length(cycles: &[Cycle], config: &EngineConfig) -> Option<i64> {
    rounded_mean(&observed_period_durations(cycles, config))
}

/// Compute the overview shown on the stats view.
pub fn cycle_summary(cycles: &[Cycle], config: &EngineConfig) -> CycleSummary {
    let last = cycles.iter().max_by_key(|c| c.period_start_date);
    CycleSummary {
        total_cycles: cycles.len(),
        cycle_length: cycle_length_stats(cycles, config),
        period_length: period_length_stats(cycles, config),
        last_period_start: last.map(|c| c.period_start_date),
        last_period_end: last.and_then(|c| c.period_end_date),
    }
}
