//! Projections past the recorded history, driven only by averages.

use chrono::{Duration, NaiveDate};

use crate::config::EngineConfig;
use crate::models::{Cycle, FertileWindow, PeriodPrediction, Phase};
use crate::ovulation::fertile_window;
use crate::statistics::{average_cycle_length, average_period_length};

/// Classify a zero-based day of an average cycle.
///
/// Uses the same priority and fertile-window policy as
/// [`CycleGeometry::classify`](crate::phase::CycleGeometry::classify).
pub fn classify_cycle_day(
    day_in_cycle: i64,
    cycle_length: i64,
    period_length: i64,
    config: &EngineConfig,
) -> Phase {
    let ovulation_day = cycle_length - config.ovulation_offset;
    let fertile_start = ovulation_day - config.fertile_days_before;
    let fertile_end = ovulation_day + config.fertile_days_after;

    if day_in_cycle < period_length {
        Phase::Menstrual
    } else if day_in_cycle == ovulation_day {
        Phase::Ovulation
    } else if (fertile_start..=fertile_end).contains(&day_in_cycle) {
        Phase::Fertile
    } else if day_in_cycle < fertile_start {
        Phase::Follicular
    } else {
        Phase::Luteal
    }
}

/// Projected phase of a date no recorded cycle covers.
///
/// Needs at least two recorded cycles. Dates further than the prediction
/// horizon past `today` are not projected.
pub fn predict_phase(
    date: NaiveDate,
    cycles: &[Cycle],
    today: NaiveDate,
    config: &EngineConfig,
) -> Option<Phase> {
    if cycles.len() < 2 {
        return None;
    }
    if (date - today).num_days() > config.prediction_horizon_days {
        return None;
    }
    let most_recent = cycles.iter().map(|c| c.period_start_date).max()?;
    let cycle_length = average_cycle_length(cycles, config);
    if cycle_length <= 0 {
        return None;
    }
    let period_length =
        average_period_length(cycles, config).unwrap_or(config.default_period_length);

    let day_in_cycle = (date - most_recent).num_days().rem_euclid(cycle_length);
    Some(classify_cycle_day(
        day_in_cycle,
        cycle_length,
        period_length,
        config,
    ))
}

/// Generate the next period prediction from the averaged history.
/// Requires at least 2 cycles.
pub fn predict_next_period(cycles: &[Cycle], config: &EngineConfig) -> Option<PeriodPrediction> {
    if cycles.len() < 2 {
        return None;
    }
    let last_start = cycles.iter().map(|c| c.period_start_date).max()?;
    let cycle_length = average_cycle_length(cycles, config);
    let period_length =
        average_period_length(cycles, config).unwrap_or(config.default_period_length);

    let predicted_start = last_start + Duration::days(cycle_length);
    let predicted_end = predicted_start + Duration::days((period_length - 1).max(0));
    Some(PeriodPrediction {
        predicted_start,
        predicted_end,
    })
}

/// Fertile window of the cycle that ends with the predicted next period.
pub fn next_fertile_window(cycles: &[Cycle], config: &EngineConfig) -> Option<FertileWindow> {
    let prediction = predict_next_period(cycles, config)?;
    let ovulation = prediction.predicted_start - Duration::days(config.ovulation_offset);
    Some(fertile_window(ovulation, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn make_cycle(start: &str, end: &str) -> Cycle {
        Cycle::new(date(start)).with_end(date(end))
    }

    fn history() -> Vec<Cycle> {
        vec![
            make_cycle("2026-01-01", "2026-01-05"),
            make_cycle("2026-01-29", "2026-02-02"),
        ]
    }

    #[test]
    fn no_prediction_with_one_cycle() {
        let cycles = vec![make_cycle("2026-01-01", "2026-01-05")];
        let cfg = EngineConfig::default();
        assert!(predict_next_period(&cycles, &cfg).is_none());
        assert!(predict_phase(date("2026-02-01"), &cycles, date("2026-01-10"), &cfg).is_none());
    }

    #[test]
    fn predicts_with_two_cycles() {
        let pred = predict_next_period(&history(), &EngineConfig::default()).unwrap();
        assert_eq!(pred.predicted_start, date("2026-02-26"));
        assert_eq!(pred.predicted_end, date("2026-03-02"));
    }

    #[test]
    fn fertility_window_calculated() {
        let fw = next_fertile_window(&history(), &EngineConfig::default()).unwrap();
        // Predicted period: Feb 26. Ovulation: Feb 26 - 14 = Feb 12
        assert_eq!(fw.ovulation, date("2026-02-12"));
        assert_eq!(fw.start, date("2026-02-07"));
        assert_eq!(fw.end, date("2026-02-13"));
    }

    #[test]
    fn projects_phases_into_future_cycles() {
        let cfg = EngineConfig::default();
        let today = date("2026-02-10");
        let phase = |d: &str| predict_phase(date(d), &history(), today, &cfg);
        assert_eq!(phase("2026-02-26"), Some(Phase::Menstrual));
        assert_eq!(phase("2026-03-02"), Some(Phase::Menstrual));
        assert_eq!(phase("2026-03-03"), Some(Phase::Follicular));
        assert_eq!(phase("2026-03-07"), Some(Phase::Fertile));
        assert_eq!(phase("2026-03-12"), Some(Phase::Ovulation));
        assert_eq!(phase("2026-03-13"), Some(Phase::Fertile));
        assert_eq!(phase("2026-03-14"), Some(Phase::Luteal));
        assert_eq!(phase("2026-03-25"), Some(Phase::Luteal));
        assert_eq!(phase("2026-03-26"), Some(Phase::Menstrual));
    }

    #[test]
    fn dates_before_latest_start_wrap_around() {
        let cfg = EngineConfig::default();
        // One day before the latest start is the last day of an average cycle.
        assert_eq!(
            predict_phase(date("2026-01-28"), &history(), date("2026-01-28"), &cfg),
            Some(Phase::Luteal)
        );
    }

    #[test]
    fn horizon_bounds_projection() {
        let cfg = EngineConfig::default();
        let today = date("2026-03-01");
        let near = today + Duration::days(364);
        let edge = today + Duration::days(365);
        let far = today + Duration::days(366);
        assert!(predict_phase(near, &history(), today, &cfg).is_some());
        assert!(predict_phase(edge, &history(), today, &cfg).is_some());
        assert!(predict_phase(far, &history(), today, &cfg).is_none());
    }

    #[test]
    fn classify_cycle_day_is_total_over_the_cycle() {
        let cfg = EngineConfig::default();
        let phases: Vec<Phase> = (0..28).map(|d| classify_cycle_day(d, 28, 5, &cfg)).collect();
        assert_eq!(phases.iter().filter(|p| **p == Phase::Menstrual).count(), 5);
        assert_eq!(phases.iter().filter(|p| **p == Phase::Follicular).count(), 4);
        assert_eq!(phases.iter().filter(|p| **p == Phase::Fertile).count(), 6);
        assert_eq!(phases.iter().filter(|p| **p == Phase::Ovulation).count(), 1);
        assert_eq!(phases.iter().filter(|p| **p == Phase::Luteal).count(), 12);
    }

    #[test]
    fn long_period_overrides_fertile_days() {
        let cfg = EngineConfig::default();
        // 20-day cycle: ovulation day 6 sits inside an 8-day period.
        assert_eq!(classify_cycle_day(6, 20, 8, &cfg), Phase::Menstrual);
        assert_eq!(classify_cycle_day(7, 20, 8, &cfg), Phase::Menstrual);
        assert_eq!(classify_cycle_day(8, 20, 8, &cfg), Phase::Luteal);
    }
}
