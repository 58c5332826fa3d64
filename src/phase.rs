//! Phase classification for dates inside a recorded cycle.
//!
//! A recorded cycle spans from its period start up to the day before the
//! next recorded start (or `average_cycle_length` days for the latest cycle).
//! Within that span the phases are checked in priority order, first match
//! wins:
//!
//! 1. menstrual: period start through period end (or the default length)
//! 2. ovulation: the ovulation day itself
//! 3. fertile: the fertile window around ovulation
//! 4. follicular: after the period, before the fertile window
//! 5. luteal: after the fertile window, to the end of the cycle
//!
//! Menstrual comes first because on short cycles the fertile window can
//! reach back into the period.

use chrono::{Duration, NaiveDate};

use crate::config::EngineConfig;
use crate::models::{Cycle, FertileWindow, Phase};
use crate::ovulation::{fertile_window, ovulation_date};

/// Resolved day boundaries of one recorded cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleGeometry {
    pub start: NaiveDate,
    pub period_end: NaiveDate,
    pub fertile: FertileWindow,
    /// Last day belonging to this cycle.
    pub end: NaiveDate,
}

impl CycleGeometry {
    pub fn new(
        cycle: &Cycle,
        next_cycle_start: Option<NaiveDate>,
        average_cycle_length: i64,
        config: &EngineConfig,
    ) -> Self {
        let start = cycle.period_start_date;
        // An end recorded before the start counts as missing.
        let period_end = cycle
            .period_end_date
            .filter(|end| *end >= start)
            .unwrap_or_else(|| start + Duration::days(config.default_period_length - 1));
        let fertile = fertile_window(ovulation_date(cycle, average_cycle_length, config), config);
        let end = match next_cycle_start {
            Some(next) => next - Duration::days(1),
            None => start + Duration::days(average_cycle_length - 1),
        };
        Self {
            start,
            period_end,
            fertile,
            end,
        }
    }

    pub fn ovulation(&self) -> NaiveDate {
        self.fertile.ovulation
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn classify(&self, date: NaiveDate) -> Option<Phase> {
        if !self.contains(date) {
            return None;
        }
        if date <= self.period_end {
            Some(Phase::Menstrual)
        } else if date == self.ovulation() {
            Some(Phase::Ovulation)
        } else if self.fertile.contains(date) {
            Some(Phase::Fertile)
        } else if date < self.fertile.start {
            Some(Phase::Follicular)
        } else if date > self.fertile.end {
            Some(Phase::Luteal)
        } else {
            None
        }
    }

    /// Every day of the cycle, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    pub fn dates_in(&self, phase: Phase) -> Vec<NaiveDate> {
        self.days()
            .filter(|d| self.classify(*d) == Some(phase))
            .collect()
    }
}

/// Phase of `date` within `cycle`. `None` when there is no cycle or the date
/// falls outside it.
pub fn phase_for_date(
    date: NaiveDate,
    cycle: Option<&Cycle>,
    next_cycle_start: Option<NaiveDate>,
    average_cycle_length: i64,
    config: &EngineConfig,
) -> Option<Phase> {
    let cycle = cycle?;
    CycleGeometry::new(cycle, next_cycle_start, average_cycle_length, config).classify(date)
}

/// All dates of `cycle` classified as `phase`.
pub fn phase_dates(
    phase: Phase,
    cycle: &Cycle,
    next_cycle_start: Option<NaiveDate>,
    average_cycle_length: i64,
    config: &EngineConfig,
) -> Vec<NaiveDate> {
    CycleGeometry::new(cycle, next_cycle_start, average_cycle_length, config).dates_in(phase)
}

/// The recorded cycle with the latest start on or before `date`, together
/// with the start of the cycle after it.
pub fn cycle_for_date(date: NaiveDate, cycles: &[Cycle]) -> Option<(&Cycle, Option<NaiveDate>)> {
    let mut sorted: Vec<&Cycle> = cycles.iter().collect();
    sorted.sort_by_key(|c| c.period_start_date);
    let idx = sorted.iter().rposition(|c| c.period_start_date <= date)?;
    let next = sorted.get(idx + 1).map(|c| c.period_start_date);
    Some((sorted[idx], next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn first_cycle() -> Cycle {
        Cycle::new(date("2024-01-01")).with_end(date("2024-01-05"))
    }

    fn classify(day: &str, cycle: &Cycle, next: Option<&str>, avg: i64) -> Option<Phase> {
        phase_for_date(
            date(day),
            Some(cycle),
            next.map(date),
            avg,
            &EngineConfig::default(),
        )
    }

    #[test]
    fn classifies_a_regular_cycle() {
        let cycle = first_cycle();
        let next = Some("2024-01-29");
        assert_eq!(classify("2024-01-03", &cycle, next, 28), Some(Phase::Menstrual));
        assert_eq!(classify("2024-01-05", &cycle, next, 28), Some(Phase::Menstrual));
        assert_eq!(classify("2024-01-06", &cycle, next, 28), Some(Phase::Follicular));
        assert_eq!(classify("2024-01-10", &cycle, next, 28), Some(Phase::Fertile));
        assert_eq!(classify("2024-01-15", &cycle, next, 28), Some(Phase::Ovulation));
        assert_eq!(classify("2024-01-16", &cycle, next, 28), Some(Phase::Fertile));
        assert_eq!(classify("2024-01-17", &cycle, next, 28), Some(Phase::Luteal));
        assert_eq!(classify("2024-01-20", &cycle, next, 28), Some(Phase::Luteal));
        assert_eq!(classify("2024-01-28", &cycle, next, 28), Some(Phase::Luteal));
    }

    #[test]
    fn no_cycle_means_no_phase() {
        assert_eq!(
            phase_for_date(date("2024-01-03"), None, None, 28, &EngineConfig::default()),
            None
        );
    }

    #[test]
    fn dates_outside_the_cycle_are_unclassified() {
        let cycle = first_cycle();
        assert_eq!(classify("2023-12-31", &cycle, Some("2024-01-29"), 28), None);
        assert_eq!(classify("2024-01-29", &cycle, Some("2024-01-29"), 28), None);
        // Latest cycle ends after the average length.
        assert_eq!(classify("2024-01-28", &cycle, None, 28), Some(Phase::Luteal));
        assert_eq!(classify("2024-01-29", &cycle, None, 28), None);
    }

    #[test]
    fn open_period_uses_default_length() {
        let cycle = Cycle::new(date("2024-01-01"));
        assert_eq!(classify("2024-01-05", &cycle, None, 28), Some(Phase::Menstrual));
        assert_eq!(classify("2024-01-06", &cycle, None, 28), Some(Phase::Follicular));
    }

    #[test]
    fn end_before_start_falls_back_to_default_length() {
        let cycle = Cycle::new(date("2024-01-05")).with_end(date("2024-01-01"));
        let next = Some("2024-02-02");
        assert_eq!(classify("2024-01-05", &cycle, next, 28), Some(Phase::Menstrual));
        assert_eq!(classify("2024-01-09", &cycle, next, 28), Some(Phase::Menstrual));
        assert_eq!(classify("2024-01-10", &cycle, next, 28), Some(Phase::Follicular));
        assert_eq!(classify("2024-01-19", &cycle, next, 28), Some(Phase::Ovulation));
    }

    #[test]
    fn ovulation_day_beats_fertile_window() {
        let cycle = first_cycle().with_ovulation(date("2024-01-13"));
        assert_eq!(classify("2024-01-13", &cycle, None, 28), Some(Phase::Ovulation));
        assert_eq!(classify("2024-01-08", &cycle, None, 28), Some(Phase::Fertile));
        assert_eq!(classify("2024-01-14", &cycle, None, 28), Some(Phase::Fertile));
        assert_eq!(classify("2024-01-15", &cycle, None, 28), Some(Phase::Luteal));
    }

    #[test]
    fn menstrual_beats_overlapping_ovulation() {
        // An 18-day average puts the ovulation estimate on the last period day.
        let cycle = first_cycle();
        assert_eq!(classify("2024-01-05", &cycle, None, 18), Some(Phase::Menstrual));
        assert_eq!(classify("2024-01-06", &cycle, None, 18), Some(Phase::Fertile));
        assert_eq!(classify("2024-01-07", &cycle, None, 18), Some(Phase::Luteal));
        assert!(phase_dates(Phase::Follicular, &cycle, None, 18, &EngineConfig::default())
            .is_empty());
        assert!(phase_dates(Phase::Ovulation, &cycle, None, 18, &EngineConfig::default())
            .is_empty());
    }

    #[test]
    fn every_day_gets_exactly_one_phase() {
        let cycle = first_cycle();
        let geometry =
            CycleGeometry::new(&cycle, Some(date("2024-01-29")), 28, &EngineConfig::default());
        let mut counts: HashMap<Phase, usize> = HashMap::new();
        for day in geometry.days() {
            let phase = geometry.classify(day).expect("classified");
            *counts.entry(phase).or_default() += 1;
        }
        assert_eq!(counts.values().sum::<usize>(), 28);
        assert_eq!(counts[&Phase::Menstrual], 5);
        assert_eq!(counts[&Phase::Follicular], 4);
        assert_eq!(counts[&Phase::Fertile], 6);
        assert_eq!(counts[&Phase::Ovulation], 1);
        assert_eq!(counts[&Phase::Luteal], 12);

        let per_phase: usize = Phase::ALL
            .iter()
            .map(|p| geometry.dates_in(*p).len())
            .sum();
        assert_eq!(per_phase, 28);
    }

    #[test]
    fn locates_the_containing_cycle() {
        let cycles = vec![
            Cycle::new(date("2024-01-29")),
            first_cycle(),
            Cycle::new(date("2024-02-26")),
        ];
        let (cycle, next) = cycle_for_date(date("2024-02-10"), &cycles).unwrap();
        assert_eq!(cycle.period_start_date, date("2024-01-29"));
        assert_eq!(next, Some(date("2024-02-26")));

        let (cycle, next) = cycle_for_date(date("2024-05-01"), &cycles).unwrap();
        assert_eq!(cycle.period_start_date, date("2024-02-26"));
        assert_eq!(next, None);

        assert!(cycle_for_date(date("2023-12-31"), &cycles).is_none());
    }

    #[test]
    fn short_next_cycle_claims_its_own_period() {
        // Ovulation of the first cycle would be Jan 15, but the next period
        // started on Jan 13.
        let cycles = vec![
            first_cycle(),
            Cycle::new(date("2024-01-13")).with_end(date("2024-01-17")),
        ];
        let cfg = EngineConfig::default();
        let (cycle, next) = cycle_for_date(date("2024-01-15"), &cycles).unwrap();
        assert_eq!(
            phase_for_date(date("2024-01-15"), Some(cycle), next, 28, &cfg),
            Some(Phase::Menstrual)
        );
        assert_eq!(
            phase_for_date(date("2024-01-15"), Some(&cycles[0]), Some(date("2024-01-13")), 28, &cfg),
            None
        );
    }
}
