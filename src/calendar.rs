//! Per-day phase resolution and month views for the calendar screen.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::models::{
    Cycle, CycleSummary, FertileWindow, PeriodPrediction, Phase, SymptomId, SymptomLog,
};
use crate::phase::{cycle_for_date, phase_for_date};
use crate::prediction::{next_fertile_window, predict_next_period, predict_phase};
use crate::statistics::{average_cycle_length, cycle_summary};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("invalid month: {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DayPhase {
    pub phase: Phase,
    /// Derived from averages rather than a recorded cycle.
    pub projected: bool,
    /// After `today`; rendered as a prediction.
    pub future: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub phase: Option<DayPhase>,
    pub symptoms: Vec<SymptomId>,
}

/// Data returned to the frontend for a month view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
    pub next_period: Option<PeriodPrediction>,
    pub fertile_window: Option<FertileWindow>,
    pub current_cycle: Option<Cycle>,
    pub summary: CycleSummary,
}

/// Resolve the phase of a single day.
///
/// Days inside a recorded cycle are classified against it. Anything later
/// falls back to the forward projection. Days before the first recorded
/// period are left unclassified.
pub fn day_phase(
    date: NaiveDate,
    cycles: &[Cycle],
    today: NaiveDate,
    config: &EngineConfig,
) -> Option<DayPhase> {
    let (cycle, next_start) = cycle_for_date(date, cycles)?;
    let future = date > today;
    let average = average_cycle_length(cycles, config);

    if let Some(phase) = phase_for_date(date, Some(cycle), next_start, average, config) {
        return Some(DayPhase {
            phase,
            projected: false,
            future,
        });
    }
    predict_phase(date, cycles, today, config).map(|phase| DayPhase {
        phase,
        projected: true,
        future,
    })
}

pub fn month_view(
    year: i32,
    month: u32,
    cycles: &[Cycle],
    symptoms: &[SymptomLog],
    today: NaiveDate,
    config: &EngineConfig,
) -> Result<MonthView, CalendarError> {
    let invalid = || CalendarError::InvalidMonth { year, month };
    let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let last_day = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?
        - Duration::days(1);

    let days = first_day
        .iter_days()
        .take_while(|d| *d <= last_day)
        .map(|date| {
            let mut logged: Vec<SymptomId> = symptoms
                .iter()
                .filter(|s| s.date == date)
                .map(|s| s.symptom.clone())
                .collect();
            logged.sort();
            logged.dedup();
            CalendarDay {
                date,
                phase: day_phase(date, cycles, today, config),
                symptoms: logged,
            }
        })
        .collect();

    let current_cycle = cycles
        .iter()
        .max_by_key(|c| c.period_start_date)
        .filter(|c| c.period_end_date.is_none())
        .cloned();

    Ok(MonthView {
        year,
        month,
        days,
        next_period: predict_next_period(cycles, config),
        fertile_window: next_fertile_window(cycles, config),
        current_cycle,
        summary: cycle_summary(cycles, config),
    })
}
