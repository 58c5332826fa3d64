use chrono::NaiveDate;

use crate::calendar::{self, CalendarError, DayPhase, MonthView};
use crate::config::{ConfigError, EngineConfig};
use crate::correlation::phase_symptom_history;
use crate::models::{
    Cycle, CycleSummary, FertileWindow, LengthStats, PeriodPrediction, Phase, PhaseSymptomEntry,
    SymptomLog,
};
use crate::ovulation::cycle_fertile_window;
use crate::prediction::{next_fertile_window, predict_next_period};
use crate::records::RecordSource;
use crate::statistics;
use crate::storage::StorageError;

/// Cycles and symptoms read from a source at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub cycles: Vec<Cycle>,
    pub symptoms: Vec<SymptomLog>,
}

impl Snapshot {
    pub fn new(cycles: Vec<Cycle>, symptoms: Vec<SymptomLog>) -> Self {
        Self { cycles, symptoms }
    }

    pub fn load(source: &dyn RecordSource) -> Result<Self, StorageError> {
        Ok(Self {
            cycles: source.cycles()?,
            symptoms: source.symptoms()?,
        })
    }
}

/// Runs every calculation against a snapshot with one configuration.
#[derive(Debug, Clone, Default)]
pub struct CycleEngine {
    config: EngineConfig,
}

impl CycleEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn average_cycle_length(&self, snapshot: &Snapshot) -> i64 {
        statistics::average_cycle_length(&snapshot.cycles, &self.config)
    }

    pub fn cycle_length_stats(&self, snapshot: &Snapshot) -> Option<LengthStats> {
        statistics::cycle_length_stats(&snapshot.cycles, &self.config)
    }

    pub fn average_period_length(&self, snapshot: &Snapshot) -> Option<i64> {
        statistics::average_period_length(&snapshot.cycles, &self.config)
    }

    pub fn period_length_stats(&self, snapshot: &Snapshot) -> Option<LengthStats> {
        statistics::period_length_stats(&snapshot.cycles, &self.config)
    }

    pub fn summary(&self, snapshot: &Snapshot) -> CycleSummary {
        statistics::cycle_summary(&snapshot.cycles, &self.config)
    }

    /// Fertile window of a recorded cycle, estimated from the average length
    /// unless the cycle has a confirmed ovulation day.
    pub fn fertile_window(&self, snapshot: &Snapshot, cycle: &Cycle) -> FertileWindow {
        cycle_fertile_window(cycle, self.average_cycle_length(snapshot), &self.config)
    }

    pub fn next_period(&self, snapshot: &Snapshot) -> Option<PeriodPrediction> {
        predict_next_period(&snapshot.cycles, &self.config)
    }

    pub fn next_fertile_window(&self, snapshot: &Snapshot) -> Option<FertileWindow> {
        next_fertile_window(&snapshot.cycles, &self.config)
    }

    pub fn phase_on(
        &self,
        snapshot: &Snapshot,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Option<DayPhase> {
        calendar::day_phase(date, &snapshot.cycles, today, &self.config)
    }

    /// Symptom frequencies for `phase` over the configured trailing window.
    pub fn symptom_history(&self, snapshot: &Snapshot, phase: Phase) -> Vec<PhaseSymptomEntry> {
        phase_symptom_history(
            phase,
            &snapshot.cycles,
            &snapshot.symptoms,
            self.average_cycle_length(snapshot),
            self.config.stats_window,
            &self.config,
        )
    }

    pub fn month(
        &self,
        snapshot: &Snapshot,
        year: i32,
        month: u32,
        today: NaiveDate,
    ) -> Result<MonthView, CalendarError> {
        calendar::month_view(
            year,
            month,
            &snapshot.cycles,
            &snapshot.symptoms,
            today,
            &self.config,
        )
    }
}
