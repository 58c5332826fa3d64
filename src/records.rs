//! The record set the engine reads from, and the trait storage backends
//! implement to hand it out.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::display::SymptomCatalog;
use crate::models::{Cycle, SymptomId, SymptomLog};
use crate::phase::cycle_for_date;
use crate::storage::StorageError;

/// Read access to the user's records.
///
/// Implemented by every storage backend. The engine only ever reads through
/// this trait and never picks a backend itself.
pub trait RecordSource {
    fn cycles(&self) -> Result<Vec<Cycle>, StorageError>;
    fn symptoms(&self) -> Result<Vec<SymptomLog>, StorageError>;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("no cycle with id {0}")]
    UnknownCycle(Uuid),
    #[error("no symptom log with id {0}")]
    UnknownSymptom(Uuid),
    #[error("period cannot end on {end} before it started on {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
}

/// Everything the user has logged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Records {
    pub cycles: Vec<Cycle>,
    pub symptoms: Vec<SymptomLog>,
    #[serde(default)]
    pub custom_symptoms: SymptomCatalog,
}

impl Records {
    /// Mark a period start. Marking the same day twice returns the existing cycle.
    pub fn start_period(&mut self, date: NaiveDate) -> Uuid {
        if let Some(existing) = self.cycles.iter().find(|c| c.period_start_date == date) {
            return existing.id;
        }
        let cycle = Cycle::new(date);
        let id = cycle.id;
        self.cycles.push(cycle);
        self.relink_symptoms();
        id
    }

    /// Set or clear the last day of bleeding.
    pub fn end_period(&mut self, id: Uuid, end: Option<NaiveDate>) -> Result<(), RecordError> {
        let cycle = self.cycle_mut(id)?;
        if let Some(end) = end {
            if end < cycle.period_start_date {
                return Err(RecordError::EndBeforeStart {
                    start: cycle.period_start_date,
                    end,
                });
            }
        }
        cycle.period_end_date = end;
        Ok(())
    }

    /// Set or clear a confirmed ovulation day.
    pub fn set_ovulation(
        &mut self,
        id: Uuid,
        ovulation: Option<NaiveDate>,
    ) -> Result<(), RecordError> {
        self.cycle_mut(id)?.ovulation_date = ovulation;
        Ok(())
    }

    pub fn remove_cycle(&mut self, id: Uuid) -> Result<Cycle, RecordError> {
        let idx = self
            .cycles
            .iter()
            .position(|c| c.id == id)
            .ok_or(RecordError::UnknownCycle(id))?;
        let removed = self.cycles.remove(idx);
        self.relink_symptoms();
        Ok(removed)
    }

    /// Log a symptom, linking it to the cycle it falls in.
    pub fn log_symptom(&mut self, date: NaiveDate, symptom: impl Into<SymptomId>) -> Uuid {
        let mut log = SymptomLog::new(date, symptom);
        log.cycle_id = cycle_for_date(date, &self.cycles).map(|(c, _)| c.id);
        let id = log.id;
        self.symptoms.push(log);
        id
    }

    pub fn remove_symptom(&mut self, id: Uuid) -> Result<SymptomLog, RecordError> {
        let idx = self
            .symptoms
            .iter()
            .position(|s| s.id == id)
            .ok_or(RecordError::UnknownSymptom(id))?;
        Ok(self.symptoms.remove(idx))
    }

    pub fn define_symptom(&mut self, name: impl Into<String>, icon: Option<String>) -> SymptomId {
        self.custom_symptoms.define(name, icon)
    }

    fn cycle_mut(&mut self, id: Uuid) -> Result<&mut Cycle, RecordError> {
        self.cycles
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RecordError::UnknownCycle(id))
    }

    /// Cycle boundaries moved; point every log at the cycle it now falls in.
    fn relink_symptoms(&mut self) {
        for log in &mut self.symptoms {
            log.cycle_id = cycle_for_date(log.date, &self.cycles).map(|(c, _)| c.id);
        }
    }
}

impl RecordSource for Records {
    fn cycles(&self) -> Result<Vec<Cycle>, StorageError> {
        Ok(self.cycles.clone())
    }

    fn symptoms(&self) -> Result<Vec<SymptomLog>, StorageError> {
        Ok(self.symptoms.clone())
    }
}
