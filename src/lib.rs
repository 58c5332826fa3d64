//! Cycle-phase inference and prediction for the cykel tracker.
//!
//! Every calculation is a pure function of the cycles and symptoms passed
//! in: nothing is cached between calls and nothing is written back. Storage
//! backends hand records to the engine through [`RecordSource`].

pub mod calendar;
pub mod config;
pub mod correlation;
pub mod crypto;
pub mod display;
pub mod engine;
pub mod models;
pub mod ovulation;
pub mod phase;
pub mod prediction;
pub mod records;
pub mod statistics;
pub mod storage;

pub use calendar::{day_phase, month_view, CalendarDay, CalendarError, DayPhase, MonthView};
pub use config::{ConfigError, EngineConfig};
pub use correlation::phase_symptom_history;
pub use display::{SymptomCatalog, SymptomDisplay};
pub use engine::{CycleEngine, Snapshot};
pub use models::{
    BuiltinSymptom, Cycle, CycleSummary, FertileWindow, LengthStats, PeriodPrediction, Phase,
    PhaseSymptomEntry, SymptomId, SymptomLog,
};
pub use ovulation::{fertile_window, ovulation_date};
pub use phase::{cycle_for_date, phase_dates, phase_for_date, CycleGeometry};
pub use prediction::{next_fertile_window, predict_next_period, predict_phase};
pub use records::{RecordError, RecordSource, Records};
pub use statistics::{
    average_cycle_length, average_period_length, cycle_length_stats, cycle_summary,
    period_length_stats,
};
pub use storage::{StorageCapability, StorageError, Store, Vault};
