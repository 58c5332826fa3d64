use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One menstrual cycle, anchored by the day the period started.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Cycle {
    pub id: Uuid,
    pub period_start_date: NaiveDate,
    /// Last day of bleeding. `None` while the period is ongoing or unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_end_date: Option<NaiveDate>,
    /// User-confirmed ovulation day; overrides the estimate for this cycle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ovulation_date: Option<NaiveDate>,
}

impl Cycle {
    pub fn new(period_start_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            period_start_date,
            period_end_date: None,
            ovulation_date: None,
        }
    }

    pub fn with_end(mut self, end: NaiveDate) -> Self {
        self.period_end_date = Some(end);
        self
    }

    pub fn with_ovulation(mut self, ovulation: NaiveDate) -> Self {
        self.ovulation_date = Some(ovulation);
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinSymptom {
    Cramps,
    Headache,
    MoodLow,
    MoodHigh,
    Fatigue,
    Bloating,
    BreastTenderness,
    Acne,
}

impl BuiltinSymptom {
    pub const ALL: [BuiltinSymptom; 8] = [
        BuiltinSymptom::Cramps,
        BuiltinSymptom::Headache,
        BuiltinSymptom::MoodLow,
        BuiltinSymptom::MoodHigh,
        BuiltinSymptom::Fatigue,
        BuiltinSymptom::Bloating,
        BuiltinSymptom::BreastTenderness,
        BuiltinSymptom::Acne,
    ];

    pub fn key(self) -> &'static str {
        match self {
            BuiltinSymptom::Cramps => "cramps",
            BuiltinSymptom::Headache => "headache",
            BuiltinSymptom::MoodLow => "mood_low",
            BuiltinSymptom::MoodHigh => "mood_high",
            BuiltinSymptom::Fatigue => "fatigue",
            BuiltinSymptom::Bloating => "bloating",
            BuiltinSymptom::BreastTenderness => "breast_tenderness",
            BuiltinSymptom::Acne => "acne",
        }
    }
}

/// Identifies what was logged: one of the shipped symptoms or a
/// user-defined one from the custom catalog.
///
/// Serialized as `{"kind": "builtin", "id": "cramps"}` or
/// `{"kind": "custom", "id": 3}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum SymptomId {
    Builtin(BuiltinSymptom),
    Custom(u64),
}

impl From<BuiltinSymptom> for SymptomId {
    fn from(symptom: BuiltinSymptom) -> Self {
        SymptomId::Builtin(symptom)
    }
}

impl fmt::Display for SymptomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymptomId::Builtin(symptom) => write!(f, "{}", symptom.key()),
            SymptomId::Custom(id) => write!(f, "custom#{id}"),
        }
    }
}

/// A symptom logged on one day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SymptomLog {
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(rename = "symptomIdentifier")]
    pub symptom: SymptomId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_id: Option<Uuid>,
}

impl SymptomLog {
    pub fn new(date: NaiveDate, symptom: impl Into<SymptomId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            symptom: symptom.into(),
            cycle_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Menstrual,
    Follicular,
    Fertile,
    Ovulation,
    Luteal,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Menstrual,
        Phase::Follicular,
        Phase::Fertile,
        Phase::Ovulation,
        Phase::Luteal,
    ];
}

/// Min / max / rounded mean over the trailing window, in days.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LengthStats {
    pub min: i64,
    pub max: i64,
    pub average: i64,
}

impl LengthStats {
    pub fn from_samples(samples: &[i64]) -> Option<Self> {
        let min = samples.iter().copied().min()?;
        let max = samples.iter().copied().max()?;
        Some(Self {
            min,
            max,
            average: rounded_mean(samples)?,
        })
    }
}

pub(crate) fn rounded_mean(samples: &[i64]) -> Option<i64> {
    if samples.is_empty() {
        return None;
    }
    let sum: i64 = samples.iter().sum();
    Some((sum as f64 / samples.len() as f64).round() as i64)
}

/// Inclusive date interval carrying conception probability.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FertileWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub ovulation: NaiveDate,
}

impl FertileWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhaseSymptomEntry {
    pub symptom: SymptomId,
    /// Number of analyzed cycles in which the symptom showed up during the phase.
    pub occurrences: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CycleSummary {
    pub total_cycles: usize,
    pub cycle_length: Option<LengthStats>,
    pub period_length: Option<LengthStats>,
    pub last_period_start: Option<NaiveDate>,
    pub last_period_end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodPrediction {
    pub predicted_start: NaiveDate,
    pub predicted_end: NaiveDate,
}
