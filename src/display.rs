//! Presentation metadata for phases and symptoms.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{BuiltinSymptom, Phase, SymptomId};

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Menstrual => "Period",
            Phase::Follicular => "Follicular",
            Phase::Fertile => "Fertile window",
            Phase::Ovulation => "Ovulation",
            Phase::Luteal => "Luteal",
        }
    }

    /// Calendar tint as a hex RGB string.
    pub fn color(self) -> &'static str {
        match self {
            Phase::Menstrual => "#e05a6d",
            Phase::Follicular => "#f3b562",
            Phase::Fertile => "#7fc8a9",
            Phase::Ovulation => "#3e9e7c",
            Phase::Luteal => "#9b8ec7",
        }
    }
}

impl BuiltinSymptom {
    pub fn label(self) -> &'static str {
        match self {
            BuiltinSymptom::Cramps => "Cramps",
            BuiltinSymptom::Headache => "Headache",
            BuiltinSymptom::MoodLow => "Low mood",
            BuiltinSymptom::MoodHigh => "High mood",
            BuiltinSymptom::Fatigue => "Fatigue",
            BuiltinSymptom::Bloating => "Bloating",
            BuiltinSymptom::BreastTenderness => "Breast tenderness",
            BuiltinSymptom::Acne => "Acne",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomSymptom {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomDisplay {
    pub label: String,
    pub icon: Option<String>,
    pub custom: bool,
}

/// User-defined symptoms, keyed by their custom id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SymptomCatalog {
    custom: BTreeMap<u64, CustomSymptom>,
    /// Next id to hand out. Ids are never reused.
    #[serde(default)]
    next_id: u64,
}

impl SymptomCatalog {
    /// Register a new custom symptom and return its id.
    pub fn define(&mut self, name: impl Into<String>, icon: Option<String>) -> SymptomId {
        let after_last = self.custom.keys().next_back().map_or(1, |last| last + 1);
        let id = self.next_id.max(after_last);
        self.next_id = id + 1;
        self.custom.insert(
            id,
            CustomSymptom {
                name: name.into(),
                icon,
            },
        );
        SymptomId::Custom(id)
    }

    pub fn get(&self, id: u64) -> Option<&CustomSymptom> {
        self.custom.get(&id)
    }

    pub fn remove(&mut self, id: u64) -> Option<CustomSymptom> {
        self.custom.remove(&id)
    }

    pub fn custom_symptoms(&self) -> impl Iterator<Item = (SymptomId, &CustomSymptom)> {
        self.custom
            .iter()
            .map(|(id, symptom)| (SymptomId::Custom(*id), symptom))
    }

    /// Display metadata for any symptom id. Custom ids missing from the
    /// catalog still get a generic label.
    pub fn describe(&self, symptom: &SymptomId) -> SymptomDisplay {
        match symptom {
            SymptomId::Builtin(builtin) => SymptomDisplay {
                label: builtin.label().to_string(),
                icon: None,
                custom: false,
            },
            SymptomId::Custom(id) => match self.custom.get(id) {
                Some(custom) => SymptomDisplay {
                    label: custom.name.clone(),
                    icon: custom.icon.clone(),
                    custom: true,
                },
                None => SymptomDisplay {
                    label: "Custom symptom".to_string(),
                    icon: None,
                    custom: true,
                },
            },
        }
    }
}
