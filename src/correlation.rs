use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::config::EngineConfig;
use crate::models::{Cycle, Phase, PhaseSymptomEntry, SymptomId, SymptomLog};
use crate::phase::phase_dates;
use crate::statistics::newest_first;

/// Which symptoms tend to show up during `phase`, across the `window` most
/// recent cycles.
///
/// A symptom counts at most once per cycle no matter how many days of the
/// phase it was logged on. Entries are ordered by occurrences, most frequent
/// first, then by symptom id.
pub fn phase_symptom_history(
    phase: Phase,
    cycles: &[Cycle],
    symptoms: &[SymptomLog],
    average_cycle_length: i64,
    window: usize,
    config: &EngineConfig,
) -> Vec<PhaseSymptomEntry> {
    let sorted = newest_first(cycles);
    let analyzed = sorted.len().min(window);
    if analyzed == 0 {
        return Vec::new();
    }

    let mut counts: BTreeMap<&SymptomId, usize> = BTreeMap::new();
    for (idx, cycle) in sorted.iter().take(analyzed).enumerate() {
        // Sorted newest first, so the neighbour before is the next cycle.
        let next_start = idx
            .checked_sub(1)
            .map(|prev| sorted[prev].period_start_date);
        let days: BTreeSet<NaiveDate> =
            phase_dates(phase, cycle, next_start, average_cycle_length, config)
                .into_iter()
                .collect();
        if days.is_empty() {
            continue;
        }

        let seen: BTreeSet<&SymptomId> = symptoms
            .iter()
            .filter(|s| days.contains(&s.date))
            .map(|s| &s.symptom)
            .collect();
        for symptom in seen {
            *counts.entry(symptom).or_default() += 1;
        }
    }

    let mut entries: Vec<PhaseSymptomEntry> = counts
        .into_iter()
        .map(|(symptom, occurrences)| PhaseSymptomEntry {
            symptom: symptom.clone(),
            occurrences,
            percentage: (occurrences as f64 / analyzed as f64 * 100.0).round() as u32,
        })
        .collect();
    // Stable, so ties keep the symptom-id order from the map.
    entries.sort_by(|a, b| b.occurrences.cmp(&a.occurrences));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BuiltinSymptom;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn cycles() -> Vec<Cycle> {
        vec![
            Cycle::new(date("2024-01-01")).with_end(date("2024-01-05")),
            Cycle::new(date("2024-01-29")).with_end(date("2024-02-02")),
            Cycle::new(date("2024-02-26")).with_end(date("2024-03-01")),
        ]
    }

    fn log(day: &str, symptom: impl Into<SymptomId>) -> SymptomLog {
        SymptomLog::new(date(day), symptom)
    }

    #[test]
    fn counts_once_per_cycle() {
        let symptoms = vec![
            log("2024-01-01", BuiltinSymptom::Cramps),
            log("2024-01-02", BuiltinSymptom::Cramps),
            log("2024-01-03", BuiltinSymptom::Cramps),
            log("2024-01-30", BuiltinSymptom::Cramps),
            log("2024-01-30", BuiltinSymptom::Fatigue),
        ];
        let history = phase_symptom_history(
            Phase::Menstrual,
            &cycles(),
            &symptoms,
            28,
            6,
            &EngineConfig::default(),
        );
        assert_eq!(
            history,
            vec![
                PhaseSymptomEntry {
                    symptom: SymptomId::Builtin(BuiltinSymptom::Cramps),
                    occurrences: 2,
                    percentage: 67,
                },
                PhaseSymptomEntry {
                    symptom: SymptomId::Builtin(BuiltinSymptom::Fatigue),
                    occurrences: 1,
                    percentage: 33,
                },
            ]
        );
    }

    #[test]
    fn ignores_symptoms_outside_the_phase() {
        let symptoms = vec![
            log("2024-01-20", BuiltinSymptom::Bloating),
            log("2024-01-15", SymptomId::Custom(3)),
        ];
        let cfg = EngineConfig::default();
        let luteal =
            phase_symptom_history(Phase::Luteal, &cycles(), &symptoms, 28, 6, &cfg);
        assert_eq!(luteal.len(), 1);
        assert_eq!(luteal[0].symptom, SymptomId::Builtin(BuiltinSymptom::Bloating));

        let ovulation =
            phase_symptom_history(Phase::Ovulation, &cycles(), &symptoms, 28, 6, &cfg);
        assert_eq!(ovulation.len(), 1);
        assert_eq!(ovulation[0].symptom, SymptomId::Custom(3));
        assert_eq!(ovulation[0].percentage, 33);
    }

    #[test]
    fn window_limits_analyzed_cycles() {
        let symptoms = vec![
            log("2024-01-02", BuiltinSymptom::Headache),
            log("2024-02-27", BuiltinSymptom::Headache),
        ];
        let history = phase_symptom_history(
            Phase::Menstrual,
            &cycles(),
            &symptoms,
            28,
            1,
            &EngineConfig::default(),
        );
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].occurrences, 1);
        assert_eq!(history[0].percentage, 100);
    }

    #[test]
    fn ties_are_ordered_by_symptom() {
        let symptoms = vec![
            log("2024-01-02", SymptomId::Custom(1)),
            log("2024-01-02", BuiltinSymptom::Acne),
            log("2024-01-02", BuiltinSymptom::Cramps),
        ];
        let history = phase_symptom_history(
            Phase::Menstrual,
            &cycles(),
            &symptoms,
            28,
            6,
            &EngineConfig::default(),
        );
        let order: Vec<SymptomId> = history.into_iter().map(|e| e.symptom).collect();
        assert_eq!(
            order,
            vec![
                SymptomId::Builtin(BuiltinSymptom::Cramps),
                SymptomId::Builtin(BuiltinSymptom::Acne),
                SymptomId::Custom(1),
            ]
        );
    }

    #[test]
    fn no_cycles_no_history() {
        let symptoms = vec![log("2024-01-02", BuiltinSymptom::Cramps)];
        assert!(phase_symptom_history(
            Phase::Menstrual,
            &[],
            &symptoms,
            28,
            6,
            &EngineConfig::default()
        )
        .is_empty());
    }
}
