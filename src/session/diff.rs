//! Minimal change-set between the working copy and the baseline.

use std::collections::HashMap;

use super::types::{ExerciseOption, FinalizePayloadEntry};

/// Build one payload entry per working-copy exercise, in working-copy order.
///
/// Each entry carries the exercise id plus only the fields that differ from
/// the baseline entry with the same id. A working entry with no baseline match
/// sends every field.
pub fn build_finalize_payload(
    working: &[ExerciseOption],
    baseline: &[ExerciseOption],
) -> Vec<FinalizePayloadEntry> {
    let mut by_id: HashMap<i64, &ExerciseOption> = HashMap::with_capacity(baseline.len());
    for prior in baseline {
        // first match wins
        by_id.entry(prior.exercise_id).or_insert(prior);
    }

    working
        .iter()
        .map(|current| diff_entry(current, by_id.get(&current.exercise_id).copied()))
        .collect()
}

fn diff_entry(current: &ExerciseOption, prior: Option<&ExerciseOption>) -> FinalizePayloadEntry {
    let mut entry = FinalizePayloadEntry::unchanged(current.exercise_id);

    if prior.map_or(true, |o| o.series != current.series) {
        entry.series = Some(current.series);
    }
    if prior.map_or(true, |o| o.repetitions != current.repetitions) {
        entry.repetitions = Some(current.repetitions);
    }
    if prior.map_or(true, |o| o.weight != current.weight) {
        entry.weight = Some(coerce_weight(&current.weight));
    }
    if prior.map_or(true, |o| o.notes != current.notes) {
        entry.notes = Some(normalize_notes(&current.notes));
    }

    entry
}

/// Numeric value of a weight input. Blank input reads as zero; anything that
/// is not a finite number is `None`.
pub fn coerce_weight(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|w| w.is_finite())
}

fn normalize_notes(notes: &str) -> Option<String> {
    if notes.is_empty() {
        None
    } else {
        Some(notes.to_string())
    }
}
