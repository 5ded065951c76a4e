//! Join planned exercises with the catalog into editable options.

use std::collections::HashMap;

use tracing::warn;

use super::types::ExerciseOption;
use crate::api::{CatalogExercise, SessionExercisePlan};

/// Build one [`ExerciseOption`] per plan entry, in plan order.
///
/// Absent weight and notes become empty strings. A plan entry whose exercise
/// is missing from the catalog keeps `value`/`label` unset but is still
/// included, since diffing only needs the exercise id.
pub fn materialize(plans: &[SessionExercisePlan], catalog: &[CatalogExercise]) -> Vec<ExerciseOption> {
    let by_id: HashMap<i64, &CatalogExercise> = catalog.iter().map(|e| (e.id, e)).collect();

    plans
        .iter()
        .map(|plan| {
            let entry = by_id.get(&plan.exercise_id);
            if entry.is_none() {
                warn!("Exercise {} not found in catalog", plan.exercise_id);
            }
            ExerciseOption {
                value: entry.map(|e| e.id),
                label: entry.map(|e| e.name.clone()),
                exercise_id: plan.exercise_id,
                series: plan.series,
                repetitions: plan.repetitions,
                weight: plan.weight.clone().unwrap_or_default(),
                notes: plan.notes.clone().unwrap_or_default(),
            }
        })
        .collect()
}
