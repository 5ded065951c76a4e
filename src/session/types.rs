use serde::Serialize;

/// Editable working record for one planned exercise.
///
/// `value`/`label` come from the catalog and stay `None` when the plan
/// references an exercise the catalog does not list. `exercise_id` comes from
/// the plan and is the key used for diffing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseOption {
    pub value: Option<i64>,
    pub label: Option<String>,
    pub exercise_id: i64,
    pub series: u32,
    pub repetitions: u32,
    /// Text as typed; numeric meaning is applied when building the payload.
    pub weight: String,
    pub notes: String,
}

/// One exercise of the finalize change-set.
///
/// Only changed fields are present. `weight` and `notes` use a nested option:
/// the outer level says whether the key is sent, the inner one allows an
/// explicit `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalizePayloadEntry {
    #[serde(rename = "id_exercise")]
    pub exercise_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetitions: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

impl FinalizePayloadEntry {
    pub fn unchanged(exercise_id: i64) -> Self {
        Self {
            exercise_id,
            series: None,
            repetitions: None,
            weight: None,
            notes: None,
        }
    }

    pub fn has_changes(&self) -> bool {
        self.series.is_some()
            || self.repetitions.is_some()
            || self.weight.is_some()
            || self.notes.is_some()
    }
}
