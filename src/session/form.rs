use std::str::FromStr;

use super::diff::build_finalize_payload;
use super::types::{ExerciseOption, FinalizePayloadEntry};
use crate::error::SessionError;

/// A new value for one field of an exercise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExerciseField {
    Series(u32),
    Repetitions(u32),
    Weight(String),
    Notes(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseEdit {
    pub exercise_id: i64,
    pub field: ExerciseField,
}

/// Parses `<exercise_id>:<field>=<value>`, e.g. `12:repetitions=15` or `12:notes=`.
impl FromStr for ExerciseEdit {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |why: &str| SessionError::InvalidEdit(format!("'{}': {}", s, why));

        let (id, rest) = s
            .split_once(':')
            .ok_or_else(|| invalid("expected <exercise_id>:<field>=<value>"))?;
        let exercise_id = id
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid("exercise id must be an integer"))?;
        let (name, value) = rest
            .split_once('=')
            .ok_or_else(|| invalid("expected <field>=<value>"))?;

        let count = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|_| invalid("expected a non-negative integer"))
        };
        let field = match name.trim() {
            "series" => ExerciseField::Series(count(value)?),
            "repetitions" | "reps" => ExerciseField::Repetitions(count(value)?),
            "weight" => ExerciseField::Weight(value.to_string()),
            "notes" => ExerciseField::Notes(value.to_string()),
            _ => return Err(invalid("field must be series, repetitions, weight or notes")),
        };

        Ok(Self { exercise_id, field })
    }
}

/// Baseline snapshot plus the user-edited working copy.
///
/// The set of exercise ids is fixed at load time; edits only change fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionForm {
    baseline: Vec<ExerciseOption>,
    working: Vec<ExerciseOption>,
}

impl SessionForm {
    pub fn new(options: Vec<ExerciseOption>) -> Self {
        Self {
            working: options.clone(),
            baseline: options,
        }
    }

    /// Replace both copies with freshly materialized options.
    pub fn reset(&mut self, options: Vec<ExerciseOption>) {
        *self = Self::new(options);
    }

    pub fn baseline(&self) -> &[ExerciseOption] {
        &self.baseline
    }

    pub fn working(&self) -> &[ExerciseOption] {
        &self.working
    }

    pub fn is_empty(&self) -> bool {
        self.working.is_empty()
    }

    pub fn apply(&mut self, edit: ExerciseEdit) -> Result<(), SessionError> {
        let option = self
            .working
            .iter_mut()
            .find(|o| o.exercise_id == edit.exercise_id)
            .ok_or(SessionError::UnknownExercise(edit.exercise_id))?;

        match edit.field {
            ExerciseField::Series(v) => option.series = v,
            ExerciseField::Repetitions(v) => option.repetitions = v,
            ExerciseField::Weight(v) => option.weight = v,
            ExerciseField::Notes(v) => option.notes = v,
        }
        Ok(())
    }

    pub fn is_dirty(&self) -> bool {
        self.payload().iter().any(FinalizePayloadEntry::has_changes)
    }

    pub fn payload(&self) -> Vec<FinalizePayloadEntry> {
        build_finalize_payload(&self.working, &self.baseline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> SessionForm {
        SessionForm::new(vec![ExerciseOption {
            value: Some(4),
            label: Some("Row".to_string()),
            exercise_id: 4,
            series: 3,
            repetitions: 10,
            weight: "20".to_string(),
            notes: String::new(),
        }])
    }

    #[test]
    fn test_parse_edits() {
        assert_eq!(
            "4:repetitions=12".parse::<ExerciseEdit>().unwrap(),
            ExerciseEdit { exercise_id: 4, field: ExerciseField::Repetitions(12) }
        );
        assert_eq!(
            "4:reps= 8".parse::<ExerciseEdit>().unwrap().field,
            ExerciseField::Repetitions(8)
        );
        assert_eq!(
            "4:notes=".parse::<ExerciseEdit>().unwrap().field,
            ExerciseField::Notes(String::new())
        );
        assert_eq!(
            "4:notes=a=b".parse::<ExerciseEdit>().unwrap().field,
            ExerciseField::Notes("a=b".to_string())
        );
        assert_eq!(
            "4:weight=abc".parse::<ExerciseEdit>().unwrap().field,
            ExerciseField::Weight("abc".to_string())
        );
    }

    #[test]
    fn test_parse_rejects_malformed_edits() {
        for raw in ["repetitions=12", "x:series=3", "4:series", "4:series=-1", "4:tempo=3"] {
            let err = raw.parse::<ExerciseEdit>().unwrap_err();
            assert!(matches!(err, SessionError::InvalidEdit(_)), "{} gave {:?}", raw, err);
        }
    }

    #[test]
    fn test_apply_changes_working_copy_only() {
        let mut form = form();
        assert!(!form.is_dirty());

        form.apply("4:series=5".parse().unwrap()).unwrap();
        assert_eq!(form.working()[0].series, 5);
        assert_eq!(form.baseline()[0].series, 3);
        assert!(form.is_dirty());

        form.apply("4:series=3".parse().unwrap()).unwrap();
        assert!(!form.is_dirty(), "reverting an edit should leave nothing to send");
    }

    #[test]
    fn test_apply_unknown_exercise() {
        let mut form = form();
        let err = form.apply("9:series=5".parse().unwrap()).unwrap_err();
        assert_eq!(err, SessionError::UnknownExercise(9));
    }

    #[test]
    fn test_reset_replaces_both_copies() {
        let mut form = form();
        form.apply("4:weight=25".parse().unwrap()).unwrap();
        form.reset(Vec::new());
        assert!(form.is_empty());
        assert!(form.baseline().is_empty());
    }
}
