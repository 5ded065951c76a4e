//! Wire types exchanged with the training API.
//!
//! Field names follow the server's JSON (`id_training_session`, `id_user`,
//! `id_exercise`, ...); the Rust side uses descriptive names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::session::FinalizePayloadEntry;

/// A single timed workout owned by one user.
///
/// Editable only while `finished_at` is `None` and the owner is the current actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSession {
    #[serde(rename = "id_training_session")]
    pub id: i64,
    #[serde(rename = "id_user")]
    pub owner_user_id: i64,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub title: Option<String>,
}

impl TrainingSession {
    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }
}

/// Server-recorded plan for one exercise of a session. Used as the diff baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionExercisePlan {
    #[serde(rename = "id_exercise")]
    pub exercise_id: i64,
    pub series: u32,
    pub repetitions: u32,
    #[serde(default, deserialize_with = "weight_as_text")]
    pub weight: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Catalog entry, the source of an exercise's display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogExercise {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPage {
    pub data: Vec<CatalogExercise>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinalizeRequest<'a> {
    pub exercises: &'a [FinalizePayloadEntry],
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FinalizeResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body shape used by the server (`{"message": ...}` or `{"error": ...}`).
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }
}

/// Planned weight arrives as a number, a string or null; keep it as text.
fn weight_as_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(serde::de::Error::custom(format!(
            "weight must be a number or string, got {}",
            other
        ))),
    }
}
