//! Remote training API consumed by the active-session core.

#[cfg(test)]
pub(crate) mod fake;
pub mod http;
pub mod types;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::session::FinalizePayloadEntry;

pub use http::HttpTrainingApi;
pub use types::*;

/// The four server operations the active-session core relies on.
#[async_trait]
pub trait TrainingApi: Send + Sync {
    async fn get_session(&self, token: &str, session_id: i64) -> Result<TrainingSession, ApiError>;

    async fn get_session_exercises(
        &self,
        token: &str,
        session_id: i64,
    ) -> Result<Vec<SessionExercisePlan>, ApiError>;

    /// Fetch one catalog page. `page_size == 0` asks the server for every entry.
    async fn get_exercise_catalog(
        &self,
        token: &str,
        page: u32,
        page_size: u32,
    ) -> Result<CatalogPage, ApiError>;

    async fn finalize_session(
        &self,
        token: &str,
        session_id: i64,
        entries: &[FinalizePayloadEntry],
    ) -> Result<FinalizeResponse, ApiError>;
}
