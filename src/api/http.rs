use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{error, info, warn};
use url::Url;

use super::types::{
    CatalogPage, ErrorBody, FinalizeRequest, FinalizeResponse, SessionExercisePlan,
    TrainingSession,
};
use super::TrainingApi;
use crate::error::ApiError;
use crate::session::FinalizePayloadEntry;

const USER_AGENT: &str = concat!("trainlog/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed implementation of [`TrainingApi`].
///
/// Routes, relative to the configured base URL:
/// - `GET training-session/{id}`
/// - `GET training-session/{id}/exercises`
/// - `GET exercises?page=..&limit=..`
/// - `PUT training-session/{id}/finish`
pub struct HttpTrainingApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTrainingApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("'{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!("'{}' cannot be a base URL", base_url)));
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ApiError::InvalidUrl(format!("'{}' cannot be a base URL", self.base_url))
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|e| {
            let msg = if e.is_timeout() {
                format!("{} timed out", what)
            } else {
                format!("{} failed: {}", what, e)
            };
            error!("{}", msg);
            ApiError::Network(msg)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::into_message);
            warn!(
                "{} returned {} ({})",
                what,
                status,
                message.as_deref().unwrap_or("no message")
            );
            return Err(ApiError::from_status(status.as_u16(), message));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("Failed to read {} response: {}", what, e)))?;
        serde_json::from_str(&body).map_err(|e| {
            let msg = format!("Unexpected {} response: {}", what, e);
            error!("{}", msg);
            ApiError::Decode(msg)
        })
    }
}

#[async_trait]
impl TrainingApi for HttpTrainingApi {
    async fn get_session(&self, token: &str, session_id: i64) -> Result<TrainingSession, ApiError> {
        let url = self.endpoint(&["training-session", session_id.to_string().as_str()])?;
        info!("Fetching session {}", session_id);
        self.send_json(self.client.get(url).bearer_auth(token), "session fetch")
            .await
    }

    async fn get_session_exercises(
        &self,
        token: &str,
        session_id: i64,
    ) -> Result<Vec<SessionExercisePlan>, ApiError> {
        let url = self.endpoint(&["training-session", session_id.to_string().as_str(), "exercises"])?;
        info!("Fetching planned exercises for session {}", session_id);
        self.send_json(self.client.get(url).bearer_auth(token), "session exercises fetch")
            .await
    }

    async fn get_exercise_catalog(
        &self,
        token: &str,
        page: u32,
        page_size: u32,
    ) -> Result<CatalogPage, ApiError> {
        let mut url = self.endpoint(&["exercises"])?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &page_size.to_string());
        info!("Fetching exercise catalog (page={}, limit={})", page, page_size);
        self.send_json(self.client.get(url).bearer_auth(token), "catalog fetch")
            .await
    }

    async fn finalize_session(
        &self,
        token: &str,
        session_id: i64,
        entries: &[FinalizePayloadEntry],
    ) -> Result<FinalizeResponse, ApiError> {
        let url = self.endpoint(&["training-session", session_id.to_string().as_str(), "finish"])?;
        info!("Finishing session {} with {} entries", session_id, entries.len());
        let request = self
            .client
            .put(url)
            .bearer_auth(token)
            .json(&FinalizeRequest { exercises: entries });
        self.send_json(request, "finalize").await
    }
}
