//! Submit the change-set that finishes a session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::form::SessionForm;
use super::loader::Liveness;
use super::types::FinalizePayloadEntry;
use crate::api::TrainingApi;
use crate::auth::AuthContext;
use crate::error::{ApiError, SessionError};
use crate::notify::{Notice, Route, ViewContext};

pub const FINALIZE_FAILED_MESSAGE: &str = "Failed to finish training";
pub const FINALIZE_SUCCESS_FALLBACK: &str = "Training finished";

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Server accepted the change-set; carries the message shown to the user.
    Finished(String),
    /// Nothing was sent because the form failed local validation.
    Invalid(SessionError),
    /// Server or network rejected the submission. The form is left untouched.
    Rejected(ApiError),
    /// A submission is already in flight; the submit control is disabled.
    Ignored,
}

/// Coordinates one finalize call at a time for a view.
///
/// The in-flight flag doubles as the disabled state of the submit control.
pub struct FinalizeOrchestrator {
    api: Arc<dyn TrainingApi>,
    ctx: ViewContext,
    liveness: Liveness,
    in_flight: AtomicBool,
}

impl FinalizeOrchestrator {
    pub fn new(api: Arc<dyn TrainingApi>, ctx: ViewContext, liveness: Liveness) -> Self {
        Self {
            api,
            ctx,
            liveness,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn submit_enabled(&self) -> bool {
        !self.in_flight.load(Ordering::Acquire)
    }

    pub async fn submit(
        &self,
        auth: &AuthContext,
        session_id: i64,
        form: &SessionForm,
    ) -> SubmitOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Finalize already in flight for session {}", session_id);
            return SubmitOutcome::Ignored;
        }

        if form.is_empty() {
            self.in_flight.store(false, Ordering::Release);
            let err = SessionError::EmptyExerciseList;
            self.ctx.notices.notify(Notice::error(err.to_string()));
            return SubmitOutcome::Invalid(err);
        }

        self.ctx.busy.set_busy(true);
        let payload = form.payload();
        let outcome = self.send(auth, session_id, &payload).await;
        self.ctx.busy.set_busy(false);
        self.in_flight.store(false, Ordering::Release);

        outcome
    }

    async fn send(
        &self,
        auth: &AuthContext,
        session_id: i64,
        payload: &[FinalizePayloadEntry],
    ) -> SubmitOutcome {
        let changed = payload.iter().filter(|e| e.has_changes()).count();
        info!(
            "Submitting session {}: {} of {} exercises changed",
            session_id,
            changed,
            payload.len()
        );

        let result = self
            .api
            .finalize_session(&auth.token, session_id, payload)
            .await;

        let alive = self.liveness.is_alive();
        match result {
            Ok(response) => {
                let message = response
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| FINALIZE_SUCCESS_FALLBACK.to_string());
                info!("Session {} finished: {}", session_id, message);
                if alive {
                    self.ctx.notices.notify(Notice::success(message.clone()));
                    self.ctx.navigator.navigate(Route::SessionsList);
                }
                SubmitOutcome::Finished(message)
            }
            Err(err) => {
                warn!("Failed to finish session {}: {}", session_id, err);
                if alive {
                    self.ctx.notices.notify(Notice::error(
                        err.server_message().unwrap_or(FINALIZE_FAILED_MESSAGE),
                    ));
                }
                SubmitOutcome::Rejected(err)
            }
        }
    }
}
