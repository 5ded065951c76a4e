//! The active-session view: load, elapsed timer, edits and finalize.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use super::finalize::{FinalizeOrchestrator, SubmitOutcome};
use super::form::{ExerciseEdit, SessionForm};
use super::loader::{load_session, LoadFailure, Liveness};
use crate::api::{TrainingApi, TrainingSession};
use crate::auth::TokenProvider;
use crate::error::SessionError;
use crate::timer::{self, format_elapsed, CancelHandle};
use crate::notify::ViewContext;

pub const DEFAULT_TITLE: &str = "Training in progress";

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// Nothing loaded yet (or no signed-in user to load for).
    Idle,
    Ready,
    /// A guard or fetch failure sent the user back to the sessions list.
    Redirected,
    /// The session was finalized; the view accepts no further submissions.
    Finished,
    TornDown,
}

/// Owns the working form, the baseline and the elapsed timer for one session.
///
/// Dropping the view tears it down: the timer stops and late async results
/// are discarded.
pub struct ActiveSessionView {
    session_id: i64,
    title_override: Option<String>,
    api: Arc<dyn TrainingApi>,
    tokens: Arc<dyn TokenProvider>,
    ctx: ViewContext,
    catalog_page_size: u32,
    liveness: Liveness,
    state: ViewState,
    session: Option<TrainingSession>,
    form: SessionForm,
    elapsed: Arc<AtomicU64>,
    timer: Option<CancelHandle>,
    finalizer: FinalizeOrchestrator,
}

impl ActiveSessionView {
    pub fn new(
        session_id: i64,
        api: Arc<dyn TrainingApi>,
        tokens: Arc<dyn TokenProvider>,
        ctx: ViewContext,
    ) -> Self {
        let liveness = Liveness::new();
        let finalizer = FinalizeOrchestrator::new(api.clone(), ctx.clone(), liveness.clone());
        Self {
            session_id,
            title_override: None,
            api,
            tokens,
            ctx,
            catalog_page_size: 0,
            liveness,
            state: ViewState::Idle,
            session: None,
            form: SessionForm::default(),
            elapsed: Arc::new(AtomicU64::new(0)),
            timer: None,
            finalizer,
        }
    }

    /// Title handed over by the screen that opened this session.
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title_override = title.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_catalog_page_size(mut self, page_size: u32) -> Self {
        self.catalog_page_size = page_size;
        self
    }

    /// Handle that async work outside the view can use to observe teardown.
    pub fn liveness(&self) -> Liveness {
        self.liveness.clone()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn session(&self) -> Option<&TrainingSession> {
        self.session.as_ref()
    }

    pub fn form(&self) -> &SessionForm {
        &self.form
    }

    pub fn title(&self) -> String {
        let title = self
            .title_override
            .clone()
            .or_else(|| self.session.as_ref().and_then(|s| s.title.clone()))
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        format!("Training: {}", title)
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed.load(Ordering::Relaxed)
    }

    pub fn elapsed_display(&self) -> String {
        format_elapsed(self.elapsed_secs())
    }

    pub fn timer_running(&self) -> bool {
        self.timer.as_ref().is_some_and(CancelHandle::is_running)
    }

    pub fn submit_enabled(&self) -> bool {
        self.state == ViewState::Ready && self.finalizer.submit_enabled()
    }

    /// Run the load sequence. Guard and fetch failures are turned into a
    /// notice plus navigation to the sessions list; nothing is returned to
    /// the caller beyond the resulting [`ViewState`].
    pub async fn load(&mut self) -> &ViewState {
        if !self.liveness.is_alive() || self.state == ViewState::Finished {
            return &self.state;
        }
        let Some(auth) = self.tokens.auth() else {
            debug!("No signed-in user, not loading session {}", self.session_id);
            return &self.state;
        };

        self.ctx.busy.set_busy(true);
        let result = load_session(
            self.api.as_ref(),
            &auth,
            self.session_id,
            self.catalog_page_size,
            &self.liveness,
        )
        .await;
        self.ctx.busy.set_busy(false);

        match result {
            Ok(loaded) => {
                self.set_session(loaded.session);
                self.form.reset(loaded.options);
                self.state = ViewState::Ready;
            }
            Err(LoadFailure::Cancelled) => {}
            Err(failure) => {
                if let Some(notice) = failure.notice() {
                    self.ctx.bounce(notice);
                }
                self.clear();
                self.state = ViewState::Redirected;
            }
        }
        &self.state
    }

    pub fn apply(&mut self, edit: ExerciseEdit) -> Result<(), SessionError> {
        self.form.apply(edit)
    }

    /// Submit the change-set. Returns `Ignored` unless the view is ready.
    ///
    /// A successful submission moves the view to [`ViewState::Finished`].
    pub async fn submit(&mut self) -> SubmitOutcome {
        if self.state != ViewState::Ready {
            return SubmitOutcome::Ignored;
        }
        let Some(auth) = self.tokens.auth() else {
            return SubmitOutcome::Ignored;
        };
        let outcome = self.finalizer.submit(&auth, self.session_id, &self.form).await;
        if matches!(outcome, SubmitOutcome::Finished(_)) && self.liveness.is_alive() {
            self.stop_timer();
            self.state = ViewState::Finished;
        }
        outcome
    }

    /// Stop the timer and discard any late async results.
    pub fn teardown(&mut self) {
        if self.state == ViewState::TornDown {
            return;
        }
        self.liveness.kill();
        self.stop_timer();
        self.state = ViewState::TornDown;
        debug!("Active session view for {} torn down", self.session_id);
    }

    fn set_session(&mut self, session: TrainingSession) {
        let restart = self.session.as_ref() != Some(&session) || self.timer.is_none();
        if restart {
            self.stop_timer();
            if let Some(started_at) = session.started_at {
                info!("Tracking session {} from {}", session.id, started_at);
                let elapsed = self.elapsed.clone();
                self.timer = Some(timer::start(started_at, move |secs| {
                    elapsed.store(secs, Ordering::Relaxed);
                }));
            }
        }
        self.session = Some(session);
    }

    fn clear(&mut self) {
        self.stop_timer();
        self.session = None;
        self.form = SessionForm::default();
    }

    fn stop_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.cancel();
        }
        self.elapsed.store(0, Ordering::Relaxed);
    }
}

impl Drop for ActiveSessionView {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{session, Call, FakeApi};
    use crate::auth::{AuthContext, StaticTokenProvider};
    use crate::error::ApiError;
    use crate::notify::testing::RecordingUi;
    use crate::notify::{Notice, Route};
    use crate::session::loader::{ALREADY_FINISHED_MESSAGE, UNAUTHORIZED_MESSAGE};

    fn signed_in(user_id: i64) -> Arc<StaticTokenProvider> {
        Arc::new(StaticTokenProvider::new(Some(AuthContext {
            token: "tok".to_string(),
            user_id,
        })))
    }

    fn view(api: &Arc<FakeApi>, ui: &Arc<RecordingUi>, user_id: i64) -> ActiveSessionView {
        ActiveSessionView::new(10, api.clone(), signed_in(user_id), ui.context())
    }

    #[tokio::test]
    async fn test_load_makes_view_ready_and_starts_timer() {
        let api = Arc::new(FakeApi::new(session(7)));
        let ui = Arc::new(RecordingUi::default());
        let mut view = view(&api, &ui, 7);

        assert_eq!(view.load().await, &ViewState::Ready);
        assert_eq!(view.form().working().len(), 2);
        assert_eq!(view.form().baseline(), view.form().working());
        assert!(view.timer_running());
        assert!(view.submit_enabled());
        assert!(ui.notices().is_empty());
        assert_eq!(ui.busy_history(), vec![true, false]);

        view.teardown();
        assert!(!view.timer_running());
        assert_eq!(view.state(), &ViewState::TornDown);
        assert!(!view.submit_enabled());
    }

    #[tokio::test]
    async fn test_unauthorized_session_redirects() {
        let api = Arc::new(FakeApi::new(session(8)));
        let ui = Arc::new(RecordingUi::default());
        let mut view = view(&api, &ui, 7);

        assert_eq!(view.load().await, &ViewState::Redirected);
        assert_eq!(ui.notices(), vec![Notice::error(UNAUTHORIZED_MESSAGE)]);
        assert_eq!(ui.routes(), vec![Route::SessionsList]);
        assert_eq!(api.calls(), vec![Call::Session]);
        assert!(!view.timer_running());
        assert!(view.form().is_empty());
    }

    #[tokio::test]
    async fn test_finished_session_redirects_with_info() {
        let mut finished = session(7);
        finished.finished_at = finished.started_at;
        let api = Arc::new(FakeApi::new(finished));
        let ui = Arc::new(RecordingUi::default());
        let mut view = view(&api, &ui, 7);

        view.load().await;
        assert_eq!(ui.notices(), vec![Notice::info(ALREADY_FINISHED_MESSAGE)]);
        assert_eq!(ui.routes(), vec![Route::SessionsList]);
        assert_eq!(api.calls(), vec![Call::Session]);
    }

    #[tokio::test]
    async fn test_no_token_means_no_load() {
        let api = Arc::new(FakeApi::new(session(7)));
        let ui = Arc::new(RecordingUi::default());
        let mut view = ActiveSessionView::new(
            10,
            api.clone(),
            Arc::new(StaticTokenProvider::new(None)),
            ui.context(),
        );

        assert_eq!(view.load().await, &ViewState::Idle);
        assert!(api.calls().is_empty());
        assert!(matches!(view.submit().await, SubmitOutcome::Ignored));
    }

    #[tokio::test]
    async fn test_teardown_during_load_discards_results() {
        let api = Arc::new(FakeApi::new(session(7)));
        let ui = Arc::new(RecordingUi::default());
        let mut view = view(&api, &ui, 7);
        let liveness = view.liveness();
        api.on_call(move |call| {
            if call == Call::Catalog {
                liveness.kill();
            }
        });

        assert_eq!(view.load().await, &ViewState::Idle);
        assert!(view.session().is_none());
        assert!(view.form().is_empty());
        assert!(!view.timer_running());
        assert!(ui.notices().is_empty());
        assert!(ui.routes().is_empty());
    }

    #[tokio::test]
    async fn test_late_failure_after_teardown_is_silent() {
        let api = Arc::new(FakeApi::new(session(7)));
        api.fail(Call::Catalog, ApiError::Server { status: 500, message: None });
        let ui = Arc::new(RecordingUi::default());
        let mut view = view(&api, &ui, 7);
        let liveness = view.liveness();
        api.on_call(move |call| {
            if call == Call::Catalog {
                liveness.kill();
            }
        });

        assert_eq!(view.load().await, &ViewState::Idle);
        assert!(ui.notices().is_empty());
        assert!(ui.routes().is_empty());

        view.teardown();
        assert_eq!(view.load().await, &ViewState::TornDown);
        assert!(ui.notices().is_empty());
    }

    #[tokio::test]
    async fn test_failed_reload_drops_previous_session() {
        let api = Arc::new(FakeApi::new(session(7)));
        let ui = Arc::new(RecordingUi::default());
        let mut view = view(&api, &ui, 7);
        view.load().await;
        assert!(view.timer_running());

        api.fail(Call::Exercises, ApiError::Network("connection reset".to_string()));
        assert_eq!(view.load().await, &ViewState::Redirected);
        assert!(view.session().is_none());
        assert!(view.form().is_empty());
        assert!(!view.timer_running());
        assert!(!view.submit_enabled());
    }

    #[tokio::test]
    async fn test_finished_view_refuses_second_submit() {
        let api = Arc::new(FakeApi::new(session(7)));
        let ui = Arc::new(RecordingUi::default());
        let mut view = view(&api, &ui, 7);
        view.load().await;

        assert!(matches!(view.submit().await, SubmitOutcome::Finished(_)));
        assert_eq!(view.state(), &ViewState::Finished);
        assert!(!view.submit_enabled());
        assert!(!view.timer_running());

        assert!(matches!(view.submit().await, SubmitOutcome::Ignored));
        assert_eq!(api.finalized().len(), 1);
        assert_eq!(ui.routes(), vec![Route::SessionsList]);
    }

    #[tokio::test]
    async fn test_edit_and_submit() {
        let api = Arc::new(FakeApi::new(session(7)));
        let ui = Arc::new(RecordingUi::default());
        let mut view = view(&api, &ui, 7);
        view.load().await;

        view.apply("1:weight=abc".parse().unwrap()).unwrap();
        let outcome = view.submit().await;

        assert!(matches!(outcome, SubmitOutcome::Finished(_)));
        assert_eq!(api.finalized()[0][0].weight, Some(None));
        assert_eq!(ui.routes(), vec![Route::SessionsList]);
    }

    #[tokio::test]
    async fn test_title_fallbacks() {
        let api = Arc::new(FakeApi::new(session(7)));
        let ui = Arc::new(RecordingUi::default());

        let mut plain = view(&api, &ui, 7);
        assert_eq!(plain.title(), "Training: Training in progress");
        plain.load().await;
        assert_eq!(plain.title(), "Training: Push day");

        let named = view(&api, &ui, 7).with_title(Some("Leg day".to_string()));
        assert_eq!(named.title(), "Training: Leg day");
    }

    #[tokio::test]
    async fn test_reload_with_new_start_restarts_timer() {
        let api = Arc::new(FakeApi::new(session(7)));
        let ui = Arc::new(RecordingUi::default());
        let mut view = view(&api, &ui, 7);
        view.load().await;
        assert!(view.timer_running());

        {
            let mut s = api.session.lock().unwrap();
            s.started_at = None;
        }
        view.load().await;
        assert_eq!(view.state(), &ViewState::Ready);
        assert!(!view.timer_running(), "session without start instant has no timer");
        assert_eq!(view.elapsed_display(), "00h:00m:00s");
    }
}
