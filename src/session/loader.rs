//! Fetch and guard an in-progress session.
//!
//! The sequence is strictly ordered: session, ownership and finished-state
//! checks, planned exercises, catalog, materialization. A guard failure stops
//! the sequence before any exercise data is requested.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::materialize::materialize;
use super::types::ExerciseOption;
use crate::api::{TrainingApi, TrainingSession};
use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::notify::Notice;

pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized access to session";
pub const ALREADY_FINISHED_MESSAGE: &str = "Session already finished";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load session data";

/// First catalog page; pages are 1-based on the server.
pub const CATALOG_FIRST_PAGE: u32 = 1;

/// Shared flag telling async continuations whether their view still exists.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn kill(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// A session that passed the guards, with its editable options.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSession {
    pub session: TrainingSession,
    pub options: Vec<ExerciseOption>,
}

#[derive(Debug)]
pub enum LoadFailure {
    /// Session belongs to another user.
    Unauthorized,
    /// Session has a finish instant.
    AlreadyFinished,
    /// One of the three fetches failed.
    Fetch(ApiError),
    /// The view went away before loading completed.
    Cancelled,
}

impl LoadFailure {
    /// Notice to show before leaving the view. `Cancelled` shows nothing.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            LoadFailure::Unauthorized => Some(Notice::error(UNAUTHORIZED_MESSAGE)),
            LoadFailure::AlreadyFinished => Some(Notice::info(ALREADY_FINISHED_MESSAGE)),
            LoadFailure::Fetch(err) => Some(Notice::error(
                err.server_message().unwrap_or(LOAD_FAILED_MESSAGE),
            )),
            LoadFailure::Cancelled => None,
        }
    }
}

/// Check ownership and finished-state of a fetched session.
pub fn guard_session(session: &TrainingSession, current_user_id: i64) -> Result<(), LoadFailure> {
    if session.owner_user_id != current_user_id {
        warn!(
            "Session {} belongs to user {}, not {}",
            session.id, session.owner_user_id, current_user_id
        );
        return Err(LoadFailure::Unauthorized);
    }
    if session.is_finished() {
        info!("Session {} is already finished", session.id);
        return Err(LoadFailure::AlreadyFinished);
    }
    Ok(())
}

/// Run the load sequence for `session_id`.
///
/// `catalog_page_size` is sent as-is; the server reads 0 as "every entry".
pub async fn load_session(
    api: &dyn TrainingApi,
    auth: &AuthContext,
    session_id: i64,
    catalog_page_size: u32,
    liveness: &Liveness,
) -> Result<LoadedSession, LoadFailure> {
    // liveness before the result: a late failure is discarded like a late success
    let session = api.get_session(&auth.token, session_id).await;
    ensure_alive(liveness)?;
    let session = session.map_err(LoadFailure::Fetch)?;

    guard_session(&session, auth.user_id)?;

    let plans = api.get_session_exercises(&auth.token, session_id).await;
    ensure_alive(liveness)?;
    let plans = plans.map_err(LoadFailure::Fetch)?;

    let catalog = api
        .get_exercise_catalog(&auth.token, CATALOG_FIRST_PAGE, catalog_page_size)
        .await;
    ensure_alive(liveness)?;
    let catalog = catalog.map_err(LoadFailure::Fetch)?;

    let options = materialize(&plans, &catalog.data);
    info!(
        "Loaded session {} with {} exercises ({} catalog entries)",
        session_id,
        options.len(),
        catalog.data.len()
    );

    Ok(LoadedSession { session, options })
}

fn ensure_alive(liveness: &Liveness) -> Result<(), LoadFailure> {
    if liveness.is_alive() {
        Ok(())
    } else {
        debug!("View torn down during load, discarding result");
        Err(LoadFailure::Cancelled)
    }
}
