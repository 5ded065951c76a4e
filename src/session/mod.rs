//! Active-session core: guard, materialize, edit, diff and finalize.

pub mod diff;
pub mod finalize;
pub mod form;
pub mod loader;
pub mod materialize;
pub mod types;
pub mod view;

pub use diff::{build_finalize_payload, coerce_weight};
pub use finalize::{FinalizeOrchestrator, SubmitOutcome};
pub use form::{ExerciseEdit, ExerciseField, SessionForm};
pub use loader::{guard_session, load_session, Liveness, LoadFailure, LoadedSession};
pub use materialize::materialize;
pub use types::{ExerciseOption, FinalizePayloadEntry};
pub use view::{ActiveSessionView, ViewState};
