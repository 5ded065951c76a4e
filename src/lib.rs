pub mod api;
pub mod auth;
pub mod config;
mod error;
pub mod notify;
pub mod session;
pub mod terminal;
pub mod timer;

pub use error::{ApiError, SessionError, TrainlogError};
pub use session::{ActiveSessionView, SubmitOutcome, ViewState};

/// Install the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
