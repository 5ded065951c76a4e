//! Elapsed-time tracking for an in-progress session.
//!
//! Every tick recomputes the elapsed seconds from the absolute start instant,
//! so a late or skipped tick never accumulates drift.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

const TICK: Duration = Duration::from_secs(1);

/// Whole seconds between `started_at` and `now`. Future start instants count as zero.
pub fn elapsed_seconds(started_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (now - started_at).num_seconds().max(0) as u64
}

/// Format seconds as `HHh:MMm:SSs`. The hour field grows past two digits as needed.
pub fn format_elapsed(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{:02}h:{:02}m:{:02}s", hours, minutes, seconds)
}

/// Handle to a running timer. Dropping it stops the timer.
#[derive(Debug)]
pub struct CancelHandle {
    task: Option<JoinHandle<()>>,
}

impl CancelHandle {
    pub fn cancel(mut self) {
        self.stop();
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("Elapsed timer stopped");
        }
    }
}

impl Drop for CancelHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Start a one-second timer reporting elapsed seconds since `started_at`.
///
/// `on_tick` runs once right away and then every second until the returned
/// handle is cancelled or dropped. Must be called from within a tokio runtime.
pub fn start<F>(started_at: DateTime<Utc>, on_tick: F) -> CancelHandle
where
    F: FnMut(u64) + Send + 'static,
{
    start_with_clock(started_at, Utc::now, on_tick)
}

/// Like [`start`], reading the current time from `clock`.
pub fn start_with_clock<C, F>(started_at: DateTime<Utc>, clock: C, mut on_tick: F) -> CancelHandle
where
    C: Fn() -> DateTime<Utc> + Send + 'static,
    F: FnMut(u64) + Send + 'static,
{
    debug!("Elapsed timer started from {}", started_at);
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICK);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            on_tick(elapsed_seconds(started_at, clock()));
        }
    });

    CancelHandle { task: Some(task) }
}
