//! Terminal rendering of notices, navigation and the busy indicator.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::notify::{BusyIndicator, Navigator, Notice, NoticeLevel, NoticeSink, Route, ViewContext};
use crate::session::{ExerciseOption, FinalizePayloadEntry};

pub struct TerminalUi {
    sessions_route: String,
    navigated_to: Mutex<Option<Route>>,
    busy: AtomicBool,
}

impl TerminalUi {
    pub fn new(sessions_route: &str) -> Arc<Self> {
        Arc::new(Self {
            sessions_route: sessions_route.to_string(),
            navigated_to: Mutex::new(None),
            busy: AtomicBool::new(false),
        })
    }

    pub fn context(self: &Arc<Self>) -> ViewContext {
        ViewContext::new(self.clone(), self.clone(), self.clone())
    }

    pub fn navigated_to(&self) -> Option<Route> {
        self.navigated_to.lock().map(|r| *r).unwrap_or(None)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Relaxed)
    }

    fn route_path(&self, route: Route) -> &str {
        match route {
            Route::SessionsList => &self.sessions_route,
        }
    }
}

impl NoticeSink for TerminalUi {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => eprintln!("{}", notice),
            NoticeLevel::Info | NoticeLevel::Success => println!("{}", notice),
        }
    }
}

impl Navigator for TerminalUi {
    fn navigate(&self, route: Route) {
        println!("-> {}", self.route_path(route));
        if let Ok(mut slot) = self.navigated_to.lock() {
            *slot = Some(route);
        }
    }
}

impl BusyIndicator for TerminalUi {
    fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::Relaxed);
        debug!("busy = {}", busy);
        if busy {
            eprint!("Working...\r");
            let _ = std::io::stderr().flush();
        }
    }
}

/// Render the working copy as a fixed-width table.
pub fn render_exercises(options: &[ExerciseOption]) -> String {
    let mut out = format!(
        "{:>6}  {:<24} {:>6} {:>5} {:>8}  {}\n",
        "id", "exercise", "series", "reps", "weight", "notes"
    );
    for o in options {
        out.push_str(&format!(
            "{:>6}  {:<24} {:>6} {:>5} {:>8}  {}\n",
            o.exercise_id,
            o.label.as_deref().unwrap_or("-"),
            o.series,
            o.repetitions,
            if o.weight.is_empty() { "-" } else { o.weight.as_str() },
            o.notes
        ));
    }
    out
}

/// One line per changed exercise; unchanged exercises are counted.
pub fn render_changes(payload: &[FinalizePayloadEntry]) -> String {
    let mut out = String::new();
    let mut unchanged = 0;
    for entry in payload {
        if !entry.has_changes() {
            unchanged += 1;
            continue;
        }
        let mut fields = Vec::new();
        if let Some(series) = entry.series {
            fields.push(format!("series={}", series));
        }
        if let Some(reps) = entry.repetitions {
            fields.push(format!("repetitions={}", reps));
        }
        if let Some(weight) = &entry.weight {
            fields.push(match weight {
                Some(w) => format!("weight={}", w),
                None => "weight=null".to_string(),
            });
        }
        if let Some(notes) = &entry.notes {
            fields.push(match notes {
                Some(n) => format!("notes={:?}", n),
                None => "notes=null".to_string(),
            });
        }
        out.push_str(&format!("  {}: {}\n", entry.exercise_id, fields.join(", ")));
    }
    out.push_str(&format!("  ({} unchanged)\n", unchanged));
    out
}
