//! User-facing side effects of the active-session core.
//!
//! Notices, navigation and the busy indicator are injected as trait objects so
//! the guard, diff and finalize logic can run without any UI attached.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Error,
    Info,
    Success,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Error => "error",
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "success",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level.as_str(), self.message)
    }
}

/// Navigation targets reachable from the active-session view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    SessionsList,
}

pub trait NoticeSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

pub trait BusyIndicator: Send + Sync {
    fn set_busy(&self, busy: bool);
}

/// The injected UI seams, bundled so they can be cloned into each component.
#[derive(Clone)]
pub struct ViewContext {
    pub notices: Arc<dyn NoticeSink>,
    pub navigator: Arc<dyn Navigator>,
    pub busy: Arc<dyn BusyIndicator>,
}

impl ViewContext {
    pub fn new(
        notices: Arc<dyn NoticeSink>,
        navigator: Arc<dyn Navigator>,
        busy: Arc<dyn BusyIndicator>,
    ) -> Self {
        Self {
            notices,
            navigator,
            busy,
        }
    }

    /// Show `notice` and leave the view for the sessions list.
    pub fn bounce(&self, notice: Notice) {
        self.notices.notify(notice);
        self.navigator.navigate(Route::SessionsList);
    }
}
