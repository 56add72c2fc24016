use std::sync::Arc;
#[cfg(any(test, feature = "testing"))]
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ToastLevel {
    Success,
    Info,
    Error,
}

/// A transient in-app message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }
}

/// Where user-visible notifications go. Neither channel is required for
/// correctness; implementations must not fail.
pub trait NotificationSink: Send + Sync {
    fn toast(&self, toast: Toast);

    /// Best-effort OS-level notification. Ignored by default.
    fn system(&self, title: &str, body: &str) {
        debug!("System notification skipped: {} - {}", title, body);
    }
}

/// Adds OS notifications (via `notify-rust`) on top of an in-app sink.
pub struct DesktopNotifier {
    inner: Arc<dyn NotificationSink>,
    enabled: bool,
}

impl DesktopNotifier {
    pub fn new(inner: Arc<dyn NotificationSink>, enabled: bool) -> Self {
        Self { inner, enabled }
    }
}

impl NotificationSink for DesktopNotifier {
    fn toast(&self, toast: Toast) {
        self.inner.toast(toast);
    }

    fn system(&self, title: &str, body: &str) {
        if !self.enabled {
            debug!("OS notifications disabled, skipping: {}", title);
            return;
        }

        let title = title.to_string();
        let body = body.to_string();
        let show = move || {
            if let Err(e) = notify_rust::Notification::new()
                .appname("liftlog")
                .summary(&title)
                .body(&body)
                .show()
            {
                warn!("Failed to show OS notification: {}", e);
            }
        };

        // The notification backend may block on IPC; keep it off the runtime threads.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(show);
            }
            Err(_) => show(),
        }
    }
}

/// Collects everything it is sent.
#[cfg(any(test, feature = "testing"))]
#[derive(Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
    system: Mutex<Vec<(String, String)>>,
}

#[cfg(any(test, feature = "testing"))]
impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.toasts()
            .into_iter()
            .filter(|t| t.level == ToastLevel::Error)
            .map(|t| t.message)
            .collect()
    }

    pub fn system_notifications(&self) -> Vec<(String, String)> {
        self.system
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(any(test, feature = "testing"))]
impl NotificationSink for RecordingNotifier {
    fn toast(&self, toast: Toast) {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(toast);
    }

    fn system(&self, title: &str, body: &str) {
        self.system
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((title.to_string(), body.to_string()));
    }
}
