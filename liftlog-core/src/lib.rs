//! LiftLog core: workout session editing, the rest timer, and the client
//! for the remote workout data service.

pub mod commands;
pub mod config;
pub mod error;
pub mod notify;
pub mod prefs;
pub mod service;
pub mod session;
pub mod timer;

pub use config::AppConfig;
pub use error::{LiftLogError, Result};
pub use notify::{DesktopNotifier, NotificationSink, Toast, ToastLevel};
pub use prefs::PreferenceStore;
pub use service::{DataService, HttpDataService};
pub use session::{PendingSave, Session, SessionEditor};
pub use timer::{RestDuration, RestTimer, RestTimerDriver, TimerPhase};

// Test doubles for downstream tests, behind the `testing` feature.
#[cfg(any(test, feature = "testing"))]
pub use notify::RecordingNotifier;
#[cfg(any(test, feature = "testing"))]
pub use service::InMemoryDataService;
