use std::sync::Arc;

use anyhow::Context;
use tracing::warn;

use liftlog_core::{
    AppConfig, DataService, DesktopNotifier, HttpDataService, LiftLogError, NotificationSink,
    PreferenceStore, RestTimerDriver, Toast,
};

use crate::toast::TerminalToasts;

/// Everything the pages share for the lifetime of the process.
pub struct AppContext {
    pub service: Arc<dyn DataService>,
    pub prefs: Arc<PreferenceStore>,
    pub notifier: Arc<dyn NotificationSink>,
}

impl AppContext {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let service = HttpDataService::new(&config)?;

        let prefs_path =
            PreferenceStore::default_path().context("No data directory for preferences")?;
        let prefs = PreferenceStore::open(&prefs_path);

        let notifier = DesktopNotifier::new(
            Arc::new(TerminalToasts),
            config.notifications_enabled,
        );

        Ok(Self {
            service: Arc::new(service),
            prefs: Arc::new(prefs),
            notifier: Arc::new(notifier),
        })
    }

    /// A rest timer starting from the saved duration.
    pub fn rest_timer(&self) -> Arc<RestTimerDriver> {
        Arc::new(RestTimerDriver::new(
            self.prefs.rest_duration(),
            self.prefs.clone(),
            self.notifier.clone(),
        ))
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notifier.toast(Toast::success(message));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notifier.toast(Toast::info(message));
    }

    pub fn error(&self, err: &LiftLogError) {
        warn!("{}", err);
        self.notifier.toast(Toast::error(err.user_message()));
    }

    /// Report a failed command and turn the result into an `Option`.
    pub fn ok<T>(&self, result: liftlog_core::Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.error(&e);
                None
            }
        }
    }
}
