use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::{RestDuration, RestExpired, RestTimer, TimerSnapshot};
use crate::error::Result;
use crate::notify::{NotificationSink, Toast};
use crate::prefs::PreferenceStore;

const TICK: Duration = Duration::from_secs(1);

struct Shared {
    timer: RestTimer,
    /// Bumped whenever a ticking task is (re)spawned or cancelled, so a task
    /// that lost the race to an abort can never tick a newer countdown.
    generation: u64,
}

/// Owns the rest timer and its one-second ticking task.
///
/// At most one ticking task exists. It is aborted on pause, reset, stop,
/// expiry and when the driver is dropped, so tearing down the workout view
/// always cancels the recurring callback.
pub struct RestTimerDriver {
    shared: Arc<Mutex<Shared>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
    prefs: Arc<PreferenceStore>,
    notifier: Arc<dyn NotificationSink>,
}

impl RestTimerDriver {
    /// `configured` is the duration loaded from preferences at startup.
    pub fn new(
        configured: RestDuration,
        prefs: Arc<PreferenceStore>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                timer: RestTimer::new(configured),
                generation: 0,
            })),
            ticker: Mutex::new(None),
            prefs,
            notifier,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        self.lock().timer.snapshot()
    }

    pub fn configured(&self) -> RestDuration {
        self.lock().timer.configured()
    }

    /// Whether a ticking task is currently alive.
    pub fn is_ticking(&self) -> bool {
        self.ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Restart the countdown at the configured duration.
    pub fn start(&self) {
        let generation = {
            let mut shared = self.lock();
            shared.timer.start();
            shared.generation += 1;
            info!("Rest timer started: {}s", shared.timer.remaining());
            shared.generation
        };
        self.spawn_ticker(generation);
    }

    pub fn pause(&self) {
        let paused = {
            let mut shared = self.lock();
            let paused = shared.timer.pause();
            if paused {
                shared.generation += 1;
                info!("Rest timer paused at {}s", shared.timer.remaining());
            }
            paused
        };
        if paused {
            self.cancel_ticker();
        }
    }

    pub fn resume(&self) {
        let generation = {
            let mut shared = self.lock();
            if !shared.timer.resume() {
                debug!("Rest timer resume ignored in {:?}", shared.timer.phase());
                return;
            }
            shared.generation += 1;
            info!("Rest timer resumed at {}s", shared.timer.remaining());
            shared.generation
        };
        self.spawn_ticker(generation);
    }

    pub fn reset(&self) {
        {
            let mut shared = self.lock();
            shared.timer.reset();
            shared.generation += 1;
        }
        self.cancel_ticker();
        info!("Rest timer reset");
    }

    pub fn stop(&self) {
        self.reset();
    }

    /// Clamp, persist as the device-wide preference, then apply to the next
    /// countdown. Nothing changes when the preference cannot be written.
    /// An in-progress countdown keeps running unchanged.
    pub fn set_configured_duration(&self, seconds: i64) -> Result<RestDuration> {
        let duration = RestDuration::clamped(seconds);
        if duration.seconds() as i64 != seconds {
            debug!("Rest duration {} clamped to {}", seconds, duration.seconds());
        }
        self.prefs.set_rest_duration(duration)?;
        self.lock().timer.set_configured(duration);
        info!("Rest duration set to {}s", duration.seconds());
        Ok(duration)
    }

    /// View teardown: back to Idle with no task left behind.
    pub fn shutdown(&self) {
        self.reset();
    }

    fn cancel_ticker(&self) {
        if let Some(handle) = self
            .ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }

    fn spawn_ticker(&self, generation: u64) {
        let shared = self.shared.clone();
        let notifier = self.notifier.clone();

        let mut ticker = self.ticker.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = ticker.take() {
            previous.abort();
        }

        *ticker = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + TICK, TICK);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let expired = {
                    let mut guard = shared.lock().unwrap_or_else(PoisonError::into_inner);
                    if guard.generation != generation || !guard.timer.is_running() {
                        break;
                    }
                    guard.timer.tick()
                };
                if let Some(expired) = expired {
                    announce_expiry(notifier.as_ref(), expired);
                    break;
                }
            }
        }));
    }
}

fn announce_expiry(notifier: &dyn NotificationSink, expired: RestExpired) {
    info!("Rest of {}s is over", expired.duration.seconds());
    notifier.system("Rest is over", "Time to start your next set");
    notifier.toast(Toast::success("Rest is over! Time to start your next set"));
}

impl Drop for RestTimerDriver {
    fn drop(&mut self) {
        if let Some(handle) = self
            .ticker
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            if !handle.is_finished() {
                debug!("Rest timer dropped mid-countdown, cancelling tick");
            }
            handle.abort();
        }
    }
}
