//! Rest timer: a countdown between sets.
//!
//! [`RestTimer`] is the pure state machine; [`RestTimerDriver`] owns the
//! one-second ticking task that feeds it.

pub mod driver;

use serde::Serialize;

pub use driver::RestTimerDriver;

/// Configured rest length, always within `[MIN_SECONDS, MAX_SECONDS]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RestDuration(u32);

impl RestDuration {
    pub const MIN_SECONDS: u32 = 30;
    pub const MAX_SECONDS: u32 = 600;
    pub const DEFAULT_SECONDS: u32 = 90;
    /// Quick choices offered in the timer settings.
    pub const PRESETS: [u32; 4] = [60, 90, 120, 180];

    /// Out-of-range requests are clamped, never rejected.
    pub fn clamped(seconds: i64) -> Self {
        let clamped = seconds.clamp(Self::MIN_SECONDS as i64, Self::MAX_SECONDS as i64);
        Self(clamped as u32)
    }

    pub fn seconds(self) -> u32 {
        self.0
    }
}

impl Default for RestDuration {
    fn default() -> Self {
        Self(Self::DEFAULT_SECONDS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
}

/// Emitted once when a running countdown reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestExpired {
    pub duration: RestDuration,
}

/// Countdown state. Phase is derived: running means `Running`, stopped
/// with time left means `Paused`, otherwise `Idle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestTimer {
    configured: RestDuration,
    remaining: u32,
    running: bool,
}

impl RestTimer {
    pub fn new(configured: RestDuration) -> Self {
        Self {
            configured,
            remaining: 0,
            running: false,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        if self.running {
            TimerPhase::Running
        } else if self.remaining > 0 {
            TimerPhase::Paused
        } else {
            TimerPhase::Idle
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn configured(&self) -> RestDuration {
        self.configured
    }

    /// From any phase: restart the countdown at the configured duration.
    pub fn start(&mut self) {
        self.remaining = self.configured.seconds();
        self.running = true;
    }

    /// Running -> Paused. Returns whether the transition happened.
    pub fn pause(&mut self) -> bool {
        if self.phase() != TimerPhase::Running {
            return false;
        }
        self.running = false;
        true
    }

    /// Paused -> Running, only with time left.
    pub fn resume(&mut self) -> bool {
        if self.phase() != TimerPhase::Paused {
            return false;
        }
        self.running = true;
        true
    }

    /// Any phase -> Idle.
    pub fn reset(&mut self) {
        self.running = false;
        self.remaining = 0;
    }

    pub fn stop(&mut self) {
        self.reset();
    }

    /// One second elapsed. Reaching zero moves to Idle and yields the
    /// expiry event; ticks outside Running do nothing.
    pub fn tick(&mut self) -> Option<RestExpired> {
        if !self.running {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            return Some(RestExpired {
                duration: self.configured,
            });
        }
        None
    }

    /// Takes effect on the next `start`; an active countdown is untouched.
    pub fn set_configured(&mut self, duration: RestDuration) {
        self.configured = duration;
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase(),
            remaining: self.remaining,
            configured: self.configured,
        }
    }
}

/// Read-only view of the timer for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimerSnapshot {
    pub phase: TimerPhase,
    pub remaining: u32,
    pub configured: RestDuration,
}

/// `m:ss`
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer(seconds: i64) -> RestTimer {
        RestTimer::new(RestDuration::clamped(seconds))
    }

    #[test]
    fn test_duration_clamps() {
        assert_eq!(RestDuration::clamped(700).seconds(), 600);
        assert_eq!(RestDuration::clamped(10).seconds(), 30);
        assert_eq!(RestDuration::clamped(-5).seconds(), 30);
        assert_eq!(RestDuration::clamped(95).seconds(), 95);
        assert_eq!(RestDuration::default().seconds(), 90);
    }

    #[test]
    fn test_start_then_ticks_counts_down() {
        let mut t = timer(60);
        t.start();
        for _ in 0..59 {
            assert!(t.tick().is_none());
        }
        assert_eq!(t.remaining(), 1);
        assert_eq!(t.phase(), TimerPhase::Running);
    }

    #[test]
    fn test_expiry_fires_exactly_once() {
        let mut t = timer(30);
        t.start();
        let expirations = (0..40).filter_map(|_| t.tick()).count();
        assert_eq!(expirations, 1);
        assert_eq!(t.phase(), TimerPhase::Idle);
        assert_eq!(t.remaining(), 0);
    }

    #[test]
    fn test_pause_resume_preserves_remaining() {
        let mut t = timer(90);
        t.start();
        for _ in 0..10 {
            t.tick();
        }
        assert!(t.pause());
        assert_eq!(t.phase(), TimerPhase::Paused);

        // Ticks while paused are ignored
        assert!(t.tick().is_none());
        assert_eq!(t.remaining(), 80);

        assert!(t.resume());
        assert_eq!(t.phase(), TimerPhase::Running);
        assert_eq!(t.remaining(), 80);
    }

    #[test]
    fn test_pause_and_resume_are_noops_in_wrong_phase() {
        let mut t = timer(90);
        assert!(!t.pause());
        assert!(!t.resume());
        assert_eq!(t.phase(), TimerPhase::Idle);

        t.start();
        assert!(!t.resume());
        assert_eq!(t.phase(), TimerPhase::Running);
    }

    #[test]
    fn test_start_while_running_restarts() {
        let mut t = timer(60);
        t.start();
        for _ in 0..25 {
            t.tick();
        }
        t.start();
        assert_eq!(t.remaining(), 60);
        assert!(t.is_running());
    }

    #[test]
    fn test_reset_and_stop_go_idle() {
        let mut t = timer(60);
        t.start();
        t.tick();
        t.reset();
        assert_eq!(t.snapshot().phase, TimerPhase::Idle);
        assert_eq!(t.remaining(), 0);

        t.start();
        t.pause();
        t.stop();
        assert_eq!(t.phase(), TimerPhase::Idle);
        assert!(!t.resume());
    }

    #[test]
    fn test_reconfigure_does_not_touch_active_countdown() {
        let mut t = timer(60);
        t.start();
        t.tick();
        t.set_configured(RestDuration::clamped(180));
        assert_eq!(t.remaining(), 59);

        t.start();
        assert_eq!(t.remaining(), 180);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(90), "1:30");
        assert_eq!(format_clock(600), "10:00");
        assert_eq!(format_clock(59), "0:59");
    }
}
