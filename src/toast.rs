use liftlog_core::{NotificationSink, Toast, ToastLevel};

/// Prints toasts inline with the prompt.
pub struct TerminalToasts;

impl NotificationSink for TerminalToasts {
    fn toast(&self, toast: Toast) {
        let icon = match toast.level {
            ToastLevel::Success => "\u{2713}",
            ToastLevel::Info => "i",
            ToastLevel::Error => "\u{2717}",
        };
        println!("  {} {}", icon, toast.message);
    }
}
