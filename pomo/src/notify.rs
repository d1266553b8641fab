//! Phase-complete alerts
//!
//! Delivery is fire-and-forget: a failed or slow notification never holds up
//! the timer loop.

use pomo_engine::{Phase, PhaseComplete};
use std::thread;
use tracing::{debug, warn};

pub const APP_NAME: &str = "pomo";

pub trait Notifier {
    fn phase_complete(&self, event: &PhaseComplete);
}

/// Title and body for the alert announcing what comes next.
pub fn message(event: &PhaseComplete) -> (&'static str, &'static str) {
    let body = match event.next {
        Phase::WorkInterval => "Time to work!",
        Phase::ShortBreak => "Time for a short break!",
        Phase::LongBreak => "Time for a long break!",
    };
    ("Pomo", body)
}

/// Desktop notifications through the platform notification service.
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn phase_complete(&self, event: &PhaseComplete) {
        let (title, body) = message(event);
        // D-Bus round trips can stall, keep them off the UI thread
        let spawned = thread::Builder::new()
            .name("notify".to_string())
            .spawn(move || {
                if let Err(e) = notify_rust::Notification::new()
                    .summary(title)
                    .body(body)
                    .appname(APP_NAME)
                    .show()
                {
                    warn!("Failed to send notification: {}", e);
                }
            });
        if let Err(e) = spawned {
            warn!("Failed to spawn notification thread: {}", e);
        }
    }
}

/// Used with `--no-notify` or `notifications.enabled = false`.
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn phase_complete(&self, event: &PhaseComplete) {
        debug!(completed = %event.completed, "notification suppressed");
    }
}
