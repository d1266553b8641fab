use std::time::{Duration, Instant};

/// Periodic tick source for the event loop. Each delivered tick arms the next.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    next_due: Instant,
}

impl Ticker {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_due: now + interval,
        }
    }

    /// How long the loop may block waiting for input before the next tick.
    pub fn timeout(&self, now: Instant) -> Duration {
        self.next_due.saturating_duration_since(now)
    }

    /// True when a tick is due; the next one is then armed one interval out.
    pub fn fire(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        // Re-arm from `now`, a stalled loop gets one tick rather than a burst
        self.next_due = now + self.interval;
        true
    }

    /// Restart the period, e.g. when a new phase begins.
    pub fn reset(&mut self, now: Instant) {
        self.next_due = now + self.interval;
    }
}
