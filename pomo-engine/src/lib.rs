//! Pomodoro cycle engine
//!
//! Tracks the current phase, its deadline and progress, and decides which
//! phase comes next. The engine never reads the clock: every time-dependent
//! operation takes `now` from the caller, which owns tick delivery.

mod engine;
mod error;
mod phase;

pub use engine::{CycleEngine, PhaseComplete, Snapshot, TickOutcome};
pub use error::{CycleError, Result};
pub use phase::{
    History, Phase, WorkDuration, LONG_BREAK_EVERY, LONG_BREAK_MINUTES, SHORT_BREAK_MINUTES,
};
