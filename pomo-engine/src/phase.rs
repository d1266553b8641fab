use crate::error::{CycleError, Result};
use chrono::Duration;
use std::fmt;
use std::str::FromStr;

pub const SHORT_BREAK_MINUTES: i64 = 5;
pub const LONG_BREAK_MINUTES: i64 = 15;
/// Every n-th completed work interval is followed by a long break.
pub const LONG_BREAK_EVERY: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    WorkInterval,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn is_break(self) -> bool {
        matches!(self, Phase::ShortBreak | Phase::LongBreak)
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::WorkInterval => "pomodoro",
            Phase::ShortBreak => "short break",
            Phase::LongBreak => "long break",
        }
    }

    /// Length of this phase given the configured work interval.
    pub fn duration(self, work: WorkDuration) -> Duration {
        match self {
            Phase::WorkInterval => work.as_duration(),
            Phase::ShortBreak => Duration::minutes(SHORT_BREAK_MINUTES),
            Phase::LongBreak => Duration::minutes(LONG_BREAK_MINUTES),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Validated length of a work interval, in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkDuration(u8);

impl WorkDuration {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 99;

    pub fn new(minutes: i64) -> Result<Self> {
        match u8::try_from(minutes) {
            Ok(m) if (Self::MIN..=Self::MAX).contains(&m) => Ok(Self(m)),
            _ => Err(CycleError::InvalidDuration {
                input: minutes.to_string(),
                reason: "must be between 1 and 99 minutes",
            }),
        }
    }

    pub fn minutes(self) -> u8 {
        self.0
    }

    pub fn as_duration(self) -> Duration {
        Duration::minutes(i64::from(self.0))
    }
}

impl FromStr for WorkDuration {
    type Err = CycleError;

    fn from_str(s: &str) -> Result<Self> {
        let minutes: i64 = s.trim().parse().map_err(|_| CycleError::InvalidDuration {
            input: s.to_string(),
            reason: "must be a whole number of minutes",
        })?;
        Self::new(minutes).map_err(|err| match err {
            CycleError::InvalidDuration { reason, .. } => CycleError::InvalidDuration {
                input: s.to_string(),
                reason,
            },
            other => other,
        })
    }
}

/// Completed-phase counters. They only ever grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct History {
    pub work: u32,
    pub short_breaks: u32,
    pub long_breaks: u32,
}

impl History {
    pub(crate) fn record(&mut self, completed: Phase) {
        match completed {
            Phase::WorkInterval => self.work += 1,
            Phase::ShortBreak => self.short_breaks += 1,
            Phase::LongBreak => self.long_breaks += 1,
        }
    }

    /// The phase that follows `completed`, assuming it has already been recorded.
    pub fn next_after(&self, completed: Phase) -> Phase {
        match completed {
            Phase::WorkInterval if self.work > 0 && self.work % LONG_BREAK_EVERY == 0 => {
                Phase::LongBreak
            }
            Phase::WorkInterval => Phase::ShortBreak,
            Phase::ShortBreak | Phase::LongBreak => Phase::WorkInterval,
        }
    }

    pub fn total(&self) -> u32 {
        self.work + self.short_breaks + self.long_breaks
    }
}
