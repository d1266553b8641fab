use crate::error::{CycleError, Result};
use crate::phase::{History, Phase, WorkDuration, LONG_BREAK_MINUTES, SHORT_BREAK_MINUTES};
use chrono::{DateTime, Duration, Local};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Unconfigured,
    Ready,
    Running,
    AwaitingConfirmation { next: Phase },
}

/// One armed phase: when it started, when it ends, how far along it is.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Interval {
    phase: Phase,
    start: DateTime<Local>,
    deadline: DateTime<Local>,
    last_tick: DateTime<Local>,
    progress: f64,
}

impl Interval {
    fn new(phase: Phase, length: Duration, now: DateTime<Local>) -> Self {
        Self {
            phase,
            start: now,
            deadline: now + length,
            last_tick: now,
            progress: 0.0,
        }
    }

    /// Progress comes from timestamps, not from counting ticks, so late or
    /// skipped ticks never make the bar drift from the deadline.
    fn advance(&mut self, now: DateTime<Local>) {
        let fraction = if now >= self.deadline {
            1.0
        } else {
            let total = (self.deadline - self.start).num_milliseconds() as f64;
            let elapsed = (now - self.start).num_milliseconds() as f64;
            if total > 0.0 {
                (elapsed / total).clamp(0.0, 1.0)
            } else {
                1.0
            }
        };
        self.progress = self.progress.max(fraction);
        self.last_tick = now;
    }

    fn remaining(&self) -> Duration {
        (self.deadline - self.last_tick).max(Duration::zero())
    }
}

/// Emitted exactly once when a phase runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseComplete {
    pub completed: Phase,
    pub next: Phase,
    pub history: History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing is counting down; the tick was ignored.
    Idle,
    Applied,
    PhaseComplete(PhaseComplete),
}

/// Read-only view of the engine for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub phase: Option<Phase>,
    pub progress: f64,
    pub remaining: Duration,
    pub history: History,
    pub running: bool,
    pub awaiting_confirmation: bool,
    pub pending: Option<Phase>,
    pub work_minutes: Option<u8>,
}

#[derive(Debug, Clone)]
pub struct CycleEngine {
    status: Status,
    work: Option<WorkDuration>,
    interval: Option<Interval>,
    history: History,
}

impl Default for CycleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleEngine {
    pub fn new() -> Self {
        Self {
            status: Status::Unconfigured,
            work: None,
            interval: None,
            history: History::default(),
        }
    }

    /// Validate and store the work-interval length typed by the user.
    ///
    /// On error the engine is left exactly as it was.
    pub fn configure(&mut self, input: &str) -> Result<WorkDuration> {
        let work: WorkDuration = input.parse()?;
        self.set_work_duration(work);
        Ok(work)
    }

    /// Store an already validated work length. Once the cycle is running the
    /// new length applies from the next work interval.
    pub fn set_work_duration(&mut self, work: WorkDuration) {
        self.work = Some(work);
        if self.status == Status::Unconfigured {
            self.status = Status::Ready;
        }
        info!(minutes = work.minutes(), "work duration configured");
    }

    /// Arm the first work interval.
    pub fn begin(&mut self, now: DateTime<Local>) -> Result<Phase> {
        match self.status {
            Status::Unconfigured => Err(CycleError::NotConfigured),
            Status::Ready => {
                self.start(Phase::WorkInterval, now)?;
                Ok(Phase::WorkInterval)
            }
            Status::Running | Status::AwaitingConfirmation { .. } => {
                Err(CycleError::AlreadyStarted)
            }
        }
    }

    fn start(&mut self, phase: Phase, now: DateTime<Local>) -> Result<()> {
        let length = self.duration_of(phase).ok_or(CycleError::NotConfigured)?;
        self.interval = Some(Interval::new(phase, length, now));
        self.status = Status::Running;
        debug!(%phase, minutes = length.num_minutes(), "phase started");
        Ok(())
    }

    /// Feed one tick from the caller's timer. Scheduling the next tick is up
    /// to the caller.
    pub fn on_tick(&mut self, now: DateTime<Local>) -> TickOutcome {
        if self.status != Status::Running {
            return TickOutcome::Idle;
        }
        let Some(interval) = self.interval.as_mut() else {
            return TickOutcome::Idle;
        };
        interval.advance(now);
        if now >= interval.deadline {
            let completed = interval.phase;
            TickOutcome::PhaseComplete(self.expire(completed))
        } else {
            TickOutcome::Applied
        }
    }

    fn expire(&mut self, completed: Phase) -> PhaseComplete {
        self.history.record(completed);
        let next = self.history.next_after(completed);
        self.status = Status::AwaitingConfirmation { next };
        info!(
            %completed,
            %next,
            work = self.history.work,
            short_breaks = self.history.short_breaks,
            long_breaks = self.history.long_breaks,
            "phase complete"
        );
        PhaseComplete {
            completed,
            next,
            history: self.history,
        }
    }

    /// The user confirmed: start the pending phase.
    pub fn acknowledge(&mut self, now: DateTime<Local>) -> Result<Phase> {
        match self.status {
            Status::AwaitingConfirmation { next } => {
                self.start(next, now)?;
                Ok(next)
            }
            _ => Err(CycleError::NotAwaitingConfirmation),
        }
    }

    pub fn duration_of(&self, phase: Phase) -> Option<Duration> {
        match phase {
            Phase::WorkInterval => self.work.map(WorkDuration::as_duration),
            Phase::ShortBreak => Some(Duration::minutes(SHORT_BREAK_MINUTES)),
            Phase::LongBreak => Some(Duration::minutes(LONG_BREAK_MINUTES)),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.work.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.status == Status::Running
    }

    pub fn is_awaiting_confirmation(&self) -> bool {
        matches!(self.status, Status::AwaitingConfirmation { .. })
    }

    pub fn has_started(&self) -> bool {
        self.interval.is_some()
    }

    pub fn current_phase(&self) -> Option<Phase> {
        self.interval.map(|interval| interval.phase)
    }

    pub fn pending_phase(&self) -> Option<Phase> {
        match self.status {
            Status::AwaitingConfirmation { next } => Some(next),
            _ => None,
        }
    }

    pub fn progress(&self) -> f64 {
        self.interval.map_or(0.0, |interval| interval.progress)
    }

    /// Deadline minus the last observed tick, never negative.
    pub fn remaining(&self) -> Duration {
        self.interval
            .map_or_else(Duration::zero, |interval| interval.remaining())
    }

    pub fn deadline(&self) -> Option<DateTime<Local>> {
        self.interval.map(|interval| interval.deadline)
    }

    pub fn history(&self) -> History {
        self.history
    }

    pub fn work_duration(&self) -> Option<WorkDuration> {
        self.work
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.current_phase(),
            progress: self.progress(),
            remaining: self.remaining(),
            history: self.history,
            running: self.is_running(),
            awaiting_confirmation: self.is_awaiting_confirmation(),
            pending: self.pending_phase(),
            work_minutes: self.work.map(WorkDuration::minutes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(minutes: &str) -> (CycleEngine, DateTime<Local>) {
        let mut engine = CycleEngine::new();
        engine.configure(minutes).unwrap();
        (engine, Local::now())
    }

    #[test]
    fn test_new_engine_is_idle() {
        let engine = CycleEngine::new();
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.phase, None);
        assert!(!snapshot.running);
        assert!(!snapshot.awaiting_confirmation);
        assert_eq!(snapshot.progress, 0.0);
        assert_eq!(snapshot.remaining, Duration::zero());
        assert_eq!(snapshot.history, History::default());
        assert_eq!(snapshot.work_minutes, None);
    }

    #[test]
    fn test_configure_rejects_zero_without_mutation() {
        let mut engine = CycleEngine::new();
        let err = engine.configure("0").unwrap_err();
        assert!(matches!(err, CycleError::InvalidDuration { .. }));
        assert!(!engine.is_configured());
        assert_eq!(engine.begin(Local::now()), Err(CycleError::NotConfigured));
    }

    #[test]
    fn test_configure_does_not_start() {
        let (engine, _) = configured("25");
        assert!(engine.is_configured());
        assert!(!engine.is_running());
        assert!(!engine.has_started());
    }

    #[test]
    fn test_begin_arms_work_interval() {
        let (mut engine, now) = configured("25");
        assert_eq!(engine.begin(now), Ok(Phase::WorkInterval));
        assert!(engine.is_running());
        assert!(!engine.is_awaiting_confirmation());
        assert_eq!(engine.current_phase(), Some(Phase::WorkInterval));
        assert_eq!(engine.deadline(), Some(now + Duration::minutes(25)));
        assert_eq!(engine.remaining(), Duration::minutes(25));
        assert_eq!(engine.progress(), 0.0);
    }

    #[test]
    fn test_begin_twice_fails() {
        let (mut engine, now) = configured("25");
        engine.begin(now).unwrap();
        assert_eq!(engine.begin(now), Err(CycleError::AlreadyStarted));
    }

    #[test]
    fn test_tick_tracks_elapsed_time() {
        let (mut engine, now) = configured("10");
        engine.begin(now).unwrap();

        let outcome = engine.on_tick(now + Duration::minutes(5));
        assert_eq!(outcome, TickOutcome::Applied);
        assert!((engine.progress() - 0.5).abs() < 1e-9);
        assert_eq!(engine.remaining(), Duration::minutes(5));
    }

    #[test]
    fn test_late_tick_does_not_drift() {
        let (mut engine, now) = configured("1");
        engine.begin(now).unwrap();

        // A single delayed tick lands right where the clock says it should
        engine.on_tick(now + Duration::seconds(45));
        assert!((engine.progress() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_progress_never_decreases() {
        let (mut engine, now) = configured("1");
        engine.begin(now).unwrap();

        engine.on_tick(now + Duration::seconds(30));
        let before = engine.progress();
        engine.on_tick(now + Duration::seconds(10));
        assert!(engine.progress() >= before);
    }

    #[test]
    fn test_expiry_at_deadline() {
        let (mut engine, now) = configured("1");
        engine.begin(now).unwrap();

        let outcome = engine.on_tick(now + Duration::minutes(1));
        assert_eq!(
            outcome,
            TickOutcome::PhaseComplete(PhaseComplete {
                completed: Phase::WorkInterval,
                next: Phase::ShortBreak,
                history: History {
                    work: 1,
                    short_breaks: 0,
                    long_breaks: 0,
                },
            })
        );
        assert!(!engine.is_running());
        assert!(engine.is_awaiting_confirmation());
        assert_eq!(engine.pending_phase(), Some(Phase::ShortBreak));
        assert_eq!(engine.progress(), 1.0);
        assert_eq!(engine.remaining(), Duration::zero());
    }

    #[test]
    fn test_ticks_after_expiry_are_ignored() {
        let (mut engine, now) = configured("1");
        engine.begin(now).unwrap();
        engine.on_tick(now + Duration::minutes(1));

        let history = engine.history();
        assert_eq!(engine.on_tick(now + Duration::minutes(2)), TickOutcome::Idle);
        assert_eq!(engine.history(), history);
        assert!(engine.is_awaiting_confirmation());
    }

    #[test]
    fn test_tick_before_start_is_idle() {
        let (mut engine, now) = configured("1");
        assert_eq!(engine.on_tick(now), TickOutcome::Idle);
        assert!(!engine.has_started());
    }

    #[test]
    fn test_acknowledge_starts_pending_phase() {
        let (mut engine, now) = configured("1");
        engine.begin(now).unwrap();
        let expired_at = now + Duration::minutes(1);
        engine.on_tick(expired_at);

        let later = expired_at + Duration::seconds(20);
        assert_eq!(engine.acknowledge(later), Ok(Phase::ShortBreak));
        assert!(engine.is_running());
        assert_eq!(engine.current_phase(), Some(Phase::ShortBreak));
        assert_eq!(engine.deadline(), Some(later + Duration::minutes(5)));
        assert_eq!(engine.progress(), 0.0);
    }

    #[test]
    fn test_acknowledge_while_running_is_rejected() {
        let (mut engine, now) = configured("1");
        engine.begin(now).unwrap();
        engine.on_tick(now + Duration::seconds(10));

        let before = engine.snapshot();
        assert_eq!(
            engine.acknowledge(now + Duration::seconds(11)),
            Err(CycleError::NotAwaitingConfirmation)
        );
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_acknowledge_before_start_is_rejected() {
        let mut engine = CycleEngine::new();
        assert_eq!(
            engine.acknowledge(Local::now()),
            Err(CycleError::NotAwaitingConfirmation)
        );
    }

    #[test]
    fn test_reconfigure_applies_to_next_work_interval() {
        let (mut engine, now) = configured("1");
        engine.begin(now).unwrap();
        engine.configure("30").unwrap();

        // The running interval keeps its deadline
        assert_eq!(engine.deadline(), Some(now + Duration::minutes(1)));
        assert_eq!(engine.duration_of(Phase::WorkInterval), Some(Duration::minutes(30)));
        assert!(engine.is_running());
    }

    #[test]
    fn test_break_durations_are_fixed() {
        let engine = CycleEngine::new();
        assert_eq!(engine.duration_of(Phase::WorkInterval), None);
        assert_eq!(engine.duration_of(Phase::ShortBreak), Some(Duration::minutes(5)));
        assert_eq!(engine.duration_of(Phase::LongBreak), Some(Duration::minutes(15)));
    }
}
