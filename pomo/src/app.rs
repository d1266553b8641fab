use crate::config::Config;
use crate::notify::Notifier;
use chrono::{DateTime, Local};
use pomo_engine::{CycleEngine, Phase, Snapshot, TickOutcome, WorkDuration};
use tracing::{error, info, warn};

/// Two digits cover every valid work length.
pub const INPUT_LIMIT: usize = 2;

#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppMode {
    #[default]
    Prompt,
    Timer,
}

pub struct App {
    pub engine: CycleEngine,
    pub mode: AppMode,
    pub input_buffer: String,
    pub input_error: Option<String>,
    pub config: Config,
    pub should_quit: bool,
    notifier: Box<dyn Notifier>,
}

impl App {
    pub fn new(config: Config, notifier: Box<dyn Notifier>) -> Self {
        Self {
            engine: CycleEngine::new(),
            mode: AppMode::Prompt,
            input_buffer: String::new(),
            input_error: None,
            config,
            should_quit: false,
            notifier,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.engine.snapshot()
    }

    pub fn placeholder(&self) -> String {
        self.config.timer.default_minutes.to_string()
    }

    /// Skip the prompt with a length given on the command line.
    pub fn start_with(&mut self, work: WorkDuration, now: DateTime<Local>) -> Option<Phase> {
        self.engine.set_work_duration(work);
        self.begin(now)
    }

    /// Returns the phase that was armed, if any, so the caller can restart
    /// its tick period.
    pub fn handle_char(&mut self, c: char, now: DateTime<Local>) -> Option<Phase> {
        match self.mode {
            AppMode::Prompt => {
                if c == '\n' {
                    self.submit_duration(now)
                } else {
                    if c.is_ascii_digit() && self.input_buffer.len() < INPUT_LIMIT {
                        self.input_buffer.push(c);
                        self.input_error = None;
                    }
                    None
                }
            }
            AppMode::Timer => {
                if c == '\n' {
                    self.confirm(now)
                } else {
                    None
                }
            }
        }
    }

    pub fn handle_backspace(&mut self) {
        if self.mode == AppMode::Prompt {
            self.input_buffer.pop();
        }
    }

    /// A bad value keeps the prompt open with the error shown.
    pub fn submit_duration(&mut self, now: DateTime<Local>) -> Option<Phase> {
        let text = if self.input_buffer.trim().is_empty() {
            self.placeholder()
        } else {
            self.input_buffer.clone()
        };
        match self.engine.configure(&text) {
            Ok(_) => {
                self.input_buffer.clear();
                self.input_error = None;
                self.begin(now)
            }
            Err(e) => {
                if e.is_user_facing() {
                    warn!("Rejected work duration: {}", e);
                } else {
                    error!("Unexpected configure failure: {}", e);
                }
                self.input_error = Some(e.to_string());
                self.input_buffer.clear();
                None
            }
        }
    }

    fn begin(&mut self, now: DateTime<Local>) -> Option<Phase> {
        match self.engine.begin(now) {
            Ok(phase) => {
                self.mode = AppMode::Timer;
                info!("Cycle started");
                Some(phase)
            }
            Err(e) => {
                error!("Could not start cycle: {}", e);
                None
            }
        }
    }

    /// Enter in timer mode. Ignored unless a finished phase is waiting.
    pub fn confirm(&mut self, now: DateTime<Local>) -> Option<Phase> {
        if !self.engine.is_awaiting_confirmation() {
            return None;
        }
        match self.engine.acknowledge(now) {
            Ok(phase) => {
                info!(%phase, "Next phase confirmed");
                Some(phase)
            }
            Err(e) => {
                error!("Acknowledge rejected while awaiting confirmation: {}", e);
                None
            }
        }
    }

    pub fn on_tick(&mut self, now: DateTime<Local>) -> TickOutcome {
        let outcome = self.engine.on_tick(now);
        if let TickOutcome::PhaseComplete(event) = &outcome {
            self.notifier.phase_complete(event);
        }
        outcome
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}
