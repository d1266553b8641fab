use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pomo_engine::{Phase, WorkDuration};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod notify;
mod ticker;
mod ui;

use app::App;
use notify::{DesktopNotifier, Notifier, SilentNotifier};
use ticker::Ticker;

#[derive(Parser)]
#[command(name = "pomo")]
#[command(about = "Pomodoro timer for the terminal", long_about = None)]
struct Cli {
    /// Work interval in minutes (1-99); skips the prompt
    #[arg(short, long, value_parser = parse_minutes)]
    minutes: Option<WorkDuration>,
    /// Disable desktop notifications
    #[arg(long)]
    no_notify: bool,
    /// Config file to use instead of the platform default
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn parse_minutes(s: &str) -> Result<WorkDuration, String> {
    s.parse::<WorkDuration>().map_err(|e| e.to_string())
}

/// Logs go to a file, the terminal belongs to the UI.
fn init_logging() -> Result<PathBuf> {
    let dirs = config::project_dirs().context("Could not determine data directory")?;
    let log_dir = dirs.data_dir();
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {:?}", log_dir))?;
    let path = log_dir.join("pomo.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {:?}", path))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(path)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match init_logging() {
        Ok(path) => info!("Logging to {:?}", path),
        Err(e) => eprintln!("Logging disabled: {:#}", e),
    }

    let config = config::load_config(cli.config.as_deref())?;
    let notifier: Box<dyn Notifier> = if cli.no_notify || !config.notifications.enabled {
        Box::new(SilentNotifier)
    } else {
        Box::new(DesktopNotifier)
    };
    let mut app = App::new(config, notifier);
    if let Some(work) = cli.minutes {
        app.start_with(work, Local::now());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    let mut ticker = Ticker::new(app.config.timer.refresh_interval(), Instant::now());

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        if event::poll(ticker.timeout(Instant::now()))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key(&mut app, key).is_some() {
                        ticker.reset(Instant::now());
                    }
                }
                // Layout is recomputed from the frame size on the next draw
                Event::Resize(_, _) => {}
                _ => {}
            }
        }

        if app.should_quit {
            info!("Quit requested");
            return Ok(());
        }

        if ticker.fire(Instant::now()) && app.engine.is_running() {
            app.on_tick(Local::now());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) -> Option<Phase> {
    let now = Local::now();
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.quit();
            None
        }
        KeyCode::Char('q') | KeyCode::Esc => {
            app.quit();
            None
        }
        KeyCode::Enter => app.handle_char('\n', now),
        KeyCode::Backspace => {
            app.handle_backspace();
            None
        }
        KeyCode::Char(c) => app.handle_char(c, now),
        _ => None,
    }
}
