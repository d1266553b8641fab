use crate::app::{App, AppMode};
use crate::config::Icons;
use chrono::Duration;
use pomo_engine::{Phase, Snapshot};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const PADDING: u16 = 2;
const MAX_WIDTH: u16 = 80;

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    draw_header(f, chunks[0], app);
    let body = content_area(chunks[1]);
    match app.mode {
        AppMode::Prompt => draw_prompt(f, body, app),
        AppMode::Timer => draw_timer(f, body, app),
    }
    draw_status_bar(f, chunks[2], app);
}

/// Centered column no wider than `MAX_WIDTH`, recomputed on every resize.
fn content_area(area: Rect) -> Rect {
    let width = area.width.min(MAX_WIDTH);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;
    let text = Line::from(vec![
        Span::raw(icons.header_left.clone()),
        Span::styled(
            "POMO",
            Style::default().fg(theme.red).add_modifier(Modifier::BOLD),
        ),
        Span::raw(icons.header_right.clone()),
    ]);
    f.render_widget(
        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(theme.black)),
        ),
        area,
    );
}

fn draw_prompt(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;

    let input = if app.input_buffer.is_empty() {
        Span::styled(app.placeholder(), Style::default().fg(theme.gray))
    } else {
        Span::styled(
            app.input_buffer.clone(),
            Style::default().fg(theme.foreground),
        )
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!("{} POMO {}", icons.work, icons.work),
            Style::default().fg(theme.red).add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::raw("How long do you want your pomodoros?"),
        Line::raw(
            "Enter a number between 1 and 99 for length in minutes, then press Enter to start.",
        ),
        Line::raw(""),
        Line::from(vec![
            Span::styled("▸ ", Style::default().fg(theme.foreground)),
            input,
            Span::styled(
                icons.input_cursor.clone(),
                Style::default()
                    .fg(theme.foreground)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
        ]),
    ];
    if let Some(err) = &app.input_error {
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(theme.red),
        )));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "(esc to quit)",
        Style::default().fg(theme.gray),
    )));

    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }),
        padded(area),
    );
}

fn draw_timer(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;
    let snapshot = app.snapshot();

    let remaining = format_remaining(snapshot.remaining);
    let bar_area = padded(area);
    let bar_width = usize::from(bar_area.width)
        .saturating_sub(remaining.chars().count() + usize::from(PADDING));

    let (filled, empty) = progress_bar(snapshot.progress, bar_width, icons);
    let bar = Line::from(vec![
        Span::styled(filled, Style::default().fg(theme.blue)),
        Span::styled(empty, Style::default().fg(theme.black)),
        Span::raw(" ".repeat(usize::from(PADDING))),
        Span::styled(
            remaining,
            Style::default()
                .fg(theme.foreground)
                .add_modifier(Modifier::BOLD),
        ),
    ]);

    let lines = if snapshot.awaiting_confirmation {
        let (icon, prompt) = completion_text(&snapshot, icons);
        vec![
            Line::raw(""),
            bar,
            Line::raw(""),
            Line::from(vec![
                Span::styled(
                    "Complete! ",
                    Style::default().fg(theme.green).add_modifier(Modifier::BOLD),
                ),
                Span::raw(icon),
            ]),
            Line::raw(""),
            Line::from(Span::styled(prompt, Style::default().fg(theme.yellow))),
        ]
    } else {
        let heading = match snapshot.phase {
            Some(phase) if phase.is_break() => "Current break:",
            _ => "Current pomodoro:",
        };
        vec![
            Line::raw(format!("Completed pomodoros: {}", snapshot.history.work)),
            Line::raw(""),
            Line::raw(heading),
            Line::raw(""),
            bar,
        ]
    };

    f.render_widget(Paragraph::new(lines), bar_area);
}

fn completion_text(snapshot: &Snapshot, icons: &Icons) -> (String, &'static str) {
    match snapshot.pending {
        Some(Phase::WorkInterval) => (icons.rest.clone(), "Press Enter to start pomodoro."),
        _ => (icons.work.clone(), "Press Enter to start break."),
    }
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;
    let snapshot = app.snapshot();

    let (mode_text, mode_color) = match (app.mode, snapshot.phase) {
        (AppMode::Prompt, _) => ("SETUP", theme.yellow),
        _ if snapshot.awaiting_confirmation => ("DONE", theme.green),
        (AppMode::Timer, Some(phase)) if phase.is_break() => ("BREAK", theme.blue),
        (AppMode::Timer, _) => ("WORK", theme.red),
    };
    let help = match app.mode {
        AppMode::Prompt => "enter:start │ esc:quit",
        AppMode::Timer if snapshot.awaiting_confirmation => "enter:next │ q:quit",
        AppMode::Timer => "q:quit",
    };
    let history = snapshot.history;
    let counters = format!(
        "{} {} {} short {} {} long {} {}",
        icons.work,
        history.work,
        icons.separator,
        history.short_breaks,
        icons.separator,
        history.long_breaks,
        icons.separator,
    );

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                format!(" {} ", mode_text),
                Style::default()
                    .bg(mode_color)
                    .fg(theme.background)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::raw(counters),
            Span::raw(" "),
            Span::raw(help),
        ]))
        .block(Block::default().style(Style::default().bg(theme.black).fg(theme.gray))),
        area,
    );
}

fn padded(area: Rect) -> Rect {
    let pad = PADDING.min(area.width / 2);
    Rect {
        x: area.x + pad,
        y: area.y + 1u16.min(area.height),
        width: area.width - pad * 2,
        height: area.height.saturating_sub(1),
    }
}

/// Filled and empty halves of a bar `width` glyphs wide.
pub fn progress_bar(progress: f64, width: usize, icons: &Icons) -> (String, String) {
    let filled = ((progress.clamp(0.0, 1.0) * width as f64).floor() as usize).min(width);
    (
        icons.progress_filled.repeat(filled),
        icons.progress_empty.repeat(width - filled),
    )
}

/// `mm:ss`, rounded to the nearest second.
pub fn format_remaining(remaining: Duration) -> String {
    let secs = (remaining.num_milliseconds().max(0) + 500) / 1000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::notify::SilentNotifier;
    use chrono::Local;
    use ratatui::{backend::TestBackend, Terminal};

    fn render(app: &App, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(usize::from(width))
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app() -> App {
        App::new(Config::default(), Box::new(SilentNotifier))
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(Duration::minutes(25)), "25:00");
        assert_eq!(format_remaining(Duration::seconds(61)), "01:01");
        assert_eq!(format_remaining(Duration::milliseconds(59_600)), "01:00");
        assert_eq!(format_remaining(Duration::zero()), "00:00");
        assert_eq!(format_remaining(Duration::seconds(-5)), "00:00");
    }

    #[test]
    fn test_progress_bar() {
        let icons = Icons::default();
        assert_eq!(progress_bar(0.0, 4, &icons), (String::new(), "░░░░".to_string()));
        assert_eq!(progress_bar(0.5, 4, &icons), ("██".to_string(), "░░".to_string()));
        assert_eq!(progress_bar(1.0, 4, &icons), ("████".to_string(), String::new()));
        assert_eq!(progress_bar(1.2, 4, &icons).0.chars().count(), 4);
        assert_eq!(progress_bar(0.5, 0, &icons), (String::new(), String::new()));
    }

    #[test]
    fn test_prompt_view() {
        let mut app = app();
        let screen = render(&app, 100, 20);
        assert!(screen.contains("How long do you want your pomodoros?"));
        assert!(screen.contains("(esc to quit)"));
        assert!(screen.contains("25"));

        app.input_error = Some("invalid duration \"0\": must be between 1 and 99 minutes".into());
        let screen = render(&app, 100, 20);
        assert!(screen.contains("must be between 1 and 99 minutes"));
    }

    #[test]
    fn test_running_view() {
        let mut app = app();
        let now = Local::now();
        app.handle_char('2', now);
        app.handle_char('\n', now);
        app.on_tick(now + Duration::seconds(30));

        let screen = render(&app, 100, 20);
        assert!(screen.contains("Completed pomodoros: 0"));
        assert!(screen.contains("Current pomodoro:"));
        assert!(screen.contains("01:30"));
        assert!(screen.contains("WORK"));
    }

    #[test]
    fn test_completion_view() {
        let mut app = app();
        let now = Local::now();
        app.handle_char('1', now);
        app.handle_char('\n', now);
        app.on_tick(now + Duration::minutes(1));

        let screen = render(&app, 100, 20);
        assert!(screen.contains("Complete!"));
        assert!(screen.contains("Press Enter to start break."));
        assert!(screen.contains("DONE"));

        app.handle_char('\n', now + Duration::minutes(1));
        let screen = render(&app, 100, 20);
        assert!(screen.contains("Current break:"));
        assert!(screen.contains("05:00"));
    }

    #[test]
    fn test_narrow_terminal_does_not_panic() {
        let mut app = app();
        let now = Local::now();
        app.handle_char('\n', now);
        render(&app, 6, 4);
        render(&app, 200, 50);
    }
}
