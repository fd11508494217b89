use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crate::app::{App, Completion};
use crate::models::Field;
use crate::view::{Phase, SLIDE_TICKS};

const POLL_INTERVAL: Duration = Duration::from_millis(30);
const TICK_INTERVAL: Duration = Duration::from_millis(40);

pub const IDLE_PLACEHOLDER: &str = "Your recommendations will appear here.";
pub const LOADING_MESSAGE: &str = "Finding the best matches for you...";
pub const EMPTY_MESSAGE: &str = "No recommendations found for this resume.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Form,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Continue,
    Quit,
}

struct UiState {
    pane: Pane,
    cursor: usize,
    scroll_offset: u16,
}

impl UiState {
    fn new() -> Self {
        Self {
            pane: Pane::Form,
            cursor: 0,
            scroll_offset: 0,
        }
    }

    fn next(&mut self, len: usize) {
        if len > 0 && self.cursor < len - 1 {
            self.cursor += 1;
        }
    }

    fn prev(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn clamp(&mut self, len: usize) {
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(3);
    }

    fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(3);
    }
}

pub fn run(app: &mut App, completions: &Receiver<Completion>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    if let Err(e) = stdout().execute(EnterAlternateScreen) {
        disable_raw_mode().ok();
        return Err(e.into());
    }

    let result = Terminal::new(CrosstermBackend::new(stdout()))
        .map_err(anyhow::Error::from)
        .and_then(|mut terminal| run_loop(&mut terminal, app, completions));

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    completions: &Receiver<Completion>,
) -> Result<()> {
    let mut ui = UiState::new();
    let mut last_tick = Instant::now();

    loop {
        while let Ok(completion) = completions.try_recv() {
            app.on_completion(completion);
            ui.clamp(app.results.records().len());
        }

        if last_tick.elapsed() >= TICK_INTERVAL {
            app.tick();
            last_tick = Instant::now();
        }

        terminal.draw(|frame| draw(frame, app, &ui))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if handle_key(app, &mut ui, key) == Control::Quit {
                break;
            }
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, ui: &mut UiState, key: KeyEvent) -> Control {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && key.code == KeyCode::Char('c') {
        return Control::Quit;
    }
    if ctrl && key.code == KeyCode::Char('s') {
        submit(app, ui);
        return Control::Continue;
    }

    if app.results.is_detail_open() {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => app.close_detail(),
            KeyCode::Char('J') | KeyCode::PageDown => ui.scroll_down(),
            KeyCode::Char('K') | KeyCode::PageUp => ui.scroll_up(),
            _ => {}
        }
        return Control::Continue;
    }

    match ui.pane {
        Pane::Form => match key.code {
            KeyCode::Esc => return Control::Quit,
            KeyCode::Tab => ui.pane = Pane::Results,
            KeyCode::Down => app.form.focus_next(),
            KeyCode::Up | KeyCode::BackTab => app.form.focus_prev(),
            KeyCode::Enter => submit(app, ui),
            KeyCode::Backspace => app.form.pop_char(),
            KeyCode::Char('p') if ctrl => app.form.prefill_sample(),
            KeyCode::Char('l') if ctrl => app.form.reset(),
            KeyCode::Char('u') if ctrl => app.form.clear_focused(),
            KeyCode::Char(c) if !ctrl => app.form.push_char(c),
            _ => {}
        },
        Pane::Results => match key.code {
            KeyCode::Tab | KeyCode::Esc => ui.pane = Pane::Form,
            KeyCode::Down | KeyCode::Char('j') => ui.next(app.results.records().len()),
            KeyCode::Up | KeyCode::Char('k') => ui.prev(),
            KeyCode::Enter | KeyCode::Char('o') => {
                if app.open_detail(ui.cursor) {
                    ui.scroll_offset = 0;
                }
            }
            _ => {}
        },
    }
    Control::Continue
}

fn submit(app: &mut App, ui: &mut UiState) {
    if app.submit() {
        ui.cursor = 0;
        ui.pane = Pane::Results;
    }
}

fn draw(frame: &mut Frame, app: &App, ui: &UiState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[0]);

    draw_form(frame, app, ui, chunks[0]);
    draw_results(frame, app, ui, chunks[1]);
    draw_detail(frame, app, ui, chunks[1]);

    let help = if app.results.is_detail_open() {
        " Esc/q:close  J/K:scroll  ^C:quit"
    } else if ui.pane == Pane::Form {
        " ↑/↓:field  Enter/^S:submit  ^P:sample  ^L:clear all  ^U:clear field  Tab:results  Esc:quit"
    } else {
        " j/k:navigate  Enter:details  ^S:submit  Tab/Esc:form  ^C:quit"
    };
    let help = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, rows[1]);
}

fn pane_block(title: String, active: bool) -> Block<'static> {
    let border = if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title)
}

fn draw_form(frame: &mut Frame, app: &App, ui: &UiState, area: Rect) {
    let editing = ui.pane == Pane::Form && !app.results.is_detail_open();
    let block = pane_block(" Enter Your Resume Details ".to_string(), editing);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    let width = inner.width.saturating_sub(2).max(10) as usize;
    let mut lines: Vec<Line> = Vec::new();
    let mut focused_span = (0, 0);

    for field in Field::ALL {
        let focused = field == app.form.focus();
        let start = lines.len();
        let marker = if focused { "> " } else { "  " };
        let label_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        lines.push(Line::from(Span::styled(
            format!("{}{}", marker, field.label()),
            label_style,
        )));

        let mut value = app.form.draft().get(field).to_string();
        if focused && editing {
            value.push('_');
        }
        if value.is_empty() {
            lines.push(Line::from(Span::styled(
                "  (empty)",
                Style::default().fg(Color::DarkGray),
            )));
        } else {
            for line in textwrap::wrap(&value, width) {
                lines.push(Line::from(format!("  {}", line)));
            }
        }
        if focused {
            focused_span = (start, lines.len());
        }
        lines.push(Line::from(""));
    }

    let offset = form_scroll(focused_span, rows[0].height as usize);
    let fields = Paragraph::new(Text::from(lines)).scroll((offset, 0));
    frame.render_widget(fields, rows[0]);

    let (button, style) = if app.results.is_loading() {
        ("[ Analyzing... ]", Style::default().fg(Color::DarkGray))
    } else if app.can_submit() {
        (
            "[ Get Recommendations ]",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )
    } else {
        ("[ Get Recommendations ]", Style::default().fg(Color::DarkGray))
    };
    frame.render_widget(Paragraph::new(Span::styled(button, style)), rows[1]);
}

/// First visible line of the field list, chosen so the focused field's
/// `[start, end)` lines fit in `height` rows, label first when they don't.
fn form_scroll((start, end): (usize, usize), height: usize) -> u16 {
    let offset = if end > height {
        (end - height).min(start)
    } else {
        0
    };
    u16::try_from(offset).unwrap_or(u16::MAX)
}

fn draw_results(frame: &mut Frame, app: &App, ui: &UiState, area: Rect) {
    let active = ui.pane == Pane::Results && !app.results.is_detail_open();
    let mut title = " Recommended Internships ".to_string();
    if let Phase::Populated(records) = app.results.phase() {
        title = format!(" Recommended Internships ({}) ", records.len());
        if let Some(at) = app.last_completed() {
            title.push_str(&format!("- {} ", at.format("%H:%M:%S")));
        }
    }
    let block = pane_block(title, active);

    let message = |text: &str, style: Style| {
        Paragraph::new(text.to_string())
            .style(style)
            .block(block.clone())
            .wrap(Wrap { trim: false })
    };

    match app.results.phase() {
        Phase::Idle => {
            let placeholder = message(IDLE_PLACEHOLDER, Style::default().fg(Color::DarkGray));
            frame.render_widget(placeholder, area);
        }
        Phase::Loading { .. } => {
            let loading = message(LOADING_MESSAGE, Style::default().fg(Color::Yellow));
            frame.render_widget(loading, area);
        }
        Phase::Failed(error) => {
            let failure = message(error.as_str(), Style::default().fg(Color::Red));
            frame.render_widget(failure, area);
        }
        Phase::Populated(records) if records.is_empty() => {
            frame.render_widget(message(EMPTY_MESSAGE, Style::default()), area);
        }
        Phase::Populated(records) => {
            let open_key = app
                .results
                .open_index()
                .and_then(|i| records.get(i).map(|r| r.list_key(i)));

            let items: Vec<ListItem> = records
                .iter()
                .enumerate()
                .map(|(i, record)| {
                    let marker = if open_key.as_ref() == Some(&record.list_key(i)) {
                        "*"
                    } else {
                        " "
                    };
                    let title = if record.title.is_empty() {
                        "(untitled)"
                    } else {
                        record.title.as_str()
                    };
                    ListItem::new(vec![
                        Line::from(Span::styled(
                            format!("{} {}", marker, title),
                            Style::default().add_modifier(Modifier::BOLD),
                        )),
                        Line::from(Span::styled(
                            format!("  {}", company_location(&record.company, &record.location)),
                            Style::default().fg(Color::DarkGray),
                        )),
                    ])
                })
                .collect();

            let list = List::new(items)
                .block(block.clone())
                .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
                .highlight_symbol("> ");

            let mut list_state = ListState::default();
            list_state.select(Some(ui.cursor));
            frame.render_stateful_widget(list, area, &mut list_state);
        }
    }
}

fn company_location(company: &str, location: &str) -> String {
    match (company.is_empty(), location.is_empty()) {
        (false, false) => format!("{} - {}", company, location),
        (false, true) => company.to_string(),
        (true, false) => location.to_string(),
        (true, true) => String::new(),
    }
}

/// The detail panel slides in from the right edge of the results pane.
fn draw_detail(frame: &mut Frame, app: &App, ui: &UiState, area: Rect) {
    let Some((record, progress)) = app.results.detail() else {
        return;
    };
    let width = area.width as u32 * progress as u32 / SLIDE_TICKS as u32;
    let width = width as u16;
    if width < 4 {
        return;
    }
    let panel = Rect {
        x: area.x + area.width - width,
        y: area.y,
        width,
        height: area.height,
    };

    let wrap_width = panel.width.saturating_sub(4).max(10) as usize;
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        record.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    let subtitle = company_location(&record.company, &record.location);
    if !subtitle.is_empty() {
        lines.push(Line::from(subtitle));
    }
    lines.push(Line::from(""));

    for (heading, body) in [
        ("Description", &record.description),
        ("Requirements", &record.requirements),
    ] {
        lines.push(Line::from(Span::styled(
            heading,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        if body.trim().is_empty() {
            lines.push(Line::from(Span::styled(
                "  (not provided)",
                Style::default().fg(Color::DarkGray),
            )));
        } else {
            for line in textwrap::fill(body, wrap_width).lines() {
                lines.push(Line::from(format!("  {}", line)));
            }
        }
        lines.push(Line::from(""));
    }

    let detail = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Detail "),
        )
        .scroll((ui.scroll_offset, 0));

    frame.render_widget(Clear, panel);
    frame.render_widget(detail, panel);
}
