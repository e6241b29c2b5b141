use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use serde_json::json;

use octofit_terminal::client::{HttpTransport, ResourceClient};
use octofit_terminal::config::AppConfig;
use octofit_terminal::controller::{ResourceListController, StatusKind};
use octofit_terminal::derive::{DifficultyClass, RankMarker};
use octofit_terminal::observer::LogObserver;
use octofit_terminal::provider::spawn_provider;
use octofit_terminal::resources::Resource;
use octofit_terminal::state::{self, AppState, ProviderCommand, Screen, apply_delta};
use octofit_terminal::views::{RowStyle, columns, derive_all};

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    ticks: usize,
}

impl App {
    fn new(state: AppState, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state,
            should_quit: false,
            cmd_tx,
            ticks: 0,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char(c @ '1'..='5') => {
                let idx = (c as usize) - ('1' as usize);
                self.open(Resource::ALL[idx]);
            }
            KeyCode::Char('h') | KeyCode::Char('0') | KeyCode::Esc => self.state.go_home(),
            KeyCode::Tab => {
                let next = self
                    .state
                    .current_resource()
                    .map(Resource::next)
                    .unwrap_or(Resource::Activities);
                self.open(next);
            }
            KeyCode::BackTab => {
                let prev = self
                    .state
                    .current_resource()
                    .map(Resource::prev)
                    .unwrap_or(Resource::Workouts);
                self.open(prev);
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                let cmd = self.state.refresh();
                match cmd {
                    Some(cmd) => self.dispatch(cmd),
                    None if self.state.controller.is_some() => {
                        self.state.push_log("[INFO] Refresh ignored: load in progress");
                    }
                    None => {}
                }
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn open(&mut self, resource: Resource) {
        if let Some(cmd) = self.state.open(resource) {
            self.dispatch(cmd);
        }
    }

    fn dispatch(&mut self, cmd: ProviderCommand) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[WARN] Fetch worker unavailable");
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Fetch request failed: worker stopped");
        }
    }
}

fn main() -> Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Some(pos) = args.iter().position(|arg| arg == "--dump") {
        let name = args
            .get(pos + 1)
            .ok_or_else(|| anyhow!("--dump needs a resource name"))?;
        let resource = name.parse::<Resource>().map_err(|err| anyhow!(err))?;
        return dump(&config, resource);
    }

    run_tui(config)
}

/// Loads one resource synchronously and prints the view as JSON.
fn dump(config: &AppConfig, resource: Resource) -> Result<()> {
    let client = ResourceClient::new(HttpTransport::new(config.request_timeout)?);
    let mut controller = ResourceListController::new(resource, config.endpoint(resource));
    controller.run(&client);

    let rows = derive_all(resource, controller.records());
    let out = json!({
        "view": controller.view(),
        "rows": rows,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&out).context("serialize view")?
    );
    match controller.error_message() {
        Some(msg) => Err(anyhow!("{resource}: {msg}")),
        None => Ok(()),
    }
}

fn run_tui(config: AppConfig) -> Result<()> {
    let transport = HttpTransport::new(config.request_timeout)?;
    let start_view = config.start_view;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let client = ResourceClient::new(transport).with_observer(LogObserver::new(tx.clone()));
    let _worker = spawn_provider(client, tx, cmd_rx);

    let mut app = App::new(AppState::new(config), Some(cmd_tx.clone()));
    app.state.push_log(format!(
        "[INFO] API base: {}",
        app.state.config.api_base
    ));
    if let Some(resource) = start_view {
        app.open(resource);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Not joined: an in-flight request would hold up exit until its timeout.
    let _ = cmd_tx.send(ProviderCommand::Shutdown);

    res.context("terminal loop failed")
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.ticks = app.ticks.wrapping_add(1);
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Home => render_home(frame, chunks[1]),
        Screen::List(resource) => render_list(frame, chunks[1], app, resource),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let tabs = Resource::ALL
        .iter()
        .enumerate()
        .map(|(idx, resource)| {
            if state.current_resource() == Some(*resource) {
                format!("[{} {}]", idx + 1, resource.title())
            } else {
                format!(" {} {} ", idx + 1, resource.title())
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    let line2 = match (state.current_resource(), &state.controller) {
        (Some(resource), Some(controller)) if controller.status() == StatusKind::Loaded => {
            format!(
                "{} | {} {}",
                resource.subtitle(),
                controller.records().len(),
                resource.count_label()
            )
        }
        (Some(resource), _) => resource.subtitle().to_string(),
        (None, _) => "Welcome to OctoFit Tracker!".to_string(),
    };
    format!("OCTOFIT TRACKER | {tabs}\n{line2}")
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Home => "1-5 Open view | Tab Next | ? Help | q Quit".to_string(),
        Screen::List(_) => {
            "1-5/Tab Switch | j/k/↑/↓ Move | r Refresh | h/Esc Home | ? Help | q Quit".to_string()
        }
    }
}

fn render_home(frame: &mut Frame, area: Rect) {
    let mut lines = vec![
        "Welcome to OctoFit Tracker!".to_string(),
        "Track workouts, compete with your team, climb the leaderboard.".to_string(),
        String::new(),
    ];
    for (idx, resource) in Resource::ALL.iter().enumerate() {
        lines.push(format!(
            "  {}  {:<12} {}",
            idx + 1,
            resource.title(),
            resource.subtitle()
        ));
    }
    let home = Paragraph::new(lines.join("\n"))
        .block(Block::default().title("Home").borders(Borders::ALL));
    frame.render_widget(home, area);
}

fn render_list(frame: &mut Frame, area: Rect, app: &App, resource: Resource) {
    let block = Block::default()
        .title(resource.title())
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(controller) = &app.state.controller else {
        return;
    };

    match controller.status() {
        StatusKind::Idle | StatusKind::Loading => {
            let spinner = SPINNER[app.ticks % SPINNER.len()];
            let loading = Paragraph::new(format!("{spinner} Loading..."))
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(loading, inner);
            return;
        }
        StatusKind::Failed => {
            let msg = controller.error_message().unwrap_or("Failed to load data");
            let error = Paragraph::new(format!("Error: {msg}"))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true });
            frame.render_widget(error, inner);
            return;
        }
        StatusKind::Loaded => {}
    }

    if app.state.rows.is_empty() {
        let empty = Paragraph::new(resource.empty_notice())
            .style(Style::default().fg(Color::Cyan));
        frame.render_widget(empty, inner);
        return;
    }

    let has_details = app
        .state
        .selected_row()
        .is_some_and(|row| !row.details().is_empty());
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(if has_details { 6 } else { 0 }),
        ])
        .split(inner);

    let widths = column_widths(resource);
    render_table_header(frame, sections[0], resource, &widths);

    let list_area = sections[1];
    let visible = list_area.height as usize;
    let (start, end) = visible_range(app.state.selected, app.state.rows.len(), visible);
    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let row = &app.state.rows[idx];
        let selected = idx == app.state.selected;
        let mut style = row_style(row.style());
        if selected {
            style = style.bg(Color::DarkGray);
            frame.render_widget(Block::default().style(style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths.clone())
            .split(row_area);
        for (col, text) in cols.iter().zip(row.cells()) {
            render_cell_text(frame, *col, &text, style);
        }
    }

    if has_details && let Some(row) = app.state.selected_row() {
        let text = row
            .details()
            .into_iter()
            .map(|(label, value)| format!("{label}: {value}"))
            .collect::<Vec<_>>()
            .join("\n");
        let details = Paragraph::new(text)
            .block(Block::default().title("Details").borders(Borders::TOP))
            .wrap(Wrap { trim: true });
        frame.render_widget(details, sections[2]);
    }
}

fn column_widths(resource: Resource) -> Vec<Constraint> {
    match resource {
        Resource::Activities => vec![
            Constraint::Length(6),
            Constraint::Min(14),
            Constraint::Length(16),
            Constraint::Length(15),
            Constraint::Length(14),
            Constraint::Length(10),
            Constraint::Length(11),
        ],
        Resource::Leaderboard => vec![
            Constraint::Length(8),
            Constraint::Min(16),
            Constraint::Length(10),
            Constraint::Min(14),
            Constraint::Length(11),
        ],
        Resource::Teams => vec![
            Constraint::Length(18),
            Constraint::Length(12),
            Constraint::Min(20),
            Constraint::Length(11),
        ],
        Resource::Users => vec![
            Constraint::Length(6),
            Constraint::Min(18),
            Constraint::Length(14),
            Constraint::Min(20),
            Constraint::Length(14),
            Constraint::Length(11),
        ],
        Resource::Workouts => vec![
            Constraint::Min(18),
            Constraint::Length(12),
            Constraint::Length(11),
            Constraint::Length(15),
            Constraint::Length(14),
            Constraint::Min(20),
        ],
    }
}

fn render_table_header(frame: &mut Frame, area: Rect, resource: Resource, widths: &[Constraint]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths.to_vec())
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);
    for (col, title) in cols.iter().zip(columns(resource)) {
        render_cell_text(frame, *col, title, style);
    }
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let text_area = Rect {
        x: area.x,
        y: area.y + (area.height / 2),
        width: area.width,
        height: 1,
    };
    let paragraph = Paragraph::new(text).style(style);
    frame.render_widget(paragraph, text_area);
}

fn row_style(style: RowStyle) -> Style {
    match style {
        RowStyle::Plain => Style::default(),
        RowStyle::Rank(RankMarker::First) => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        RowStyle::Rank(RankMarker::Second) => Style::default().fg(Color::White),
        RowStyle::Rank(RankMarker::Third) => Style::default().fg(Color::Rgb(205, 127, 50)),
        RowStyle::Rank(RankMarker::Neutral) => Style::default().fg(Color::Gray),
        RowStyle::Difficulty(DifficultyClass::Easy) => Style::default().fg(Color::Green),
        RowStyle::Difficulty(DifficultyClass::Medium) => Style::default().fg(Color::Yellow),
        RowStyle::Difficulty(DifficultyClass::Hard) => Style::default().fg(Color::Red),
        RowStyle::Difficulty(DifficultyClass::Neutral) => Style::default(),
    }
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "OctoFit Tracker - Help",
        "",
        "Views:",
        "  1            Activities",
        "  2            Leaderboard",
        "  3            Teams",
        "  4            Users",
        "  5            Workouts",
        "  Tab / S-Tab  Next / previous view",
        "  h / Esc      Home",
        "",
        "Lists:",
        "  j/k or ↑/↓   Move selection",
        "  r            Refresh",
        "",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
