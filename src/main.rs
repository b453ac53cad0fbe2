use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::DateTime;
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
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use propboard::markets::{self, STAT_COUNT, StatKind};
use propboard::projection::PlayerProjection;
use propboard::state::{
    AppState, Delta, EditorColumn, ProviderCommand, Screen, apply_delta,
};
use propboard::{export, feed};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayerPane {
    Roster,
    Grid,
}

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    player_pane: PlayerPane,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
            player_pane: PlayerPane::Roster,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.edit_buffer.is_some() {
            self.on_edit_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Char('1') => self.state.screen = Screen::Leaderboard,
            KeyCode::Char('2') => self.state.screen = Screen::Player,
            KeyCode::Char('3') => self.state.screen = Screen::Weights,
            KeyCode::Char('r') => self.request_refresh(false),
            KeyCode::Char('R') => self.request_refresh(true),
            KeyCode::Char('o') => self.export_leaderboard(),
            _ => match self.state.screen {
                Screen::Leaderboard => self.on_leaderboard_key(key),
                Screen::Player => self.on_player_key(key),
                Screen::Weights => self.on_weights_key(key),
            },
        }
    }

    fn on_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state.edit_buffer = None,
            KeyCode::Enter => self.commit_edit(),
            KeyCode::Backspace => {
                if let Some(buffer) = self.state.edit_buffer.as_mut() {
                    buffer.pop();
                }
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == '-' => {
                if let Some(buffer) = self.state.edit_buffer.as_mut() {
                    buffer.push(c);
                }
            }
            _ => {}
        }
    }

    fn on_leaderboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                let len = self.state.leaderboard().len();
                if len > 0 && self.state.leaderboard_selected + 1 < len {
                    self.state.leaderboard_selected += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.state.leaderboard_selected =
                    self.state.leaderboard_selected.saturating_sub(1);
            }
            KeyCode::Char('f') => self.state.cycle_position_filter(),
            KeyCode::Enter => {
                let board = self.state.leaderboard();
                if let Some(entry) = board.get(self.state.leaderboard_selected) {
                    let idx = self
                        .state
                        .players
                        .iter()
                        .position(|(id, _, _)| *id == entry.player_id);
                    if let Some(idx) = idx {
                        self.state.select_player(idx);
                        self.state.screen = Screen::Player;
                        self.player_pane = PlayerPane::Grid;
                    }
                }
            }
            _ => {}
        }
    }

    fn on_player_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab => {
                self.player_pane = match self.player_pane {
                    PlayerPane::Roster => PlayerPane::Grid,
                    PlayerPane::Grid => PlayerPane::Roster,
                };
            }
            KeyCode::Char('j') | KeyCode::Down => match self.player_pane {
                PlayerPane::Roster => {
                    let next = self.state.player_selected + 1;
                    if next < self.state.players.len() {
                        self.state.select_player(next);
                    }
                }
                PlayerPane::Grid => {
                    if self.state.editor.stat_row + 1 < STAT_COUNT {
                        self.state.editor.stat_row += 1;
                    }
                }
            },
            KeyCode::Char('k') | KeyCode::Up => match self.player_pane {
                PlayerPane::Roster => {
                    let prev = self.state.player_selected.saturating_sub(1);
                    self.state.select_player(prev);
                }
                PlayerPane::Grid => {
                    self.state.editor.stat_row = self.state.editor.stat_row.saturating_sub(1);
                }
            },
            KeyCode::Char('h') | KeyCode::Left => self.state.editor.column = 0,
            KeyCode::Char('l') | KeyCode::Right => self.state.editor.column = 1,
            KeyCode::Char('i') | KeyCode::Enter => {
                if self.player_pane == PlayerPane::Grid {
                    self.begin_edit();
                }
            }
            KeyCode::Char('s') => self.state.save_override(),
            KeyCode::Char('x') => self.state.clear_override(),
            KeyCode::Esc => self.state.screen = Screen::Leaderboard,
            _ => {}
        }
    }

    fn on_weights_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.state.weights_selected + 1 < STAT_COUNT {
                    self.state.weights_selected += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.state.weights_selected = self.state.weights_selected.saturating_sub(1);
            }
            KeyCode::Char('i') | KeyCode::Enter => self.begin_edit(),
            KeyCode::Char('d') => {
                self.state.weights.reset();
                self.state.push_log("[INFO] Scoring weights reset to defaults");
            }
            KeyCode::Esc => self.state.screen = Screen::Leaderboard,
            _ => {}
        }
    }

    fn begin_edit(&mut self) {
        match self.state.screen {
            Screen::Player => {
                let Some((id, _, _)) = self.state.selected_player().cloned() else {
                    return;
                };
                let stat = self.state.editor.selected_stat();
                let current = self.state.effective_stat(&id, stat);
                let text = match self.state.editor.selected_column() {
                    EditorColumn::Quantity => fmt_trim(current.quantity),
                    EditorColumn::Probability => fmt_trim(current.probability),
                };
                self.state.edit_buffer = Some(text);
            }
            Screen::Weights => {
                let stat = StatKind::ALL[self.state.weights_selected.min(STAT_COUNT - 1)];
                self.state.edit_buffer = Some(fmt_trim(self.state.weights.get(stat)));
            }
            Screen::Leaderboard => {}
        }
    }

    fn commit_edit(&mut self) {
        let Some(raw) = self.state.edit_buffer.take() else {
            return;
        };
        let Ok(value) = raw.trim().parse::<f64>() else {
            self.state.push_log(format!("[WARN] Not a number: {raw}"));
            return;
        };

        match self.state.screen {
            Screen::Player => {
                let Some((id, _, _)) = self.state.selected_player().cloned() else {
                    return;
                };
                let stat = self.state.editor.selected_stat();
                let mut current = self.state.effective_stat(&id, stat);
                match self.state.editor.selected_column() {
                    EditorColumn::Quantity => current.quantity = value.max(0.0),
                    EditorColumn::Probability => current.probability = value.clamp(0.0, 1.0),
                }
                self.state.editor.touched[stat.index()] = Some(current);
            }
            Screen::Weights => {
                let stat = StatKind::ALL[self.state.weights_selected.min(STAT_COUNT - 1)];
                self.state.weights.set(stat, value);
                self.state
                    .push_log(format!("[INFO] {} weight set to {}", stat.label(), value));
            }
            Screen::Leaderboard => {}
        }
    }

    fn request_refresh(&mut self, force: bool) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Refresh unavailable");
            return;
        };
        if tx.send(ProviderCommand::Refresh { force }).is_err() {
            self.state.push_log("[WARN] Refresh request failed");
        } else if force {
            self.state.push_log("[INFO] Forced refresh requested");
        } else {
            self.state.push_log("[INFO] Refresh requested");
        }
    }

    fn export_leaderboard(&mut self) {
        let board = self.state.leaderboard();
        if board.is_empty() {
            self.state.push_log("[INFO] Nothing to export");
            return;
        }
        let path = PathBuf::from("propboard_leaderboard.xlsx");
        match export::export_leaderboard(&path, &board, &self.state.salaries) {
            Ok(n) => self
                .state
                .push_log(format!("[INFO] Exported {n} rows to {}", path.display())),
            Err(err) => self.state.push_log(format!("[WARN] Export failed: {err}")),
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    feed::spawn_provider(tx, cmd_rx);

    let mut app = App::new(Some(cmd_tx));
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
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
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(7),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Leaderboard => render_leaderboard(frame, chunks[1], &app.state),
        Screen::Player => render_player(frame, chunks[1], app),
        Screen::Weights => render_weights(frame, chunks[1], &app.state),
    }

    render_console(frame, chunks[2], &app.state);

    let footer = Paragraph::new(footer_text(&app.state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let screen = match state.screen {
        Screen::Leaderboard => "LEADERBOARD",
        Screen::Player => "PLAYER BOARD",
        Screen::Weights => "SCORING WEIGHTS",
    };
    let status = if state.loading {
        "fetching...".to_string()
    } else {
        match state.rows_fetched_at {
            Some(ts) => {
                let source = if state.rows_from_cache { "cache" } else { "live" };
                format!("{} rows @ {} ({source})", state.rows.len(), format_fetched(ts))
            }
            None => "no data".to_string(),
        }
    };
    format!(
        "PROPBOARD | {screen} | Filter: {} | Top {}\n{status}",
        state.position_filter.label(),
        state.leaderboard_limit
    )
}

fn footer_text(state: &AppState) -> String {
    if state.edit_buffer.is_some() {
        return "Type value | Enter Commit | Esc Cancel | Backspace Delete".to_string();
    }
    match state.screen {
        Screen::Leaderboard => {
            "1/2/3 Screens | j/k Move | Enter Edit player | f Filter | r Refresh | R Force | o Export | ? Help | q Quit"
                .to_string()
        }
        Screen::Player => {
            "Tab Pane | j/k Move | h/l Column | i/Enter Edit | s Save override | x Clear | Esc Back | q Quit"
                .to_string()
        }
        Screen::Weights => {
            "j/k Move | i/Enter Edit | d Defaults | Esc Back | q Quit".to_string()
        }
    }
}

const BOARD_COLUMNS: [Constraint; 13] = [
    Constraint::Length(5),
    Constraint::Min(20),
    Constraint::Length(5),
    Constraint::Length(8),
    Constraint::Length(8),
    Constraint::Length(7),
    Constraint::Length(8),
    Constraint::Length(7),
    Constraint::Length(6),
    Constraint::Length(8),
    Constraint::Length(7),
    Constraint::Length(7),
    Constraint::Length(9),
];

fn render_leaderboard(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.rows.is_empty() {
        let message = if state.loading {
            "Fetching market data..."
        } else {
            "No market data available. Press r to fetch, R to force a fresh pull."
        };
        let empty = Paragraph::new(message).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let header_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(BOARD_COLUMNS)
        .split(sections[0]);
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let titles = [
        "#", "Player", "Pos", "Proj", "PassYd", "PaTD", "RushYd", "RuTD", "Rec", "RecYd",
        "ReTD", "AnyTD", "Salary",
    ];
    for (i, title) in titles.iter().enumerate() {
        render_cell_text(frame, header_cols[i], title, bold);
    }

    let board = state.leaderboard();
    let list_area = sections[1];
    if board.is_empty() {
        let empty = Paragraph::new("No players match the current filter")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }
    if list_area.height == 0 {
        return;
    }

    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.leaderboard_selected, board.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let selected = idx == state.leaderboard_selected;
        let row_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(BOARD_COLUMNS)
            .split(row_area);

        let p = &board[idx];
        let name = if state.overrides.contains_key(&p.player_id) {
            format!("{}*", p.player_name)
        } else {
            p.player_name.clone()
        };
        let pos = if p.position.is_empty() { "-" } else { &p.position };

        render_cell_text(frame, cols[0], &format!("{}", idx + 1), row_style);
        render_cell_text(frame, cols[1], &name, row_style);
        render_cell_text(frame, cols[2], pos, row_style);
        render_cell_text(frame, cols[3], &format!("{:.2}", p.total_points), row_style);
        for (offset, stat) in StatKind::ALL.iter().enumerate() {
            let quantity = p.stat(*stat).quantity;
            render_cell_text(frame, cols[4 + offset], &format!("{quantity:.1}"), row_style);
        }
        render_cell_text(frame, cols[12], &salary_cell(state, p), row_style);
    }
}

fn salary_cell(state: &AppState, p: &PlayerProjection) -> String {
    match state
        .salaries
        .get(&p.player_name.to_lowercase())
        .and_then(|i| i.salary)
    {
        Some(salary) => format!("${salary:.0}"),
        None => "-".to_string(),
    }
}

fn render_player(frame: &mut Frame, area: Rect, app: &App) {
    let state = &app.state;
    if state.players.is_empty() {
        let empty = Paragraph::new("No players loaded yet")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(40)])
        .split(area);

    render_roster(frame, panes[0], app);
    render_stat_grid(frame, panes[1], app);
}

fn render_roster(frame: &mut Frame, area: Rect, app: &App) {
    let state = &app.state;
    let focused = app.player_pane == PlayerPane::Roster;
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .title("Players")
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 {
        return;
    }
    let visible = inner.height as usize;
    let (start, end) = visible_range(state.player_selected, state.players.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: inner.x,
            y: inner.y + i as u16,
            width: inner.width,
            height: 1,
        };
        let selected = idx == state.player_selected;
        let style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        let (id, name, position) = &state.players[idx];
        let marker = if state.overrides.contains_key(id) { "*" } else { " " };
        let pos = if position.is_empty() { "--" } else { position };
        let text = format!("{marker}{name} ({pos})");
        let paragraph = Paragraph::new(text).style(style);
        frame.render_widget(paragraph, row_area);
    }
}

const GRID_COLUMNS: [Constraint; 4] = [
    Constraint::Length(18),
    Constraint::Length(12),
    Constraint::Length(12),
    Constraint::Min(8),
];

fn render_stat_grid(frame: &mut Frame, area: Rect, app: &App) {
    let state = &app.state;
    let Some((player_id, player_name, _)) = state.selected_player().cloned() else {
        return;
    };
    let focused = app.player_pane == PlayerPane::Grid;
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let has_override = state.overrides.contains_key(&player_id);
    let title = if has_override {
        format!("{player_name} [override saved]")
    } else {
        player_name.clone()
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(STAT_COUNT as u16),
            Constraint::Min(3),
        ])
        .split(inner);

    let header_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(GRID_COLUMNS)
        .split(sections[0]);
    let bold = Style::default().add_modifier(Modifier::BOLD);
    render_cell_text(frame, header_cols[0], "Stat", bold);
    render_cell_text(frame, header_cols[1], "Projection", bold);
    render_cell_text(frame, header_cols[2], "Prob", bold);
    render_cell_text(frame, header_cols[3], "Source", bold);

    for (row_idx, stat) in StatKind::ALL.iter().enumerate() {
        if row_idx as u16 >= sections[1].height {
            break;
        }
        let row_area = Rect {
            x: sections[1].x,
            y: sections[1].y + row_idx as u16,
            width: sections[1].width,
            height: 1,
        };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(GRID_COLUMNS)
            .split(row_area);

        let sp = state.effective_stat(&player_id, *stat);
        let row_selected = focused && state.editor.stat_row == row_idx;

        let label_style = if row_selected {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        render_cell_text(frame, cols[0], stat.label(), label_style);

        for (col_idx, value) in [sp.quantity, sp.probability].iter().enumerate() {
            let cell_selected = row_selected && state.editor.column == col_idx;
            let style = if cell_selected {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default()
            };
            let text = if cell_selected && state.edit_buffer.is_some() {
                format!("{}_", state.edit_buffer.as_deref().unwrap_or(""))
            } else if col_idx == 0 {
                format!("{value:.2}")
            } else {
                format!("{value:.3}")
            };
            render_cell_text(frame, cols[1 + col_idx], &text, style);
        }

        render_cell_text(
            frame,
            cols[3],
            stat_source(state, &player_id, *stat),
            Style::default().fg(Color::DarkGray),
        );
    }

    render_market_detail(frame, sections[2], state, &player_id);
}

fn stat_source(state: &AppState, player_id: &str, stat: StatKind) -> &'static str {
    if state.editor.touched[stat.index()].is_some() {
        return "edited";
    }
    if state
        .overrides
        .get(player_id)
        .is_some_and(|s| s.stats[stat.index()].is_some())
    {
        return "override";
    }
    "market"
}

fn render_market_detail(frame: &mut Frame, area: Rect, state: &AppState, player_id: &str) {
    let stat = state.editor.selected_stat();
    let rows = state.rows_for_player(player_id);

    let mut lines = Vec::new();
    if stat == StatKind::TotalTouchdowns {
        let (line, prob) = markets::resolve_total_touchdowns(&rows);
        lines.push(format!(
            "{}: resolved line {line:.2}, prob {prob:.3} (projection pinned to 0.5)",
            stat.label()
        ));
    } else {
        match markets::find_market(stat, &rows) {
            Some(row) => {
                lines.push(format!(
                    "{}: \"{}\" line {:.2}, avg prob {:.3}",
                    stat.label(),
                    row.market_label,
                    row.line,
                    row.avg_prob
                ));
                lines.push(format!("key: {}", row.market_key));
                let books: Vec<String> = row
                    .book_odds
                    .iter()
                    .map(|(book, odds)| format!("{book} {odds}"))
                    .collect();
                if !books.is_empty() {
                    lines.push(format!("books: {}", books.join("  ")));
                }
            }
            None => {
                lines.push(format!(
                    "{}: no market matched, defaults (0.0, 0.5)",
                    stat.label()
                ));
            }
        }
    }

    let paragraph = Paragraph::new(lines.join("\n"))
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(paragraph, area);
}

fn render_weights(frame: &mut Frame, area: Rect, state: &AppState) {
    let widths = [
        Constraint::Length(20),
        Constraint::Length(10),
        Constraint::Length(10),
    ];
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let header_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(sections[0]);
    let bold = Style::default().add_modifier(Modifier::BOLD);
    render_cell_text(frame, header_cols[0], "Stat", bold);
    render_cell_text(frame, header_cols[1], "Weight", bold);
    render_cell_text(frame, header_cols[2], "Default", bold);

    for (row_idx, stat) in StatKind::ALL.iter().enumerate() {
        if row_idx as u16 >= sections[1].height {
            break;
        }
        let row_area = Rect {
            x: sections[1].x,
            y: sections[1].y + row_idx as u16,
            width: sections[1].width,
            height: 1,
        };
        let selected = row_idx == state.weights_selected;
        let style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(style), row_area);
        }
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let weight_text = if selected && state.edit_buffer.is_some() {
            format!("{}_", state.edit_buffer.as_deref().unwrap_or(""))
        } else {
            fmt_trim(state.weights.get(*stat))
        };
        render_cell_text(frame, cols[0], stat.label(), style);
        render_cell_text(frame, cols[1], &weight_text, style);
        render_cell_text(frame, cols[2], &fmt_trim(stat.default_weight()), style);
    }
}

fn render_console(frame: &mut Frame, area: Rect, state: &AppState) {
    let lines: Vec<&str> = state
        .logs
        .iter()
        .take(area.height.saturating_sub(2) as usize)
        .map(|s| s.as_str())
        .collect();
    let console = Paragraph::new(lines.join("\n"))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Propboard - Help",
        "",
        "Global:",
        "  1            Leaderboard",
        "  2            Player board",
        "  3            Scoring weights",
        "  r            Refresh (cache-aware)",
        "  R            Force refresh (clears cache)",
        "  o            Export leaderboard to xlsx",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Leaderboard:",
        "  j/k or ↑/↓   Move",
        "  f            Cycle position filter",
        "  Enter        Open player board",
        "",
        "Player board:",
        "  Tab          Switch pane",
        "  h/l          Projection / probability column",
        "  i/Enter      Edit focused cell",
        "  s            Save override (upsert)",
        "  x            Clear override",
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

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let paragraph = Paragraph::new(text).style(style);
    frame.render_widget(paragraph, area);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 || visible == 0 {
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

fn format_fetched(ts: i64) -> String {
    match DateTime::from_timestamp(ts, 0) {
        Some(dt) => dt.format("%H:%M:%S UTC").to_string(),
        None => "-".to_string(),
    }
}

fn fmt_trim(value: f64) -> String {
    let text = format!("{value:.3}");
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
