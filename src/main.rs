mod config;
mod game;
mod logging;
mod mission;
mod puzzle;
mod score;
mod storage;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::rngs::ThreadRng;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{error, info};
use tui_textarea::TextArea;

use game::{Game, GameEvent, MissionOutcome, Severity};
use mission::{Mission, PuzzleParams, Section};
use puzzle::{check_answer, Opponent, Verdict};
use score::ScoreLedger;
use storage::{AutoSave, Backend, ProgressStore};

const GAME_VERSION: &str = env!("CARGO_PKG_VERSION");
const TICK: Duration = Duration::from_millis(200);
const EXPORT_FILE: &str = "export.json";
const EDITOR_TITLE: &str = " Terminal [F5: Submit | F1: Hint | :q Quit] ";

enum Screen {
    Title,
    MissionSelect,
    Playing,
    Results,
}

enum MenuOption {
    NewGame,
    Continue,
    Quit,
}

impl MenuOption {
    fn next(&self) -> Self {
        match self {
            MenuOption::NewGame => MenuOption::Continue,
            MenuOption::Continue => MenuOption::Quit,
            MenuOption::Quit => MenuOption::NewGame,
        }
    }

    fn prev(&self) -> Self {
        match self {
            MenuOption::NewGame => MenuOption::Quit,
            MenuOption::Continue => MenuOption::NewGame,
            MenuOption::Quit => MenuOption::Continue,
        }
    }
}

struct App<'a> {
    game: Game<Backend>,
    autosave: AutoSave,
    data_dir: PathBuf,
    screen: Screen,
    menu_selection: MenuOption,
    select_index: usize,
    editor: TextArea<'a>,
    message: String,
    message_style: Style,
    message_scroll: u16,
    hints_shown: usize,
    opponent: Option<Opponent>,
    rng: ThreadRng,
    last_tick: Instant,
    last_outcome: Option<MissionOutcome>,
    command_mode: bool,
    command_buffer: String,
}

impl<'a> App<'a> {
    fn new(game: Game<Backend>, autosave: AutoSave, data_dir: PathBuf) -> Self {
        App {
            game,
            autosave,
            data_dir,
            screen: Screen::Title,
            menu_selection: MenuOption::NewGame,
            select_index: 0,
            editor: new_editor(),
            message: String::from("Pick a mission. The rival crew is already in the network..."),
            message_style: Style::default().fg(Color::Yellow),
            message_scroll: 0,
            hints_shown: 0,
            opponent: None,
            rng: rand::thread_rng(),
            last_tick: Instant::now(),
            last_outcome: None,
            command_mode: false,
            command_buffer: String::new(),
        }
    }

    /// Mission ids in display order: section by section, level by level.
    fn mission_list(&self) -> Vec<u32> {
        Section::ALL
            .iter()
            .flat_map(|s| self.game.catalog().in_section(*s))
            .map(|m| m.id)
            .collect()
    }

    fn selected_mission(&self) -> Option<&Mission> {
        let id = *self.mission_list().get(self.select_index)?;
        self.game.catalog().get(id)
    }

    fn set_message(&mut self, message: impl Into<String>, style: Style) {
        self.message = message.into();
        self.message_style = style;
        self.message_scroll = 0;
    }

    /// Applies everything the controller signalled since the last call.
    fn pump_events(&mut self) {
        for event in self.game.drain_events() {
            match event {
                GameEvent::Notify { severity, message } => {
                    self.set_message(message, severity_style(severity));
                }
                GameEvent::MissionStarted { mission_id } => self.load_mission(mission_id),
                GameEvent::MissionResults(outcome) => {
                    if let Some(opponent) = self.opponent.as_mut() {
                        opponent.stop();
                    }
                    self.last_outcome = Some(outcome);
                    self.screen = Screen::Results;
                }
            }
        }
    }

    fn load_mission(&mut self, id: u32) {
        let Some(mission) = self.game.catalog().get(id) else {
            return;
        };
        self.opponent = Some(Opponent::new(
            mission.target_time,
            mission.ai_speed_multiplier,
        ));
        if let Some(pos) = self.mission_list().iter().position(|m| *m == id) {
            self.select_index = pos;
        }
        self.editor = new_editor();
        self.hints_shown = 0;
        self.screen = Screen::Playing;
        self.set_message(
            "Read the briefing, type your answer and press F5.",
            Style::default().fg(Color::Yellow),
        );
    }

    fn start_selected(&mut self) {
        if let Some(id) = self.selected_mission().map(|m| m.id) {
            self.game.start_mission(id);
            self.pump_events();
        }
    }

    fn submit_answer(&mut self) {
        let Some(mission) = self.game.active_mission() else {
            return;
        };
        let target_time = mission.target_time;
        let answer = self.editor.lines().join("\n");

        match check_answer(&mission.params, &answer) {
            Verdict::Solved => {
                let bonus = self.game.ledger().config().solve_bonus;
                self.game.ledger_mut().record_attempt();
                self.game.ledger_mut().add_points(bonus);
                let stats = self.game.ledger().stats(target_time);
                self.set_message(
                    "*** ACCESS GRANTED ***  [ Press ENTER ]",
                    Style::default().fg(Color::Green),
                );
                self.game.complete_mission(true, &stats);
            }
            Verdict::Wrong { detail } => {
                self.game.ledger_mut().record_attempt();
                let penalty = self.game.ledger().config().attempt_penalty;
                self.set_message(
                    format!("{detail}\n\n-{penalty} points. Try again."),
                    Style::default().fg(Color::Red),
                );
            }
            Verdict::Malformed { reason } => {
                self.set_message(reason, Style::default().fg(Color::Magenta));
            }
        }
        self.pump_events();
    }

    fn show_hint(&mut self) {
        if !self.game.settings().show_hints {
            self.set_message(
                "Hints are disabled. Use :hints to turn them back on.",
                Style::default().fg(Color::DarkGray),
            );
            return;
        }
        let Some(mission) = self.game.active_mission() else {
            return;
        };
        match mission.hints.get(self.hints_shown).cloned() {
            Some(hint) => {
                self.game.ledger_mut().record_hint();
                self.hints_shown += 1;
                self.set_message(format!("HINT: {hint}"), Style::default().fg(Color::Cyan));
            }
            None => self.set_message(
                "No more hints available. You're on your own...",
                Style::default().fg(Color::DarkGray),
            ),
        }
    }

    fn abort_mission(&mut self, reason: &str) {
        let Some(target_time) = self.game.active_mission().map(|m| m.target_time) else {
            return;
        };
        let stats = self.game.ledger().stats(target_time);
        self.set_message(reason.to_string(), Style::default().fg(Color::Red));
        self.game.complete_mission(false, &stats);
        self.pump_events();
    }

    fn tick(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_tick);
        self.last_tick = now;

        if matches!(self.screen, Screen::Playing) {
            let rival_won = match self.opponent.as_mut() {
                Some(opponent) => opponent.advance(dt, &mut self.rng),
                None => false,
            };
            if rival_won {
                self.abort_mission("The rival crew got there first. Mission failed.");
            }
        }

        self.autosave.tick(now, &mut self.game);
        self.pump_events();
    }

    fn export_save(&mut self) {
        let path = self.data_dir.join(EXPORT_FILE);
        let result = self
            .game
            .export_save()
            .map(|json| std::fs::write(&path, json));
        match result {
            Some(Ok(())) => self.set_message(
                format!("Save exported to {}", path.display()),
                Style::default().fg(Color::Green),
            ),
            Some(Err(e)) => {
                error!(error = %e, path = %path.display(), "export failed");
                self.set_message(format!("Export failed: {e}"), Style::default().fg(Color::Red));
            }
            None => self.set_message("Nothing to export.", Style::default().fg(Color::Red)),
        }
    }

    fn import_save(&mut self) {
        let path = self.data_dir.join(EXPORT_FILE);
        match std::fs::read_to_string(&path) {
            Ok(json) => {
                if self.game.import_save(&json) {
                    self.set_message(
                        format!("Save imported from {}", path.display()),
                        Style::default().fg(Color::Green),
                    );
                }
                self.pump_events();
            }
            Err(e) => self.set_message(
                format!("Cannot read {}: {e}", path.display()),
                Style::default().fg(Color::Red),
            ),
        }
    }

    fn toggle_setting(&mut self, name: &str) {
        let mut settings = self.game.settings().clone();
        let value = match name {
            "sound" => {
                settings.sound_enabled = !settings.sound_enabled;
                settings.sound_enabled
            }
            "hints" => {
                settings.show_hints = !settings.show_hints;
                settings.show_hints
            }
            _ => {
                settings.auto_save = !settings.auto_save;
                settings.auto_save
            }
        };
        self.game.update_settings(settings);
        self.set_message(
            format!("{name}: {}", if value { "on" } else { "off" }),
            Style::default().fg(Color::Cyan),
        );
    }

    /// Runs a `:` command. Returns `true` when the player asked to quit.
    fn run_command(&mut self) -> bool {
        let command = std::mem::take(&mut self.command_buffer);
        self.command_mode = false;
        match command.as_str() {
            "q" | "quit" => return true,
            "w" => {
                if self.game.save_progress() {
                    self.set_message("Progress saved.", Style::default().fg(Color::Green));
                }
                self.pump_events();
            }
            "hint" => self.show_hint(),
            "abort" => self.abort_mission("Mission aborted."),
            "export" => self.export_save(),
            "import" => self.import_save(),
            "wipe" => {
                if self.game.wipe_saved_data() {
                    self.set_message(
                        "Saved progress, stats and settings deleted.",
                        Style::default().fg(Color::Yellow),
                    );
                }
                self.screen = Screen::MissionSelect;
                self.select_index = 0;
                self.pump_events();
            }
            "reset" => {
                self.game.reset_progress();
                self.screen = Screen::MissionSelect;
                self.select_index = 0;
                self.set_message("All progress erased.", Style::default().fg(Color::Yellow));
            }
            "sound" | "hints" | "autosave" => self.toggle_setting(&command),
            "help" => self.set_message(
                "Commands: :q (quit), :w (save), :hint, :abort, :export, :import, :reset, \
                 :wipe, :sound, :hints, :autosave",
                Style::default().fg(Color::Cyan),
            ),
            "" => {}
            other => self.set_message(
                format!("Unknown command: {other}"),
                Style::default().fg(Color::Red),
            ),
        }
        false
    }

    /// Returns `true` when the game should exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.screen {
            Screen::Title => {
                match key.code {
                    KeyCode::Down | KeyCode::Char('j') => {
                        self.menu_selection = self.menu_selection.next();
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        self.menu_selection = self.menu_selection.prev();
                    }
                    KeyCode::Enter => match self.menu_selection {
                        MenuOption::NewGame => {
                            self.game.start_new_game();
                            self.pump_events();
                        }
                        MenuOption::Continue => self.screen = Screen::MissionSelect,
                        MenuOption::Quit => return true,
                    },
                    KeyCode::Char('q') => return true,
                    _ => {}
                }
                return false;
            }
            Screen::Results => {
                if key.code == KeyCode::Enter {
                    self.screen = Screen::MissionSelect;
                }
                return false;
            }
            Screen::MissionSelect | Screen::Playing => {}
        }

        // Command mode handling (vim-style :q)
        if self.command_mode {
            match key.code {
                KeyCode::Esc => {
                    self.command_mode = false;
                    self.command_buffer.clear();
                }
                KeyCode::Enter => return self.run_command(),
                KeyCode::Backspace => {
                    self.command_buffer.pop();
                    if self.command_buffer.is_empty() {
                        self.command_mode = false;
                    }
                }
                KeyCode::Char(c) => self.command_buffer.push(c),
                _ => {}
            }
            return false;
        }

        if key.code == KeyCode::Char(':') && key.modifiers == KeyModifiers::NONE {
            self.command_mode = true;
            self.command_buffer.clear();
            return false;
        }

        if matches!(self.screen, Screen::MissionSelect) {
            let count = self.mission_list().len();
            match key.code {
                KeyCode::Down | KeyCode::Char('j') if count > 0 => {
                    self.select_index = (self.select_index + 1) % count;
                }
                KeyCode::Up | KeyCode::Char('k') if count > 0 => {
                    self.select_index = (self.select_index + count - 1) % count;
                }
                KeyCode::Enter => self.start_selected(),
                KeyCode::Esc => self.screen = Screen::Title,
                _ => {}
            }
            return false;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => {
                self.set_message(
                    "Type :abort to leave the mission, :q to quit",
                    Style::default().fg(Color::DarkGray),
                );
            }
            (KeyCode::PageDown, _) => {
                let lines = self.message.lines().count() as u16;
                if self.message_scroll < lines.saturating_sub(5) {
                    self.message_scroll += 3;
                }
            }
            (KeyCode::PageUp, _) => {
                self.message_scroll = self.message_scroll.saturating_sub(3);
            }
            (KeyCode::F(5), _) | (KeyCode::Char('r'), KeyModifiers::CONTROL) => {
                self.submit_answer();
            }
            (KeyCode::F(1), _) => self.show_hint(),
            _ => {
                self.editor.input(key);
            }
        }
        false
    }
}

fn new_editor<'a>() -> TextArea<'a> {
    let mut editor = TextArea::default();
    editor.set_block(Block::default().borders(Borders::ALL).title(EDITOR_TITLE));
    editor.set_line_number_style(Style::default().fg(Color::DarkGray));
    editor.set_placeholder_text("> answer");
    editor
}

fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Info => Style::default().fg(Color::Cyan),
        Severity::Success => Style::default().fg(Color::Green),
        Severity::Warning => Style::default().fg(Color::Yellow),
        Severity::Error => Style::default().fg(Color::Red),
    }
}

fn main() -> Result<()> {
    let config = config::resolve_config()?;
    if let Err(e) = logging::init(&config.storage.data_dir) {
        eprintln!("cyber-ops: logging disabled: {e:#}");
    }
    info!(version = GAME_VERSION, "cyber-ops starting");

    let catalog = match &config.catalog {
        Some(path) => mission::load_catalog(path)?,
        None => mission::builtin_catalog()?,
    };
    let backend = Backend::open_or_memory(&config.storage.data_dir);
    let persistent = backend.is_persistent();
    let store = ProgressStore::new(backend, config.storage.key_prefix.clone(), GAME_VERSION)
        .with_migrations(game::save_migrations());
    let mut game = Game::new(catalog, ScoreLedger::new(config.scoring.clone()), store);
    game.load_settings();
    game.load_progress();

    let autosave = AutoSave::new(&config.autosave, Instant::now());
    let mut app = App::new(game, autosave, config.storage.data_dir.clone());
    if app.game.has_saved_progress() {
        app.menu_selection = MenuOption::Continue;
    }
    if !persistent {
        app.set_message(
            format!(
                "Cannot write to {}. Progress will be lost when you quit.",
                config.storage.data_dir.display()
            ),
            Style::default().fg(Color::Red),
        );
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        terminal.draw(|f| draw_ui(f, &app))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key) {
                    break;
                }
            }
        }
        app.tick();
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    app.game.save_progress();
    let stats = app.game.player_stats();
    println!(
        "\nSession over. {} missions completed, {} XP, {} credits.\n",
        stats.missions_completed, stats.total_xp, stats.credits
    );
    info!("cyber-ops exiting");

    Ok(())
}

fn draw_ui(f: &mut Frame, app: &App) {
    match app.screen {
        Screen::Title => draw_title_screen(f, app),
        Screen::MissionSelect => draw_mission_select(f, app),
        Screen::Playing => draw_playing(f, app),
        Screen::Results => draw_results(f, app),
    }
}

fn status_line(app: &App) -> Line<'static> {
    let stats = app.game.player_stats();
    let mut spans = vec![
        Span::styled(
            " CYBER OPS ",
            Style::default().fg(Color::Black).bg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" XP: {} ", stats.total_xp),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" Credits: {} ", stats.credits),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("  "),
        Span::styled(
            format!(
                " Cleared: {}/{} ",
                app.game.catalog().completion_count(),
                app.game.catalog().missions().len()
            ),
            Style::default().fg(Color::Magenta),
        ),
    ];

    if let (Screen::Playing, Some(mission)) = (&app.screen, app.game.active_mission()) {
        let ledger = app.game.ledger();
        let rival = app.opponent.as_ref().map(|o| o.progress()).unwrap_or(0.0);
        spans.extend([
            Span::raw("  "),
            Span::styled(
                format!(" {} ", mission.title),
                Style::default().fg(Color::White).bg(Color::DarkGray),
            ),
            Span::raw("  "),
            Span::styled(
                format!(" Score: {:.0} ", ledger.score()),
                Style::default().fg(Color::Green),
            ),
            Span::raw("  "),
            Span::raw(format!(
                " Tries: {}  Hints: {}  Time: {}s/{}s  Bonus: +{} ",
                ledger.attempts(),
                ledger.hints_used(),
                ledger.time_elapsed(),
                mission.target_time,
                ledger.calculate_time_bonus(mission.target_time)
            )),
            Span::raw("  "),
            Span::styled(
                format!(" Rival: {:.0}% ", rival),
                Style::default().fg(if rival < 50.0 {
                    Color::Green
                } else if rival < 80.0 {
                    Color::Yellow
                } else {
                    Color::Red
                }),
            ),
        ]);
    }
    Line::from(spans)
}

fn briefing(mission: &Mission) -> String {
    let mut text = format!(
        "{}\n\nDifficulty: {}   Type: {}\n\n",
        mission.description, mission.difficulty, mission.mission_type
    );
    match &mission.params {
        PuzzleParams::Password { solution, charset } => {
            text.push_str(&format!(
                "Target password: {} characters",
                solution.chars().count()
            ));
            if let Some(charset) = charset {
                text.push_str(&format!(" ({charset})"));
            }
            text.push_str("\n\nAnswer: the password.");
        }
        PuzzleParams::Firewall { ports } => {
            text.push_str(&format!(
                "Knock sequence length: {}\n\nAnswer: ports in order, e.g. 22, 80",
                ports.len()
            ));
        }
        PuzzleParams::Network { nodes, .. } => {
            text.push_str(&format!(
                "Nodes: {}\n\nAnswer: the route, e.g. A -> B -> C",
                nodes.join("  ")
            ));
        }
        PuzzleParams::Malware { samples, .. } => {
            for (i, sample) in samples.iter().enumerate() {
                text.push_str(&format!("  {}. {}\n", i + 1, sample));
            }
            text.push_str("\nAnswer: the infected sample (name or number).");
        }
        PuzzleParams::Phishing { messages, .. } => {
            for (i, message) in messages.iter().enumerate() {
                text.push_str(&format!("  {}. {}\n", i + 1, message));
            }
            text.push_str("\nAnswer: numbers of every phishing message, e.g. 1, 3");
        }
    }
    text
}

fn draw_message(f: &mut Frame, app: &App, area: Rect) {
    let content = if app.command_mode {
        format!(":{}", app.command_buffer)
    } else {
        app.message.clone()
    };
    let (style, title) = if app.command_mode {
        (Style::default().fg(Color::White).bg(Color::DarkGray), " Command ")
    } else {
        (app.message_style, " Comms ")
    };
    let title = if app.message.lines().count() > 8 {
        format!("{title} [PgUp/PgDn to scroll]")
    } else {
        title.to_string()
    };
    let message = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false })
        .style(style)
        .scroll((app.message_scroll, 0));
    f.render_widget(message, area);
}

fn draw_playing(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(8),
        ])
        .split(f.area());

    let status = Paragraph::new(status_line(app)).block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(status, chunks[0]);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    let text = app
        .game
        .active_mission()
        .map(briefing)
        .unwrap_or_default();
    let brief = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" Briefing "))
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::White));
    f.render_widget(brief, main_chunks[0]);
    f.render_widget(&app.editor, main_chunks[1]);

    draw_message(f, app, chunks[2]);
}

fn draw_mission_select(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(6),
        ])
        .split(f.area());

    let status = Paragraph::new(status_line(app)).block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(status, chunks[0]);

    let mut lines = Vec::new();
    let mut index = 0;
    for section in Section::ALL {
        lines.push(Line::from(Span::styled(
            format!("── {section} ──"),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        for mission in app.game.catalog().in_section(section) {
            let marker = if mission.completed {
                "[DONE]"
            } else if mission.locked {
                "[LOCK]"
            } else {
                "[OPEN]"
            };
            let text = format!(
                " {marker} L{} {:<22} {:<7} best {:>4}",
                mission.level, mission.title, mission.difficulty, mission.best_score
            );
            let style = if index == app.select_index {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else if mission.locked {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };
            lines.push(Line::from(Span::styled(text, style)));
            index += 1;
        }
        lines.push(Line::raw(""));
    }

    let list = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Missions [↑/↓ select | ENTER start | ESC back | :help] "),
    );
    f.render_widget(list, chunks[1]);

    draw_message(f, app, chunks[2]);
}

fn draw_results(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(14), Constraint::Length(6)])
        .split(f.area());

    let body = match &app.last_outcome {
        Some(outcome) => {
            let title = app
                .game
                .catalog()
                .get(outcome.mission_id)
                .map(|m| m.title.as_str())
                .unwrap_or("?");
            let catalog = app.game.catalog();
            let unlocked = match outcome.unlocked.and_then(|id| catalog.get(id)) {
                Some(next) => format!("\nUnlocked: {}", next.title),
                None if outcome.success => catalog
                    .get(outcome.mission_id)
                    .and_then(|m| catalog.next_in_section(m))
                    .map(|next| format!("\nNext up: {}", next.title))
                    .unwrap_or_default(),
                None => String::new(),
            };
            format!(
                "=== {} {} ===\n\n\
                ╔══════════════════════════╗\n\
                ║  MISSION REPORT          ║\n\
                ╠══════════════════════════╣\n\
                ║  Final score:     {:>5}  ║\n\
                ║  Rank:    {:>2} {:>10}  ║\n\
                ║  Attempts:        {:>5}  ║\n\
                ║  Hints used:      {:>5}  ║\n\
                ║  Time (s):        {:>5}  ║\n\
                ║  XP earned:       {:>5}  ║\n\
                ║  Credits earned:  {:>5}  ║\n\
                ╚══════════════════════════╝{}{}\n\n\
                Press ENTER to continue...",
                title,
                if outcome.success { "COMPLETE" } else { "FAILED" },
                outcome.final_score,
                outcome.rank.grade(),
                outcome.rank.title(),
                outcome.stats.attempts,
                outcome.stats.hints_used,
                outcome.stats.time,
                outcome.xp,
                outcome.credits,
                if outcome.new_best { "\nNEW BEST SCORE!" } else { "" },
                unlocked,
            )
        }
        None => String::from("No mission played yet."),
    };

    let (style, title) = match &app.last_outcome {
        Some(o) if o.success => (Style::default().fg(Color::Green), " MISSION COMPLETE "),
        _ => (Style::default().fg(Color::Red), " MISSION FAILED "),
    };
    let report = Paragraph::new(body)
        .block(Block::default().borders(Borders::ALL).title(title))
        .alignment(Alignment::Center)
        .style(style);
    f.render_widget(report, chunks[0]);

    draw_message(f, app, chunks[1]);
}

fn draw_title_screen(f: &mut Frame, app: &App) {
    let area = f.area();

    let title_art = r#"
    ╔═══════════════════════════════════════════════════════════╗
    ║                                                           ║
    ║        ██████╗██╗   ██╗██████╗ ███████╗██████╗            ║
    ║       ██╔════╝╚██╗ ██╔╝██╔══██╗██╔════╝██╔══██╗           ║
    ║       ██║      ╚████╔╝ ██████╔╝█████╗  ██████╔╝           ║
    ║       ██║       ╚██╔╝  ██╔══██╗██╔══╝  ██╔══██╗           ║
    ║       ╚██████╗   ██║   ██████╔╝███████╗██║  ██║           ║
    ║        ╚═════╝   ╚═╝   ╚═════╝ ╚══════╝╚═╝  ╚═╝           ║
    ║                                                           ║
    ║                  ██████╗ ██████╗ ███████╗                 ║
    ║                 ██╔═══██╗██╔══██╗██╔════╝                 ║
    ║                 ██║   ██║██████╔╝███████╗                 ║
    ║                 ██║   ██║██╔═══╝ ╚════██║                 ║
    ║                 ╚██████╔╝██║     ███████║                 ║
    ║                  ╚═════╝ ╚═╝     ╚══════╝                 ║
    ║                                                           ║
    ║             "Outhack the rival crew"                      ║
    ║                                                           ║
    ╚═══════════════════════════════════════════════════════════╝
"#;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(22),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(1),
        ])
        .split(area);

    let title = Paragraph::new(title_art)
        .style(Style::default().fg(Color::Green))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let options = [
        (MenuOption::NewGame, "  NEW GAME  "),
        (MenuOption::Continue, "  CONTINUE  "),
        (MenuOption::Quit, "  QUIT  "),
    ];
    for (i, (option, label)) in options.iter().enumerate() {
        let selected = std::mem::discriminant(option) == std::mem::discriminant(&app.menu_selection);
        let style = if selected {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let item = Paragraph::new(*label)
            .style(style)
            .alignment(Alignment::Center);
        f.render_widget(item, chunks[i + 1]);
    }

    let help = Paragraph::new("↑/↓ to select  •  ENTER to confirm  •  q to quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[4]);
}
