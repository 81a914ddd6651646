pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};

use zendo::{
    analytics::{Analytics, AnalyticsStore, FileAnalyticsStore},
    history::HistoryDb,
    music::{MusicPlayer, STUDY_PLAYLISTS},
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    settings::{FileSettingsStore, Settings, SettingsPatch, SettingsState, SettingsStore},
    timer::{SessionType, Tick, Timer},
    todo::TodoList,
};

const TICK_RATE_MS: u64 = 1000;

/// zen pomodoro timer for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A zen pomodoro timer TUI with configurable focus and break durations, a scratch todo list, persisted focus analytics, and a study-music panel."
)]
pub struct Cli {
    /// focus session length in minutes (overrides the saved setting for this run)
    #[clap(short = 'f', long)]
    focus: Option<u32>,

    /// short break length in minutes
    #[clap(short = 'b', long)]
    short_break: Option<u32>,

    /// long break length in minutes
    #[clap(short = 'l', long)]
    long_break: Option<u32>,

    /// daily focus-session goal
    #[clap(short = 'g', long)]
    goal: Option<u32>,

    /// session type to start on
    #[clap(short = 's', long, value_enum, default_value_t = SessionType::Focus)]
    session: SessionType,
}

impl Cli {
    /// Run-only overrides; never written back to the settings file.
    fn overrides(&self) -> SettingsPatch {
        SettingsPatch {
            pomodoro_minutes: self.focus,
            short_break_minutes: self.short_break,
            long_break_minutes: self.long_break,
            daily_goal_sessions: self.goal,
        }
    }
}

/// Modal overlay drawn over the timer screen; at most one open at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Settings,
    Analytics,
    Todos,
    Music,
}

pub const SETTINGS_FIELDS: usize = 4;

/// min, max, slider step per settings row, in panel order
pub const FIELD_RANGES: [(u32, u32, u32); SETTINGS_FIELDS] =
    [(15, 60, 5), (3, 15, 1), (10, 30, 5), (1, 12, 1)];

/// Draft edited in the settings panel; applied to the store on save, thrown
/// away on escape.
#[derive(Debug)]
pub struct SettingsPanel {
    pub draft: Settings,
    pub selected: usize,
}

impl SettingsPanel {
    fn new(current: Settings) -> Self {
        Self {
            draft: current,
            selected: 0,
        }
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn select_next(&mut self) {
        if self.selected + 1 < SETTINGS_FIELDS {
            self.selected += 1;
        }
    }

    fn field_mut(&mut self) -> &mut u32 {
        match self.selected {
            0 => &mut self.draft.pomodoro_minutes,
            1 => &mut self.draft.short_break_minutes,
            2 => &mut self.draft.long_break_minutes,
            _ => &mut self.draft.daily_goal_sessions,
        }
    }

    /// Moves the selected value one slider step, clamped to its range.
    fn adjust(&mut self, delta: i32) {
        let (min, max, step) = FIELD_RANGES[self.selected];
        let value = self.field_mut();
        *value = if delta > 0 {
            value.saturating_add(step).min(max)
        } else {
            value.saturating_sub(step).max(min)
        };
    }
}

#[derive(Debug, Default)]
pub struct TodoPanel {
    pub input: String,
    pub selected: usize,
}

#[derive(Debug, Default)]
pub struct MusicPanel {
    pub selected: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub settings: SettingsState,
    pub analytics: Analytics,
    pub timer: Timer,
    pub todos: TodoList,
    pub music: MusicPlayer,
    pub history: Option<HistoryDb>,
    pub panel: Option<Panel>,
    pub settings_panel: SettingsPanel,
    pub todo_panel: TodoPanel,
    pub music_panel: MusicPanel,
}

impl App {
    pub fn new(
        cli: &Cli,
        settings_store: Box<dyn SettingsStore>,
        analytics_store: Box<dyn AnalyticsStore>,
        history: Option<HistoryDb>,
    ) -> Self {
        let mut settings = SettingsState::load(settings_store);
        settings.apply_transient(cli.overrides());

        let analytics = Analytics::load(analytics_store);
        let timer = Timer::with_session(settings.get(), cli.session);
        let settings_panel = SettingsPanel::new(*settings.get());

        Self {
            settings,
            analytics,
            timer,
            todos: TodoList::new(),
            music: MusicPlayer::new(),
            history,
            panel: None,
            settings_panel,
            todo_panel: TodoPanel::default(),
            music_panel: MusicPanel::default(),
        }
    }

    /// One elapsed second. A focus session that runs down naturally credits
    /// its configured duration, once.
    pub fn on_tick(&mut self) {
        if let Tick::Expired(SessionType::Focus) = self.timer.tick() {
            let minutes = self.settings.get().pomodoro_minutes;
            self.analytics.record_session(minutes);
            if let Some(history) = &self.history {
                // best effort; a failed write never interrupts the timer
                let _ = history.record(&SessionType::Focus.to_string(), minutes);
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        match self.panel {
            None => self.handle_main_key(key),
            Some(Panel::Settings) => {
                self.handle_settings_key(key);
                Flow::Continue
            }
            Some(Panel::Analytics) => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('a')) {
                    self.panel = None;
                }
                Flow::Continue
            }
            Some(Panel::Todos) => {
                self.handle_todo_key(key);
                Flow::Continue
            }
            Some(Panel::Music) => {
                self.handle_music_key(key);
                Flow::Continue
            }
        }
    }

    fn handle_main_key(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Char(' ') => self.timer.toggle(),
            KeyCode::Char('r') => self.timer.reset(self.settings.get()),
            KeyCode::Char('1') => {
                self.timer.switch_session(SessionType::Focus, self.settings.get());
            }
            KeyCode::Char('2') => {
                self.timer.switch_session(SessionType::ShortBreak, self.settings.get());
            }
            KeyCode::Char('3') => {
                self.timer.switch_session(SessionType::LongBreak, self.settings.get());
            }
            KeyCode::Char('s') => {
                self.settings_panel = SettingsPanel::new(*self.settings.get());
                self.panel = Some(Panel::Settings);
            }
            KeyCode::Char('a') => self.panel = Some(Panel::Analytics),
            KeyCode::Char('t') => self.panel = Some(Panel::Todos),
            KeyCode::Char('m') => self.panel = Some(Panel::Music),
            _ => {}
        }
        Flow::Continue
    }

    fn handle_settings_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.panel = None,
            KeyCode::Up | KeyCode::Char('k') => self.settings_panel.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.settings_panel.select_next(),
            KeyCode::Left | KeyCode::Char('h') => self.settings_panel.adjust(-1),
            KeyCode::Right | KeyCode::Char('l') => self.settings_panel.adjust(1),
            KeyCode::Enter => self.save_settings(),
            _ => {}
        }
    }

    fn save_settings(&mut self) {
        self.settings.update(self.settings_panel.draft.into());
        // a paused countdown picks the new duration up immediately
        self.timer.apply_settings(self.settings.get());
        self.panel = None;
    }

    fn handle_todo_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.panel = None,
            KeyCode::Enter => {
                if self.todos.add(&self.todo_panel.input).is_some() {
                    self.todo_panel.input.clear();
                }
            }
            KeyCode::Up => self.todo_panel.selected = self.todo_panel.selected.saturating_sub(1),
            KeyCode::Down => {
                if self.todo_panel.selected + 1 < self.todos.len() {
                    self.todo_panel.selected += 1;
                }
            }
            KeyCode::Tab => {
                let id = self.selected_todo_id();
                if let Some(id) = id {
                    self.todos.toggle(id);
                }
            }
            KeyCode::Delete => {
                let id = self.selected_todo_id();
                if let Some(id) = id {
                    self.todos.remove(id);
                    if self.todo_panel.selected >= self.todos.len() {
                        self.todo_panel.selected = self.todos.len().saturating_sub(1);
                    }
                }
            }
            KeyCode::Backspace => {
                self.todo_panel.input.pop();
            }
            KeyCode::Char(c) => self.todo_panel.input.push(c),
            _ => {}
        }
    }

    fn selected_todo_id(&self) -> Option<u64> {
        self.todos
            .items()
            .get(self.todo_panel.selected)
            .map(|item| item.id)
    }

    fn handle_music_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.panel = None,
            KeyCode::Char('c') if !self.music.is_connected() => self.music.connect(),
            KeyCode::Char(' ') => self.music.toggle_playback(),
            KeyCode::Up => self.music_panel.selected = self.music_panel.selected.saturating_sub(1),
            KeyCode::Down => {
                if self.music_panel.selected + 1 < STUDY_PLAYLISTS.len() {
                    self.music_panel.selected += 1;
                }
            }
            KeyCode::Enter => self.music.select_playlist(self.music_panel.selected),
            _ => {}
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(
        &cli,
        Box::new(FileSettingsStore::new()),
        Box::new(FileAnalyticsStore::new()),
        HistoryDb::new().ok(),
    );
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        match runner.step() {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => {}
            AppEvent::Key(key) => {
                if app.handle_key(key) == Flow::Quit {
                    break;
                }
            }
        }
    }

    Ok(())
}
