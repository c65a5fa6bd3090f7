mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wordmix::{
    app_dirs::AppDirs,
    config::{parse_names, parse_phrases, ConfigEdit, ConfigStore, FileConfigStore, SessionRecord, SettingsForm},
    countdown::{CountdownEvent, WallClockTicks},
    error::{ConfigurationError, GameError},
    order::Outcome,
    runtime::{command_for, Command, CrosstermEventSource, GameEvent, Runner, UI_TICK},
    session::Session,
    Advance, Game, Phase, RevealPolicy, RoundError,
};

use crate::ui::screen::current_screen;

/// scrambled-sentence party game: race the countdown, rebuild the phrase, keep score
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Deal scrambled sentences to a room of players. When the countdown runs out, reveal the phrase, hand out points and move on until every phrase has been played."
)]
pub struct Cli {
    /// session file to use instead of the platform config dir
    #[clap(long)]
    config: Option<PathBuf>,

    /// seconds per round
    #[clap(short = 'd', long, value_parser = clap::value_parser!(u32).range(1..))]
    duration: Option<u32>,

    /// import phrases from a file, one per line
    #[clap(long)]
    phrases_file: Option<PathBuf>,

    /// comma-separated player names
    #[clap(long)]
    names: Option<String>,

    /// allow revealing before the countdown runs out
    #[clap(long)]
    reveal_anytime: bool,

    /// let players rearrange the words and check their order
    #[clap(long)]
    arrange: bool,

    /// seed for a reproducible deal
    #[clap(long)]
    seed: Option<u64>,

    /// start with every score at zero
    #[clap(long)]
    reset_scores: bool,
}

impl Cli {
    fn reveal_policy(&self) -> RevealPolicy {
        if self.reveal_anytime {
            RevealPolicy::Immediate
        } else {
            RevealPolicy::AfterExpiry
        }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Fold command-line settings into the stored record. Returns true if
    /// anything changed.
    fn apply_overrides(&self, record: &mut SessionRecord) -> Result<bool, Box<dyn Error>> {
        let mut changed = false;
        if let Some(path) = &self.phrases_file {
            let phrases = parse_phrases(&fs::read_to_string(path)?);
            if phrases.is_empty() {
                return Err(ConfigurationError::NoPhrases.into());
            }
            record.phrases = phrases;
            changed = true;
        }
        if let Some(names) = &self.names {
            record.names = parse_names(names);
            changed = true;
        }
        if let Some(duration) = self.duration {
            record.duration = duration;
            changed = true;
        }
        if self.reset_scores {
            record.scores.clear();
            changed = true;
        }
        Ok(changed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Playing,
    Settings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub is_error: bool,
}

impl Status {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    Phrases,
    Translations,
    Names,
    Duration,
}

impl SettingsField {
    const ALL: [SettingsField; 4] = [
        SettingsField::Phrases,
        SettingsField::Translations,
        SettingsField::Names,
        SettingsField::Duration,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SettingsField::Phrases => "Phrases (one per line)",
            SettingsField::Translations => "Translations (one per line, optional)",
            SettingsField::Names => "Players (comma-separated)",
            SettingsField::Duration => "Seconds per round",
        }
    }

    fn is_multiline(self) -> bool {
        matches!(self, SettingsField::Phrases | SettingsField::Translations)
    }

    fn offset(self, step: isize) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0) as isize;
        let len = Self::ALL.len() as isize;
        Self::ALL[(idx + step).rem_euclid(len) as usize]
    }
}

/// Text being edited in the settings screen.
#[derive(Debug, Clone)]
pub struct SettingsEditor {
    pub form: SettingsForm,
    pub focus: SettingsField,
}

impl SettingsEditor {
    fn from_record(record: &SessionRecord) -> Self {
        Self {
            form: SettingsForm::from_record(record),
            focus: SettingsField::Phrases,
        }
    }

    pub fn field(&self, field: SettingsField) -> &str {
        match field {
            SettingsField::Phrases => &self.form.phrases,
            SettingsField::Translations => &self.form.translations,
            SettingsField::Names => &self.form.names,
            SettingsField::Duration => &self.form.duration,
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            SettingsField::Phrases => &mut self.form.phrases,
            SettingsField::Translations => &mut self.form.translations,
            SettingsField::Names => &mut self.form.names,
            SettingsField::Duration => &mut self.form.duration,
        }
    }

    fn insert(&mut self, c: char) {
        if self.focus == SettingsField::Duration && !c.is_ascii_digit() && c != '-' {
            return;
        }
        self.focused_mut().push(c);
    }

    fn backspace(&mut self) {
        self.focused_mut().pop();
    }

    fn enter(&mut self) {
        if self.focus.is_multiline() {
            self.focused_mut().push('\n');
        } else {
            self.focus = self.focus.offset(1);
        }
    }
}

pub struct App<S: ConfigStore> {
    pub game: Game<S, StdRng, WallClockTicks>,
    pub state: AppState,
    pub arrange: bool,
    pub selected: usize,
    pub cursor: usize,
    pub status: Option<Status>,
    pub settings: SettingsEditor,
}

impl<S: ConfigStore> App<S> {
    pub fn new(game: Game<S, StdRng, WallClockTicks>, arrange: bool) -> Self {
        let settings = SettingsEditor::from_record(&game.session().to_record());
        Self {
            game,
            state: AppState::Playing,
            arrange,
            selected: 0,
            cursor: 0,
            status: None,
            settings,
        }
    }

    pub fn on_tick(&mut self) {
        if self.game.poll() == Some(CountdownEvent::Expired) {
            self.status = Some(Status::info("Time's up! Press space to reveal."));
        }
    }

    /// Returns false when the app should quit.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        match self.state {
            AppState::Playing => match command_for(key) {
                Some(command) => self.apply(command),
                None => true,
            },
            AppState::Settings => {
                self.on_settings_key(key);
                true
            }
        }
    }

    pub fn selected_player(&self) -> Option<&str> {
        self.game.session().ledger.players().nth(self.selected)
    }

    fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Quit => return false,
            Command::Advance => match self.game.machine().phase() {
                Phase::Scrambled => self.reveal(),
                Phase::Revealed => self.next(),
                Phase::Idle | Phase::Ended => self.restart(),
            },
            Command::Reveal => self.reveal(),
            Command::Next => self.next(),
            Command::SelectPrevious => self.selected = self.selected.saturating_sub(1),
            Command::SelectNext => {
                let players = self.game.session().ledger.len();
                if self.selected + 1 < players {
                    self.selected += 1;
                }
            }
            Command::Increment => self.adjust_selected(|game, name| game.apply_increment(name).map(|_| ())),
            Command::Decrement => self.adjust_selected(|game, name| game.apply_decrement(name).map(|_| ())),
            Command::ResetSelected => self.adjust_selected(|game, name| game.reset_score(name)),
            Command::ResetAll => {
                let result = self.game.reset_scores();
                if self.report(result).is_some() {
                    self.status = Some(Status::info("Scores reset."));
                }
            }
            Command::OpenSettings => {
                self.settings = SettingsEditor::from_record(&self.game.session().to_record());
                self.state = AppState::Settings;
                self.status = None;
            }
            Command::CursorLeft if self.arrange => self.cursor = self.cursor.saturating_sub(1),
            Command::CursorRight if self.arrange => {
                if self.cursor + 1 < self.token_count() {
                    self.cursor += 1;
                }
            }
            Command::MoveTokenLeft if self.arrange && self.cursor > 0 => {
                let to = self.cursor - 1;
                let result = self.game.move_token(self.cursor, to);
                if self.report(result).is_some() {
                    self.cursor = to;
                }
            }
            Command::MoveTokenRight if self.arrange && self.cursor + 1 < self.token_count() => {
                let to = self.cursor + 1;
                let result = self.game.move_token(self.cursor, to);
                if self.report(result).is_some() {
                    self.cursor = to;
                }
            }
            Command::CheckArrangement if self.arrange => {
                let result = self.game.check_arrangement();
                if let Some(outcome) = self.report(result) {
                    self.status = Some(match outcome {
                        Outcome::Correct => Status::info("Correct!"),
                        Outcome::Incorrect => Status::error("Not quite, keep going."),
                    });
                }
            }
            _ => {}
        }
        true
    }

    fn reveal(&mut self) {
        match self.game.reveal() {
            Ok(()) => self.status = None,
            Err(GameError::Round(RoundError::RevealLocked)) => {
                self.status = Some(Status::info("Wait for the countdown to finish."));
            }
            Err(e) => self.status = Some(Status::error(e.to_string())),
        }
    }

    fn next(&mut self) {
        let result = self.game.next();
        if let Some(advance) = self.report(result) {
            self.cursor = 0;
            self.status = match advance {
                Advance::Started { .. } => None,
                Advance::Ended(_) => Some(Status::info("Game over! Press enter to play again.")),
            };
        }
    }

    fn restart(&mut self) {
        let result = self.game.restart();
        if self.report(result).is_some() {
            self.cursor = 0;
            self.status = None;
        }
    }

    fn adjust_selected<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Game<S, StdRng, WallClockTicks>, &str) -> Result<(), GameError>,
    {
        let Some(name) = self.selected_player().map(str::to_string) else {
            self.status = Some(Status::info("Add players in settings (s) to keep score."));
            return;
        };
        let result = f(&mut self.game, &name);
        self.report(result);
    }

    fn on_settings_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('s') if ctrl => self.save_settings(),
            KeyCode::Char('c') if ctrl => self.state = AppState::Playing,
            KeyCode::Esc => {
                self.state = AppState::Playing;
                self.status = None;
            }
            KeyCode::Tab => self.settings.focus = self.settings.focus.offset(1),
            KeyCode::BackTab => self.settings.focus = self.settings.focus.offset(-1),
            KeyCode::Enter => self.settings.enter(),
            KeyCode::Backspace => self.settings.backspace(),
            KeyCode::Char(c) => self.settings.insert(c),
            _ => {}
        }
    }

    fn save_settings(&mut self) {
        let result = ConfigEdit::parse(&self.settings.form)
            .map_err(GameError::from)
            .and_then(|edit| self.game.save_configuration(edit));
        if self.report(result).is_some() {
            self.state = AppState::Playing;
            self.selected = 0;
            self.cursor = 0;
            self.status = Some(Status::info("Settings saved. New game started."));
        }
    }

    fn token_count(&self) -> usize {
        self.game.machine().visible_tokens().map_or(0, |t| t.len())
    }

    fn report<T>(&mut self, result: Result<T, GameError>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.status = Some(Status::error(e.to_string()));
                None
            }
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_env("WORDMIX_LOG")
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_file = AppDirs::log_path().and_then(|path| {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok()?;
        }
        OpenOptions::new().create(true).append(true).open(&path).ok()
    });

    match log_file {
        Some(file) => tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init(),
        // Without a log file stay silent rather than corrupting the TUI
        None => tracing_subscriber::registry().with(env_filter).init(),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_tracing();

    let store = cli
        .config
        .as_ref()
        .map(FileConfigStore::with_path)
        .unwrap_or_default();
    let mut record = store.load();
    let overridden = cli.apply_overrides(&mut record)?;

    let game = Game::from_session(
        store,
        Session::from_record(record),
        cli.reveal_policy(),
        cli.rng(),
        WallClockTicks::new(),
    )?;
    if overridden {
        game.persist()?;
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(game, cli.arrange);
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, S: ConfigStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), UI_TICK);

    loop {
        terminal.draw(|f| ui(app, f))?;

        match runner.step() {
            GameEvent::Tick => app.on_tick(),
            GameEvent::Resize => {}
            GameEvent::Key(key) => {
                if key.kind == KeyEventKind::Press && !app.on_key(key) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn ui<S: ConfigStore>(app: &App<S>, f: &mut Frame) {
    current_screen::<S>(&app.state).render(app, f);
}
