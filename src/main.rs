pub mod generator;
pub mod quiz;
pub mod runtime;
pub mod score;
pub mod session;
pub mod sources;
pub mod ui;
pub mod util;

use crate::{
    generator::QuizGenerator,
    quiz::{
        Difficulty, Question, QuizConfig, QuizMode, QuizResult, SourceFile, MAX_DURATION_MINUTES,
        MAX_QUESTION_COUNT,
    },
    runtime::{AppEvent, CrosstermEventSource, EventSource, FixedTicker, Runner, Ticker},
    score::ReviewMode,
    session::QuizSession,
};
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
    path::PathBuf,
    sync::mpsc::Sender,
    thread,
    time::Duration,
};

const TICK_RATE_MS: u64 = 250;
const TICKS_PER_SECOND: u64 = 1000 / TICK_RATE_MS;

/// terminal certification engine with ai-generated exams
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal certification engine: supply a topic and/or study documents, get a Gemini-generated multiple choice exam, take it in guided or exam mode under a countdown, and review a scored breakdown."
)]
pub struct Cli {
    /// topic to build the exam around
    #[clap(short = 't', long)]
    topic: Option<String>,

    /// study document to use as source material (pdf or plain text); repeatable
    #[clap(short = 'f', long = "file")]
    files: Vec<PathBuf>,

    /// exam duration in minutes
    #[clap(short = 'd', long, default_value_t = 90, value_parser = clap::value_parser!(u32).range(1..=MAX_DURATION_MINUTES as i64))]
    duration_minutes: u32,

    /// number of questions to generate
    #[clap(short = 'q', long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=MAX_QUESTION_COUNT as i64))]
    question_count: u32,

    /// interaction mode: guided reveals each answer, exam defers feedback
    #[clap(short = 'm', long, value_enum, default_value_t = QuizMode::Exam)]
    mode: QuizMode,

    /// target difficulty for the generated questions
    #[clap(long, value_enum, default_value_t = Difficulty::Medium)]
    difficulty: Difficulty,
}

/// Which form field currently has focus.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FormField {
    Topic,
    Duration,
    Questions,
    Mode,
    Difficulty,
}

impl FormField {
    const ORDER: [FormField; 5] = [
        FormField::Topic,
        FormField::Duration,
        FormField::Questions,
        FormField::Mode,
        FormField::Difficulty,
    ];

    fn next(self) -> Self {
        let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(i + 1) % Self::ORDER.len()]
    }

    fn prev(self) -> Self {
        let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(i + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// The configuration-entry screen state. Survives generation failures and
/// retakes so prior input is preserved.
#[derive(Debug, Clone)]
pub struct ConfigForm {
    pub topic: String,
    pub sources: Vec<SourceFile>,
    pub duration_minutes: u32,
    pub question_count: u32,
    pub mode: QuizMode,
    pub difficulty: Difficulty,
    pub focus: FormField,
    pub error: Option<String>,
}

impl ConfigForm {
    pub fn from_cli(cli: &Cli, sources: Vec<SourceFile>) -> Self {
        Self {
            topic: cli.topic.clone().unwrap_or_default(),
            sources,
            duration_minutes: cli.duration_minutes,
            question_count: cli.question_count,
            mode: cli.mode,
            difficulty: cli.difficulty,
            focus: FormField::Topic,
            error: None,
        }
    }

    pub fn to_config(&self) -> QuizConfig {
        QuizConfig {
            topic: self.topic.clone(),
            sources: self.sources.clone(),
            duration_minutes: self.duration_minutes.clamp(1, MAX_DURATION_MINUTES),
            question_count: self.question_count.clamp(1, MAX_QUESTION_COUNT),
            mode: self.mode,
            difficulty: self.difficulty,
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.topic.trim().is_empty() || !self.sources.is_empty()
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn input_char(&mut self, c: char) {
        if self.focus == FormField::Topic && !c.is_control() {
            self.topic.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.focus == FormField::Topic {
            self.topic.pop();
        }
    }

    /// Left/Right adjustment of the focused field. Numeric fields clamp to
    /// their allowed ranges; enum fields cycle.
    pub fn adjust(&mut self, delta: i32) {
        match self.focus {
            FormField::Topic => {}
            FormField::Duration => {
                let next = self.duration_minutes as i64 + (delta as i64) * 5;
                self.duration_minutes = next.clamp(1, MAX_DURATION_MINUTES as i64) as u32;
            }
            FormField::Questions => {
                let next = self.question_count as i64 + delta as i64;
                self.question_count = next.clamp(1, MAX_QUESTION_COUNT as i64) as u32;
            }
            FormField::Mode => {
                self.mode = match self.mode {
                    QuizMode::Guided => QuizMode::Exam,
                    QuizMode::Exam => QuizMode::Guided,
                };
            }
            FormField::Difficulty => {
                let dirs = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
                let i = dirs.iter().position(|d| *d == self.difficulty).unwrap_or(1) as i32;
                let next = (i + delta).rem_euclid(dirs.len() as i32) as usize;
                self.difficulty = dirs[next];
            }
        }
    }
}

/// Results-screen state: the finished attempt plus review presentation.
#[derive(Debug, Clone)]
pub struct ReviewState {
    pub questions: Vec<Question>,
    pub result: QuizResult,
    pub filter: ReviewMode,
    pub scroll_offset: usize,
}

impl ReviewState {
    pub fn new(questions: Vec<Question>, result: QuizResult) -> Self {
        Self {
            questions,
            result,
            filter: ReviewMode::All,
            scroll_offset: 0,
        }
    }

    pub fn toggle_filter(&mut self) {
        self.filter = match self.filter {
            ReviewMode::All => ReviewMode::IncorrectOnly,
            ReviewMode::IncorrectOnly => ReviewMode::All,
        };
        self.scroll_offset = 0;
    }
}

/// Top-level application state: one screen at a time, no ambient globals.
#[derive(Debug)]
pub enum Screen {
    Configuring,
    Generating,
    InSession(QuizSession),
    ShowingResult(ReviewState),
}

#[derive(Debug)]
pub struct App {
    pub form: ConfigForm,
    pub screen: Screen,
    pub spinner_frame: usize,
    tick_count: u64,
}

impl App {
    pub fn new(cli: &Cli, sources: Vec<SourceFile>) -> Self {
        Self {
            form: ConfigForm::from_cli(cli, sources),
            screen: Screen::Configuring,
            spinner_frame: 0,
            tick_count: 0,
        }
    }

    /// Kicks off a generation request on a worker thread and moves to the
    /// loading screen. The outcome comes back through the event channel, so
    /// the loop stays the single writer of app state.
    pub fn start_generation(&mut self, worker_tx: Sender<AppEvent>) {
        let config = self.form.to_config();
        self.form.error = None;
        self.spinner_frame = 0;
        self.screen = Screen::Generating;

        thread::spawn(move || {
            let outcome = QuizGenerator::from_env().and_then(|g| g.generate(&config));
            // The receiver is gone when the user quit mid-generation.
            let _ = worker_tx.send(AppEvent::Generated(outcome));
        });
    }

    pub fn on_generated(&mut self, outcome: Result<Vec<Question>, generator::GenerationError>) {
        if !matches!(self.screen, Screen::Generating) {
            return;
        }
        match outcome {
            Ok(questions) => {
                let config = self.form.to_config();
                self.tick_count = 0;
                self.screen = Screen::InSession(QuizSession::new(questions, &config));
            }
            Err(err) => {
                log::warn!("generation failed: {}", err);
                self.form.error = Some(format!(
                    "Failed to generate exam. Check your topic or files and try again. {}",
                    err
                ));
                self.screen = Screen::Configuring;
            }
        }
    }

    pub fn on_tick(&mut self) {
        match &mut self.screen {
            Screen::Generating => {
                self.spinner_frame = self.spinner_frame.wrapping_add(1);
            }
            Screen::InSession(session) => {
                self.tick_count += 1;
                if self.tick_count % TICKS_PER_SECOND == 0 {
                    session.on_tick();
                }
            }
            _ => {}
        }
        self.maybe_show_result();
    }

    /// Consumes a key event; returns true when the app should exit.
    pub fn handle_key(&mut self, key: KeyEvent, worker_tx: Sender<AppEvent>) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        let mut quit = false;
        let mut start = false;
        let mut retake = false;

        match &mut self.screen {
            Screen::Configuring => match key.code {
                KeyCode::Esc => quit = true,
                KeyCode::Enter => start = self.form.can_submit(),
                KeyCode::Tab | KeyCode::Down => self.form.focus_next(),
                KeyCode::BackTab | KeyCode::Up => self.form.focus_prev(),
                KeyCode::Left => self.form.adjust(-1),
                KeyCode::Right => self.form.adjust(1),
                KeyCode::Backspace => self.form.backspace(),
                KeyCode::Char(c) => self.form.input_char(c),
                _ => {}
            },
            // No session-mutating input while the request is pending.
            Screen::Generating => {
                if key.code == KeyCode::Esc {
                    quit = true;
                }
            }
            Screen::InSession(session) => match key.code {
                KeyCode::Esc => quit = true,
                KeyCode::Char(c @ '1'..='4') => {
                    session.select_option(c as usize - '1' as usize);
                }
                KeyCode::Char(c @ 'a'..='d') => {
                    session.select_option(c as usize - 'a' as usize);
                }
                KeyCode::Char(c @ 'A'..='D') => {
                    session.select_option(c as usize - 'A' as usize);
                }
                KeyCode::Enter => session.advance(),
                _ => {}
            },
            Screen::ShowingResult(review) => match key.code {
                KeyCode::Esc => quit = true,
                KeyCode::Char('i') => review.toggle_filter(),
                KeyCode::Char('r') => retake = true,
                KeyCode::Up => review.scroll_offset = review.scroll_offset.saturating_sub(1),
                KeyCode::Down => review.scroll_offset += 1,
                KeyCode::PageUp => review.scroll_offset = review.scroll_offset.saturating_sub(10),
                KeyCode::PageDown => review.scroll_offset += 10,
                KeyCode::Home => review.scroll_offset = 0,
                _ => {}
            },
        }

        if start {
            self.start_generation(worker_tx);
        }
        if retake {
            self.retake();
        }
        self.maybe_show_result();
        quit
    }

    /// Clears all session/result/error state and returns to the
    /// configuration entry point with prior input preserved.
    pub fn retake(&mut self) {
        self.form.error = None;
        self.tick_count = 0;
        self.screen = Screen::Configuring;
    }

    fn maybe_show_result(&mut self) {
        let finished = matches!(&self.screen, Screen::InSession(s) if s.is_finished());
        if !finished {
            return;
        }
        if let Screen::InSession(session) =
            std::mem::replace(&mut self.screen, Screen::Configuring)
        {
            let result = session.result();
            self.screen = Screen::ShowingResult(ReviewState::new(session.questions, result));
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    pretty_env_logger::init();

    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let sources = match sources::load_sources(&cli.files) {
        Ok(sources) => sources,
        Err(err) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::Io, format!("failed to read source file: {err}"))
                .exit();
        }
    };

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&cli, sources);
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let outcome = run_app(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome
}

fn run_app<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        match runner.step() {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => {}
            AppEvent::Generated(outcome) => app.on_generated(outcome),
            AppEvent::Key(key) => {
                if app.handle_key(key, runner.sender()) {
                    break;
                }
            }
        }
    }

    Ok(())
}
