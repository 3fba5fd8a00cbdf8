pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use handgrid::{
    config::{ConfigStore, FileConfigStore, GameConfig},
    logging::{init_tracing, LogTarget},
    replay::{self, Recording},
    runtime::{terminal_events, GameEvent, IntervalTimer, Runner},
    session::{FrameReport, Session},
    tracking::{HandFrame, Pointer, VirtualHands},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use tracing::info;

const FRAME_RATE_MS: u64 = 33;
const NUDGE: f64 = 0.01;

/// shape a grid rectangle with two fingertips to match a target area and perimeter
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Hold two fingertips still to form a rectangle on a grid. When its area and perimeter match the target you move on to the next puzzle."
)]
pub struct Cli {
    /// read settings from this JSON file instead of the default location
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// write the effective settings to the config file and exit
    #[clap(long)]
    save_config: bool,

    /// seed for the puzzle order (random when omitted)
    #[clap(long)]
    seed: Option<u64>,

    /// play a JSON-lines hand recording without a terminal UI and print phase changes
    #[clap(short = 'r', long)]
    replay: Option<PathBuf>,

    /// pixels per grid unit
    #[clap(short = 'u', long)]
    unit_px: Option<f64>,

    /// milliseconds a shape must be held still to count
    #[clap(long)]
    hold_ms: Option<u64>,

    /// flip fingertips horizontally, like a selfie camera
    #[clap(long)]
    mirror: bool,

    /// append logs to this file (RUST_LOG controls verbosity)
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, mut cfg: GameConfig) -> GameConfig {
        if let Some(unit_px) = self.unit_px {
            cfg.unit_px = unit_px;
        }
        if let Some(hold_ms) = self.hold_ms {
            cfg.hold_ms = hold_ms;
        }
        if self.mirror {
            cfg.mirror = true;
        }
        cfg
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }

    fn log_target(&self) -> LogTarget {
        match (&self.log_file, &self.replay) {
            (Some(path), _) => LogTarget::File(path.clone()),
            (None, Some(_)) => LogTarget::Stderr,
            (None, None) => LogTarget::Off,
        }
    }
}

#[derive(Debug)]
pub struct App {
    pub session: Session,
    pub hands: VirtualHands,
    pub report: FrameReport,
    countdown_timer: IntervalTimer,
}

impl App {
    pub fn new(session: Session) -> Self {
        let countdown_timer = IntervalTimer::new(session.config().countdown_interval());
        let report = session.report(Instant::now());
        Self {
            session,
            hands: VirtualHands::default(),
            report,
            countdown_timer,
        }
    }

    /// Deliver owed countdown ticks, then run one frame.
    pub fn on_frame(&mut self, frame: &HandFrame, now: Instant) {
        for _ in 0..self.countdown_timer.due(now) {
            self.session.tick_countdown(now);
        }
        if !self.session.is_success() {
            self.countdown_timer.disarm();
        }

        self.report = self.session.process_frame(frame, now);

        if self.session.is_success() && !self.countdown_timer.is_armed() {
            self.countdown_timer.arm(now);
        }
    }

    /// Returns false when the player asked to quit.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return false,
            KeyCode::Left => self.hands.nudge(Pointer::A, -NUDGE, 0.0),
            KeyCode::Right => self.hands.nudge(Pointer::A, NUDGE, 0.0),
            KeyCode::Up => self.hands.nudge(Pointer::A, 0.0, -NUDGE),
            KeyCode::Down => self.hands.nudge(Pointer::A, 0.0, NUDGE),
            KeyCode::Char('a') => self.hands.nudge(Pointer::B, -NUDGE, 0.0),
            KeyCode::Char('d') => self.hands.nudge(Pointer::B, NUDGE, 0.0),
            KeyCode::Char('w') => self.hands.nudge(Pointer::B, 0.0, -NUDGE),
            KeyCode::Char('s') => self.hands.nudge(Pointer::B, 0.0, NUDGE),
            KeyCode::Char('1') => self.hands.toggle(Pointer::A),
            KeyCode::Char('2') => self.hands.toggle(Pointer::B),
            _ => {}
        }
        true
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    init_tracing(&cli.log_target())?;

    let store = cli.config_store();
    let config = cli.apply(store.load());
    config.validate()?;

    if cli.save_config {
        store.save(&config)?;
        println!("saved settings to {}", store.path().display());
        return Ok(());
    }

    let mut session = Session::new(config, cli.seed)?;

    if let Some(path) = &cli.replay {
        return run_replay(&mut session, path);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session);
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    info!(solved = app.session.solved(), "session ended");
    result
}

fn run_replay(session: &mut Session, path: &Path) -> Result<(), Box<dyn Error>> {
    let recording = Recording::load(path)?;
    info!(frames = recording.frames.len(), path = %path.display(), "replaying");

    for change in replay::play(session, &recording, Instant::now()) {
        println!("{change}");
    }
    println!("solved {} puzzle(s)", session.solved());
    Ok(())
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(terminal_events(), Duration::from_millis(FRAME_RATE_MS));

    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            GameEvent::Tick(at) => {
                let frame = app.hands.frame();
                app.on_frame(&frame, at);
            }
            GameEvent::Frame(frame) => app.on_frame(&frame, Instant::now()),
            GameEvent::Resize => {}
            GameEvent::Key(key) => {
                if !app.on_key(key) {
                    break;
                }
            }
        }
        terminal.draw(|f| ui(app, f))?;
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
