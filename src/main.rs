use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::terminal;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use steptty::audio::{self, AudioClock, ManualClock};
use steptty::loader::sample_loader;
use steptty::middle::Middle;
use steptty::pipeline::Session;
use steptty::shared::InputEvent;
use steptty::sound::{RecordingProvider, SampleBank};
use steptty::tui;

const FRAME_INTERVAL: Duration = Duration::from_millis(16); // ~60fps

/// Terminal step sequencer with a lookahead audio scheduler
#[derive(Parser, Debug)]
#[command(name = "steptty", version)]
struct Cli {
    /// Session file (JSON); the built-in three-groove session when omitted
    session: Option<PathBuf>,

    /// Directory whose .wav files are added to the sound map by file stem
    #[arg(short, long)]
    sounds: Option<PathBuf>,

    /// Where to write the log (the terminal belongs to the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log every committed note
    #[arg(short, long)]
    verbose: bool,

    /// Print the notes every player would commit in the first SECS seconds, without audio
    #[arg(long, value_name = "SECS")]
    dry_run: Option<f64>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log_path = cli
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("steptty.log"));
    init_logging(&log_path, cli.verbose)?;

    let session = load_session(&cli)?;
    if let Some(secs) = cli.dry_run {
        return dry_run(&session, secs);
    }

    let audio = audio::start_audio()?;
    let mut bank = SampleBank::new(audio.sender(), audio.clock());
    // never start a transport whose sounds failed to load
    bank.load_all(&session.used_sounds())
        .context("loading sounds")?;
    let mut middle = Middle::from_session(&session, Arc::new(bank), audio.clock(), Instant::now())?;

    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard; // auto drops when out of scope
    crossterm::execute!(std::io::stdout(), terminal::EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    loop {
        for (player, event) in middle.tick(Instant::now()) {
            tracing::trace!("player {player}: {event:?}");
        }

        let ds = middle.display_state();
        term.draw(|frame| {
            tui::view::render(frame, frame.area(), &ds);
        })?;

        // wake up in time for the next lookahead pass
        let timeout = middle.until_next_tick(Instant::now()).min(FRAME_INTERVAL);
        for event in tui::input::poll_input(timeout)? {
            if event == InputEvent::Quit {
                middle.stop_all();
                tracing::info!("quit");
                return Ok(());
            }
            middle.handle_input(event);
        }
    }
}

fn init_logging(path: &Path, verbose: bool) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .init();
    Ok(())
}

fn load_session(cli: &Cli) -> anyhow::Result<Session> {
    let mut session = match &cli.session {
        Some(path) => Session::load(path)?,
        None => Session::default(),
    };
    if let Some(dir) = &cli.sounds {
        session.merge_sounds(sample_loader::index_wav_in_dir(dir)?);
    }
    let missing = session.unmapped_sounds();
    if !missing.is_empty() {
        anyhow::bail!("no file for sound(s): {}", missing.join(", "));
    }
    tracing::info!(
        "session: {} players, {} sounds",
        session.players.len(),
        session.sounds.len()
    );
    Ok(session)
}

// Simulates the tick cadence on a hand-driven clock and prints every commit
fn dry_run(session: &Session, secs: f64) -> anyhow::Result<()> {
    let provider = RecordingProvider::new();
    let clock = ManualClock::new(0.0);
    let mut middle = Middle::from_session(session, provider.clone(), clock.clone(), Instant::now())?;
    let tick = session.scheduler.to_config()?.tick_interval;

    for _ in 0..middle.players().len() {
        middle.handle_input(InputEvent::PlayPause);
        middle.handle_input(InputEvent::NextPlayer);
    }
    let mut wall = Instant::now();
    while clock.now() < secs {
        clock.advance(tick.as_secs_f64());
        wall += tick;
        middle.tick(wall);
    }
    middle.stop_all();

    let mut commits = provider.commits();
    commits.retain(|c| c.time < secs);
    commits.sort_by(|a, b| a.time.total_cmp(&b.time));
    for commit in commits {
        println!("{:>9.4}  {}", commit.time, commit.name);
    }
    Ok(())
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(std::io::stdout(), terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
