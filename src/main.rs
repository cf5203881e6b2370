//! A scrollytelling reader for the terminal.
//!
//! Scroll through a story and the map panel follows along: each section
//! re-frames the map when it comes into view, and animated sections draw
//! their route as you read.
//!
//! Run without arguments for the built-in story, or pass a story file.
//! Run with `--dump-default` to print the built-in story as a template.

mod app;
mod config;
mod story;
mod ui;

use std::io::{self, stdout};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};

use crate::app::{
    event::{spawn_event_reader, AppEvent},
    handler, map_runtime,
    state::AppState,
};
use crate::story::script::{StoryScript, DEFAULT_STORY};

/// Frame interval; camera transitions advance once per tick.
const TICK_RATE: Duration = Duration::from_millis(33);

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Scroll-driven map stories in the terminal")]
struct Cli {
    /// Story file to open (defaults to the built-in story).
    story: Option<PathBuf>,

    /// Print the built-in story file and exit.
    #[arg(long = "dump-default")]
    dump_default: bool,

    /// Rows scrolled per key press or wheel notch (overrides the config).
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..=20))]
    scroll_step: Option<u16>,

    /// Drop feature-id answers that arrive after a newer section was entered.
    #[arg(long)]
    discard_stale_seeks: bool,
}

fn load_story(path: Option<&PathBuf>) -> Result<StoryScript> {
    match path {
        Some(path) => StoryScript::load(path)
            .with_context(|| format!("cannot load story {}", path.display())),
        None => StoryScript::builtin().context("built-in story is invalid"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The UI owns stdout; logs go to stderr and stay silent unless RUST_LOG is set.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.dump_default {
        print!("{DEFAULT_STORY}");
        return Ok(());
    }

    let script = load_story(cli.story.as_ref())?;
    tracing::info!(
        title = %script.title,
        sections = script.sections.len(),
        bookmarks = script.bookmarks.len(),
        "story loaded"
    );
    if script.actions.is_empty() {
        tracing::warn!("story has no entry actions; the map will never move");
    }

    let mut user_config = config::AppConfig::load();
    if let Some(step) = cli.scroll_step {
        user_config.scroll_step = step;
    }
    if cli.discard_stale_seeks {
        user_config.discard_stale_seeks = true;
    }

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stdout_handle = stdout();
    execute!(stdout_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    // ── async channels ────────────────────────────────────────
    let mut events = spawn_event_reader(TICK_RATE);
    let (map_tx, mut map_rx) = tokio::sync::mpsc::unbounded_channel();
    map_runtime::spawn_animated_layer(map_tx.clone(), script.route.clone());

    let size = terminal.size()?;
    let mut state = AppState::new(
        script,
        user_config,
        Rect::new(0, 0, size.width, size.height),
        map_tx,
    );

    // ── event loop ────────────────────────────────────────────
    let result: Result<()> = loop {
        if let Err(err) = terminal.draw(|frame| ui::draw(frame, &state)) {
            break Err(err.into());
        }

        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                match event {
                    AppEvent::Key(k) => handler::handle_key(&mut state, k),
                    AppEvent::Mouse(m) => handler::handle_mouse(&mut state, m),
                    AppEvent::Resize(w, h) => state.resize(Rect::new(0, 0, w, h)),
                    AppEvent::Tick => state.on_tick(),
                }
            }

            Some(update) = map_rx.recv() => {
                handler::handle_map_update(&mut state, update);
                // Drain whatever else is queued before redrawing.
                while let Ok(update) = map_rx.try_recv() {
                    handler::handle_map_update(&mut state, update);
                }
            }
        }

        if state.should_quit {
            break Ok(());
        }
    };

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result?;
    match state.fatal.take() {
        Some(err) => Err(err).context("story aborted"),
        None => Ok(()),
    }
}
