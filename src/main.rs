//! mindscape - AI-assisted mind map studio for the terminal
//!
//! Type a topic and Gemini lays out a radial concept map you can
//! rearrange with the mouse, expand node by node, question through a
//! per-node chat, and export as a PNG poster.
//!
//! Usage: mindscape [--help] [--version] [map.json]

mod app;
mod config;
mod map;
mod types;
mod ui;

use anyhow::{Context, Result};
use app::App;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io::stdout;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    if args.iter().any(|a| a == "--version" || a == "-v") {
        println!("mindscape {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // First non-flag argument is the map file to open (or create on save)
    let map_file = args
        .iter()
        .skip(1)
        .find(|a| !a.starts_with('-'))
        .map(PathBuf::from);

    init_logging();

    let result = run_app(map_file);

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// The TUI owns stdout, so tracing stays silent unless MINDSCAPE_LOG
/// points at a file.
fn init_logging() {
    let path = match std::env::var("MINDSCAPE_LOG") {
        Ok(p) if !p.is_empty() => p,
        _ => return,
    };
    let file = match std::fs::OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(_) => return,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
}

fn print_help() {
    println!(
        r#"mindscape - AI mind maps in your terminal

            _             _
 _ __ ___  (_) _ __    __| | ___   ___   __ _  _ __    ___
| '_ ` _ \ | || '_ \  / _` |/ __| / __| / _` || '_ \  / _ \
| | | | | || || | | || (_| |\__ \| (__ | (_| || |_) ||  __/
|_| |_| |_||_||_| |_| \__,_||___/ \___| \__,_|| .__/  \___|
                                              |_|

Made with ♥ by daskladas

USAGE:
    mindscape [OPTIONS] [map.json]

OPTIONS:
    -h, --help       Print help information
    -v, --version    Print version information

KEYBINDINGS:
    g                Generate a map from a topic
    e                Expand the selected node with AI
    c                Chat about the selected node
    d / Del          Delete the selected node (and its subtree)
    Tab / arrows     Cycle node selection
    s                Save the map as JSON
    x                Export the map as PNG
    t                Cycle theme
    ?                Help overlay
    q                Quit

MOUSE:
    Drag             Move a node
    Click            Select a node
    Shift+Click      Delete a node (and its subtree)
    Right-Click      Expand a node with AI

CONFIG:
    ~/.config/mindscape/config.toml   (Gemini API key lives here)

LOGGING:
    MINDSCAPE_LOG=/tmp/mindscape.log mindscape
"#
    );
}

fn run_app(map_file: Option<PathBuf>) -> Result<()> {
    // Load configuration
    let config = config::Config::load().context("Failed to load configuration")?;

    // Create application state
    let mut app = App::new(config, map_file).context("Failed to initialize application")?;

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to setup terminal")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    // Install panic handler so terminal is restored on panic
    // (without this, a panic leaves the terminal in raw mode + alternate screen)
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(std::io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        let _ = execute!(std::io::stdout(), crossterm::cursor::Show);
        original_hook(info);
    }));

    // Run main loop
    let result = main_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

fn main_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| {
            ui::render(frame, app);
        })?;

        // Drain finished AI workers, expire flash messages
        app.update_timers();

        // Poll for events with timeout (keeps the loop ticking for polls)
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key)?,
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_does_not_panic() {
        print_help();
    }
}
