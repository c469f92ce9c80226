//! Handwriting Studio Entry Point
//!
//! Launches the terminal studio: draw symbols with the mouse, save them to
//! the handwriting service and render text in your own handwriting.
//!
//! # Usage
//!
//! ```bash
//! # Hosted service, defaults
//! handwriting-studio
//!
//! # Local backend, shorter timeout
//! handwriting-studio --base-url http://127.0.0.1:5000 --timeout-ms 3000
//!
//! # Capture only a few symbols
//! handwriting-studio --symbols abc123
//!
//! # Verbose logging (written to the log file, never the terminal)
//! RUST_LOG=debug handwriting-studio --log-file /tmp/studio.log
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{self, IsTerminal, Write};
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use studio_core::{
    default_config_path, load_config_from_path, ConfigOverrides, RenderDisplay, SandboxedDisplay,
    Studio,
};
use studio_tui::{App, SystemClipboard};

const DEFAULT_LOG_DIRECTIVES: &str = "studio_core=info,studio_tui=info";

/// Handwriting Studio - capture your handwriting and render text with it
#[derive(Parser, Debug)]
#[command(name = "handwriting-studio")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Base URL of the handwriting service
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Symbols to capture, in order
    #[arg(long, value_name = "STRING")]
    symbols: Option<String>,

    /// Log file path
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.base_url.clone(),
            timeout_ms: self.timeout_ms,
            symbols: self.symbols.clone(),
        }
    }
}

fn default_log_path() -> Option<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .map(|dir| dir.join("handwriting-studio").join("studio.log"))
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Open the log file, or say on `warnings` why logging is off
fn log_file_or_warn(path: &Path, warnings: &mut impl Write) -> Option<File> {
    match open_log_file(path) {
        Ok(file) => Some(file),
        Err(e) => {
            let _ = writeln!(
                warnings,
                "Warning: logging disabled, cannot open {}: {e}",
                path.display()
            );
            None
        }
    }
}

/// Log to a file; the terminal belongs to the UI
fn init_logging(path: Option<PathBuf>) {
    let Some(path) = path.or_else(default_log_path) else {
        return;
    };
    let Some(file) = log_file_or_warn(&path, &mut io::stderr()) else {
        return;
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVES));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.clone());

    let config_path = args.config.clone().or_else(default_config_path);
    let mut config = load_config_from_path(config_path).context("Failed to load configuration")?;
    config
        .apply_overrides(&args.overrides())
        .context("Invalid command-line option")?;

    tracing::info!(
        base_url = %config.api.base_url,
        timeout_ms = config.api.timeout_ms,
        symbols = config.symbols.len(),
        source = %config.source(),
        "Starting handwriting studio"
    );

    // Check if we have a TTY before attempting initialization
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: handwriting-studio requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means stdin/stdout are piped or the session has no TTY");
        eprintln!("(CI, containers, SSH without -t).");
        std::process::exit(1);
    }

    let display = RenderDisplay::new(
        Box::new(SandboxedDisplay::new()),
        Box::new(SystemClipboard::new()),
    );
    let studio = Studio::from_config(&config, display).context("Failed to create HTTP client")?;

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, studio).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    studio: Studio,
) -> Result<()> {
    let size = crossterm::terminal::size()?;
    let mut app = App::new(studio, size);
    app.run(terminal).await?;

    let progress = app.studio().session().progress();
    println!("Saved {}/{} symbols this session.", progress.captured, progress.total);
    tracing::info!(captured = progress.captured, "Handwriting studio closed");

    Ok(())
}
