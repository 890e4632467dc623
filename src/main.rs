//! userdeck binary entry point.
//!
//! Parses configuration, sets up file logging and the tokio runtime,
//! initializes the terminal in raw mode, runs the TUI event loop,
//! and restores the terminal state on exit.
//!
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context as _, Result};
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use userdeck::api::{DEFAULT_BASE_URL, ReqresClient};
use userdeck::app::keymap::Keymap;
use userdeck::app::{self, AppContext, Theme};
use userdeck::store::Avatars;
use userdeck::store::avatar::DEFAULT_AVATAR_SERVICE;

/// Browse and manage users from a paged REST directory. Changes stay local.
#[derive(Debug, Parser)]
#[command(name = "userdeck", version, about)]
struct Cli {
    /// Base URL of the user directory; pages are read from `{base}/users?page=N`.
    #[arg(long, env = "USERDECK_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Value for the `x-api-key` header, if the directory wants one.
    #[arg(long, env = "USERDECK_API_KEY")]
    api_key: Option<String>,

    /// Service used to generate placeholder avatars.
    #[arg(long, env = "USERDECK_AVATAR_SERVICE", default_value = DEFAULT_AVATAR_SERVICE)]
    avatar_service: String,

    /// Theme file (created with defaults if missing).
    #[arg(long, env = "USERDECK_THEME", default_value = "theme.conf")]
    theme: String,

    /// Keybindings file (created with defaults if missing).
    #[arg(long, env = "USERDECK_KEYBINDS", default_value = "keybinds.conf")]
    keybinds: String,

    /// Log file. The terminal belongs to the UI, so logs never go to stdout.
    #[arg(long, env = "USERDECK_LOG_FILE")]
    log_file: Option<PathBuf>,
}

fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .try_init()
        .context("install tracing subscriber")?;
    Ok(())
}

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Program entry point: run the TUI and report any top-level error to stderr.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("userdeck.log"));
    init_logging(&log_file)?;

    let client = ReqresClient::new(&cli.base_url, cli.api_key.clone())
        .map_err(|e| anyhow::anyhow!(e))?;
    let avatars = Avatars::from_service(&cli.avatar_service).map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(base_url = %client.base_url(), avatars = %avatars.base(), "starting");
    let ctx = AppContext::new(Arc::new(client), avatars);

    let theme = Theme::load_or_init(&cli.theme);
    let keymap = Keymap::load_or_init(&cli.keybinds);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    // The event loop is synchronous; entering the runtime lets the store spawn its load.
    let _guard = runtime.enter();

    let mut terminal = init_terminal().context("init terminal")?;

    let res = app::run(&mut terminal, &ctx, theme, keymap);

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();

    if let Err(err) = res {
        tracing::error!(error = %err, "application error");
        eprintln!("application error: {err}");
    }
    Ok(())
}
