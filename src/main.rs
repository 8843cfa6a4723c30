//! library-catalog binary entry point.
//!
//! Resolves settings, sets up file logging and the tokio runtime, puts the
//! terminal in raw mode, runs the catalog loop and restores the terminal on
//! exit.
use anyhow::{Context as _, bail};
use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

use library_catalog::api::{HttpBooksClient, Role};
use library_catalog::app::keymap::Keymap;
use library_catalog::app::settings::Settings;
use library_catalog::app::{self, AppState, Session, Theme, config_file_write_path};
use library_catalog::error::Context;
use library_catalog::search::Debouncer;

#[derive(Parser, Debug)]
#[command(version, about = "Browse, search and check out books from a library catalog")]
struct Cli {
    /// Books collection URL
    #[arg(long, env = "CATALOG_BASE_URL")]
    base_url: Option<String>,

    /// Code of the acting user
    #[arg(long, env = "CATALOG_USER_CODE")]
    user_code: Option<u64>,

    /// Display name of the acting user
    #[arg(long, env = "CATALOG_USER_NAME")]
    user_name: Option<String>,

    /// Role of the acting user: staff or regular
    #[arg(long, env = "CATALOG_ROLE", value_parser = parse_role)]
    role: Option<Role>,

    /// Quiet period in milliseconds before a typed search is sent
    #[arg(long, env = "CATALOG_DEBOUNCE_MS")]
    debounce_ms: Option<u64>,

    /// Log file; defaults to library-catalog.log in the config directory
    #[arg(long, env = "CATALOG_LOG_FILE")]
    log_file: Option<PathBuf>,
}

/// Used when `RUST_LOG` is unset. Keeps the HTTP spans from `TracingMiddleware`.
const DEFAULT_LOG_FILTER: &str = "library_catalog=info,reqwest_tracing=info";

fn parse_role(s: &str) -> Result<Role, String> {
    Role::parse(s).ok_or_else(|| format!("unknown role '{s}', expected staff or regular"))
}

impl Cli {
    /// Command-line values win over the stored settings.
    fn merge_into(self, mut settings: Settings) -> Settings {
        if let Some(url) = self.base_url {
            settings.base_url = url;
        }
        if let Some(code) = self.user_code {
            settings.user_code = Some(code);
        }
        if let Some(name) = self.user_name {
            settings.user_name = name;
        }
        if let Some(role) = self.role {
            settings.role = role;
        }
        if let Some(ms) = self.debounce_ms {
            settings.debounce_ms = ms;
        }
        settings
    }
}

fn init_logging(path: &PathBuf) -> library_catalog::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_ctx(|| format!("open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> library_catalog::Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode().with_ctx(|| "enable raw mode".to_string())?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen).with_ctx(|| "enter alternate screen".to_string())?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).with_ctx(|| "create terminal".to_string())?;
    Ok(terminal)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| config_file_write_path("library-catalog.log"));
    init_logging(&log_file).map_err(|e| anyhow::anyhow!(e))?;

    let settings_path = config_file_write_path("settings.conf");
    let settings = cli.merge_into(Settings::load_or_init(&settings_path.to_string_lossy()));
    let Some(user_code) = settings.user_code else {
        bail!(
            "no acting user configured: pass --user-code or set user_code in {}",
            settings_path.display()
        );
    };
    tracing::info!(base_url = %settings.base_url, user_code, "starting");

    let runtime = tokio::runtime::Runtime::new().context("start tokio runtime")?;
    let client = HttpBooksClient::new(&settings.base_url)?;

    let session = Session {
        user_code,
        user_name: settings.user_name.clone(),
        role: settings.role,
    };
    let mut state = AppState::new(session, Debouncer::new(settings.debounce()));
    state.theme = Theme::load_or_init(&config_file_write_path("theme.conf").to_string_lossy());
    state.keymap = Keymap::load_or_init(&config_file_write_path("keybinds.conf").to_string_lossy());

    let mut terminal = init_terminal().map_err(|e| anyhow::anyhow!(e))?;

    let res = app::run(&mut terminal, &mut state, runtime.handle(), Arc::new(client));

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    if let Err(err) = &res {
        tracing::error!(error = %err, "catalog loop failed");
    }
    res
}
