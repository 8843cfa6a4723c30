//! Persistent settings: parse/write `settings.conf`.
//!
//! Holds the backend location, the acting user and the search debounce.
//! Command-line flags override whatever is stored here (see `main.rs`).

use std::time::Duration;

use crate::api::{Role, UserCode};
use crate::error::{Context, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/livros";

/// Settings loaded from or saved to `settings.conf`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Books collection URL, e.g. `http://localhost:8080/livros`.
    pub base_url: String,
    /// Code of the acting user. Required before the UI can start.
    pub user_code: Option<UserCode>,
    pub user_name: String,
    pub role: Role,
    /// Quiet period before a typed search is sent.
    pub debounce_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_code: None,
            user_name: String::new(),
            role: Role::Regular,
            debounce_ms: crate::search::DEFAULT_DEBOUNCE.as_millis() as u64,
        }
    }
}

impl Settings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Load settings from `path`, or write defaults there when nothing exists.
    ///
    /// An existing file elsewhere in the config search path is preferred over
    /// creating a new one.
    pub fn load_or_init(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        if let Some(existing) = crate::app::config_file_read_path("settings.conf") {
            return Self::from_file(&existing.to_string_lossy()).unwrap_or_default();
        }
        let settings = Self::default();
        if let Err(e) = settings.write_file(path) {
            tracing::warn!(path, error = %e, "could not write default settings");
        }
        settings
    }

    /// Parse a `<key> = <value>` file. Unknown keys and bad values are skipped.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).with_ctx(|| format!("read settings from {path}"))?;
        Ok(Self::parse(&contents))
    }

    pub fn parse(contents: &str) -> Self {
        let mut cfg = Self::default();
        for raw in contents.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((lhs, rhs)) = line.split_once('=') else {
                continue;
            };
            let (lhs, rhs) = (lhs.trim(), rhs.trim());
            if rhs.is_empty() {
                continue;
            }
            match lhs {
                "base_url" => cfg.base_url = rhs.to_string(),
                "user_code" => cfg.user_code = rhs.parse().ok().or(cfg.user_code),
                "user_name" => cfg.user_name = rhs.to_string(),
                "role" => cfg.role = Role::parse(rhs).unwrap_or(cfg.role),
                "debounce_ms" => cfg.debounce_ms = rhs.parse().unwrap_or(cfg.debounce_ms),
                _ => {}
            }
        }
        cfg
    }

    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# library-catalog settings\n");
        buf.push_str("# Command-line flags and CATALOG_* environment variables take precedence.\n\n");
        let _ = writeln!(&mut buf, "base_url = {}", self.base_url);
        buf.push_str("# Acting user; leave user_code unset to require --user-code\n");
        match self.user_code {
            Some(code) => {
                let _ = writeln!(&mut buf, "user_code = {code}");
            }
            None => buf.push_str("# user_code = 1\n"),
        }
        let _ = writeln!(&mut buf, "user_name = {}", self.user_name);
        buf.push_str("# Role: staff|regular\n");
        let _ = writeln!(&mut buf, "role = {}", self.role.as_wire());
        let _ = writeln!(&mut buf, "debounce_ms = {}", self.debounce_ms);

        std::fs::write(path, buf)
    }
}
