//! Application configuration from command-line flags and the environment.
//!
//! Each setting resolves flag first, then environment variable, then default.

use std::path::PathBuf;

/// Default listen address.
pub const DEFAULT_ADDR: &str = "0.0.0.0:4040";

/// Default location of templates and static assets.
pub const DEFAULT_UI_DIR: &str = "./ui";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("a data source name is required (--dsn or SNIPPETBOX_DSN)")]
    MissingDsn,

    /// The `.env` file exists but could not be loaded.
    #[error("environment file: {0}")]
    Environment(String),
}

/// Values given on the command line, taking precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub addr: Option<String>,
    pub dsn: Option<String>,
    pub ui_dir: Option<PathBuf>,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:4040").
    pub addr: String,

    /// Store data source name: a SQLite URL such as `sqlite://snippetbox.db`,
    /// or `memory` for a throwaway in-process store.
    pub dsn: String,

    /// Directory holding `html/` templates and `static/` assets.
    pub ui_dir: PathBuf,
}

impl Config {
    /// Resolve configuration.
    ///
    /// Required:
    /// - `--dsn` / `SNIPPETBOX_DSN`
    ///
    /// Optional:
    /// - `--addr` / `SNIPPETBOX_ADDR` (default: "0.0.0.0:4040")
    /// - `--ui-dir` / `SNIPPETBOX_UI_DIR` (default: "./ui")
    pub fn load(overrides: Overrides) -> Result<Self, ConfigError> {
        let addr = overrides
            .addr
            .or_else(|| std::env::var("SNIPPETBOX_ADDR").ok())
            .unwrap_or_else(|| DEFAULT_ADDR.to_string());

        let dsn = overrides
            .dsn
            .or_else(|| std::env::var("SNIPPETBOX_DSN").ok())
            .map(|dsn| dsn.trim().to_string())
            .filter(|dsn| !dsn.is_empty())
            .ok_or(ConfigError::MissingDsn)?;

        let ui_dir = overrides
            .ui_dir
            .or_else(|| std::env::var_os("SNIPPETBOX_UI_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UI_DIR));

        tracing::info!(
            addr = %addr,
            ui_dir = %ui_dir.display(),
            "configuration loaded"
        );

        Ok(Self { addr, dsn, ui_dir })
    }
}
