//! Snippetbox - HTTP server for sharing short text snippets.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use snippetbox_web::config::{Config, ConfigError, Overrides};
use snippetbox_web::startup::{self, StartupError};

/// Snippetbox - share short text snippets.
#[derive(Parser, Debug)]
#[command(name = "snippetbox")]
#[command(about = "Web application for sharing short text snippets", long_about = None)]
struct Args {
    /// Path to .env file (optional).
    #[arg(long, env = "DOTENV_PATH", default_value = ".env")]
    dotenv: String,

    /// Listen address (overrides SNIPPETBOX_ADDR).
    #[arg(long)]
    addr: Option<String>,

    /// Store data source name, e.g. sqlite://snippetbox.db (overrides SNIPPETBOX_DSN).
    #[arg(long)]
    dsn: Option<String>,

    /// Directory with html/ templates and static/ assets (overrides SNIPPETBOX_UI_DIR).
    #[arg(long)]
    ui_dir: Option<PathBuf>,
}

fn load_dotenv(path: &str) -> anyhow::Result<()> {
    if Path::new(path).exists() {
        dotenvy::from_path(path).with_context(|| format!("failed to load {path}"))?;
        eprintln!("Loaded environment from {path}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments
    let args = Args::parse();

    // Load .env file if it exists
    if let Err(err) = load_dotenv(&args.dotenv) {
        let err = StartupError::Config(ConfigError::Environment(format!("{err:#}")));
        eprintln!("{err}");
        return ExitCode::from(err.exit_code());
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let overrides = Overrides {
        addr: args.addr,
        dsn: args.dsn,
        ui_dir: args.ui_dir,
    };

    let result = match Config::load(overrides) {
        Ok(config) => startup::run(config).await,
        Err(err) => Err(err.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "snippetbox stopped");
            ExitCode::from(err.exit_code())
        }
    }
}
