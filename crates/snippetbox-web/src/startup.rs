//! Process startup: store connection, template cache, listener.
//!
//! Each stage fails with its own [`StartupError`] variant and exit code, and
//! nothing listens until every earlier stage has succeeded.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::{Config, ConfigError};
use crate::routes::router;
use crate::state::AppState;
use crate::store::{MemorySnippetStore, SnippetStore, SqliteSnippetStore, StoreError};
use crate::templates::{TemplateCache, TemplateError};

/// Data source name selecting the in-process store.
pub const MEMORY_DSN: &str = "memory";

/// Fatal startup failures.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("store unreachable: {0}")]
    Store(#[source] StoreError),

    #[error("template cache build failed: {0}")]
    Templates(#[from] TemplateError),

    #[error("listener failed on {addr}: {source}")]
    Listener {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

impl StartupError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Store(_) => 1,
            Self::Config(_) => 2,
            Self::Listener { .. } => 3,
            Self::Templates(_) => 4,
        }
    }
}

/// Open the store named by `dsn`.
pub async fn connect_store(dsn: &str) -> Result<Arc<dyn SnippetStore>, StoreError> {
    if dsn == MEMORY_DSN {
        tracing::warn!("using in-memory store; snippets will not survive a restart");
        return Ok(Arc::new(MemorySnippetStore::new()));
    }

    Ok(Arc::new(SqliteSnippetStore::connect(dsn).await?))
}

/// Connect the store and build the template cache.
pub async fn build_state(config: &Config) -> Result<AppState, StartupError> {
    let store = connect_store(&config.dsn)
        .await
        .map_err(StartupError::Store)?;
    let templates = TemplateCache::new(&config.ui_dir)?;

    Ok(AppState::new(store, templates, config.ui_dir.join("static")))
}

/// Build everything, then bind and serve until the server stops.
pub async fn run(config: Config) -> Result<(), StartupError> {
    let state = build_state(&config).await?;
    let app = router(state);

    let listener_error = |source| StartupError::Listener {
        addr: config.addr.clone(),
        source,
    };

    let listener = TcpListener::bind(&config.addr)
        .await
        .map_err(listener_error)?;
    tracing::info!(addr = %config.addr, "starting server");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(listener_error)
}
