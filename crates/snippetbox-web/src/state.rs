//! Application state shared across all request handlers.

use std::path::Path;
use std::sync::Arc;

use crate::store::SnippetStore;
use crate::templates::TemplateCache;

/// Explicit context handed to the router and every handler.
///
/// Built once at startup; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Snippet persistence.
    pub store: Arc<dyn SnippetStore>,

    /// Compiled page templates, read-only after startup.
    pub templates: Arc<TemplateCache>,

    /// Directory served under `/static`.
    pub static_dir: Arc<Path>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn SnippetStore>,
        templates: TemplateCache,
        static_dir: impl AsRef<Path>,
    ) -> Self {
        Self {
            store,
            templates: Arc::new(templates),
            static_dir: Arc::from(static_dir.as_ref()),
        }
    }
}
