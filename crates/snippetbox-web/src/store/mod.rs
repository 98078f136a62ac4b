//! Snippet persistence.
//!
//! Handlers talk to storage through the [`SnippetStore`] port so they can be
//! exercised against [`MemorySnippetStore`] in tests and against
//! [`SqliteSnippetStore`] in production.
//!
//! The only business rule owned here is that expired snippets are invisible:
//! neither [`SnippetStore::get`] nor [`SnippetStore::latest`] ever returns a
//! snippet whose expiry has passed, and an expired snippet is reported exactly
//! like one that never existed.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub use memory::MemorySnippetStore;
pub use sqlite::SqliteSnippetStore;

/// Maximum number of snippets returned by [`SnippetStore::latest`].
pub const LATEST_LIMIT: usize = 10;

/// A titled block of text with a creation and an expiry time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snippet {
    /// Store-assigned identifier.
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created: DateTime<Utc>,
    /// Always strictly after `created`.
    pub expires: DateTime<Utc>,
}

/// Errors returned by snippet stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No live snippet with the requested id (absent or expired).
    #[error("no matching snippet found")]
    NotFound,

    /// The underlying database failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence port for snippets.
#[async_trait]
pub trait SnippetStore: Send + Sync + 'static {
    /// Insert a snippet expiring `expires_in_days` days from now and return
    /// its id.
    async fn insert(
        &self,
        title: &str,
        content: &str,
        expires_in_days: i64,
    ) -> Result<i64, StoreError>;

    /// Fetch a non-expired snippet by id.
    async fn get(&self, id: i64) -> Result<Snippet, StoreError>;

    /// Fetch up to [`LATEST_LIMIT`] non-expired snippets, newest first.
    async fn latest(&self) -> Result<Vec<Snippet>, StoreError>;
}
