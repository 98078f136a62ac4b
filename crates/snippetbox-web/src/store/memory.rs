//! In-process snippet store.
//!
//! Holds rows in a vector behind a mutex. Nothing is persisted; used by the
//! handler tests and for throwaway local runs (`SNIPPETBOX_DSN=memory`).

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use super::{LATEST_LIMIT, Snippet, SnippetStore, StoreError};

/// Snippet store backed by process memory.
#[derive(Debug, Default)]
pub struct MemorySnippetStore {
    rows: Mutex<Vec<Snippet>>,
}

impl MemorySnippetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows, expired ones included.
    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.lock().is_empty()
    }

    /// Insert a row with explicit timestamps.
    pub fn insert_at(
        &self,
        title: &str,
        content: &str,
        created: DateTime<Utc>,
        expires: DateTime<Utc>,
    ) -> i64 {
        let mut rows = self.rows.lock();
        let id = rows.last().map_or(1, |row| row.id + 1);
        rows.push(Snippet {
            id,
            title: title.to_string(),
            content: content.to_string(),
            created,
            expires,
        });
        id
    }
}

#[async_trait]
impl SnippetStore for MemorySnippetStore {
    async fn insert(
        &self,
        title: &str,
        content: &str,
        expires_in_days: i64,
    ) -> Result<i64, StoreError> {
        let created = Utc::now();
        let expires = created + Duration::days(expires_in_days);
        let id = self.insert_at(title, content, created, expires);
        tracing::debug!(id, "snippet stored in memory");
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Snippet, StoreError> {
        let now = Utc::now();
        self.rows
            .lock()
            .iter()
            .find(|row| row.id == id && row.expires > now)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn latest(&self) -> Result<Vec<Snippet>, StoreError> {
        let now = Utc::now();
        let mut live: Vec<Snippet> = self
            .rows
            .lock()
            .iter()
            .filter(|row| row.expires > now)
            .cloned()
            .collect();
        live.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
        live.truncate(LATEST_LIMIT);
        Ok(live)
    }
}
