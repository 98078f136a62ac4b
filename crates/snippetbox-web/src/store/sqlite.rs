//! SQLite-backed snippet store.
//!
//! Timestamps are produced by SQLite itself (`datetime('now')`), stored as
//! UTC `YYYY-MM-DD HH:MM:SS` text, so expiry filters compare like with like.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use super::{LATEST_LIMIT, Snippet, SnippetStore, StoreError};

/// Upper bound on pooled connections.
const MAX_CONNECTIONS: u32 = 5;

const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS snippets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title VARCHAR(100) NOT NULL,
    content TEXT NOT NULL,
    created DATETIME NOT NULL,
    expires DATETIME NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_snippets_created ON snippets(created);";

/// A row from the `snippets` table.
#[derive(Debug, sqlx::FromRow)]
struct SnippetRow {
    id: i64,
    title: String,
    content: String,
    created: NaiveDateTime,
    expires: NaiveDateTime,
}

impl From<SnippetRow> for Snippet {
    fn from(row: SnippetRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            created: row.created.and_utc(),
            expires: row.expires.and_utc(),
        }
    }
}

/// Snippet store over a SQLite connection pool.
#[derive(Debug, Clone)]
pub struct SqliteSnippetStore {
    pool: SqlitePool,
}

impl SqliteSnippetStore {
    /// Open a pool for `dsn` (e.g. `sqlite://snippetbox.db`), creating the
    /// database file and schema when missing.
    pub async fn connect(dsn: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(dsn)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        let store = Self::from_pool(pool).await?;
        tracing::info!(max_connections = MAX_CONNECTIONS, "sqlite store connected");
        Ok(store)
    }

    /// Wrap an existing pool, ensuring the schema exists.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl SnippetStore for SqliteSnippetStore {
    async fn insert(
        &self,
        title: &str,
        content: &str,
        expires_in_days: i64,
    ) -> Result<i64, StoreError> {
        let result = sqlx::query(
            "INSERT INTO snippets (title, content, created, expires) \
             VALUES (?, ?, datetime('now'), datetime('now', ?))",
        )
        .bind(title)
        .bind(content)
        .bind(format!("+{expires_in_days} days"))
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn get(&self, id: i64) -> Result<Snippet, StoreError> {
        let row = sqlx::query_as::<_, SnippetRow>(
            "SELECT id, title, content, created, expires \
             FROM snippets \
             WHERE expires > datetime('now') AND id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Snippet::from).ok_or(StoreError::NotFound)
    }

    async fn latest(&self) -> Result<Vec<Snippet>, StoreError> {
        let rows = sqlx::query_as::<_, SnippetRow>(
            "SELECT id, title, content, created, expires \
             FROM snippets \
             WHERE expires > datetime('now') \
             ORDER BY created DESC, id DESC \
             LIMIT ?",
        )
        .bind(LATEST_LIMIT as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Snippet::from).collect())
    }
}
