//! SQLite Reset Token Store
//!
//! Implements ResetTokenStore on a SQLite file so tokens survive restarts
//! and are visible to every instance sharing the database.

use crate::domain::entities::ResetToken;
use crate::domain::ports::{ResetTokenStore, TokenStoreError};
use crate::infrastructure::ShutdownController;
use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS password_reset_tokens (
    token      TEXT PRIMARY KEY,
    email      TEXT NOT NULL,
    expires_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_password_reset_tokens_expires
    ON password_reset_tokens (expires_at);
";

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// SQLite-backed reset token store.
///
/// The connection is shared behind a mutex; all queries run on the
/// blocking thread pool.
#[derive(Clone)]
pub struct SqliteResetTokenStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteResetTokenStore {
    /// Open (or create) the token database at `path`.
    pub fn open(path: &str) -> anyhow::Result<Self> {
        Self::init(Connection::open(path)?)
    }

    /// Private in-memory database, for tests and local development.
    pub fn in_memory() -> anyhow::Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> anyhow::Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Start the background task that deletes expired tokens.
    ///
    /// The task exits when `shutdown` fires.
    pub fn start_gc(&self, interval: Duration, shutdown: ShutdownController) -> JoinHandle<()> {
        let store = self.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.wait() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
                match store.purge_expired().await {
                    Ok(0) => {}
                    Ok(removed) => {
                        tracing::debug!("reset token GC removed {} expired entries", removed)
                    }
                    Err(e) => tracing::error!("reset token GC failed: {}", e),
                }
            }
            tracing::debug!("reset token GC stopped");
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, TokenStoreError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            f(&guard)
        })
        .await
        .map_err(|e| TokenStoreError::Storage(e.to_string()))?
        .map_err(|e| TokenStoreError::Storage(e.to_string()))
    }

    #[cfg(test)]
    async fn insert_raw(&self, token: &str, email: &str, expires_at: u64) {
        let (token, email) = (token.to_string(), email.to_string());
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO password_reset_tokens (token, email, expires_at) VALUES (?1, ?2, ?3)",
                params![token, email, expires_at as i64],
            )
        })
        .await
        .unwrap();
    }
}

#[async_trait]
impl ResetTokenStore for SqliteResetTokenStore {
    async fn issue(&self, email: &str, ttl: Duration) -> Result<ResetToken, TokenStoreError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(TokenStoreError::EmptyEmail);
        }

        let token = ResetToken {
            token: uuid::Uuid::new_v4().simple().to_string(),
            email,
            expires_at: now_secs() + ttl.as_secs(),
        };

        let row = token.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO password_reset_tokens (token, email, expires_at) VALUES (?1, ?2, ?3)",
                params![row.token, row.email, row.expires_at as i64],
            )
        })
        .await?;

        Ok(token)
    }

    async fn consume(&self, token: &str) -> Result<Option<String>, TokenStoreError> {
        let token = token.trim().to_string();
        if token.is_empty() {
            return Ok(None);
        }

        let row = self
            .with_conn(move |conn| {
                conn.query_row(
                    "DELETE FROM password_reset_tokens WHERE token = ?1 RETURNING token, email, expires_at",
                    params![token],
                    |r| {
                        Ok(ResetToken {
                            token: r.get(0)?,
                            email: r.get(1)?,
                            expires_at: r.get::<_, i64>(2)? as u64,
                        })
                    },
                )
                .optional()
            })
            .await?;

        Ok(row
            .filter(|stored| !stored.is_expired(now_secs()))
            .map(|stored| stored.email))
    }

    async fn purge_expired(&self) -> Result<usize, TokenStoreError> {
        let now = now_secs() as i64;
        self.with_conn(move |conn| {
            conn.execute(
                "DELETE FROM password_reset_tokens WHERE expires_at <= ?1",
                params![now],
            )
        })
        .await
    }
}
