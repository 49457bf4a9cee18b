//! `SQLite`-backed response cache.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;
use streamkit_api::tmdb::{CacheError, CacheKey, CacheStore, DEFAULT_CACHE_TTL};

use super::connection::open_db;
use super::migrations::run_migrations;

/// Persistent cache storing each response as JSON text with an absolute
/// expiry (Unix seconds).
///
/// Entries survive process restarts. Expired rows read as misses and are
/// deleted on access or by [`SqliteCache::purge_expired`].
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct SqliteCache {
    conn: Mutex<Connection>,
    ttl: Duration,
}

impl SqliteCache {
    /// Wraps an open connection, running migrations first.
    ///
    /// A zero `ttl` selects [`DEFAULT_CACHE_TTL`].
    ///
    /// # Errors
    ///
    /// Returns an error if migrations fail.
    pub fn new(conn: Connection, ttl: Duration) -> Result<Self> {
        run_migrations(&conn).context("database migration failed")?;
        let ttl = if ttl.is_zero() { DEFAULT_CACHE_TTL } else { ttl };
        Ok(Self {
            conn: Mutex::new(conn),
            ttl,
        })
    }

    /// Opens the cache database; see [`open_db`] for path resolution.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open(dir: Option<&PathBuf>, ttl: Duration) -> Result<Self> {
        Self::new(open_db(dir)?, ttl)
    }

    /// Configured time-to-live.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of live entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn len(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM response_cache WHERE expires_at > ?1",
                [now()],
                |row| row.get(0),
            )
            .context("failed to count cache entries")?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Returns `true` if no live entry remains.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Deletes expired rows and returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn purge_expired(&self) -> Result<usize> {
        let conn = self.lock()?;
        let removed = conn
            .execute("DELETE FROM response_cache WHERE expires_at <= ?1", [now()])
            .context("failed to purge expired cache entries")?;
        tracing::info!(removed = removed, "expired cache entries purged");
        Ok(removed)
    }

    /// Acquires the connection.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn
            .lock()
            .map_err(|_| CacheError::new("cache connection lock poisoned"))
    }

    /// Reads a live entry, deleting it if expired or unreadable.
    fn load(&self, key: &CacheKey) -> Result<Option<Value>> {
        let conn = self.lock()?;
        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT value, expires_at FROM response_cache WHERE key = ?1",
                [key.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .context("failed to query response_cache")?;

        let Some((text, expires_at)) = row else {
            return Ok(None);
        };

        if expires_at > now() {
            match serde_json::from_str(&text) {
                Ok(value) => return Ok(Some(value)),
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "unreadable cache row dropped");
                }
            }
        }

        conn.execute("DELETE FROM response_cache WHERE key = ?1", [key.as_str()])
            .context("failed to delete stale cache row")?;
        Ok(None)
    }

    /// Upserts an entry (last write wins).
    fn store(&self, key: &CacheKey, value: &Value) -> Result<()> {
        let text = serde_json::to_string(value).context("failed to serialize value")?;
        let stored_at = now();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let expires_at = stored_at.saturating_add(ttl);

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO response_cache (key, value, expires_at, stored_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                expires_at = excluded.expires_at,
                stored_at = excluded.stored_at",
            rusqlite::params![key.as_str(), text, expires_at, stored_at],
        )
        .context("failed to upsert response_cache row")?;
        Ok(())
    }
}

impl CacheStore for SqliteCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<Value>, CacheError> {
        self.load(key).map_err(|err| CacheError::new(format!("{err:#}")))
    }

    async fn set(&self, key: &CacheKey, value: Value) -> Result<(), CacheError> {
        self.store(key, &value)
            .map_err(|err| CacheError::new(format!("{err:#}")))
    }
}

/// Current Unix time in seconds.
fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
