//! Cache adapter contract and the built-in in-memory store.
#![allow(clippy::future_not_send)]

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::key::CacheKey;

/// Default time-to-live of the built-in cache (5 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Fault raised by a cache backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cache backend error: {message}")]
#[allow(clippy::module_name_repetitions)]
pub struct CacheError {
    message: String,
}

impl CacheError {
    /// Creates a cache error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Cache capability consumed by the request pipeline.
///
/// Implementations own storage, eviction and expiry. Synchronous backends
/// simply return without awaiting anything.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(CacheStore: Send)]
pub trait LocalCacheStore {
    /// Returns the cached value, or `None` on a miss.
    ///
    /// # Errors
    ///
    /// Returns an error only when the backend itself faults.
    async fn get(&self, key: &CacheKey) -> Result<Option<Value>, CacheError>;

    /// Stores `value` under `key`, overwriting any previous entry.
    ///
    /// # Errors
    ///
    /// Returns an error only when the backend itself faults.
    async fn set(&self, key: &CacheKey, value: Value) -> Result<(), CacheError>;
}

/// A stored value and its expiry deadline (`None` = never).
#[derive(Debug)]
struct MemoryEntry {
    value: Value,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| now < deadline)
    }
}

/// Time-expiring in-memory cache.
///
/// Every entry expires `ttl` after it was written. There is no size bound;
/// expired entries are dropped when read or by [`MemoryCache::purge_expired`].
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct MemoryCache {
    ttl: Duration,
    entries: RwLock<HashMap<CacheKey, MemoryEntry>>,
}

impl MemoryCache {
    /// Creates a cache whose entries live for `ttl`.
    ///
    /// A zero `ttl` selects [`DEFAULT_CACHE_TTL`].
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let ttl = if ttl.is_zero() { DEFAULT_CACHE_TTL } else { ttl };
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Configured time-to-live.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.is_live(now))
            .count()
    }

    /// Returns `true` if no live entry remains.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drops expired entries and returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.is_live(now));
        before.saturating_sub(entries.len())
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl CacheStore for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<Value>, CacheError> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if entry.is_live(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|e| !e.is_live(now)) {
            entries.remove(key);
            tracing::debug!(key = %key, "expired cache entry dropped");
        }
        Ok(None)
    }

    async fn set(&self, key: &CacheKey, value: Value) -> Result<(), CacheError> {
        let expires_at = Instant::now().checked_add(self.ttl);
        self.entries
            .write()
            .await
            .insert(key.clone(), MemoryEntry { value, expires_at });
        Ok(())
    }
}
