//! In-process key/value cache with per-entry expiry.
//!
//! Keys are namespaced as `{prefix}:{version}:{key}` so that bumping the
//! version of a stored shape invalidates every older entry without touching
//! them.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

/// Version used by the non-`_versioned` operations.
pub const DEFAULT_VERSION: u32 = 1;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires: Option<DateTime<Utc>>,
}

impl<V> Entry<V> {
    fn expired(&self) -> bool {
        self.expires.is_some_and(|expires| Utc::now() >= expires)
    }
}

/// A shareable in-memory cache.
///
/// Values are cloned in and out. Entries without a TTL never expire;
/// expired entries read as absent and are evicted on that read.
///
/// # Thread Safety
///
/// `Cache` is `Send + Sync` for `Send + Sync` values; wrap it in an `Arc`
/// to share it across tasks.
///
/// # Example
///
/// ```rust
/// use chrono::Duration;
/// use mailman_client::Cache;
///
/// # tokio_test::block_on(async {
/// let cache = Cache::new("accounts");
/// cache.set("anne", 42u64, Some(Duration::seconds(60))).await;
/// assert_eq!(cache.get("anne").await, Some(42));
/// # });
/// ```
pub struct Cache<V> {
    prefix: String,
    entries: RwLock<HashMap<String, Entry<V>>>,
}

impl<V: Clone> Cache<V> {
    /// Creates an empty cache whose keys are namespaced by `prefix`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the key prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Builds the full storage key for `key` at `version`.
    #[must_use]
    pub fn make_key(&self, key: &str, version: u32) -> String {
        format!("{}:{version}:{key}", self.prefix)
    }

    /// Returns the live value for `key`.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.get_versioned(key, DEFAULT_VERSION).await
    }

    /// Returns the live value for `key` at `version`.
    pub async fn get_versioned(&self, key: &str, version: u32) -> Option<V> {
        let full_key = self.make_key(key, version);
        {
            let entries = self.entries.read().await;
            match entries.get(&full_key) {
                None => {
                    tracing::debug!("Cache miss: {}", full_key);
                    return None;
                }
                Some(entry) if !entry.expired() => {
                    tracing::debug!("Cache hit: {}", full_key);
                    return Some(entry.value.clone());
                }
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        if entries.get(&full_key).is_some_and(Entry::expired) {
            entries.remove(&full_key);
        }
        tracing::debug!("Cache miss (expired): {}", full_key);
        None
    }

    /// Stores `value` under `key`; `None` means it never expires.
    pub async fn set(&self, key: &str, value: V, ttl: Option<Duration>) {
        self.set_versioned(key, value, ttl, DEFAULT_VERSION).await;
    }

    /// Stores `value` under `key` at `version`.
    pub async fn set_versioned(&self, key: &str, value: V, ttl: Option<Duration>, version: u32) {
        let full_key = self.make_key(key, version);
        let expires = ttl.map(|ttl| Utc::now() + ttl);
        self.entries
            .write()
            .await
            .insert(full_key, Entry { value, expires });
    }

    /// Returns the cached value for `key`, or runs `producer` and caches
    /// what it returns.
    ///
    /// # Errors
    ///
    /// Returns the producer's error; nothing is stored in that case.
    pub async fn get_or_set<F, Fut, E>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        producer: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.get_or_set_versioned(key, ttl, DEFAULT_VERSION, producer)
            .await
    }

    /// [`get_or_set`](Self::get_or_set) at `version`.
    ///
    /// # Errors
    ///
    /// Returns the producer's error; nothing is stored in that case.
    pub async fn get_or_set_versioned<F, Fut, E>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        version: u32,
        producer: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get_versioned(key, version).await {
            return Ok(value);
        }
        let value = producer().await?;
        self.set_versioned(key, value.clone(), ttl, version).await;
        Ok(value)
    }

    /// Removes `key`. Returns `true` if an entry was stored.
    pub async fn delete(&self, key: &str) -> bool {
        self.delete_versioned(key, DEFAULT_VERSION).await
    }

    /// Removes `key` at `version`.
    pub async fn delete_versioned(&self, key: &str, version: u32) -> bool {
        let full_key = self.make_key(key, version);
        self.entries.write().await.remove(&full_key).is_some()
    }

    /// Removes every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

impl<V> fmt::Debug for Cache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

// Verify Cache is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Cache<serde_json::Value>>();
};
