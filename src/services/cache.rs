//! In-memory document cache
//!
//! Created empty at start-up, filled on demand, dropped with the process.
//! Entries never expire and are never evicted. Concurrent requests for the
//! same missing key share a single load; a failed load stores nothing.
//! Loads started with [`DocumentCache::get_or_spawn_load`] run on their own
//! task and fill the cache even when every caller has gone away.

use crate::types::{DocumentKey, RegstatsError, Result};
use moka::future::Cache;
use std::future::Future;

pub struct DocumentCache<V> {
    entries: Cache<DocumentKey, V>,
}

impl<V> DocumentCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            entries: Cache::builder().build(),
        }
    }

    /// Cached value for `key`, if one has been loaded
    pub async fn get(&self, key: &DocumentKey) -> Option<V> {
        self.entries.get(key).await
    }

    /// Return the cached value, or run `load` and cache its success.
    ///
    /// While `load` is pending, other callers for the same key wait on it
    /// instead of starting their own. An error is handed to every waiter and
    /// the key stays empty, so the next call loads again.
    pub async fn get_or_try_load<F>(&self, key: &DocumentKey, load: F) -> Result<V>
    where
        F: Future<Output = Result<V>>,
    {
        self.entries
            .try_get_with_by_ref(key, load)
            .await
            .map_err(|shared: std::sync::Arc<RegstatsError>| (*shared).clone())
    }

    /// Like [`DocumentCache::get_or_try_load`], but `load` runs on a spawned
    /// task that stores its own result.
    ///
    /// Once started, the load runs to completion even if every caller
    /// waiting on it is dropped.
    pub async fn get_or_spawn_load<F>(&self, key: &DocumentKey, load: F) -> Result<V>
    where
        F: Future<Output = Result<V>> + Send + 'static,
    {
        let entries = self.entries.clone();
        let owned = key.clone();

        self.get_or_try_load(key, async move {
            let task_key = owned.clone();
            let task = tokio::spawn(async move {
                let value = load.await?;
                entries.insert(task_key, value.clone()).await;
                Ok::<V, RegstatsError>(value)
            });

            task.await.map_err(|e| RegstatsError::Task {
                key: owned.to_string(),
                message: e.to_string(),
            })?
        })
        .await
    }

    /// Number of cached entries
    pub async fn len(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<V> Default for DocumentCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
