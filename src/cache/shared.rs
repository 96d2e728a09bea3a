//! Shared Cache Module
//!
//! Cloneable async handle around a `CacheStore`, providing get-or-fetch.
//!
//! The store lock is never held while a producer runs. `get_or_fetch` checks
//! the cache, releases the lock, awaits the producer and locks again to store
//! the result. Two callers can both miss before either raises the loading
//! flag, so duplicate fetches for a key are possible there. When a fetch is
//! already in flight and a stale value is still stored, the stale value is
//! served instead of fetching again. `get_or_fetch_coalesced` closes the gap
//! with a per-key lock.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::cache::store::validate_key;
use crate::cache::{CacheStats, CacheStore, EntryInfo};
use crate::error::{CacheError, Result};

// == Shared Cache ==
/// Thread-safe handle to one cache store. Clones share the same store.
#[derive(Debug, Clone)]
pub struct SharedCache {
    store: Arc<RwLock<CacheStore>>,
    /// Per-key locks used by `get_or_fetch_coalesced`
    key_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl SharedCache {
    pub fn new(store: CacheStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            key_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Direct access to the underlying store lock.
    pub fn store(&self) -> &Arc<RwLock<CacheStore>> {
        &self.store
    }

    // == Plain Operations ==
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.store.write().await.get(key)
    }

    pub async fn set(&self, key: &str, value: Value, ttl_override_ms: Option<u64>) -> Result<()> {
        self.store.write().await.set(key, value, ttl_override_ms)
    }

    pub async fn set_ttl(&self, category: &str, ttl_ms: u64) {
        self.store.write().await.set_ttl(category, ttl_ms);
    }

    pub async fn invalidate(&self, key: &str) -> bool {
        self.store.write().await.invalidate(key)
    }

    pub async fn invalidate_prefix(&self, prefix: &str) -> usize {
        self.store.write().await.invalidate_prefix(prefix)
    }

    /// Drops all entries and returns how many there were.
    pub async fn clear(&self) -> usize {
        self.store.write().await.clear()
    }

    pub async fn cleanup_expired(&self) -> usize {
        self.store.write().await.cleanup_expired()
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    pub async fn entries(&self) -> Vec<EntryInfo> {
        self.store.read().await.entries()
    }

    pub async fn is_loading(&self, key: &str) -> bool {
        self.store.read().await.is_loading(key)
    }

    // == Get Or Fetch ==
    /// Returns the cached value for `key`, or runs `producer` and caches its
    /// result.
    ///
    /// A fresh entry means `producer` is never called. On failure nothing is
    /// cached, the loading flag is cleared and the producer's error is
    /// returned as-is. No retry, no timeout.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: &str,
        producer: F,
    ) -> std::result::Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Value, E>>,
        E: From<CacheError>,
    {
        validate_key(key)?;

        {
            let mut store = self.store.write().await;
            if let Some(value) = store.get(key) {
                return Ok(value);
            }

            if store.is_loading(key) {
                if let Some(stale) = store.peek_any(key) {
                    debug!(key = %key, "Fetch in flight, serving stale value");
                    store.stats_mut().record_stale_served();
                    return Ok(stale);
                }
                debug!(key = %key, "Fetch in flight with nothing stored, fetching again");
            }

            store.mark_loading(key);
        }

        self.run_producer(key, producer).await
    }

    // == Get Or Fetch (Coalesced) ==
    /// Like `get_or_fetch`, but at most one producer per key runs at a time.
    ///
    /// Concurrent callers for the same key wait for the running fetch and
    /// return its cached result. If that fetch failed, the next waiter runs
    /// its own producer.
    pub async fn get_or_fetch_coalesced<F, Fut, E>(
        &self,
        key: &str,
        producer: F,
    ) -> std::result::Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Value, E>>,
        E: From<CacheError>,
    {
        validate_key(key)?;

        {
            let mut store = self.store.write().await;
            if let Some(value) = store.peek_fresh(key) {
                store.stats_mut().record_hit();
                return Ok(value);
            }
        }

        let key_lock = self.key_lock(key).await;
        let result = {
            let _guard = key_lock.lock().await;

            let cached = {
                let mut store = self.store.write().await;
                match store.peek_fresh(key) {
                    // Filled by the fetch this caller waited on
                    Some(value) => {
                        store.stats_mut().record_hit();
                        store.stats_mut().record_coalesced();
                        Some(value)
                    }
                    None => {
                        store.stats_mut().record_miss();
                        store.mark_loading(key);
                        None
                    }
                }
            };

            match cached {
                Some(value) => Ok(value),
                None => self.run_producer(key, producer).await,
            }
        };
        self.release_key_lock(key, key_lock).await;

        result
    }

    /// Awaits `producer` for a key already marked loading and records the
    /// outcome.
    async fn run_producer<F, Fut, E>(
        &self,
        key: &str,
        producer: F,
    ) -> std::result::Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Value, E>>,
        E: From<CacheError>,
    {
        let outcome = producer().await;

        let mut store = self.store.write().await;
        store.clear_loading(key);

        match outcome {
            Ok(value) => {
                store.set(key, value.clone(), None)?;
                store.stats_mut().record_fetch();
                debug!(key = %key, "Fetched and cached");
                Ok(value)
            }
            Err(err) => {
                store.stats_mut().record_fetch_failure();
                warn!(key = %key, "Fetch failed, nothing cached");
                Err(err)
            }
        }
    }

    async fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.key_locks.lock().await;
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drops the per-key lock once no other caller holds a clone of it.
    async fn release_key_lock(&self, key: &str, key_lock: Arc<Mutex<()>>) {
        let mut locks = self.key_locks.lock().await;
        // One reference in the map, one held here
        if Arc::strong_count(&key_lock) == 2 {
            locks.remove(key);
        }
    }
}
