//! Cache Store Module
//!
//! Main cache engine: HashMap storage with write timestamps, TTL policy and
//! loading flags.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheEntry, CacheStats, Clock, SystemClock, TtlPolicy, MAX_KEY_LENGTH};
use crate::error::{CacheError, Result};

// == Entry Info ==
/// Point-in-time view of one entry, for inspection endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryInfo {
    pub key: String,
    /// Last write timestamp (Unix milliseconds)
    pub written_at: u64,
    pub age_ms: u64,
    /// TTL that applies to this entry right now
    pub ttl_ms: u64,
    pub ttl_remaining_ms: u64,
    pub stale: bool,
    pub loading: bool,
}

// == Cache Store ==
/// Key/value storage with TTL-based staleness.
///
/// Stale entries stay in the map until `invalidate`, `clear` or
/// `cleanup_expired` removes them; `get` just stops returning them.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// In-flight fetch count per key
    loading: HashMap<String, usize>,
    /// TTL configuration
    policy: TtlPolicy,
    /// Performance statistics
    stats: CacheStats,
    /// Time source for write stamps and staleness checks
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore reading the system clock.
    pub fn new(policy: TtlPolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    /// Creates a new CacheStore with an explicit time source.
    pub fn with_clock(policy: TtlPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            loading: HashMap::new(),
            policy,
            stats: CacheStats::new(),
            clock,
        }
    }

    // == Get ==
    /// Retrieves a value if it exists and is still fresh.
    ///
    /// A stale entry is reported as absent but left in place.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        match self.peek_fresh(key) {
            Some(value) => {
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Like `get` but without touching statistics.
    pub fn peek_fresh(&self, key: &str) -> Option<Value> {
        let entry = self.entries.get(key)?;
        let ttl = self.effective_ttl(key, entry);
        if entry.is_stale(self.clock.now_ms(), ttl) {
            None
        } else {
            Some(entry.value.clone())
        }
    }

    /// Returns the physically stored value, fresh or stale.
    pub fn peek_any(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Set ==
    /// Stores a value stamped with the current time.
    ///
    /// `ttl_override_ms` applies to this entry only; the policy is unchanged.
    /// Overwriting an existing key resets its timestamp and override.
    pub fn set(&mut self, key: &str, value: Value, ttl_override_ms: Option<u64>) -> Result<()> {
        validate_key(key)?;

        let entry = CacheEntry::new(value, self.clock.now_ms(), ttl_override_ms);
        self.entries.insert(key.to_string(), entry);
        self.stats.total_entries = self.entries.len();

        Ok(())
    }

    // == TTL Policy ==
    /// Changes the TTL of every key in `category` that has no override.
    pub fn set_ttl(&mut self, category: &str, ttl_ms: u64) {
        self.policy.set_ttl(category, ttl_ms);
    }

    /// Returns the TTL the policy assigns to `key`.
    pub fn ttl_for(&self, key: &str) -> u64 {
        self.policy.ttl_for(key)
    }

    pub fn policy(&self) -> &TtlPolicy {
        &self.policy
    }

    // == Invalidate ==
    /// Removes an entry. Missing keys are a no-op.
    ///
    /// Returns whether an entry was removed.
    pub fn invalidate(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.stats.record_invalidations(1);
            self.stats.total_entries = self.entries.len();
        }
        removed
    }

    /// Removes every entry whose key starts with `prefix`.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate_prefix(&mut self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before - self.entries.len();

        self.stats.record_invalidations(removed);
        self.stats.total_entries = self.entries.len();
        removed
    }

    // == Clear ==
    /// Drops all entries and returns how many there were.
    ///
    /// Policy and counters are kept. Loading flags are kept too, so fetches
    /// already in flight still lower only their own flag when they finish.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.stats.total_entries = 0;
        removed
    }

    // == Cleanup Expired ==
    /// Removes all stale entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let policy = &self.policy;

        let before = self.entries.len();
        self.entries.retain(|key, entry| {
            let ttl = entry
                .ttl_override_ms
                .unwrap_or_else(|| policy.ttl_for(key));
            !entry.is_stale(now, ttl)
        });
        let count = before - self.entries.len();

        self.stats.record_expired(count);
        self.stats.total_entries = self.entries.len();
        count
    }

    // == Loading Flags ==
    /// Raises the loading flag for `key`. Nested calls stack.
    pub fn mark_loading(&mut self, key: &str) {
        *self.loading.entry(key.to_string()).or_insert(0) += 1;
    }

    /// Lowers one level of the loading flag for `key`.
    pub fn clear_loading(&mut self, key: &str) {
        if let Some(count) = self.loading.get_mut(key) {
            *count -= 1;
            if *count == 0 {
                self.loading.remove(key);
            }
        }
    }

    pub fn is_loading(&self, key: &str) -> bool {
        self.loading.contains_key(key)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.total_entries = self.entries.len();
        stats.loading = self.loading.len();
        stats
    }

    /// Mutable access for callers that record fetch outcomes.
    pub(crate) fn stats_mut(&mut self) -> &mut CacheStats {
        &mut self.stats
    }

    // == Inspection ==
    /// Snapshot of every stored entry, sorted by key.
    pub fn entries(&self) -> Vec<EntryInfo> {
        let now = self.clock.now_ms();
        let mut infos: Vec<EntryInfo> = self
            .entries
            .iter()
            .map(|(key, entry)| {
                let ttl_ms = self.effective_ttl(key, entry);
                EntryInfo {
                    key: key.clone(),
                    written_at: entry.written_at,
                    age_ms: entry.age_ms(now),
                    ttl_ms,
                    ttl_remaining_ms: entry.ttl_remaining_ms(now, ttl_ms),
                    stale: entry.is_stale(now, ttl_ms),
                    loading: self.is_loading(key),
                }
            })
            .collect();
        infos.sort_by(|a, b| a.key.cmp(&b.key));
        infos
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` is physically stored, regardless of freshness.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn effective_ttl(&self, key: &str, entry: &CacheEntry) -> u64 {
        entry
            .ttl_override_ms
            .unwrap_or_else(|| self.policy.ttl_for(key))
    }
}

// == Key Validation ==
/// Rejects keys that cannot name an entry.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("Key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidKey(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}
