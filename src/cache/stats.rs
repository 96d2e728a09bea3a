//! Cache Statistics Module
//!
//! Tracks cache activity: lookups, fetches and removals.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups answered with a fresh value
    pub hits: u64,
    /// Lookups that found nothing fresh
    pub misses: u64,
    /// Producer calls that completed successfully
    pub fetches: u64,
    /// Producer calls that failed
    pub fetch_failures: u64,
    /// Stale values handed out while another fetch was in flight
    pub stale_served: u64,
    /// Callers that waited on another caller's fetch and reused its result
    pub coalesced: u64,
    /// Entries removed by expiry cleanup
    pub expired_removed: u64,
    /// Entries removed by invalidation
    pub invalidations: u64,
    /// Current number of entries in the cache, stale ones included
    pub total_entries: usize,
    /// Keys with a fetch currently in flight
    pub loading: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_fetch(&mut self) {
        self.fetches += 1;
    }

    pub fn record_fetch_failure(&mut self) {
        self.fetch_failures += 1;
    }

    pub fn record_stale_served(&mut self) {
        self.stale_served += 1;
    }

    pub fn record_coalesced(&mut self) {
        self.coalesced += 1;
    }

    pub fn record_expired(&mut self, count: usize) {
        self.expired_removed += count as u64;
    }

    pub fn record_invalidations(&mut self, count: usize) {
        self.invalidations += count as u64;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.fetches, 0);
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_hit_rate_no_lookups() {
        let stats = CacheStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();

        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_removal_counters_accumulate() {
        let mut stats = CacheStats::new();
        stats.record_expired(3);
        stats.record_expired(2);
        stats.record_invalidations(4);

        assert_eq!(stats.expired_removed, 5);
        assert_eq!(stats.invalidations, 4);
    }

    #[test]
    fn test_stats_serialize() {
        let mut stats = CacheStats::new();
        stats.record_fetch();
        stats.record_fetch_failure();

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["fetches"], 1);
        assert_eq!(json["fetch_failures"], 1);
        assert_eq!(json["loading"], 0);
    }
}
