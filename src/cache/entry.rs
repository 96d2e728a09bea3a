//! Cache Entry Module
//!
//! Defines the structure for individual cache entries and their staleness check.

use serde_json::Value;

// == Cache Entry ==
/// Represents a single cache entry with value and write metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// The stored value
    pub value: Value,
    /// Last write timestamp (Unix milliseconds)
    pub written_at: u64,
    /// TTL for this entry only, in milliseconds. None = use the store policy.
    pub ttl_override_ms: Option<u64>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry written at `now_ms`.
    pub fn new(value: Value, now_ms: u64, ttl_override_ms: Option<u64>) -> Self {
        Self {
            value,
            written_at: now_ms,
            ttl_override_ms,
        }
    }

    // == Age ==
    /// Milliseconds elapsed since the last write.
    ///
    /// A clock reading earlier than `written_at` counts as age 0.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.written_at)
    }

    // == Is Stale ==
    /// Checks whether the entry has outlived `ttl_ms`.
    ///
    /// Boundary condition: the entry is fresh while `age < ttl` and stale from
    /// the moment `age == ttl`.
    pub fn is_stale(&self, now_ms: u64, ttl_ms: u64) -> bool {
        self.age_ms(now_ms) >= ttl_ms
    }

    // == Time To Live ==
    /// Returns remaining freshness in milliseconds, 0 once stale.
    pub fn ttl_remaining_ms(&self, now_ms: u64, ttl_ms: u64) -> u64 {
        ttl_ms.saturating_sub(self.age_ms(now_ms))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new(json!({"name": "acme"}), 1_000, None);

        assert_eq!(entry.value, json!({"name": "acme"}));
        assert_eq!(entry.written_at, 1_000);
        assert!(entry.ttl_override_ms.is_none());
    }

    #[test]
    fn test_entry_fresh_before_ttl() {
        let entry = CacheEntry::new(json!(1), 1_000, None);

        assert!(!entry.is_stale(1_000, 500));
        assert!(!entry.is_stale(1_499, 500));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new(json!(1), 1_000, None);

        // Entry should be stale once age == ttl
        assert!(
            entry.is_stale(1_500, 500),
            "Entry should be stale at boundary"
        );
        assert!(entry.is_stale(9_999, 500));
    }

    #[test]
    fn test_zero_ttl_is_always_stale() {
        let entry = CacheEntry::new(json!(1), 1_000, None);
        assert!(entry.is_stale(1_000, 0));
    }

    #[test]
    fn test_clock_behind_write_time() {
        let entry = CacheEntry::new(json!(1), 5_000, None);

        assert_eq!(entry.age_ms(4_000), 0);
        assert!(!entry.is_stale(4_000, 10));
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = CacheEntry::new(json!(1), 1_000, None);

        assert_eq!(entry.ttl_remaining_ms(1_000, 10_000), 10_000);
        assert_eq!(entry.ttl_remaining_ms(4_000, 10_000), 7_000);
        assert_eq!(entry.ttl_remaining_ms(20_000, 10_000), 0);
    }
}
