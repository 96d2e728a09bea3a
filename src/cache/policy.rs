//! TTL Policy Module
//!
//! Maps key categories to maximum ages, with a default fallback.

use std::collections::HashMap;

use serde::Serialize;

/// Characters that end a key's category prefix.
const CATEGORY_SEPARATORS: [char; 3] = [':', '/', '?'];

// == TTL Policy ==
/// Category-to-TTL table supplied when the store is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TtlPolicy {
    /// Fallback TTL in milliseconds
    default_ttl_ms: u64,
    /// Per-category TTL in milliseconds
    categories: HashMap<String, u64>,
}

impl TtlPolicy {
    // == Constructor ==
    /// Creates a policy with only a default TTL.
    pub fn new(default_ttl_ms: u64) -> Self {
        Self {
            default_ttl_ms,
            categories: HashMap::new(),
        }
    }

    /// Builder-style category registration.
    pub fn with_category(mut self, category: impl Into<String>, ttl_ms: u64) -> Self {
        self.categories.insert(category.into(), ttl_ms);
        self
    }

    /// Creates a policy from a default and a category table.
    pub fn from_parts(default_ttl_ms: u64, categories: HashMap<String, u64>) -> Self {
        Self {
            default_ttl_ms,
            categories,
        }
    }

    // == Lookup ==
    /// Returns the TTL that applies to `key`.
    pub fn ttl_for(&self, key: &str) -> u64 {
        self.categories
            .get(category_of(key))
            .copied()
            .unwrap_or(self.default_ttl_ms)
    }

    /// Returns the fallback TTL.
    pub fn default_ttl_ms(&self) -> u64 {
        self.default_ttl_ms
    }

    /// Returns the configured categories.
    pub fn categories(&self) -> &HashMap<String, u64> {
        &self.categories
    }

    // == Update ==
    /// Sets the TTL for every key of `category`.
    pub fn set_ttl(&mut self, category: impl Into<String>, ttl_ms: u64) {
        self.categories.insert(category.into(), ttl_ms);
    }
}

/// Returns the category part of a key: everything before the first separator.
///
/// `documents:acme` and `documents/acme?page=2` both belong to `documents`;
/// `companies` is its own category.
pub fn category_of(key: &str) -> &str {
    key.split(CATEGORY_SEPARATORS).next().unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_of() {
        assert_eq!(category_of("companies"), "companies");
        assert_eq!(category_of("documents:acme"), "documents");
        assert_eq!(category_of("documents/acme/list"), "documents");
        assert_eq!(category_of("search?q=contract"), "search");
        assert_eq!(category_of(""), "");
    }

    #[test]
    fn test_default_applies_to_unknown_category() {
        let policy = TtlPolicy::new(300_000).with_category("companies", 600_000);

        assert_eq!(policy.ttl_for("companies"), 600_000);
        assert_eq!(policy.ttl_for("system_log"), 300_000);
    }

    #[test]
    fn test_category_applies_to_scoped_keys() {
        let policy = TtlPolicy::new(300_000).with_category("documents", 120_000);

        assert_eq!(policy.ttl_for("documents:acme"), 120_000);
        assert_eq!(policy.ttl_for("documents/globex?page=3"), 120_000);
    }

    #[test]
    fn test_set_ttl_overrides_category() {
        let mut policy = TtlPolicy::new(300_000).with_category("companies", 600_000);
        policy.set_ttl("companies", 1_000);
        policy.set_ttl("notifications", 5_000);

        assert_eq!(policy.ttl_for("companies"), 1_000);
        assert_eq!(policy.ttl_for("notifications:unread"), 5_000);
        assert_eq!(policy.default_ttl_ms(), 300_000);
    }
}
