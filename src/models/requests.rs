//! Request DTOs for the gateway API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::MAX_KEY_LENGTH;

/// Request body for storing a value (PUT /cache/entries)
#[derive(Debug, Clone, Deserialize)]
pub struct SetEntryRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: Value,
    /// TTL in milliseconds for this entry only
    #[serde(default)]
    pub ttl_ms: Option<u64>,
}

impl SetEntryRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            ));
        }
        None
    }
}

/// Request body for changing a category TTL (PUT /cache/ttl)
#[derive(Debug, Clone, Deserialize)]
pub struct SetTtlRequest {
    pub category: String,
    pub ttl_ms: u64,
}

impl SetTtlRequest {
    pub fn validate(&self) -> Option<String> {
        if self.category.trim().is_empty() {
            return Some("Category cannot be empty".to_string());
        }
        None
    }
}

/// Query string for DELETE /cache
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvalidateQuery {
    /// Only drop keys starting with this prefix; everything when absent
    pub prefix: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_entry_request_deserialize() {
        let json = r#"{"key": "companies", "value": [{"id": "acme"}]}"#;
        let req: SetEntryRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.key, "companies");
        assert_eq!(req.value, json!([{"id": "acme"}]));
        assert!(req.ttl_ms.is_none());
    }

    #[test]
    fn test_set_entry_request_with_ttl() {
        let json = r#"{"key": "companies", "value": null, "ttl_ms": 600000}"#;
        let req: SetEntryRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.ttl_ms, Some(600_000));
    }

    #[test]
    fn test_validate_empty_key() {
        let req = SetEntryRequest {
            key: "".to_string(),
            value: json!(1),
            ttl_ms: None,
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_valid_request() {
        let req = SetEntryRequest {
            key: "documents:acme".to_string(),
            value: json!([]),
            ttl_ms: Some(60_000),
        };
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_set_ttl_request_validate() {
        let json = r#"{"category": " ", "ttl_ms": 5}"#;
        let req: SetTtlRequest = serde_json::from_str(json).unwrap();
        assert!(req.validate().is_some());
    }
}
