//! Cache Entry Module
//!
//! Defines the persisted record for one cached response and its freshness rules.

use std::time::Duration;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::cache::Params;

// == Cache Entry ==
/// A cached response as persisted in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// The cached payload
    pub data: Value,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Time-to-live in milliseconds
    pub ttl: u64,
    /// Logical endpoint that produced the payload
    pub endpoint: String,
    /// Parameters of the original request
    #[serde(default)]
    pub params: Params,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry written at `now_ms`.
    ///
    /// # Arguments
    /// * `data` - The payload to store
    /// * `endpoint` - Logical endpoint identifier
    /// * `params` - Request parameters
    /// * `ttl` - How long the entry stays fresh
    /// * `now_ms` - Write time in Unix milliseconds
    pub fn new(
        data: Value,
        endpoint: impl Into<String>,
        params: Params,
        ttl: Duration,
        now_ms: u64,
    ) -> Self {
        Self {
            data,
            created_at: now_ms,
            ttl: ttl.as_millis() as u64,
            endpoint: endpoint.into(),
            params,
        }
    }

    // == Expiry ==
    /// Unix millisecond at which the entry turns stale.
    pub fn expires_at(&self) -> u64 {
        self.created_at.saturating_add(self.ttl)
    }

    /// Checks freshness against `now_ms`.
    ///
    /// An entry is fresh while `now < created_at + ttl`; it is stale from the
    /// expiry instant onwards.
    pub fn is_fresh_at(&self, now_ms: u64) -> bool {
        now_ms < self.expires_at()
    }

    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        !self.is_fresh_at(now_ms)
    }

    // == Decode ==
    /// Deserializes the payload into `T`.
    pub fn decode<T: DeserializeOwned>(self) -> serde_json::Result<T> {
        serde_json::from_value(self.data)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::params;
    use serde_json::json;

    fn entry(ttl_ms: u64, now_ms: u64) -> CacheEntry {
        CacheEntry::new(
            json!({"price": "1.0"}),
            "COMPANY_OVERVIEW",
            params([("symbol", "IBM")]),
            Duration::from_millis(ttl_ms),
            now_ms,
        )
    }

    #[test]
    fn test_entry_creation() {
        let entry = entry(60_000, 1_000);

        assert_eq!(entry.created_at, 1_000);
        assert_eq!(entry.ttl, 60_000);
        assert_eq!(entry.expires_at(), 61_000);
        assert_eq!(entry.endpoint, "COMPANY_OVERVIEW");
    }

    #[test]
    fn test_entry_freshness() {
        let entry = entry(100, 1_000);

        assert!(entry.is_fresh_at(1_000));
        assert!(entry.is_fresh_at(1_099));
        assert!(entry.is_expired_at(1_200));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        // Stale exactly at created_at + ttl
        let entry = entry(100, 1_000);
        assert!(entry.is_expired_at(1_100), "Entry should be expired at boundary");
    }

    #[test]
    fn test_persisted_field_names() {
        let json = serde_json::to_value(entry(5, 7)).unwrap();

        assert_eq!(json["createdAt"], 7);
        assert_eq!(json["ttl"], 5);
        assert_eq!(json["endpoint"], "COMPANY_OVERVIEW");
        assert_eq!(json["params"]["symbol"], "IBM");
        assert_eq!(json["data"]["price"], "1.0");
    }

    #[test]
    fn test_decode_payload() {
        #[derive(Deserialize)]
        struct Quote {
            price: String,
        }

        let quote: Quote = entry(5, 7).decode().unwrap();
        assert_eq!(quote.price, "1.0");
    }

    #[test]
    fn test_missing_params_defaults_to_empty() {
        let raw = r#"{"data":[1,2],"createdAt":1,"ttl":2,"endpoint":"TOP_GAINERS_LOSERS"}"#;
        let entry: CacheEntry = serde_json::from_str(raw).unwrap();
        assert!(entry.params.is_empty());
    }
}
