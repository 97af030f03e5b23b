//! Cache Index Module
//!
//! Catalog of every live cache entry, persisted as a single store record.
//! Used for enumeration, statistics, bulk clears and size-bounded retention
//! without scanning the store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cache::{CacheKey, Params};

// == Index Entry ==
/// Lightweight record of one cached response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub cache_key: CacheKey,
    pub endpoint: String,
    #[serde(default)]
    pub params: Params,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
}

impl IndexEntry {
    pub fn new(cache_key: CacheKey, endpoint: impl Into<String>, params: Params, created_at: u64) -> Self {
        Self {
            cache_key,
            endpoint: endpoint.into(),
            params,
            created_at,
        }
    }
}

// == Cache Index ==
/// Ordered list of index entries.
///
/// Entries are kept in write order:
/// - Front = written first
/// - Back = written last
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheIndex {
    entries: Vec<IndexEntry>,
}

impl CacheIndex {
    // == Constructor ==
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    // == Upsert ==
    /// Records a write, replacing any prior entry for the same key.
    ///
    /// The entry moves to the back regardless of where the old one sat.
    pub fn upsert(&mut self, entry: IndexEntry) {
        self.remove(&entry.cache_key);
        self.entries.push(entry);
    }

    // == Remove ==
    /// Removes a key from the index. Returns whether it was present.
    pub fn remove(&mut self, key: &CacheKey) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| &e.cache_key != key);
        self.entries.len() != before
    }

    // == Evict Overflow ==
    /// Trims the index down to the `max` most recent entries.
    ///
    /// Entries are ranked by `created_at`; equal timestamps keep their write
    /// order (the sort is stable). Returns the evicted entries, oldest first.
    pub fn evict_overflow(&mut self, max: usize) -> Vec<IndexEntry> {
        if self.entries.len() <= max {
            return Vec::new();
        }

        self.entries.sort_by_key(|e| e.created_at);
        let overflow = self.entries.len() - max;
        self.entries.drain(..overflow).collect()
    }

    // == Drain Endpoint ==
    /// Removes and returns every entry recorded for `endpoint`.
    pub fn drain_endpoint(&mut self, endpoint: &str) -> Vec<IndexEntry> {
        let (drained, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| e.endpoint == endpoint);
        self.entries = kept;
        drained
    }

    // == Endpoint Counts ==
    /// Number of entries per endpoint.
    pub fn endpoint_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.endpoint.clone()).or_insert(0) += 1;
        }
        counts
    }

    #[cfg(test)]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.iter().any(|e| &e.cache_key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> Vec<IndexEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<IndexEntry>> for CacheIndex {
    fn from(entries: Vec<IndexEntry>) -> Self {
        Self { entries }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::params;

    fn entry(endpoint: &str, symbol: &str, created_at: u64) -> IndexEntry {
        let p = params([("symbol", symbol)]);
        IndexEntry::new(CacheKey::derive(endpoint, &p), endpoint, p, created_at)
    }

    fn key(endpoint: &str, symbol: &str) -> CacheKey {
        CacheKey::derive(endpoint, &params([("symbol", symbol)]))
    }

    #[test]
    fn test_index_new() {
        let index = CacheIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn test_upsert_new_keys() {
        let mut index = CacheIndex::new();

        index.upsert(entry("COMPANY_OVERVIEW", "IBM", 1));
        index.upsert(entry("COMPANY_OVERVIEW", "AAPL", 2));

        assert_eq!(index.len(), 2);
        assert!(index.contains(&key("COMPANY_OVERVIEW", "IBM")));
    }

    #[test]
    fn test_upsert_replaces_existing_key() {
        let mut index = CacheIndex::new();

        index.upsert(entry("COMPANY_OVERVIEW", "IBM", 1));
        index.upsert(entry("COMPANY_OVERVIEW", "AAPL", 2));
        index.upsert(entry("COMPANY_OVERVIEW", "IBM", 3));

        assert_eq!(index.len(), 2);
        let last = index.iter().last().unwrap();
        assert_eq!(last.cache_key, key("COMPANY_OVERVIEW", "IBM"));
        assert_eq!(last.created_at, 3);
    }

    #[test]
    fn test_remove() {
        let mut index = CacheIndex::new();
        index.upsert(entry("COMPANY_OVERVIEW", "IBM", 1));

        assert!(index.remove(&key("COMPANY_OVERVIEW", "IBM")));
        assert!(!index.remove(&key("COMPANY_OVERVIEW", "IBM")));
        assert!(index.is_empty());
    }

    #[test]
    fn test_evict_overflow_noop_within_bound() {
        let mut index = CacheIndex::new();
        index.upsert(entry("A", "1", 1));
        index.upsert(entry("A", "2", 2));

        assert!(index.evict_overflow(2).is_empty());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_evict_overflow_removes_oldest() {
        let mut index = CacheIndex::new();
        // Written out of timestamp order
        index.upsert(entry("A", "b", 20));
        index.upsert(entry("A", "a", 10));
        index.upsert(entry("A", "d", 40));
        index.upsert(entry("A", "c", 30));

        let evicted = index.evict_overflow(2);

        let evicted: Vec<_> = evicted.iter().map(|e| e.created_at).collect();
        assert_eq!(evicted, vec![10, 20]);
        let kept: Vec<_> = index.iter().map(|e| e.created_at).collect();
        assert_eq!(kept, vec![30, 40]);
    }

    #[test]
    fn test_evict_overflow_ties_keep_write_order() {
        let mut index = CacheIndex::new();
        index.upsert(entry("A", "first", 5));
        index.upsert(entry("A", "second", 5));
        index.upsert(entry("A", "third", 5));

        let evicted = index.evict_overflow(1);

        assert_eq!(evicted[0].cache_key, key("A", "first"));
        assert_eq!(evicted[1].cache_key, key("A", "second"));
        assert!(index.contains(&key("A", "third")));
    }

    #[test]
    fn test_drain_endpoint() {
        let mut index = CacheIndex::new();
        index.upsert(entry("COMPANY_OVERVIEW", "IBM", 1));
        index.upsert(entry("TOP_GAINERS_LOSERS", "", 2));
        index.upsert(entry("COMPANY_OVERVIEW", "AAPL", 3));

        let drained = index.drain_endpoint("COMPANY_OVERVIEW");

        assert_eq!(drained.len(), 2);
        assert_eq!(index.len(), 1);
        assert_eq!(index.iter().next().unwrap().endpoint, "TOP_GAINERS_LOSERS");
    }

    #[test]
    fn test_endpoint_counts() {
        let mut index = CacheIndex::new();
        index.upsert(entry("COMPANY_OVERVIEW", "IBM", 1));
        index.upsert(entry("COMPANY_OVERVIEW", "AAPL", 2));
        index.upsert(entry("SYMBOL_SEARCH", "tes", 3));

        let counts = index.endpoint_counts();
        assert_eq!(counts.get("COMPANY_OVERVIEW"), Some(&2));
        assert_eq!(counts.get("SYMBOL_SEARCH"), Some(&1));
        assert_eq!(counts.get("TOP_GAINERS_LOSERS"), None);
    }

    #[test]
    fn test_serialized_as_array() {
        let mut index = CacheIndex::new();
        index.upsert(entry("COMPANY_OVERVIEW", "IBM", 42));

        let json = serde_json::to_value(&index).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["cacheKey"], "@stockwatch_cache_COMPANY_OVERVIEW_symbol:IBM");
        assert_eq!(json[0]["createdAt"], 42);

        let back: CacheIndex = serde_json::from_value(json).unwrap();
        assert_eq!(back, index);
    }
}
