//! Cache Statistics Module
//!
//! Summarizes the cache index: entry count, capacity and per-endpoint breakdown.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cache::CacheIndex;

// == Cache Stats ==
/// Snapshot of the cache index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Current number of indexed entries
    pub total_entries: usize,
    /// Configured maximum number of entries
    pub max_size: usize,
    /// Entry count per endpoint
    pub endpoints: BTreeMap<String, usize>,
}

impl CacheStats {
    // == Constructor ==
    /// Creates empty statistics for a cache bounded at `max_size`.
    pub fn empty(max_size: usize) -> Self {
        Self {
            max_size,
            ..Self::default()
        }
    }

    /// Builds statistics from an index snapshot.
    pub fn from_index(index: &CacheIndex, max_size: usize) -> Self {
        Self {
            total_entries: index.len(),
            max_size,
            endpoints: index.endpoint_counts(),
        }
    }

    // == Usage ==
    /// Share of capacity in use, rounded to a whole percent.
    ///
    /// Returns 0 for a zero-capacity cache.
    pub fn usage_percent(&self) -> u32 {
        if self.max_size == 0 {
            0
        } else {
            ((self.total_entries as f64 / self.max_size as f64) * 100.0).round() as u32
        }
    }
}
