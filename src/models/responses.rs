//! Response DTOs for the HTTP surface
//!
//! Data responses are `Fetched<T>` serialized as-is; these cover health,
//! maintenance and error bodies.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cache::{CacheStats, IndexEntry};

/// Response body for `GET /cache/stats`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_entries: usize,
    pub max_size: usize,
    pub endpoints: BTreeMap<String, usize>,
    /// Share of capacity in use, rounded to a whole percent
    pub usage_percent: u32,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        let usage_percent = stats.usage_percent();
        Self {
            total_entries: stats.total_entries,
            max_size: stats.max_size,
            endpoints: stats.endpoints,
            usage_percent,
        }
    }
}

/// Response body for `GET /cache/entries`
#[derive(Debug, Clone, Serialize)]
pub struct EntriesResponse {
    pub count: usize,
    pub entries: Vec<IndexEntry>,
}

impl EntriesResponse {
    pub fn new(entries: Vec<IndexEntry>) -> Self {
        Self {
            count: entries.len(),
            entries,
        }
    }
}

/// Response body for cache sweeps and clears
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Success message
    pub message: String,
    /// Number of entries removed
    pub removed: usize,
}

impl ClearResponse {
    pub fn cleaned(removed: usize) -> Self {
        Self {
            message: format!("Removed {} expired entries", removed),
            removed,
        }
    }

    pub fn cleared(removed: usize) -> Self {
        Self {
            message: format!("Cleared {} entries", removed),
            removed,
        }
    }

    pub fn cleared_endpoint(endpoint: &str, removed: usize) -> Self {
        Self {
            message: format!("Cleared {} entries for {}", removed, endpoint),
            removed,
        }
    }
}

/// Response body for `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
