//! Expiring Cache Module
//!
//! Main cache engine: per-endpoint TTLs on top of a persistent key/value
//! store, with an index record that bounds the number of retained entries.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::{
    CacheEntry, CacheIndex, CacheKey, CacheStats, Clock, IndexEntry, KeyValueStore, Params,
    SystemClock, INDEX_KEY,
};
use crate::config::CacheConfig;
use crate::error::Result;

// == Expiring Cache ==
/// Response cache keyed by `(endpoint, params)`.
///
/// Reads are fail-open: a store or decode failure is logged and reported as
/// a miss. Writes report failures to the caller.
pub struct ExpiringCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
    /// Serializes read-modify-write cycles on the index record
    index_lock: Mutex<()>,
}

impl ExpiringCache {
    // == Constructor ==
    /// Creates a cache over `store` using the wall clock.
    pub fn new(store: Arc<dyn KeyValueStore>, config: CacheConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    /// Creates a cache reading time from `clock`.
    pub fn with_clock(
        store: Arc<dyn KeyValueStore>,
        config: CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            clock,
            config,
            index_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Get ==
    /// Returns the cached value if present and fresh.
    ///
    /// A stale entry is removed (store and index) and reported as absent.
    ///
    /// # Arguments
    /// * `endpoint` - Logical endpoint identifier
    /// * `params` - Request parameters
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str, params: &Params) -> Option<T> {
        let key = CacheKey::derive(endpoint, params);

        let raw = match self.store.get_item(key.as_str()).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("Cache MISS for {}: {:?}", endpoint, params);
                self.forget_orphan(&key).await;
                return None;
            }
            Err(e) => {
                warn!("Error reading from cache ({}): {}", key, e);
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Undecodable cache record {}: {}", key, e);
                return None;
            }
        };

        if entry.is_expired_at(self.clock.now_ms()) {
            debug!("Cache EXPIRED for {}: {:?}", endpoint, params);
            if let Err(e) = self.remove_key(&key).await {
                warn!("Error removing expired entry {}: {}", key, e);
            }
            return None;
        }

        match entry.decode() {
            Ok(value) => {
                debug!("Cache HIT for {}: {:?}", endpoint, params);
                Some(value)
            }
            Err(e) => {
                warn!("Cached payload for {} has unexpected shape: {}", key, e);
                None
            }
        }
    }

    // == Get Stale ==
    /// Returns the cached value regardless of freshness.
    ///
    /// Never deletes anything and never touches the index.
    pub async fn get_stale<T: DeserializeOwned>(&self, endpoint: &str, params: &Params) -> Option<T> {
        let key = CacheKey::derive(endpoint, params);

        let raw = match self.store.get_item(key.as_str()).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Error getting stale cache ({}): {}", key, e);
                return None;
            }
        };

        serde_json::from_str::<CacheEntry>(&raw)
            .and_then(|entry| entry.decode::<T>())
            .map_err(|e| warn!("Undecodable stale record {}: {}", key, e))
            .ok()
    }

    // == Set ==
    /// Stores `data` with the TTL configured for `endpoint`.
    ///
    /// Replaces any previous entry for the same key, then trims the index
    /// back to `max_entries` by evicting the oldest entries.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        params: &Params,
        data: &T,
    ) -> Result<()> {
        let key = CacheKey::derive(endpoint, params);
        let ttl = self.config.ttl_for(endpoint);
        let now = self.clock.now_ms();

        let entry = CacheEntry::new(serde_json::to_value(data)?, endpoint, params.clone(), ttl, now);
        self.store
            .set_item(key.as_str(), serde_json::to_string(&entry)?)
            .await?;

        let _guard = self.index_lock.lock().await;
        let mut index = self.read_index().await?;
        index.upsert(IndexEntry::new(key, endpoint, params.clone(), now));

        info!(
            "Cache SET for {}: {:?} ({} minutes)",
            endpoint,
            params,
            ttl.as_secs() / 60
        );

        self.evict_overflow(&mut index).await;
        self.save_index(&index).await
    }

    // == Remove ==
    /// Deletes the entry for `(endpoint, params)`. Absence is not an error.
    pub async fn remove(&self, endpoint: &str, params: &Params) -> Result<()> {
        let key = CacheKey::derive(endpoint, params);
        self.remove_key(&key).await?;
        debug!("Cache REMOVED for {}: {:?}", endpoint, params);
        Ok(())
    }

    // == Remove Expired ==
    /// Sweeps the index and removes every stale entry.
    ///
    /// Undecodable records count as stale. Index entries whose store record
    /// has disappeared are pruned without being counted.
    ///
    /// Returns the number of entries removed.
    pub async fn remove_expired(&self) -> Result<usize> {
        let _guard = self.index_lock.lock().await;
        let index = self.read_index().await?;
        let before = index.len();
        let now = self.clock.now_ms();

        let mut removed = 0;
        let mut kept = Vec::with_capacity(before);

        for entry in index.into_entries() {
            let fresh = match self.store.get_item(entry.cache_key.as_str()).await {
                Ok(Some(raw)) => serde_json::from_str::<CacheEntry>(&raw)
                    .map(|cached| cached.is_fresh_at(now))
                    .unwrap_or(false),
                // Orphaned index entry
                Ok(None) => continue,
                Err(e) => {
                    warn!("Skipping {} during sweep: {}", entry.cache_key, e);
                    true
                }
            };

            if fresh {
                kept.push(entry);
                continue;
            }

            match self.store.remove_item(entry.cache_key.as_str()).await {
                Ok(()) => removed += 1,
                Err(e) => {
                    warn!("Error removing expired entry {}: {}", entry.cache_key, e);
                    kept.push(entry);
                }
            }
        }

        if kept.len() != before {
            self.save_index(&CacheIndex::from(kept)).await?;
        }

        if removed > 0 {
            info!("Removed {} expired cache entries", removed);
        }
        Ok(removed)
    }

    // == Clear Endpoint ==
    /// Removes every entry recorded for `endpoint`.
    ///
    /// Returns the number of entries removed.
    pub async fn clear_endpoint(&self, endpoint: &str) -> Result<usize> {
        let _guard = self.index_lock.lock().await;
        let mut index = self.read_index().await?;
        let drained = index.drain_endpoint(endpoint);

        for entry in &drained {
            self.store.remove_item(entry.cache_key.as_str()).await?;
        }
        if !drained.is_empty() {
            self.save_index(&index).await?;
        }

        info!("Cleared {} cache entries for {}", drained.len(), endpoint);
        Ok(drained.len())
    }

    // == Clear All ==
    /// Removes every tracked entry and the index record itself.
    ///
    /// Returns the number of entries removed.
    pub async fn clear_all(&self) -> Result<usize> {
        let _guard = self.index_lock.lock().await;
        let index = self.read_index().await?;

        for entry in index.iter() {
            self.store.remove_item(entry.cache_key.as_str()).await?;
        }
        self.store.remove_item(INDEX_KEY).await?;

        info!("Cleared all cache data ({} entries)", index.len());
        Ok(index.len())
    }

    // == Stats ==
    /// Summarizes the index. Never reads cached payloads.
    pub async fn stats(&self) -> CacheStats {
        CacheStats::from_index(&self.snapshot().await, self.config.max_entries)
    }

    // == Entries ==
    /// Lists every indexed entry in index order.
    pub async fn entries(&self) -> Vec<IndexEntry> {
        self.snapshot().await.into_entries()
    }

    // == Internals ==

    /// Fail-open index read for the read-only operations.
    async fn snapshot(&self) -> CacheIndex {
        self.read_index().await.unwrap_or_else(|e| {
            warn!("Error getting cache index: {}", e);
            CacheIndex::new()
        })
    }

    /// Reads the index record.
    ///
    /// A missing record is an empty index. An undecodable one is discarded.
    async fn read_index(&self) -> Result<CacheIndex> {
        let Some(raw) = self.store.get_item(INDEX_KEY).await? else {
            return Ok(CacheIndex::new());
        };

        Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Discarding corrupt cache index: {}", e);
            CacheIndex::new()
        }))
    }

    async fn save_index(&self, index: &CacheIndex) -> Result<()> {
        self.store
            .set_item(INDEX_KEY, serde_json::to_string(index)?)
            .await?;
        Ok(())
    }

    /// Removes the overflow from `index` and deletes the matching records.
    /// Entries whose record could not be deleted are kept at the front.
    /// Caller holds the index lock.
    async fn evict_overflow(&self, index: &mut CacheIndex) {
        let evicted = index.evict_overflow(self.config.max_entries);
        if evicted.is_empty() {
            return;
        }

        let total = evicted.len();
        let mut failed = Vec::new();
        for entry in evicted {
            if let Err(e) = self.store.remove_item(entry.cache_key.as_str()).await {
                warn!("Error evicting {}: {}", entry.cache_key, e);
                failed.push(entry);
            }
        }

        info!("Cache cleanup: removed {} old entries", total - failed.len());

        // Records still in the store stay tracked; the next write retries them
        if !failed.is_empty() {
            failed.extend(std::mem::take(index).into_entries());
            *index = CacheIndex::from(failed);
        }
    }

    async fn remove_key(&self, key: &CacheKey) -> Result<()> {
        self.store.remove_item(key.as_str()).await?;

        let _guard = self.index_lock.lock().await;
        let mut index = self.read_index().await?;
        if index.remove(key) {
            self.save_index(&index).await?;
        }
        Ok(())
    }

    /// Drops `key` from the index after its store record turned out missing.
    async fn forget_orphan(&self, key: &CacheKey) {
        let _guard = self.index_lock.lock().await;
        let mut index = match self.read_index().await {
            Ok(index) => index,
            Err(_) => return,
        };

        if index.remove(key) {
            debug!("Pruning orphaned index entry {}", key);
            if let Err(e) = self.save_index(&index).await {
                warn!("Error pruning orphaned index entry {}: {}", key, e);
            }
        }
    }
}
