//! Persistent Key/Value Store Module
//!
//! String-keyed storage consumed by the expiring cache. The cache serializes
//! everything it writes, so backends only ever see opaque strings.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::error::StoreError;

// == Key/Value Store ==
/// Durable string storage.
///
/// Implementations serialize their own operations; callers may share one
/// store between tasks.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value under `key`, or `None` if absent.
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set_item(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn remove_item(&self, key: &str) -> Result<(), StoreError>;

    /// Removes every key.
    async fn clear(&self) -> Result<(), StoreError>;
}

// == Memory Store ==
/// Volatile in-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    pub async fn contains_key(&self, key: &str) -> bool {
        self.items.read().await.contains_key(key)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.items.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.items.write().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.items.write().await.clear();
        Ok(())
    }
}

// == File Store ==
/// Store persisted as one JSON object on disk.
///
/// The file is loaded on first access and rewritten after every mutation
/// through a temporary file and a rename.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    items: Mutex<Option<HashMap<String, String>>>,
}

impl FileStore {
    /// Creates a store backed by `path`. Nothing is read until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            items: Mutex::new(None),
        }
    }

    /// Reads the file. A missing, empty or undecodable file loads as an empty
    /// map; the next write replaces it.
    async fn load(&self) -> Result<HashMap<String, String>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(HashMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Discarding undecodable store file {}: {}", self.path.display(), e);
                HashMap::new()
            })),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn persist(&self, items: &HashMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string(items)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!("Persisted {} store records to {}", items.len(), self.path.display());
        Ok(())
    }

    /// Applies `mutate` to the loaded map and persists it; the in-memory copy
    /// is only replaced once the file write succeeded.
    async fn mutate<F>(&self, mutate: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut HashMap<String, String>),
    {
        let mut guard = self.items.lock().await;
        let mut items = match guard.as_ref() {
            Some(items) => items.clone(),
            None => self.load().await?,
        };

        mutate(&mut items);
        self.persist(&items).await?;
        *guard = Some(items);
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut guard = self.items.lock().await;
        if guard.is_none() {
            *guard = Some(self.load().await?);
        }
        Ok(guard.as_ref().and_then(|items| items.get(key).cloned()))
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.mutate(|items| {
            items.insert(key.to_string(), value);
        })
        .await
    }

    async fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.mutate(|items| {
            items.remove(key);
        })
        .await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.mutate(|items| items.clear()).await
    }
}
