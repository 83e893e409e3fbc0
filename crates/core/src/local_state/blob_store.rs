use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{Error, Result};

/// Persistence port for keyed blobs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns `None` when the key has never been written.
    fn read(&self, key: &str) -> Result<Option<String>>;
    async fn write(&self, key: &str, value: String) -> Result<()>;
}

/// Builds the storage key for one user's slice of local state.
pub fn state_key(user_id: &str, name: &str) -> String {
    format!("{}:{}", user_id, name)
}

/// Reads a JSON array stored under `key`.
///
/// A missing key yields an empty list. So does a blob that fails to parse:
/// the damaged value is logged and overwritten by the next write.
pub fn read_json_list<T: DeserializeOwned>(store: &dyn BlobStore, key: &str) -> Result<Vec<T>> {
    let Some(raw) = store.read(key)? else {
        return Ok(Vec::new());
    };
    match serde_json::from_str::<Vec<T>>(&raw) {
        Ok(items) => Ok(items),
        Err(e) => {
            warn!("Discarding malformed local state under '{}': {}", key, e);
            Ok(Vec::new())
        }
    }
}

pub async fn write_json_list<T: Serialize>(
    store: &dyn BlobStore,
    key: &str,
    items: &[T],
) -> Result<()> {
    let raw = serde_json::to_string(items)?;
    store.write(key, raw).await
}

/// Blob store backed by a process-local map.
#[derive(Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, String>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let blobs = self
            .blobs
            .read()
            .map_err(|_| Error::Unexpected("blob store lock poisoned".to_string()))?;
        Ok(blobs.get(key).cloned())
    }

    async fn write(&self, key: &str, value: String) -> Result<()> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|_| Error::Unexpected("blob store lock poisoned".to_string()))?;
        blobs.insert(key.to_string(), value);
        Ok(())
    }
}
