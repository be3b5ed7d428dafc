//! In-memory implementation of FlowStorage
//!
//! This implementation is primarily intended for testing and development purposes.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{FlowKey, FlowStorage, FlowStoreError, FlowStoreResult};

/// In-memory implementation of FlowStorage
///
/// Documents are kept serialized, the same way a file backend holds them,
/// so unparseable contents can be simulated with [`InMemoryFlowStore::insert_raw`].
/// All data is lost when the instance is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFlowStore {
    documents: Arc<RwLock<HashMap<FlowKey, Vec<u8>>>>,
}

impl InMemoryFlowStore {
    /// Create a new, empty in-memory flow store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw bytes under `key` without any serialization
    pub async fn insert_raw(&self, key: FlowKey, bytes: impl Into<Vec<u8>>) {
        self.documents.write().await.insert(key, bytes.into());
    }

    /// Number of stored documents
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl FlowStorage for InMemoryFlowStore {
    async fn list_keys(&self) -> FlowStoreResult<Vec<FlowKey>> {
        let store = self.documents.read().await;
        let mut keys: Vec<FlowKey> = store
            .keys()
            .filter(|key| FlowKey::from_stored_name(key.as_str()).is_some())
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn exists(&self, key: &FlowKey) -> FlowStoreResult<bool> {
        Ok(self.documents.read().await.contains_key(key))
    }

    async fn read(&self, key: &FlowKey) -> FlowStoreResult<Value> {
        let store = self.documents.read().await;
        match store.get(key) {
            Some(data) => Ok(serde_json::from_slice(data)?),
            None => Err(FlowStoreError::NotFound(key.to_string())),
        }
    }

    async fn write(&self, key: &FlowKey, document: &Value) -> FlowStoreResult<()> {
        let data = serde_json::to_vec_pretty(document)?;
        self.documents.write().await.insert(key.clone(), data);
        Ok(())
    }

    async fn rename(&self, from: &FlowKey, to: &FlowKey) -> FlowStoreResult<()> {
        let mut store = self.documents.write().await;
        let data = store
            .remove(from)
            .ok_or_else(|| FlowStoreError::NotFound(from.to_string()))?;
        store.insert(to.clone(), data);
        Ok(())
    }

    async fn delete(&self, key: &FlowKey) -> FlowStoreResult<()> {
        match self.documents.write().await.remove(key) {
            Some(_) => Ok(()),
            None => Err(FlowStoreError::NotFound(key.to_string())),
        }
    }

    fn location(&self) -> String {
        "memory://".to_string()
    }
}
