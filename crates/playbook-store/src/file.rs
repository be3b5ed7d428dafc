//! Filesystem implementation of FlowStorage
//!
//! One pretty-printed JSON file per flow, stored flat in a dedicated directory.

use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::{FlowKey, FlowStorage, FlowStoreError, FlowStoreResult};

/// Flow storage backed by a directory on the local filesystem
///
/// Writes are plain overwrites with no locking: concurrent saves to the same
/// key race and the last write wins.
#[derive(Debug, Clone)]
pub struct FileFlowStore {
    root: PathBuf,
}

impl FileFlowStore {
    /// Create a store rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the flow files
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &FlowKey) -> PathBuf {
        self.root.join(key.as_str())
    }
}

/// Map a missing file onto the store's NotFound condition
fn map_io(err: std::io::Error, key: &FlowKey) -> FlowStoreError {
    if err.kind() == ErrorKind::NotFound {
        FlowStoreError::NotFound(key.to_string())
    } else {
        FlowStoreError::Io(err)
    }
}

#[async_trait]
impl FlowStorage for FileFlowStore {
    async fn prepare(&self) -> FlowStoreResult<()> {
        fs::create_dir_all(&self.root).await?;
        info!(root = %self.root.display(), "Flow directory ready");
        Ok(())
    }

    async fn list_keys(&self) -> FlowStoreResult<Vec<FlowKey>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            // Nothing saved yet
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name();
            match name.to_str().and_then(FlowKey::from_stored_name) {
                Some(key) => keys.push(key),
                None => debug!(name = ?name, "Skipping non-flow file"),
            }
        }

        keys.sort();
        Ok(keys)
    }

    async fn exists(&self, key: &FlowKey) -> FlowStoreResult<bool> {
        match fs::metadata(self.path_for(key)).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn read(&self, key: &FlowKey) -> FlowStoreResult<Value> {
        let data = fs::read(self.path_for(key))
            .await
            .map_err(|err| map_io(err, key))?;
        Ok(serde_json::from_slice(&data)?)
    }

    async fn write(&self, key: &FlowKey, document: &Value) -> FlowStoreResult<()> {
        fs::create_dir_all(&self.root).await?;
        let data = serde_json::to_vec_pretty(document)?;
        fs::write(self.path_for(key), data).await?;
        Ok(())
    }

    async fn rename(&self, from: &FlowKey, to: &FlowKey) -> FlowStoreResult<()> {
        fs::rename(self.path_for(from), self.path_for(to))
            .await
            .map_err(|err| map_io(err, from))
    }

    async fn delete(&self, key: &FlowKey) -> FlowStoreResult<()> {
        fs::remove_file(self.path_for(key))
            .await
            .map_err(|err| map_io(err, key))
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }
}
