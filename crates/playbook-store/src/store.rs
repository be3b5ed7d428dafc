//! Flow store policy
//!
//! [`FlowStore`] turns user supplied filenames into canonical keys and applies
//! the defaulting and collision rules shared by every caller.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{default_document, FlowKey, FlowStorage, FlowStoreError, FlowStoreResult};

/// Named flow documents on top of a [`FlowStorage`] backend
#[derive(Debug, Clone)]
pub struct FlowStore {
    storage: Arc<dyn FlowStorage>,
}

impl FlowStore {
    pub fn new(storage: Arc<dyn FlowStorage>) -> Self {
        Self { storage }
    }

    /// The underlying backend
    pub fn storage(&self) -> &Arc<dyn FlowStorage> {
        &self.storage
    }

    /// Find the stored key for `raw`, trying the bare name before the suffixed one
    pub async fn resolve(&self, raw: &str) -> FlowStoreResult<Option<FlowKey>> {
        for candidate in FlowKey::candidates(raw)? {
            if self.storage.exists(&candidate).await? {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    /// Keys of all stored flows
    pub async fn list(&self) -> FlowStoreResult<Vec<FlowKey>> {
        self.storage.list_keys().await
    }

    /// Load a flow, or the default document when nothing is stored under `raw`
    pub async fn load(&self, raw: &str) -> FlowStoreResult<Value> {
        let Some(key) = self.resolve(raw).await? else {
            debug!(filename = raw, "Flow not found, returning default document");
            return Ok(default_document());
        };

        match self.storage.read(&key).await {
            // Deleted between the existence check and the read
            Err(FlowStoreError::NotFound(_)) => Ok(default_document()),
            other => other,
        }
    }

    /// Save `document` under `raw`, replacing whatever was there
    ///
    /// A top-level `filename` field is dropped; the name travels out of band.
    pub async fn save(&self, raw: &str, mut document: Value) -> FlowStoreResult<FlowKey> {
        let key = FlowKey::new(raw)?;
        if let Value::Object(fields) = &mut document {
            fields.remove("filename");
        }
        self.storage.write(&key, &document).await?;
        Ok(key)
    }

    /// Rename a flow. Never overwrites an existing target.
    ///
    /// A missing source gets a default placeholder first, so a flow whose
    /// initial save never landed can still be renamed.
    pub async fn rename(&self, old_raw: &str, new_raw: &str) -> FlowStoreResult<FlowKey> {
        let target = FlowKey::new(new_raw)?;
        if self.storage.exists(&target).await? {
            return Err(FlowStoreError::Conflict(target.into_string()));
        }

        let (source, placeholder) = match self.resolve(old_raw).await? {
            Some(key) => (key, false),
            None => {
                let key = FlowKey::new(old_raw)?;
                warn!(filename = %key, "Rename source missing, creating placeholder");
                self.storage.write(&key, &default_document()).await?;
                (key, true)
            }
        };

        if let Err(err) = self.storage.rename(&source, &target).await {
            if placeholder {
                warn!(filename = %source, error = %err, "Rename failed, removing placeholder");
                if let Err(cleanup) = self.storage.delete(&source).await {
                    warn!(filename = %source, error = %cleanup, "Failed to remove placeholder");
                }
            }
            return Err(err);
        }
        Ok(target)
    }

    /// Duplicate a flow under a new name. Never overwrites an existing target.
    pub async fn copy(&self, source_raw: &str, new_raw: &str) -> FlowStoreResult<FlowKey> {
        let target = FlowKey::new(new_raw)?;
        if self.storage.exists(&target).await? {
            return Err(FlowStoreError::Conflict(target.into_string()));
        }

        let source = self
            .resolve(source_raw)
            .await?
            .ok_or_else(|| FlowStoreError::NotFound(source_raw.to_string()))?;

        let document = self.storage.read(&source).await?;
        self.storage.write(&target, &document).await?;
        Ok(target)
    }

    /// Delete a flow
    pub async fn delete(&self, raw: &str) -> FlowStoreResult<FlowKey> {
        let key = self
            .resolve(raw)
            .await?
            .ok_or_else(|| FlowStoreError::NotFound(raw.to_string()))?;

        self.storage.delete(&key).await?;
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryFlowStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn store() -> (FlowStore, InMemoryFlowStore) {
        let backend = InMemoryFlowStore::new();
        (FlowStore::new(Arc::new(backend.clone())), backend)
    }

    /// Backend whose renames always fail
    #[derive(Debug)]
    struct RenameFailsStore(InMemoryFlowStore);

    #[async_trait::async_trait]
    impl FlowStorage for RenameFailsStore {
        async fn list_keys(&self) -> FlowStoreResult<Vec<FlowKey>> {
            self.0.list_keys().await
        }

        async fn exists(&self, key: &FlowKey) -> FlowStoreResult<bool> {
            self.0.exists(key).await
        }

        async fn read(&self, key: &FlowKey) -> FlowStoreResult<Value> {
            self.0.read(key).await
        }

        async fn write(&self, key: &FlowKey, document: &Value) -> FlowStoreResult<()> {
            self.0.write(key, document).await
        }

        async fn rename(&self, _from: &FlowKey, _to: &FlowKey) -> FlowStoreResult<()> {
            let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only volume");
            Err(err.into())
        }

        async fn delete(&self, key: &FlowKey) -> FlowStoreResult<()> {
            self.0.delete(key).await
        }

        fn location(&self) -> String {
            self.0.location()
        }
    }

    fn sample_flow() -> Value {
        json!({
            "nodes": [
                {"id": "start", "type": "question", "data": {"label": "Vehicle year?"}},
                {"id": "quote", "type": "result", "data": {"label": "Quote"}}
            ],
            "edges": [{"id": "e1", "source": "start", "target": "quote"}],
            "carriers": {"acme": {"name": "Acme Mutual"}},
            "quoteSettings": {"currency": "USD"}
        })
    }

    async fn names(store: &FlowStore) -> Vec<String> {
        store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(FlowKey::into_string)
            .collect()
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let (store, _) = store();

        let key = store.save("auto", sample_flow()).await.unwrap();

        assert_eq!(key.as_str(), "auto.json");
        assert_eq!(store.load("auto.json").await.unwrap(), sample_flow());
        assert_eq!(store.load("auto").await.unwrap(), sample_flow());
    }

    #[tokio::test]
    async fn test_load_missing_returns_default() {
        let (store, backend) = store();

        assert_eq!(store.load("nothing-here").await.unwrap(), default_document());
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_load_corrupt_document_fails() {
        let (store, backend) = store();
        backend.insert_raw(FlowKey::new("bad").unwrap(), "not json at all").await;

        assert!(matches!(
            store.load("bad").await,
            Err(FlowStoreError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_save_strips_embedded_filename() {
        let (store, _) = store();
        let mut doc = sample_flow();
        doc["filename"] = json!("auto.json");

        store.save("auto.json", doc).await.unwrap();

        let loaded = store.load("auto.json").await.unwrap();
        assert!(loaded.get("filename").is_none());
        assert_eq!(loaded, sample_flow());
    }

    #[tokio::test]
    async fn test_save_overwrites_without_merge() {
        let (store, _) = store();
        store.save("home", sample_flow()).await.unwrap();
        store.save("home", json!({"nodes": []})).await.unwrap();

        assert_eq!(store.load("home").await.unwrap(), json!({"nodes": []}));
        assert_eq!(names(&store).await, vec!["home.json"]);
    }

    #[tokio::test]
    async fn test_save_strips_traversal() {
        let (store, _) = store();

        let key = store.save("../../etc/passwd", json!({})).await.unwrap();

        assert_eq!(key.as_str(), "passwd.json");
        assert_eq!(names(&store).await, vec!["passwd.json"]);
    }

    #[tokio::test]
    async fn test_list_after_saves() {
        let (store, _) = store();
        store.save("existing", json!({})).await.unwrap();

        store.save("a", json!({})).await.unwrap();
        store.save("b", json!({})).await.unwrap();

        assert_eq!(names(&store).await, vec!["a.json", "b.json", "existing.json"]);
    }

    #[tokio::test]
    async fn test_rename_conflict_leaves_source() {
        let (store, _) = store();
        store.save("a", sample_flow()).await.unwrap();
        store.save("b", json!({"nodes": []})).await.unwrap();

        let result = store.rename("a.json", "b.json").await;

        assert!(matches!(result, Err(FlowStoreError::Conflict(name)) if name == "b.json"));
        assert_eq!(store.load("a.json").await.unwrap(), sample_flow());
        assert_eq!(store.load("b.json").await.unwrap(), json!({"nodes": []}));
    }

    #[tokio::test]
    async fn test_rename_moves_document() {
        let (store, _) = store();
        store.save("a", sample_flow()).await.unwrap();

        let key = store.rename("a.json", "renters").await.unwrap();

        assert_eq!(key.as_str(), "renters.json");
        assert_eq!(store.resolve("a.json").await.unwrap(), None);
        assert_eq!(store.load("renters.json").await.unwrap(), sample_flow());
    }

    #[tokio::test]
    async fn test_failed_rename_removes_placeholder() {
        let backend = InMemoryFlowStore::new();
        let store = FlowStore::new(Arc::new(RenameFailsStore(backend.clone())));
        store.save("kept", sample_flow()).await.unwrap();

        assert!(matches!(
            store.rename("unsaved", "saved").await,
            Err(FlowStoreError::Io(_))
        ));
        assert_eq!(names(&store).await, vec!["kept.json"]);

        // An existing source is left where it was
        assert!(store.rename("kept", "renamed").await.is_err());
        assert_eq!(store.load("kept").await.unwrap(), sample_flow());
        assert_eq!(backend.len().await, 1);
    }

    #[tokio::test]
    async fn test_rename_missing_source_creates_placeholder() {
        let (store, _) = store();

        let key = store.rename("never-saved", "landed").await.unwrap();

        assert_eq!(key.as_str(), "landed.json");
        assert_eq!(names(&store).await, vec!["landed.json"]);
        assert_eq!(store.load("landed").await.unwrap(), default_document());
    }

    #[tokio::test]
    async fn test_rename_onto_itself_conflicts() {
        let (store, _) = store();
        store.save("same", json!({})).await.unwrap();

        assert!(matches!(
            store.rename("same", "same.json").await,
            Err(FlowStoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let (store, _) = store();
        store.save("gone", json!({})).await.unwrap();

        let key = store.delete("gone").await.unwrap();
        assert_eq!(key.as_str(), "gone.json");

        assert!(matches!(
            store.delete("gone").await,
            Err(FlowStoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_leaves_storage_untouched() {
        let (store, _) = store();
        store.save("keep", json!({})).await.unwrap();

        assert!(matches!(
            store.delete("missing.json").await,
            Err(FlowStoreError::NotFound(_))
        ));
        assert_eq!(names(&store).await, vec!["keep.json"]);
    }

    #[tokio::test]
    async fn test_bare_name_resolves_before_suffixed() {
        let (store, backend) = store();
        let bare = FlowKey::candidates("legacy").unwrap().remove(0);
        backend.insert_raw(bare, r#"{"nodes": ["bare"]}"#).await;
        store.save("legacy", json!({"nodes": ["suffixed"]})).await.unwrap();

        assert_eq!(store.load("legacy").await.unwrap(), json!({"nodes": ["bare"]}));

        store.delete("legacy").await.unwrap();
        assert_eq!(store.load("legacy").await.unwrap(), json!({"nodes": ["suffixed"]}));
    }

    #[tokio::test]
    async fn test_copy() {
        let (store, _) = store();
        store.save("source", sample_flow()).await.unwrap();

        let key = store.copy("source", "duplicate").await.unwrap();

        assert_eq!(key.as_str(), "duplicate.json");
        assert_eq!(store.load("source").await.unwrap(), sample_flow());
        assert_eq!(store.load("duplicate").await.unwrap(), sample_flow());
    }

    #[tokio::test]
    async fn test_copy_missing_source_and_conflict() {
        let (store, _) = store();
        store.save("taken", json!({})).await.unwrap();

        assert!(matches!(
            store.copy("missing", "fresh").await,
            Err(FlowStoreError::NotFound(_))
        ));
        assert!(matches!(
            store.copy("taken", "taken").await,
            Err(FlowStoreError::Conflict(_))
        ));
        assert_eq!(names(&store).await, vec!["taken.json"]);
    }

    #[tokio::test]
    async fn test_invalid_names_rejected() {
        let (store, _) = store();

        assert!(matches!(store.save("..", json!({})).await, Err(FlowStoreError::InvalidKey(_))));
        assert!(matches!(store.load("dir/").await, Err(FlowStoreError::InvalidKey(_))));
        assert!(matches!(store.rename("a", "..").await, Err(FlowStoreError::InvalidKey(_))));
    }
}
