//! Playbook Flow Store
//!
//! Provides the storage abstraction for named flow documents.
//! The FlowStorage trait defines a contract for reading and writing opaque JSON
//! documents addressed by a canonical [`FlowKey`]. The [`FlowStore`] type layers
//! the naming policy (canonicalization, defaults, conflicts) on top of a backend.

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

pub mod file;
pub mod key;
pub mod memory;
pub mod store;

pub use key::FlowKey;
pub use store::FlowStore;

/// Key used when a request names no flow at all
pub const DEFAULT_FLOW_KEY: &str = "default_flow.json";

/// Document returned for a flow that has never been saved
pub fn default_document() -> Value {
    json!({
        "nodes": [],
        "edges": [],
        "carriers": {},
        "quoteSettings": {},
    })
}

/// Errors that can occur during flow store operations
#[derive(Error, Debug)]
pub enum FlowStoreError {
    #[error("Flow not found: {0}")]
    NotFound(String),

    #[error("Flow already exists: {0}")]
    Conflict(String),

    #[error("Invalid flow filename: {0:?}")]
    InvalidKey(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for FlowStorage operations
pub type FlowStoreResult<T> = Result<T, FlowStoreError>;

/// Trait defining the contract for flow storage backends
///
/// Backends only move documents between keys. Naming rules live in
/// [`FlowStore`], so every backend sees keys that are already canonical.
#[async_trait]
pub trait FlowStorage: Send + Sync + std::fmt::Debug {
    /// Prepare the backend for use (e.g. create the storage directory)
    async fn prepare(&self) -> FlowStoreResult<()> {
        Ok(())
    }

    /// List the keys of every stored flow
    async fn list_keys(&self) -> FlowStoreResult<Vec<FlowKey>>;

    /// Check whether a document is stored under `key`
    async fn exists(&self, key: &FlowKey) -> FlowStoreResult<bool>;

    /// Read and parse the document stored under `key`
    async fn read(&self, key: &FlowKey) -> FlowStoreResult<Value>;

    /// Write `document` under `key`, replacing any previous contents
    async fn write(&self, key: &FlowKey, document: &Value) -> FlowStoreResult<()>;

    /// Move the document at `from` to `to`
    async fn rename(&self, from: &FlowKey, to: &FlowKey) -> FlowStoreResult<()>;

    /// Remove the document stored under `key`
    async fn delete(&self, key: &FlowKey) -> FlowStoreResult<()>;

    /// Human readable description of where documents live
    fn location(&self) -> String;
}
