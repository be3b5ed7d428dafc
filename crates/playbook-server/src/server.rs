//! Main Playbook Server implementation
//!
//! This module contains the PlaybookServer implementation.

use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, info_span, Instrument};

use playbook_store::{FlowKey, FlowStorage, FlowStore};

use crate::assets::StaticAssets;
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// Main server implementation
#[derive(Debug, Clone)]
pub struct PlaybookServer {
    /// Configuration
    pub config: ServerConfig,

    /// Named flow documents
    flows: FlowStore,

    /// Frontend bundle
    assets: StaticAssets,
}

impl PlaybookServer {
    /// Create a new PlaybookServer
    pub fn new(config: ServerConfig, storage: Arc<dyn FlowStorage>, assets: StaticAssets) -> Self {
        Self {
            config,
            flows: FlowStore::new(storage),
            assets,
        }
    }

    /// Run the server until a shutdown signal arrives
    pub async fn run(self) -> ServerResult<()> {
        info!("Starting Playbook Server");

        // Create and bind the TCP listener
        let listener =
            TcpListener::bind((self.config.bind_address.as_str(), self.config.port)).await?;
        let addr = listener.local_addr()?;

        info!(
            %addr,
            playbooks = %self.flows.storage().location(),
            static_dir = %self.assets.root().display(),
            "Listening"
        );

        let app = crate::api::build_router(Arc::new(self));

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }

    /// The frontend bundle served for non-API paths
    pub fn assets(&self) -> &StaticAssets {
        &self.assets
    }

    /// Where flows are persisted
    pub fn storage_location(&self) -> String {
        self.flows.storage().location()
    }

    /// List all stored flows
    pub async fn list_flows(&self) -> ServerResult<Vec<FlowKey>> {
        let keys = self.flows.list().await?;
        debug!(count = keys.len(), "Listed flows");
        Ok(keys)
    }

    /// Load a flow, or the default document if it was never saved
    pub async fn load_flow(&self, filename: &str) -> ServerResult<Value> {
        let span = info_span!("load_flow", %filename);
        async move { Ok::<_, ServerError>(self.flows.load(filename).await?) }
            .instrument(span)
            .await
    }

    /// Save a flow, replacing any previous version
    pub async fn save_flow(&self, filename: &str, document: Value) -> ServerResult<FlowKey> {
        let span = info_span!("save_flow", %filename);
        async move {
            let key = self.flows.save(filename, document).await?;
            info!(%key, "Playbook saved");
            Ok::<_, ServerError>(key)
        }
        .instrument(span)
        .await
    }

    /// Rename a flow
    pub async fn rename_flow(
        &self,
        old_filename: &str,
        new_filename: &str,
    ) -> ServerResult<FlowKey> {
        let span = info_span!("rename_flow", %old_filename, %new_filename);
        async move {
            let key = self.flows.rename(old_filename, new_filename).await?;
            info!(%key, "Playbook renamed");
            Ok::<_, ServerError>(key)
        }
        .instrument(span)
        .await
    }

    /// Duplicate a flow under a new name
    pub async fn copy_flow(
        &self,
        source_filename: &str,
        new_filename: &str,
    ) -> ServerResult<FlowKey> {
        let span = info_span!("copy_flow", %source_filename, %new_filename);
        async move {
            let key = self.flows.copy(source_filename, new_filename).await?;
            info!(%key, "Playbook copied");
            Ok::<_, ServerError>(key)
        }
        .instrument(span)
        .await
    }

    /// Delete a flow
    pub async fn delete_flow(&self, filename: &str) -> ServerResult<()> {
        let span = info_span!("delete_flow", %filename);
        async move {
            let key = self.flows.delete(filename).await?;
            info!(%key, "Playbook deleted");
            Ok::<_, ServerError>(())
        }
        .instrument(span)
        .await
    }

    /// Check that the flow store can be read; returns the number of stored flows
    pub async fn check_storage_health(&self) -> ServerResult<usize> {
        Ok(self.flows.list().await?.len())
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(?err, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(?err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received, shutting down gracefully"),
        _ = terminate => info!("SIGTERM received, shutting down gracefully"),
    }
}
