//!
//! Playbook Server - persists playbook flows and serves the playbook editor
//!
//! This module exports all the components of the Playbook Server.

use std::sync::Arc;

use playbook_store::{file::FileFlowStore, memory::InMemoryFlowStore, FlowStorage};

/// API module
pub mod api;

/// Static asset module
pub mod assets;

/// Configuration module
pub mod config;

/// Error module
pub mod error;

/// Server module
pub mod server;

// Re-export key types
pub use assets::StaticAssets;
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::PlaybookServer;

/// Run function
pub async fn run(config: ServerConfig) -> ServerResult<()> {
    // Create dependencies
    let storage = create_flow_store(&config)?;
    storage.prepare().await?;
    let assets = StaticAssets::new(&config.static_dir);

    // Create and run server
    PlaybookServer::new(config, storage, assets).run().await
}

/// Initialize logging
pub fn init_logging(config: &ServerConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_format == "json" {
        fmt().json().with_env_filter(filter).with_target(true).init();
    } else {
        fmt().with_env_filter(filter).with_target(true).init();
    }
}

/// Create the flow storage backend named by the configured URL
pub fn create_flow_store(config: &ServerConfig) -> ServerResult<Arc<dyn FlowStorage>> {
    if config.flow_store_url.starts_with("memory://") {
        tracing::info!("Using in-memory flow store");
        return Ok(Arc::new(InMemoryFlowStore::new()));
    }

    if let Some(dir) = config.flow_store_url.strip_prefix("file://") {
        if dir.is_empty() {
            return Err(ServerError::ConfigurationError(
                "Missing directory in file:// flow store URL".to_string(),
            ));
        }
        tracing::info!("Using file flow store at {}", dir);
        return Ok(Arc::new(FileFlowStore::new(dir)));
    }

    Err(ServerError::ConfigurationError(format!(
        "Unsupported flow store URL: {}",
        config.flow_store_url
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_url(url: &str) -> ServerConfig {
        ServerConfig {
            flow_store_url: url.to_string(),
            ..ServerConfig::default()
        }
    }

    #[test]
    fn test_create_flow_store_by_scheme() {
        let store = create_flow_store(&config_with_url("memory://")).unwrap();
        assert_eq!(store.location(), "memory://");

        let store = create_flow_store(&config_with_url("file://data/playbooks")).unwrap();
        assert_eq!(store.location(), "data/playbooks");
    }

    #[test]
    fn test_create_flow_store_rejects_unknown_scheme() {
        for url in ["redis://localhost", "file://", "playbooks"] {
            assert!(matches!(
                create_flow_store(&config_with_url(url)),
                Err(ServerError::ConfigurationError(_))
            ));
        }
    }
}
