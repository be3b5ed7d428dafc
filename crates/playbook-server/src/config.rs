//! Configuration for the Playbook Server
//!
//! This module contains the configuration types and loading functionality.

use serde::{Deserialize, Serialize};
use std::env;
use tracing::{info, warn};

use crate::error::{ServerError, ServerResult};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Host to bind to
    #[serde(default = "default_host")]
    pub bind_address: String,

    /// Where flows are stored: `file://<dir>` or `memory://`
    #[serde(default = "default_flow_store_url")]
    pub flow_store_url: String,

    /// Directory holding the built frontend bundle
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format (`pretty` or `json`)
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Largest accepted request body in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_port() -> u16 {
    5001
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_flow_store_url() -> String {
    "file://playbooks".to_string()
}

fn default_static_dir() -> String {
    "build".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_max_body_bytes() -> usize {
    50 * 1024 * 1024 // 50MB
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn load() -> ServerResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> ServerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Start with defaults
        let mut config = Self::default();

        if let Some(port) = lookup("PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.port = port;
            } else {
                warn!("Invalid PORT value: {}", port);
            }
        }

        if let Some(host) = lookup("SERVER_HOST") {
            config.bind_address = host;
        }

        if let Some(flow_store_url) = lookup("FLOW_STORE_URL") {
            config.flow_store_url = flow_store_url;
        }

        if let Some(static_dir) = lookup("STATIC_DIR") {
            config.static_dir = static_dir;
        }

        if let Some(log_level) = lookup("LOG_LEVEL") {
            config.log_level = log_level;
        }

        if let Some(log_format) = lookup("LOG_FORMAT") {
            match log_format.to_lowercase().as_str() {
                "json" | "pretty" => config.log_format = log_format.to_lowercase(),
                _ => warn!("Invalid LOG_FORMAT value: {}, using {}", log_format, config.log_format),
            }
        }

        if let Some(max_body) = lookup("MAX_BODY_BYTES") {
            match max_body.parse::<usize>() {
                Ok(bytes) if bytes > 0 => config.max_body_bytes = bytes,
                _ => warn!("Invalid MAX_BODY_BYTES value: {}", max_body),
            }
        }

        // Validate required fields
        if config.flow_store_url.is_empty() {
            return Err(ServerError::ConfigurationError(
                "Flow store URL is required".to_string(),
            ));
        }

        if config.flow_store_url.starts_with("memory://") {
            warn!("Using in-memory flow store - saved playbooks will not survive a restart!");
        }

        info!("Loaded server configuration");
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_host(),
            flow_store_url: default_flow_store_url(),
            static_dir: default_static_dir(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}
