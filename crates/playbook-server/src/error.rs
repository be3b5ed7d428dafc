//! Error types for the Playbook Server
//!
//! This module contains the error types used throughout the server.

use playbook_store::FlowStoreError;
use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Resource already exists
    #[error("{0} already exists")]
    Conflict(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Flow store error
    #[error("Flow store error: {0}")]
    StoreError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

impl From<FlowStoreError> for ServerError {
    fn from(err: FlowStoreError) -> Self {
        match err {
            FlowStoreError::NotFound(name) => ServerError::NotFound(format!("Playbook {}", name)),
            FlowStoreError::Conflict(name) => ServerError::Conflict(format!("Playbook {}", name)),
            FlowStoreError::InvalidKey(name) => {
                ServerError::ValidationError(format!("Invalid filename: {:?}", name))
            }
            _ => ServerError::StoreError(err.to_string()),
        }
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::InternalError(format!("IO error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_taxonomy() {
        let err: ServerError = FlowStoreError::NotFound("a.json".into()).into();
        assert!(matches!(err, ServerError::NotFound(ref msg) if msg == "Playbook a.json"));

        let err: ServerError = FlowStoreError::Conflict("b.json".into()).into();
        assert_eq!(err.to_string(), "Playbook b.json already exists");

        let err: ServerError = FlowStoreError::InvalidKey("..".into()).into();
        assert!(matches!(err, ServerError::ValidationError(_)));

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only volume");
        let err: ServerError = FlowStoreError::Io(io).into();
        assert!(
            matches!(err, ServerError::StoreError(ref msg) if msg.contains("read-only volume"))
        );
    }
}
