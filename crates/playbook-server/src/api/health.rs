//! Health check endpoint for the Playbook Server
//!
//! This module contains the health check handler.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::server::PlaybookServer;

/// Health check handler
///
/// Reports the storage location and whether the flow store can be listed.
pub async fn health_check(State(server): State<Arc<PlaybookServer>>) -> impl IntoResponse {
    debug!("Health check requested");

    let mut response = json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "playbooksDir": server.storage_location(),
    });

    let status = match server.check_storage_health().await {
        Ok(count) => {
            response["flows"] = json!(count);
            StatusCode::OK
        }
        Err(err) => {
            warn!(?err, "Flow store health check failed");
            response["status"] = json!("degraded");
            response["error"] = json!(err.to_string());
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    (status, Json(response))
}
