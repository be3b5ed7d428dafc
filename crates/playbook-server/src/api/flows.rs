//! Flow persistence API
//!
//! Handlers for listing, loading, saving, renaming, copying and deleting
//! playbook flows.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

use playbook_store::{FlowKey, DEFAULT_FLOW_KEY};

use crate::api::errors::ApiError;
use crate::server::PlaybookServer;

/// Query parameters for loading a flow
#[derive(Debug, Deserialize)]
pub struct LoadQuery {
    pub filename: Option<String>,
}

/// Request body for renaming a flow
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameFlowRequest {
    pub old_filename: Option<String>,
    pub new_filename: Option<String>,
}

/// Request body for copying a flow
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyFlowRequest {
    pub source_filename: Option<String>,
    pub new_filename: Option<String>,
}

/// Request body for deleting a flow
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteFlowRequest {
    pub filename: Option<String>,
}

/// Response after a flow has moved to a new name
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenamedFlowResponse {
    pub message: String,
    pub new_filename: FlowKey,
}

/// Treat absent and empty names alike
fn non_empty(name: Option<String>) -> Option<String> {
    name.filter(|name| !name.is_empty())
}

/// Handler for listing flows
pub async fn list_flows_handler(
    State(server): State<Arc<PlaybookServer>>,
) -> Result<Json<Vec<FlowKey>>, ApiError> {
    let mut flows = server.list_flows().await.map_err(|err| {
        error!(?err, "Failed to list flows");
        ApiError::with_context("Error reading flows", err)
    })?;

    // The editor always needs something to select
    if flows.is_empty() {
        let default_key = FlowKey::new(DEFAULT_FLOW_KEY)
            .map_err(|err| ApiError::InternalServerError(err.to_string()))?;
        flows.push(default_key);
    }

    Ok(Json(flows))
}

/// Handler for loading a flow
pub async fn load_flow_handler(
    State(server): State<Arc<PlaybookServer>>,
    Query(query): Query<LoadQuery>,
) -> Result<Json<Value>, ApiError> {
    let filename = non_empty(query.filename).unwrap_or_else(|| DEFAULT_FLOW_KEY.to_string());

    let document = server.load_flow(&filename).await.map_err(|err| {
        error!(?err, %filename, "Failed to load flow");
        ApiError::with_context("Error loading playbook", err)
    })?;

    Ok(Json(document))
}

/// Handler for saving a flow
///
/// The target name is read from the payload's `filename` field.
pub async fn save_flow_handler(
    State(server): State<Arc<PlaybookServer>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(document) = payload?;

    let filename = document
        .get("filename")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_FLOW_KEY)
        .to_string();

    let key = server.save_flow(&filename, document).await.map_err(|err| {
        error!(?err, %filename, "Failed to save flow");
        ApiError::with_context("Error saving playbook", err)
    })?;

    Ok(Json(json!({
        "message": "Playbook saved successfully",
        "filename": key,
    })))
}

/// Handler for renaming a flow
pub async fn rename_flow_handler(
    State(server): State<Arc<PlaybookServer>>,
    payload: Result<Json<RenameFlowRequest>, JsonRejection>,
) -> Result<Json<RenamedFlowResponse>, ApiError> {
    let Json(request) = payload?;

    let (Some(old_filename), Some(new_filename)) =
        (non_empty(request.old_filename), non_empty(request.new_filename))
    else {
        return Err(ApiError::BadRequest("Missing filename parameters".to_string()));
    };

    info!(%old_filename, %new_filename, "Renaming flow");
    let key = server
        .rename_flow(&old_filename, &new_filename)
        .await
        .map_err(|err| {
            error!(?err, %old_filename, %new_filename, "Failed to rename flow");
            ApiError::with_context("Error renaming playbook", err)
        })?;

    Ok(Json(RenamedFlowResponse {
        message: "Playbook renamed successfully".to_string(),
        new_filename: key,
    }))
}

/// Handler for copying a flow
pub async fn copy_flow_handler(
    State(server): State<Arc<PlaybookServer>>,
    payload: Result<Json<CopyFlowRequest>, JsonRejection>,
) -> Result<Json<RenamedFlowResponse>, ApiError> {
    let Json(request) = payload?;

    let (Some(source_filename), Some(new_filename)) =
        (non_empty(request.source_filename), non_empty(request.new_filename))
    else {
        return Err(ApiError::BadRequest("Missing filename parameters".to_string()));
    };

    let key = server
        .copy_flow(&source_filename, &new_filename)
        .await
        .map_err(|err| {
            error!(?err, %source_filename, %new_filename, "Failed to copy flow");
            ApiError::with_context("Error copying playbook", err)
        })?;

    Ok(Json(RenamedFlowResponse {
        message: "Playbook copied successfully".to_string(),
        new_filename: key,
    }))
}

/// Handler for deleting a flow
pub async fn delete_flow_handler(
    State(server): State<Arc<PlaybookServer>>,
    payload: Result<Json<DeleteFlowRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;

    let Some(filename) = non_empty(request.filename) else {
        return Err(ApiError::BadRequest("Missing filename parameter".to_string()));
    };

    server.delete_flow(&filename).await.map_err(|err| {
        error!(?err, %filename, "Failed to delete flow");
        ApiError::with_context("Error deleting playbook", err)
    })?;

    Ok(Json(json!({ "message": "Playbook deleted successfully" })))
}
