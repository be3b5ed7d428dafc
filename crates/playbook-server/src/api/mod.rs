//! API module for the Playbook Server
//!
//! This module contains the API routes and handlers for the Playbook Server.

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::Method,
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod errors;
pub mod flows;
pub mod health;

use crate::server::PlaybookServer;

/// Build the router for API endpoints and the frontend fallback
pub fn build_router(server: Arc<PlaybookServer>) -> Router {
    let max_body_bytes = server.config.max_body_bytes;

    Router::new()
        // Flow persistence
        .route("/api/flows", get(flows::list_flows_handler))
        .route("/api/load", get(flows::load_flow_handler))
        .route("/api/save", post(flows::save_flow_handler))
        .route("/api/rename_flow", post(flows::rename_flow_handler))
        .route("/api/copy_flow", post(flows::copy_flow_handler))
        .route("/api/delete_flow", post(flows::delete_flow_handler))
        // Health check
        .route("/api/health", get(health::health_check))
        // Everything else is the frontend
        .fallback(serve_frontend)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Fallback handler serving the static bundle
async fn serve_frontend(State(server): State<Arc<PlaybookServer>>, request: Request) -> Response {
    server.assets().serve(request).await
}

// Re-export all modules for easier imports
pub use errors::*;
pub use flows::*;
pub use health::*;
