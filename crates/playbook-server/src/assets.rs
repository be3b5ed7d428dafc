//! Static asset serving for the single-page frontend
//!
//! Existing files under the asset root are served as-is. Any other path gets
//! the SPA entry document so the client-side router can handle it.

use axum::{
    body::Body,
    extract::Request,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::path::{Path, PathBuf};
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, warn};

/// Entry document of the frontend bundle
pub const ENTRY_DOCUMENT: &str = "index.html";

/// Body returned when the frontend bundle has not been built
pub const BUILD_MISSING_MESSAGE: &str =
    "Frontend build not found. Please run 'npm run build' and move the 'build' folder here.";

/// Location of a prebuilt frontend bundle
#[derive(Debug, Clone)]
pub struct StaticAssets {
    root: PathBuf,
}

impl StaticAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the bundle is served from
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the SPA entry document
    pub fn entry_path(&self) -> PathBuf {
        self.root.join(ENTRY_DOCUMENT)
    }

    /// Whether the bundle (at least its entry document) is present
    pub async fn is_built(&self) -> bool {
        tokio::fs::metadata(self.entry_path())
            .await
            .map(|metadata| metadata.is_file())
            .unwrap_or(false)
    }

    /// Serve `request` from the bundle, falling back to the entry document
    pub async fn serve(&self, request: Request) -> Response {
        if !self.is_built().await {
            warn!(root = %self.root.display(), "Frontend build missing");
            return (
                StatusCode::NOT_FOUND,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                BUILD_MISSING_MESSAGE,
            )
                .into_response();
        }

        let service = ServeDir::new(&self.root)
            .append_index_html_on_directories(true)
            .fallback(ServeFile::new(self.entry_path()));

        match service.oneshot(request).await {
            Ok(response) => response.map(Body::new),
            Err(err) => {
                error!(?err, "Failed to serve static asset");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
