//! Error handling for the Playbook Server API
//!
//! Every failure leaves a handler as a status code plus a JSON body of the form
//! `{"message": <summary>, "error": <detail>}`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::ServerError;

/// API Error type for returning standard error responses
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),
    /// Internal server error (500)
    InternalServerError(String),
    /// Wrapped server error, with a summary of the operation that failed
    ServerError {
        context: &'static str,
        source: ServerError,
    },
}

impl ApiError {
    /// Wrap a server error with a summary of the failed operation
    pub fn with_context(context: &'static str, source: ServerError) -> Self {
        ApiError::ServerError { context, source }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServerError { source, .. } => match source {
                ServerError::NotFound(_) => StatusCode::NOT_FOUND,
                ServerError::Conflict(_) => StatusCode::CONFLICT,
                ServerError::ValidationError(_) => StatusCode::BAD_REQUEST,
                ServerError::StoreError(_)
                | ServerError::ConfigurationError(_)
                | ServerError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::ServerError { context, source } => write!(f, "{}: {}", context, source),
        }
    }
}

impl std::fmt::Debug for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "BadRequest({})", msg),
            ApiError::InternalServerError(msg) => write!(f, "InternalServerError({})", msg),
            ApiError::ServerError { context, source } => {
                write!(f, "ServerError({}, {:?})", context, source)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, error) = match self {
            ApiError::BadRequest(msg) | ApiError::InternalServerError(msg) => (msg.clone(), msg),
            ApiError::ServerError { context, source } => (context.to_string(), source.to_string()),
        };

        let body = Json(json!({
            "message": message,
            "error": error,
        }));

        (status, body).into_response()
    }
}
