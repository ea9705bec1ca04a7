//! Error type system for Bookden
//!
//! This module provides the error taxonomy shared by the plugin runtime and
//! the administrative API:
//! - One variant per failure class in the plugin lifecycle
//! - HTTP status code mapping for the admin boundary
//! - JSON error responses with trace IDs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Main error type for the Bookden system
#[derive(Debug, thiserror::Error)]
pub enum BookdenError {
    // System-level errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    // Manifest errors
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Manifest parse error: {0}")]
    ParseError(String),

    #[error("Manifest validation error: {0}")]
    ValidationError(String),

    // Plugin lifecycle errors
    #[error("Plugin already loaded: {0}")]
    AlreadyLoaded(String),

    #[error("Plugin dependency error: {0}")]
    DependencyError(String),

    #[error("Plugin initialization failed: {0}")]
    InitError(String),

    #[error("Plugin lifecycle error: {0}")]
    LifecycleError(String),

    // Asset staging errors
    #[error("Asset staging failed: {0}")]
    StagingError(String),

    // Event bus errors
    #[error("Event error: {0}")]
    EventError(String),
}

impl BookdenError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            BookdenError::ParseError(_) | BookdenError::ValidationError(_) => {
                StatusCode::BAD_REQUEST
            }

            // 404 Not Found
            BookdenError::NotFound(_) => StatusCode::NOT_FOUND,

            // 409 Conflict
            BookdenError::AlreadyLoaded(_) | BookdenError::DependencyError(_) => {
                StatusCode::CONFLICT
            }

            // 500 Internal Server Error
            BookdenError::ConfigError(_)
            | BookdenError::IoError(_)
            | BookdenError::InitError(_)
            | BookdenError::LifecycleError(_)
            | BookdenError::StagingError(_)
            | BookdenError::EventError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type name for API responses
    pub fn error_type(&self) -> &'static str {
        match self {
            BookdenError::ConfigError(_) => "ConfigError",
            BookdenError::IoError(_) => "IoError",
            BookdenError::NotFound(_) => "NotFound",
            BookdenError::ParseError(_) => "ParseError",
            BookdenError::ValidationError(_) => "ValidationError",
            BookdenError::AlreadyLoaded(_) => "AlreadyLoaded",
            BookdenError::DependencyError(_) => "DependencyError",
            BookdenError::InitError(_) => "InitError",
            BookdenError::LifecycleError(_) => "LifecycleError",
            BookdenError::StagingError(_) => "StagingError",
            BookdenError::EventError(_) => "EventError",
        }
    }
}

/// Error response structure for API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Unique trace ID for this error
    pub trace_id: String,
}

impl ErrorResponse {
    /// Create a new error response with a generated trace ID
    pub fn new(error: String, message: String) -> Self {
        Self {
            error,
            message,
            trace_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an error response from a BookdenError
    pub fn from_error(error: &BookdenError) -> Self {
        Self::new(error.error_type().to_string(), error.to_string())
    }
}

/// Implement IntoResponse so handlers can return BookdenError directly
impl IntoResponse for BookdenError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_response = ErrorResponse::from_error(&self);

        tracing::error!(
            error_type = self.error_type(),
            trace_id = %error_response.trace_id,
            status_code = %status_code,
            "Request failed: {}",
            self
        );

        (status_code, Json(error_response)).into_response()
    }
}

/// Result type alias for operations that can fail with BookdenError
pub type Result<T> = std::result::Result<T, BookdenError>;
