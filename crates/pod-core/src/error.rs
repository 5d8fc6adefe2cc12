//! Error types module
//!
//! This module provides the core error taxonomy used throughout the POD
//! pipeline. All errors are unified under the `AppError` enum: missing
//! records, malformed input, upstream (storage/notification) failures,
//! timeouts, and image processing failures.

use std::io;
use std::time::Duration;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like upstream hiccups
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented.
/// The HTTP boundary (owned by the caller) uses this to build `{code, message}`
/// bodies without leaking internals.
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "NOT_FOUND")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upstream failure: {0}")]
    Upstream(String),

    #[error("Upstream failure: {message}")]
    UpstreamWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::UpstreamWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::Validation(format!("UUID parsing error: {}", err))
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        match self {
            AppError::NotFound(_) => 404,
            AppError::Validation(_) => 400,
            AppError::Timeout(_) => 504,
            AppError::Upstream(_) | AppError::UpstreamWithSource { .. } => 502,
            AppError::ImageProcessing(_) => 422,
            AppError::Internal(_) => 500,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Timeout(_) => "TIMEOUT",
            AppError::Upstream(_) | AppError::UpstreamWithSource { .. } => "UPSTREAM_FAILURE",
            AppError::ImageProcessing(_) => "IMAGE_PROCESSING_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Timeout(_) | AppError::Upstream(_) | AppError::UpstreamWithSource { .. }
        )
    }

    fn client_message(&self) -> String {
        match self {
            AppError::NotFound(msg) => format!("Not found: {}", msg),
            AppError::Validation(msg) => format!("Invalid request: {}", msg),
            AppError::Timeout(_) => "The operation timed out".to_string(),
            AppError::Upstream(_) | AppError::UpstreamWithSource { .. } => {
                "An upstream service failed".to_string()
            }
            AppError::ImageProcessing(_) => "The image could not be processed".to_string(),
            AppError::Internal(_) => "An internal error occurred".to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            AppError::NotFound(_) | AppError::Validation(_) => LogLevel::Debug,
            AppError::Timeout(_) | AppError::Upstream(_) | AppError::UpstreamWithSource { .. } => {
                LogLevel::Warn
            }
            AppError::ImageProcessing(_) | AppError::Internal(_) => LogLevel::Error,
        }
    }
}
