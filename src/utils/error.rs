//! Error types and handling
//!
//! Common error types used across the application.

use crate::capture::CaptureError;
use crate::feedback::api::ApiError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Recording error: {0}")]
    Recording(String),

    #[error("Failed to load space: {0}")]
    FetchFailed(ApiError),

    #[error("Failed to submit feedback: {0}")]
    SubmissionFailed(ApiError),
}

impl From<CaptureError> for AppError {
    fn from(error: CaptureError) -> Self {
        match error {
            CaptureError::PermissionDenied(msg) => AppError::PermissionDenied(msg),
            CaptureError::DeviceUnavailable(msg) => AppError::DeviceUnavailable(msg),
            other => AppError::Recording(other.to_string()),
        }
    }
}

/// Error response for UI listeners
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        let code = match &error {
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::PermissionDenied(_) => "PERMISSION_DENIED",
            AppError::DeviceUnavailable(_) => "DEVICE_UNAVAILABLE",
            AppError::Recording(_) => "RECORDING_ERROR",
            AppError::FetchFailed(_) => "FETCH_FAILED",
            AppError::SubmissionFailed(_) => "SUBMISSION_FAILED",
        };

        ErrorResponse {
            code: code.to_string(),
            message: error.to_string(),
        }
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
