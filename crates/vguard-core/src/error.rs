//! Error types for controller operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for controller operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur while setting up or feeding the controller.
///
/// None of these are raised from the per-frame path: once the loop is
/// running every failure is logged and recovered locally.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("Template load failed for {}: {}", .path.display(), .message)]
    TemplateLoad { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Frame source failed: {0}")]
    FrameSource(String),

    #[error("Frame source exhausted")]
    SourceExhausted,

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl ControlError {
    /// Create a template load failure.
    pub fn template_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::TemplateLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Create a frame source failure.
    pub fn frame_source(message: impl Into<String>) -> Self {
        Self::FrameSource(message.into())
    }

    /// Check if the run loop should retry after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ControlError::FrameSource(_) | ControlError::Image(_) | ControlError::Io(_))
    }
}
