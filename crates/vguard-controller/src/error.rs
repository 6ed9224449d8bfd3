//! Runner error types.

use std::path::PathBuf;
use thiserror::Error;
use vguard_core::ControlError;

pub type RunnerResult<T> = Result<T, RunnerError>;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("No frames found in {}", .0.display())]
    NoFrames(PathBuf),

    #[error("Overlay output failed: {0}")]
    OverlayFailed(String),

    #[error("Control error: {0}")]
    Control(#[from] ControlError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RunnerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn overlay_failed(msg: impl Into<String>) -> Self {
        Self::OverlayFailed(msg.into())
    }

    /// Whether the loop can keep going after this error.
    pub fn is_retryable(&self) -> bool {
        match self {
            RunnerError::Control(e) => e.is_retryable(),
            RunnerError::OverlayFailed(_) | RunnerError::Image(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_source_errors_are_retryable() {
        let err: RunnerError = ControlError::frame_source("decode failed").into();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_exhausted_source_is_not_retryable() {
        let err: RunnerError = ControlError::SourceExhausted.into();
        assert!(!err.is_retryable());
        assert!(!RunnerError::config_error("bad").is_retryable());
    }

    #[test]
    fn test_no_frames_message_names_directory() {
        let err = RunnerError::NoFrames(PathBuf::from("/data/frames"));
        assert_eq!(err.to_string(), "No frames found in /data/frames");
    }
}
