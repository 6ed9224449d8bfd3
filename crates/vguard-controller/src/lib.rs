//! VGuard targeting controller runtime.
//!
//! This crate provides:
//! - The paced frame loop with deadline accounting
//! - A directory-backed frame source and an NCC template matcher
//! - Logging stand-ins for servos and on/off outputs
//! - A console button and an overlay renderer that writes annotated frames

pub mod button;
pub mod config;
pub mod control_loop;
pub mod devices;
pub mod error;
pub mod frame_source;
pub mod logging;
pub mod matcher;
pub mod renderer;

pub use button::{ButtonCommand, StdinButton};
pub use config::RunnerConfig;
pub use control_loop::{ControlLoop, FpsCounter, LoopStats};
pub use devices::{LoggingOutput, LoggingServo};
pub use error::{RunnerError, RunnerResult};
pub use frame_source::DirectoryFrameSource;
pub use logging::SessionLogger;
pub use matcher::GrayTemplateMatcher;
pub use renderer::FrameRenderer;
