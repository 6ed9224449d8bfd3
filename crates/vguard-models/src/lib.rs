//! Shared data models for the VGuard targeting controller.
//!
//! This crate provides Serde-serializable types for:
//! - Operating modes and button events
//! - Template identities and session identifiers
//! - Match geometry (rectangles and pixel offsets)
//! - Per-frame reports emitted by the controller

pub mod button;
pub mod geometry;
pub mod mode;
pub mod report;
pub mod session;
pub mod steering;
pub mod template;

// Re-export common types
pub use button::ButtonEvent;
pub use geometry::{MatchRect, PixelOffset};
pub use mode::{Mode, ModeParseError};
pub use report::FrameReport;
pub use session::SessionId;
pub use steering::SteeringDirection;
pub use template::TemplateId;
