#![deny(unreachable_patterns)]
//! Control core of the VGuard targeting controller.
//!
//! This crate provides:
//! - N-consecutive-frame confirmation of template identities
//! - The six-mode state machine (normal, mark, detect and their delays)
//! - Proportional pan/tilt steering with dead zone and step limits
//! - Edge-triggered centering output and periodic alert toggling
//! - Template catalog loading and button press classification
//! - Overlay composition through a pluggable renderer
//!
//! Hardware and camera access stay behind the traits in [`hardware`] and
//! [`vision`]; [`SafetySystem`] ties everything together one frame at a time.

pub mod alert;
pub mod button;
pub mod catalog;
pub mod centering;
pub mod config;
pub mod confirmation;
pub mod controller;
pub mod error;
pub mod hardware;
pub mod metrics;
pub mod overlay;
pub mod system;
pub mod tracking;
pub mod vision;

#[cfg(test)]
mod tests;

pub use alert::AlertSignaler;
pub use button::PressClassifier;
pub use catalog::{Template, TemplateCatalog};
pub use centering::{CenteringGate, OutputEdge};
pub use config::{AxisConfig, ControllerConfig};
pub use confirmation::{Confirmation, ConfirmationEngine};
pub use controller::{ArmedTarget, ControllerState, ModeController, Transition};
pub use error::{ControlError, ControlResult};
pub use hardware::{BinaryOutput, ButtonInput, Devices, SteeringActuator};
pub use overlay::{DrawStyle, Hud, NullRenderer, Renderer};
pub use system::{ConfirmationCounts, Detection, SafetySystem};
pub use tracking::{AxisTracker, SteeringCommand, TrackingController};
pub use vision::{Frame, FrameSource, TemplateMatcher};
