//! Steering calibration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Mounting direction of a steering actuator.
///
/// Which way an actuator must rotate to pull a target back toward the
/// frame center depends on how the servo is mounted, so it is configured
/// rather than derived. `Normal` rotates by `-offset * gain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum SteeringDirection {
    #[default]
    Normal,
    Inverted,
}

impl SteeringDirection {
    /// Multiplier applied to the proportional correction.
    pub fn sign(&self) -> f32 {
        match self {
            SteeringDirection::Normal => 1.0,
            SteeringDirection::Inverted => -1.0,
        }
    }
}
