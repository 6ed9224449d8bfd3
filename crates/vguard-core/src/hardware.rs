//! Actuator and output interfaces.
//!
//! The controller never talks to pins or servos directly. It writes through
//! these traits, and the run loop owns the concrete drivers in a
//! [`Devices`] bundle that is lent to the controller once per frame.

use std::time::Instant;
use vguard_models::ButtonEvent;

/// Angle-commanded steering servo.
///
/// Writes are idempotent: commanding the angle already held has no effect
/// beyond the physical actuator.
#[cfg_attr(test, mockall::automock)]
pub trait SteeringActuator: Send {
    /// Command an absolute angle in degrees, within `[-90, 90]`.
    fn set_angle(&mut self, degrees: i32);
}

/// Logical on/off output. Electrical polarity is the driver's concern.
#[cfg_attr(test, mockall::automock)]
pub trait BinaryOutput: Send {
    fn set(&mut self, on: bool);
}

/// Source of debounced button events, polled once per frame.
pub trait ButtonInput: Send {
    fn poll(&mut self, now: Instant) -> Option<ButtonEvent>;
}

/// Hardware handles driven by the controller.
pub struct Devices {
    /// Horizontal steering servo
    pub pan: Box<dyn SteeringActuator>,
    /// Vertical steering servo
    pub tilt: Box<dyn SteeringActuator>,
    /// Audible alert, toggled while the danger target is confirmed
    pub alert: Box<dyn BinaryOutput>,
    /// Centering output (lamp/laser), raised while the target stays centered
    pub centering: Box<dyn BinaryOutput>,
}

impl Devices {
    pub fn new(
        pan: Box<dyn SteeringActuator>,
        tilt: Box<dyn SteeringActuator>,
        alert: Box<dyn BinaryOutput>,
        centering: Box<dyn BinaryOutput>,
    ) -> Self {
        Self {
            pan,
            tilt,
            alert,
            centering,
        }
    }

    /// Drive both axes to neutral and switch both outputs off.
    pub fn park(&mut self) {
        self.pan.set_angle(0);
        self.tilt.set_angle(0);
        self.alert.set(false);
        self.centering.set(false);
    }
}
