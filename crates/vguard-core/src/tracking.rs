//! Proportional pan/tilt steering.
//!
//! Converts the pixel offset of the confirmed target into bounded angle
//! corrections, one axis at a time:
//!
//! 1. clamp the offset to the half-frame extent
//! 2. inside the dead zone, hold position
//! 3. otherwise `delta = -offset * gain * direction`, clamped to `max_step`
//! 4. `angle = clamp(angle + delta, min_angle, max_angle)`
//!
//! A command is issued only when the angle actually changes.

use tracing::trace;
use vguard_models::PixelOffset;

use crate::config::{AxisConfig, ControllerConfig};
use crate::hardware::Devices;
use crate::metrics;

/// Hard mechanical limit of the servos, in degrees.
pub const ANGLE_LIMIT: f32 = 90.0;

/// Steering state of one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisTracker {
    angle: f32,
    min_angle: f32,
    max_angle: f32,
    dead_zone: i32,
    half_extent: i32,
    gain: f32,
    max_step: f32,
    sign: f32,
}

impl AxisTracker {
    pub fn new(config: &AxisConfig, dead_zone: i32, half_extent: i32) -> Self {
        let min_angle = config.min_angle.clamp(-ANGLE_LIMIT, ANGLE_LIMIT);
        let max_angle = config.max_angle.clamp(-ANGLE_LIMIT, ANGLE_LIMIT);

        Self {
            angle: 0.0,
            min_angle: min_angle.min(max_angle),
            max_angle: max_angle.max(min_angle),
            dead_zone,
            half_extent: half_extent.max(0),
            gain: config.gain,
            max_step: config.max_step.abs(),
            sign: config.direction.sign(),
        }
    }

    /// Apply one frame's offset. Returns the angle to command, if it changed.
    #[must_use]
    pub fn step(&mut self, offset: i32) -> Option<i32> {
        let offset = offset.clamp(-self.half_extent, self.half_extent);
        if offset.abs() <= self.dead_zone {
            return None;
        }

        let delta = (-(offset as f32) * self.gain * self.sign).clamp(-self.max_step, self.max_step);
        let angle = (self.angle + delta).clamp(self.min_angle, self.max_angle);
        if angle == self.angle {
            return None;
        }

        self.angle = angle;
        // Servo drivers take whole degrees; truncate toward zero.
        Some(angle as i32)
    }

    /// Return to neutral without commanding the actuator.
    pub fn reset(&mut self) {
        self.angle = 0.0;
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }
}

/// Angles commanded during one tracking step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SteeringCommand {
    pub pan: Option<i32>,
    pub tilt: Option<i32>,
}

/// Two-axis proportional controller.
#[derive(Debug, Clone)]
pub struct TrackingController {
    pan: AxisTracker,
    tilt: AxisTracker,
}

impl TrackingController {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            pan: AxisTracker::new(&config.pan, config.dead_zone, config.frame_center_x),
            tilt: AxisTracker::new(&config.tilt, config.dead_zone, config.frame_center_y),
        }
    }

    /// Steer both axes toward the target and write changed angles.
    pub fn track(&mut self, offset: PixelOffset, devices: &mut Devices) -> SteeringCommand {
        let command = SteeringCommand {
            pan: self.pan.step(offset.dx),
            tilt: self.tilt.step(offset.dy),
        };

        if let Some(angle) = command.pan {
            devices.pan.set_angle(angle);
            metrics::record_actuator_command("pan");
        }
        if let Some(angle) = command.tilt {
            devices.tilt.set_angle(angle);
            metrics::record_actuator_command("tilt");
        }
        if command != SteeringCommand::default() {
            trace!(dx = offset.dx, dy = offset.dy, ?command, "Steering correction");
        }

        command
    }

    /// Forget accumulated angles; both axes read neutral again.
    pub fn reset(&mut self) {
        self.pan.reset();
        self.tilt.reset();
    }

    pub fn pan(&self) -> &AxisTracker {
        &self.pan
    }

    pub fn tilt(&self) -> &AxisTracker {
        &self.tilt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vguard_models::SteeringDirection;

    fn axis(gain: f32, max_step: f32) -> AxisTracker {
        let config = AxisConfig {
            gain,
            max_step,
            ..Default::default()
        };
        AxisTracker::new(&config, 5, 175)
    }

    #[test]
    fn test_large_offset_is_step_limited() {
        let mut tracker = axis(0.05, 3.0);
        // -(-100) * 0.05 = 5, clamped to 3
        assert_eq!(tracker.step(-100), Some(3));
        assert_eq!(tracker.angle(), 3.0);
    }

    #[test]
    fn test_positive_offset_rotates_negative() {
        let mut tracker = axis(0.05, 3.0);
        assert_eq!(tracker.step(40), Some(-2));
        assert_eq!(tracker.angle(), -2.0);
    }

    #[test]
    fn test_inverted_direction_flips_correction() {
        let config = AxisConfig {
            direction: SteeringDirection::Inverted,
            ..Default::default()
        };
        let mut tracker = AxisTracker::new(&config, 5, 175);
        assert_eq!(tracker.step(-100), Some(-3));
    }

    #[test]
    fn test_dead_zone_is_a_fixed_point() {
        let mut tracker = axis(0.05, 3.0);
        let _ = tracker.step(-100);
        let held = tracker.angle();

        for offset in [-5, -1, 0, 3, 5] {
            assert_eq!(tracker.step(offset), None);
            assert_eq!(tracker.angle(), held);
        }
    }

    #[test]
    fn test_angle_never_leaves_bounds() {
        let mut tracker = axis(1.0, 30.0);
        for _ in 0..20 {
            let _ = tracker.step(-175);
            assert!(tracker.angle() <= ANGLE_LIMIT);
        }
        assert_eq!(tracker.angle(), 90.0);
        // Saturated: no further command
        assert_eq!(tracker.step(-175), None);

        for _ in 0..20 {
            let before = tracker.angle();
            let _ = tracker.step(175);
            assert!(tracker.angle() >= -ANGLE_LIMIT);
            assert!((tracker.angle() - before).abs() <= 30.0);
        }
        assert_eq!(tracker.angle(), -90.0);
    }

    #[test]
    fn test_offset_clamped_to_half_extent() {
        let mut tracker = axis(0.01, 10.0);
        // 1000 px clamps to 175 px -> 1.75 degrees
        let _ = tracker.step(-1000);
        assert!((tracker.angle() - 1.75).abs() < 1e-5);
    }

    #[test]
    fn test_configured_bounds_cannot_exceed_servo_limit() {
        let config = AxisConfig {
            min_angle: -180.0,
            max_angle: 180.0,
            gain: 1.0,
            max_step: 200.0,
            ..Default::default()
        };
        let mut tracker = AxisTracker::new(&config, 0, 1000);
        assert_eq!(tracker.step(-1000), Some(90));
    }

    #[test]
    fn test_bounds_beyond_servo_limit_stay_ordered() {
        let config = AxisConfig {
            min_angle: 95.0,
            max_angle: 100.0,
            gain: 1.0,
            max_step: 30.0,
            ..Default::default()
        };
        let mut tracker = AxisTracker::new(&config, 0, 175);
        // Both bounds collapse onto the limit; the first step pins there.
        assert_eq!(tracker.step(-100), Some(90));
        assert_eq!(tracker.step(100), None);
        assert_eq!(tracker.angle(), 90.0);
    }

    #[test]
    fn test_reset_returns_to_neutral() {
        let mut tracker = axis(0.05, 3.0);
        let _ = tracker.step(-100);
        tracker.reset();
        assert_eq!(tracker.angle(), 0.0);
    }
}
