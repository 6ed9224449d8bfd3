//! Simulated actuators that log every physical change.

use tracing::{debug, info};
use vguard_core::{BinaryOutput, SteeringActuator};

/// Servo stand-in. Repeated writes of the held angle are absorbed.
#[derive(Debug)]
pub struct LoggingServo {
    axis: &'static str,
    angle: Option<i32>,
    moves: u64,
}

impl LoggingServo {
    pub fn new(axis: &'static str) -> Self {
        Self {
            axis,
            angle: None,
            moves: 0,
        }
    }

    pub fn angle(&self) -> Option<i32> {
        self.angle
    }

    /// Number of writes that changed the angle.
    pub fn moves(&self) -> u64 {
        self.moves
    }
}

impl SteeringActuator for LoggingServo {
    fn set_angle(&mut self, degrees: i32) {
        let degrees = degrees.clamp(-90, 90);
        if self.angle == Some(degrees) {
            return;
        }
        debug!(axis = self.axis, from = ?self.angle, to = degrees, "Servo moved");
        self.angle = Some(degrees);
        self.moves += 1;
    }
}

/// On/off output stand-in.
#[derive(Debug)]
pub struct LoggingOutput {
    name: &'static str,
    level: bool,
    edges: u64,
}

impl LoggingOutput {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            level: false,
            edges: 0,
        }
    }

    pub fn level(&self) -> bool {
        self.level
    }

    /// Number of level changes.
    pub fn edges(&self) -> u64 {
        self.edges
    }
}

impl BinaryOutput for LoggingOutput {
    fn set(&mut self, on: bool) {
        if self.level == on {
            return;
        }
        info!(output = self.name, on, "Output switched");
        self.level = on;
        self.edges += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_servo_absorbs_repeated_writes() {
        let mut servo = LoggingServo::new("pan");
        servo.set_angle(10);
        servo.set_angle(10);
        servo.set_angle(-4);
        assert_eq!(servo.angle(), Some(-4));
        assert_eq!(servo.moves(), 2);
    }

    #[test]
    fn test_servo_clamps_to_mechanical_range() {
        let mut servo = LoggingServo::new("tilt");
        servo.set_angle(140);
        assert_eq!(servo.angle(), Some(90));
    }

    #[test]
    fn test_output_counts_edges_only() {
        let mut output = LoggingOutput::new("alert");
        output.set(false);
        output.set(true);
        output.set(true);
        output.set(false);
        assert!(!output.level());
        assert_eq!(output.edges(), 2);
    }
}
