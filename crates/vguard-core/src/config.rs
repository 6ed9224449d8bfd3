//! Configuration for the targeting controller.
//!
//! Defaults match a QVGA (320x240) grayscale sensor with hobby servos on
//! the pan and tilt axes.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use vguard_models::SteeringDirection;

use crate::error::{ControlError, ControlResult};
use crate::tracking::ANGLE_LIMIT;

/// Proportional steering parameters for one actuator axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisConfig {
    /// Degrees of correction per pixel of offset (default: 0.05)
    pub gain: f32,

    /// Largest correction issued in a single frame, in degrees (default: 3.0)
    pub max_step: f32,

    /// Lower actuator bound in degrees (default: -90.0)
    pub min_angle: f32,

    /// Upper actuator bound in degrees (default: 90.0)
    pub max_angle: f32,

    /// Mounting direction of the servo
    pub direction: SteeringDirection,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            gain: 0.05,
            max_step: 3.0,
            min_angle: -90.0,
            max_angle: 90.0,
            direction: SteeringDirection::Normal,
        }
    }
}

/// Configuration for the whole controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    // === Matching ===
    /// Minimum similarity (0-1) for the matcher to report a hit (default: 0.7)
    pub match_threshold: f32,

    /// Pixel stride used by the matcher search (default: 6)
    pub search_step: u32,

    /// Gaussian blur sigma applied to templates at load time (default: 1.5)
    pub template_blur: f32,

    // === Confirmation ===
    /// Consecutive frames a signal must persist to be confirmed (default: 5)
    pub confirm_frames: u32,

    /// Pixel radius around the frame center treated as centered (default: 5)
    pub dead_zone: i32,

    // === Steering ===
    pub pan: AxisConfig,
    pub tilt: AxisConfig,

    /// Frame center x-coordinate used for offsets (default: 175)
    pub frame_center_x: i32,

    /// Frame center y-coordinate used for offsets (default: 110)
    pub frame_center_y: i32,

    /// Pan angle held in mark mode so the operator is not re-detected (default: -55)
    pub mark_pan_angle: i32,

    // === Timing ===
    /// Grace period of every delay mode, in milliseconds (default: 3000)
    pub delay_ms: u64,

    /// Time after entering mark mode before enrollment counting starts (default: 1000)
    pub mark_settle_ms: u64,

    /// Minimum time between alert output toggles (default: 500)
    pub alert_period_ms: u64,

    /// Minimum time between SAFE reports in detect mode (default: 1000)
    pub safe_report_ms: u64,

    // === Button ===
    /// Minimum time between accepted key edges (default: 300)
    pub debounce_ms: u64,

    /// Hold time at or above which a press counts as long (default: 1000)
    pub long_press_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            match_threshold: 0.7,
            search_step: 6,
            template_blur: 1.5,

            confirm_frames: 5,
            dead_zone: 5,

            pan: AxisConfig::default(),
            tilt: AxisConfig::default(),
            frame_center_x: 175,
            frame_center_y: 110,
            mark_pan_angle: -55,

            delay_ms: 3000,
            mark_settle_ms: 1000,
            alert_period_ms: 500,
            safe_report_ms: 1000,

            debounce_ms: 300,
            long_press_ms: 1000,
        }
    }
}

impl ControllerConfig {
    /// Faster confirmation and stronger steering for a close, fast target.
    pub fn responsive() -> Self {
        let axis = AxisConfig {
            gain: 0.08,
            max_step: 5.0,
            ..Default::default()
        };
        Self {
            confirm_frames: 3,
            pan: axis,
            tilt: axis,
            ..Default::default()
        }
    }

    /// Longer confirmation window for noisy scenes.
    pub fn conservative() -> Self {
        Self {
            match_threshold: 0.8,
            confirm_frames: 8,
            dead_zone: 8,
            ..Default::default()
        }
    }

    /// Look up a named preset: `default`, `responsive` or `conservative`.
    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "default" => Some(Self::default()),
            "responsive" => Some(Self::responsive()),
            "conservative" => Some(Self::conservative()),
            _ => None,
        }
    }

    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> ControlResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Create config from environment variables. `VGUARD_PRESET` picks the
    /// base values; individual variables override them.
    pub fn from_env() -> Self {
        let defaults = std::env::var("VGUARD_PRESET")
            .ok()
            .and_then(|name| Self::preset(&name))
            .unwrap_or_default();
        Self {
            match_threshold: env_parse("VGUARD_MATCH_THRESHOLD").unwrap_or(defaults.match_threshold),
            search_step: env_parse("VGUARD_SEARCH_STEP").unwrap_or(defaults.search_step),
            template_blur: env_parse("VGUARD_TEMPLATE_BLUR").unwrap_or(defaults.template_blur),
            confirm_frames: env_parse("VGUARD_CONFIRM_FRAMES").unwrap_or(defaults.confirm_frames),
            dead_zone: env_parse("VGUARD_DEAD_ZONE").unwrap_or(defaults.dead_zone),
            pan: AxisConfig {
                gain: env_parse("VGUARD_PAN_GAIN").unwrap_or(defaults.pan.gain),
                max_step: env_parse("VGUARD_MAX_STEP").unwrap_or(defaults.pan.max_step),
                direction: env_direction("VGUARD_PAN_DIRECTION").unwrap_or(defaults.pan.direction),
                ..defaults.pan
            },
            tilt: AxisConfig {
                gain: env_parse("VGUARD_TILT_GAIN").unwrap_or(defaults.tilt.gain),
                max_step: env_parse("VGUARD_MAX_STEP").unwrap_or(defaults.tilt.max_step),
                direction: env_direction("VGUARD_TILT_DIRECTION").unwrap_or(defaults.tilt.direction),
                ..defaults.tilt
            },
            frame_center_x: env_parse("VGUARD_CENTER_X").unwrap_or(defaults.frame_center_x),
            frame_center_y: env_parse("VGUARD_CENTER_Y").unwrap_or(defaults.frame_center_y),
            mark_pan_angle: env_parse("VGUARD_MARK_PAN_ANGLE").unwrap_or(defaults.mark_pan_angle),
            delay_ms: env_parse("VGUARD_DELAY_MS").unwrap_or(defaults.delay_ms),
            mark_settle_ms: env_parse("VGUARD_MARK_SETTLE_MS").unwrap_or(defaults.mark_settle_ms),
            alert_period_ms: env_parse("VGUARD_ALERT_PERIOD_MS").unwrap_or(defaults.alert_period_ms),
            safe_report_ms: env_parse("VGUARD_SAFE_REPORT_MS").unwrap_or(defaults.safe_report_ms),
            debounce_ms: env_parse("VGUARD_DEBOUNCE_MS").unwrap_or(defaults.debounce_ms),
            long_press_ms: env_parse("VGUARD_LONG_PRESS_MS").unwrap_or(defaults.long_press_ms),
        }
    }

    /// Reject values the controller cannot operate with.
    pub fn validate(&self) -> ControlResult<()> {
        if !(0.0..=1.0).contains(&self.match_threshold) {
            return Err(ControlError::invalid_config(format!(
                "match_threshold must be within 0..=1, got {}",
                self.match_threshold
            )));
        }
        if self.search_step == 0 {
            return Err(ControlError::invalid_config("search_step must be at least 1"));
        }
        if self.confirm_frames == 0 {
            return Err(ControlError::invalid_config("confirm_frames must be at least 1"));
        }
        if self.dead_zone < 0 {
            return Err(ControlError::invalid_config("dead_zone must not be negative"));
        }
        if self.frame_center_x <= 0 || self.frame_center_y <= 0 {
            return Err(ControlError::invalid_config("frame center must be positive"));
        }
        if !self.template_blur.is_finite() || self.template_blur < 0.0 {
            return Err(ControlError::invalid_config("template_blur must be finite and non-negative"));
        }
        for (name, axis) in [("pan", &self.pan), ("tilt", &self.tilt)] {
            let finite = [axis.min_angle, axis.max_angle, axis.gain, axis.max_step];
            if finite.iter().any(|v| !v.is_finite()) {
                return Err(ControlError::invalid_config(format!(
                    "{} angles, gain and max_step must be finite",
                    name
                )));
            }
            // Bounds are cut to the servo limit before use.
            if axis.min_angle.max(-ANGLE_LIMIT) >= axis.max_angle.min(ANGLE_LIMIT) {
                return Err(ControlError::invalid_config(format!(
                    "{} min_angle must be below max_angle within ±{}",
                    name, ANGLE_LIMIT
                )));
            }
            if axis.max_step <= 0.0 || axis.gain < 0.0 {
                return Err(ControlError::invalid_config(format!(
                    "{} gain must be non-negative and max_step positive",
                    name
                )));
            }
        }
        if self.delay_ms == 0 || self.alert_period_ms == 0 {
            return Err(ControlError::invalid_config("delay and alert period must be non-zero"));
        }
        Ok(())
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn mark_settle(&self) -> Duration {
        Duration::from_millis(self.mark_settle_ms)
    }

    pub fn alert_period(&self) -> Duration {
        Duration::from_millis(self.alert_period_ms)
    }

    pub fn safe_report_interval(&self) -> Duration {
        Duration::from_millis(self.safe_report_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn env_direction(key: &str) -> Option<SteeringDirection> {
    match std::env::var(key).ok()?.trim().to_lowercase().as_str() {
        "normal" => Some(SteeringDirection::Normal),
        "inverted" => Some(SteeringDirection::Inverted),
        _ => None,
    }
}
