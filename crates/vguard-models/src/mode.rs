//! Operating modes of the targeting controller.
//!
//! The controller cycles through six modes:
//!
//! - `Normal`: report every match, no actuation
//! - `DelayToMark`: grace period before enrollment
//! - `Mark`: enroll or cycle the danger target
//! - `DelayToDetect`: grace period before detection
//! - `Detect`: confirm, track and alert on the danger target
//! - `DelayToNormal`: grace period before returning to `Normal`

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Operating mode. Exactly one is active at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Scan for every enrolled template and report matches.
    #[default]
    Normal,

    /// Waiting out the delay before entering `Mark`.
    DelayToMark,

    /// Enrollment: the operator flags one template as the danger target.
    Mark,

    /// Waiting out the delay before entering `Detect`.
    DelayToDetect,

    /// Danger detection with steering and alerting.
    Detect,

    /// Waiting out the delay before returning to `Normal`.
    DelayToNormal,
}

impl Mode {
    /// All modes in cycle order.
    pub const ALL: &'static [Mode] = &[
        Mode::Normal,
        Mode::DelayToMark,
        Mode::Mark,
        Mode::DelayToDetect,
        Mode::Detect,
        Mode::DelayToNormal,
    ];

    /// Returns the mode name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::DelayToMark => "delay_to_mark",
            Mode::Mark => "mark",
            Mode::DelayToDetect => "delay_to_detect",
            Mode::Detect => "detect",
            Mode::DelayToNormal => "delay_to_normal",
        }
    }

    /// Short label shown on the device overlay.
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Mark => "MARK",
            Mode::Detect => "DANGER",
            Mode::DelayToMark | Mode::DelayToDetect | Mode::DelayToNormal => "DELAY",
        }
    }

    /// Returns true for the three timed grace-period modes.
    pub fn is_delay(&self) -> bool {
        matches!(
            self,
            Mode::DelayToMark | Mode::DelayToDetect | Mode::DelayToNormal
        )
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(Mode::Normal),
            "delay_to_mark" => Ok(Mode::DelayToMark),
            "mark" => Ok(Mode::Mark),
            "delay_to_detect" => Ok(Mode::DelayToDetect),
            "detect" | "danger" => Ok(Mode::Detect),
            "delay_to_normal" => Ok(Mode::DelayToNormal),
            _ => Err(ModeParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown mode: {0}")]
pub struct ModeParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!("normal".parse::<Mode>().unwrap(), Mode::Normal);
        assert_eq!("MARK".parse::<Mode>().unwrap(), Mode::Mark);
        assert_eq!("danger".parse::<Mode>().unwrap(), Mode::Detect);
        assert_eq!("delay_to_normal".parse::<Mode>().unwrap(), Mode::DelayToNormal);
        assert!("armed".parse::<Mode>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for mode in Mode::ALL {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), *mode);
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(Mode::Detect.label(), "DANGER");
        assert_eq!(Mode::DelayToDetect.label(), "DELAY");
        assert!(Mode::DelayToNormal.is_delay());
        assert!(!Mode::Mark.is_delay());
    }
}
