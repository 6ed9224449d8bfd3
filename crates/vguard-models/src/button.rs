//! Debounced button events.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Event produced once per physical press cycle.
///
/// The two variants are mutually exclusive: a press is classified on
/// release by how long the key was held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ButtonEvent {
    /// Held for less than the long-press threshold.
    ShortPress,
    /// Held for at least the long-press threshold.
    LongPress,
}

impl ButtonEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonEvent::ShortPress => "short_press",
            ButtonEvent::LongPress => "long_press",
        }
    }
}

impl fmt::Display for ButtonEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
