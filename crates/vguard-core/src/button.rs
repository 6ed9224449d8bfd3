//! Press classification from sampled key levels.
//!
//! The key is sampled once per frame. An edge is accepted only when more
//! than the debounce window has passed since the previous accepted edge;
//! a press is classified on release by how long it was held.

use std::time::{Duration, Instant};
use tracing::debug;
use vguard_models::ButtonEvent;

use crate::config::ControllerConfig;

/// Turns raw key levels into short/long press events.
#[derive(Debug, Clone)]
pub struct PressClassifier {
    debounce: Duration,
    long_press: Duration,
    pressed_at: Option<Instant>,
    last_edge: Option<Instant>,
}

impl PressClassifier {
    pub fn new(debounce: Duration, long_press: Duration) -> Self {
        Self {
            debounce,
            long_press,
            pressed_at: None,
            last_edge: None,
        }
    }

    pub fn from_config(config: &ControllerConfig) -> Self {
        Self::new(config.debounce(), config.long_press())
    }

    /// Feed the key level observed at `now`. Returns an event on an
    /// accepted release edge.
    pub fn sample(&mut self, down: bool, now: Instant) -> Option<ButtonEvent> {
        let settled = self
            .last_edge
            .map_or(true, |last| now.saturating_duration_since(last) > self.debounce);
        if !settled {
            return None;
        }

        match (down, self.pressed_at) {
            (true, None) => {
                debug!("Key pressed");
                self.pressed_at = Some(now);
                self.last_edge = Some(now);
                None
            }
            (false, Some(pressed_at)) => {
                let held = now.saturating_duration_since(pressed_at);
                self.pressed_at = None;
                self.last_edge = Some(now);

                let event = if held >= self.long_press {
                    ButtonEvent::LongPress
                } else {
                    ButtonEvent::ShortPress
                };
                debug!(held_ms = held.as_millis() as u64, %event, "Key released");
                Some(event)
            }
            _ => None,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed_at.is_some()
    }
}
