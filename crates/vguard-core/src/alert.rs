//! Periodic alert output.

use std::time::{Duration, Instant};
use tracing::warn;
use vguard_models::TemplateId;

use crate::hardware::BinaryOutput;
use crate::metrics;

/// Toggles the alert output while the danger target is confirmed.
#[derive(Debug, Clone)]
pub struct AlertSignaler {
    period: Duration,
    last_toggle: Option<Instant>,
    level: bool,
}

impl AlertSignaler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last_toggle: None,
            level: false,
        }
    }

    /// Called on frames where the danger target is confirmed. Flips the
    /// output when at least one period has passed since the last flip.
    /// The first confirmed frame flips immediately. Returns true when the
    /// output was toggled.
    pub fn signal(&mut self, target: &TemplateId, now: Instant, output: &mut dyn BinaryOutput) -> bool {
        let due = self
            .last_toggle
            .map_or(true, |last| now.saturating_duration_since(last) >= self.period);
        if !due {
            return false;
        }

        self.level = !self.level;
        output.set(self.level);
        self.last_toggle = Some(now);
        metrics::record_alert_toggle();
        warn!(target_id = %target, on = self.level, "[WARNING] Danger target detected: {}", target);
        true
    }

    /// Called on every frame without a confirmed danger target: holds the
    /// output off. The next confirmation starts with an "on" toggle.
    pub fn hold_off(&mut self, output: &mut dyn BinaryOutput) {
        output.set(false);
        self.level = false;
        self.last_toggle = None;
    }

    pub fn is_on(&self) -> bool {
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::MockBinaryOutput;
    use mockall::predicate::eq;
    use mockall::Sequence;

    #[test]
    fn test_toggles_at_period() {
        let mut output = MockBinaryOutput::new();
        let mut seq = Sequence::new();
        output.expect_set().with(eq(true)).times(1).in_sequence(&mut seq).return_const(());
        output.expect_set().with(eq(false)).times(1).in_sequence(&mut seq).return_const(());
        output.expect_set().with(eq(true)).times(1).in_sequence(&mut seq).return_const(());

        let target = TemplateId::new("1");
        let mut alert = AlertSignaler::new(Duration::from_millis(500));
        let t0 = Instant::now();

        assert!(alert.signal(&target, t0, &mut output));
        assert!(!alert.signal(&target, t0 + Duration::from_millis(200), &mut output));
        assert!(!alert.signal(&target, t0 + Duration::from_millis(499), &mut output));
        assert!(alert.signal(&target, t0 + Duration::from_millis(500), &mut output));
        assert!(!alert.is_on());
        assert!(alert.signal(&target, t0 + Duration::from_millis(1000), &mut output));
        assert!(alert.is_on());
    }

    #[test]
    fn test_hold_off_restarts_cycle() {
        let mut output = MockBinaryOutput::new();
        let mut seq = Sequence::new();
        output.expect_set().with(eq(true)).times(1).in_sequence(&mut seq).return_const(());
        output.expect_set().with(eq(false)).times(1).in_sequence(&mut seq).return_const(());
        output.expect_set().with(eq(true)).times(1).in_sequence(&mut seq).return_const(());

        let target = TemplateId::new("1");
        let mut alert = AlertSignaler::new(Duration::from_millis(500));
        let t0 = Instant::now();

        alert.signal(&target, t0, &mut output);
        alert.hold_off(&mut output);
        // Immediately on again, no period wait after a lapse
        assert!(alert.signal(&target, t0 + Duration::from_millis(10), &mut output));
    }
}
