//! Centering gate for the lamp/laser output.
//!
//! The output goes high once the target has stayed inside the dead zone
//! for a full confirmation window, and low on the first frame it leaves.
//! Both edges are written exactly once, so noise at the dead-zone boundary
//! cannot make the output chatter while the target is held.

use tracing::debug;
use vguard_models::PixelOffset;

use crate::confirmation::ConfirmationEngine;
use crate::hardware::BinaryOutput;

/// Marker identity fed to the engine while the target is centered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Centered;

/// Edge written to the output during a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEdge {
    Rising,
    Falling,
}

/// Edge-triggered centering output driver.
#[derive(Debug, Clone)]
pub struct CenteringGate {
    streak: ConfirmationEngine<Centered>,
    dead_zone: i32,
    output_high: bool,
}

impl CenteringGate {
    pub fn new(confirm_frames: u32, dead_zone: i32) -> Self {
        Self {
            streak: ConfirmationEngine::new(confirm_frames),
            dead_zone,
            output_high: false,
        }
    }

    /// Evaluate one frame's target offset. `None` means no confirmed
    /// target this frame, which counts as not centered.
    pub fn update(
        &mut self,
        offset: Option<PixelOffset>,
        output: &mut dyn BinaryOutput,
    ) -> Option<OutputEdge> {
        let centered = offset.is_some_and(|o| o.within(self.dead_zone));
        let confirmation = self.streak.update(centered.then_some(Centered));

        if confirmation.confirmed && !self.output_high {
            output.set(true);
            self.output_high = true;
            debug!("Target centered, output raised");
            return Some(OutputEdge::Rising);
        }
        if !centered && self.output_high {
            output.set(false);
            self.output_high = false;
            debug!("Target left center, output lowered");
            return Some(OutputEdge::Falling);
        }
        None
    }

    /// Force the output low and drop the streak.
    pub fn clear(&mut self, output: &mut dyn BinaryOutput) {
        output.set(false);
        self.output_high = false;
        self.streak.reset();
    }

    pub fn is_high(&self) -> bool {
        self.output_high
    }

    /// Consecutive centered frames so far, saturating at the window.
    pub fn streak(&self) -> u32 {
        self.streak.count()
    }
}
