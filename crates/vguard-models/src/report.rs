//! Per-frame controller reports.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Mode, PixelOffset, TemplateId};

/// Summary of one processed frame.
///
/// Emitted by the controller after every loop iteration; the run loop
/// logs it at trace level and uses it for frame accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FrameReport {
    /// Mode in effect after this frame's transition evaluation.
    pub mode: Mode,

    /// True when this frame changed the mode.
    pub transitioned: bool,

    /// Currently armed danger target, if any.
    pub danger_target: Option<TemplateId>,

    /// Identities matched in this frame, in catalog order.
    pub matched: Vec<TemplateId>,

    /// True while the danger target is confirmed in `Detect`.
    pub danger_confirmed: bool,

    /// Offset of the confirmed target from the frame center.
    pub target_offset: Option<PixelOffset>,

    /// Level of the centering output after this frame.
    pub centered_output: bool,

    /// Level of the alert output after this frame.
    pub alert_output: bool,
}

impl FrameReport {
    /// Report for a frame in which nothing was matched.
    pub fn idle(mode: Mode) -> Self {
        Self {
            mode,
            transitioned: false,
            danger_target: None,
            matched: Vec::new(),
            danger_confirmed: false,
            target_offset: None,
            centered_output: false,
            alert_output: false,
        }
    }
}
