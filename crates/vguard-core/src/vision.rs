//! Frame acquisition and template matching interfaces.

use async_trait::async_trait;
use image::GrayImage;
use vguard_models::MatchRect;

use crate::error::ControlResult;

/// One captured, lens-corrected grayscale frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Monotonic frame counter assigned by the source.
    pub sequence: u64,
    pub image: GrayImage,
}

impl Frame {
    pub fn new(sequence: u64, image: GrayImage) -> Self {
        Self { sequence, image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Produces frames for the control loop.
///
/// Called once per loop iteration; implementations may suspend until the
/// next frame is available. There is no acquisition timeout.
#[async_trait]
pub trait FrameSource: Send {
    async fn next_frame(&mut self) -> ControlResult<Frame>;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}

/// Pixel-level template search.
///
/// Deterministic per call and stateless between calls. Returns the
/// location of the template in the frame when the similarity reaches
/// `threshold`.
pub trait TemplateMatcher: Send {
    fn find(
        &self,
        frame: &Frame,
        template: &GrayImage,
        threshold: f32,
        step: u32,
    ) -> Option<MatchRect>;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}
