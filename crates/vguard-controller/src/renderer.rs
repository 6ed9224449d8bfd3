//! Overlay renderer that draws into a copy of the frame.
//!
//! Boxes and crosses are rasterized into the grayscale image. Text has no
//! font to draw with, so HUD lines are collected and logged with the frame
//! instead. Annotated frames are written to disk only when an output
//! directory is configured.

use image::{GrayImage, Luma};
use std::path::{Path, PathBuf};
use tracing::trace;
use vguard_core::overlay::{DrawStyle, Renderer};
use vguard_core::Frame;
use vguard_models::MatchRect;

use crate::error::{RunnerError, RunnerResult};

pub struct FrameRenderer {
    output_dir: Option<PathBuf>,
    canvas: Option<GrayImage>,
    sequence: u64,
    texts: Vec<String>,
}

impl FrameRenderer {
    /// Create a renderer, creating `output_dir` when given.
    pub fn new(output_dir: Option<PathBuf>) -> RunnerResult<Self> {
        if let Some(dir) = &output_dir {
            std::fs::create_dir_all(dir)?;
        }
        Ok(Self {
            output_dir,
            canvas: None,
            sequence: 0,
            texts: Vec::new(),
        })
    }

    /// Start annotating a new frame.
    pub fn begin(&mut self, frame: &Frame) {
        self.canvas = Some(frame.image.clone());
        self.sequence = frame.sequence;
        self.texts.clear();
    }

    /// Finish the frame, writing it out when an output directory is set.
    /// Returns the written path.
    pub fn finish(&mut self) -> RunnerResult<Option<PathBuf>> {
        if !self.texts.is_empty() {
            trace!(frame = self.sequence, hud = %self.texts.join(" | "), "Overlay text");
        }

        let (Some(dir), Some(canvas)) = (&self.output_dir, self.canvas.take()) else {
            return Ok(None);
        };
        let path = frame_path(dir, self.sequence);
        canvas
            .save(&path)
            .map_err(|e| RunnerError::overlay_failed(format!("{}: {}", path.display(), e)))?;
        Ok(Some(path))
    }

    pub fn canvas(&self) -> Option<&GrayImage> {
        self.canvas.as_ref()
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    fn fill(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u8) {
        let Some(canvas) = self.canvas.as_mut() else {
            return;
        };
        let (w, h) = (canvas.width() as i32, canvas.height() as i32);
        let (x0, x1) = (x0.max(0), x1.min(w - 1));
        let (y0, y1) = (y0.max(0), y1.min(h - 1));

        for y in y0..=y1 {
            for x in x0..=x1 {
                canvas.put_pixel(x as u32, y as u32, Luma([color]));
            }
        }
    }
}

impl Renderer for FrameRenderer {
    fn draw_rectangle(&mut self, rect: MatchRect, style: &DrawStyle) {
        let t = style.thickness.max(1) as i32 - 1;
        let (x0, y0) = (rect.x, rect.y);
        let (x1, y1) = (rect.x + rect.width - 1, rect.y + rect.height - 1);

        self.fill(x0, y0, x1, y0 + t, style.color);
        self.fill(x0, y1 - t, x1, y1, style.color);
        self.fill(x0, y0, x0 + t, y1, style.color);
        self.fill(x1 - t, y0, x1, y1, style.color);
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, _style: &DrawStyle) {
        self.texts.push(format!("{}@{},{}", text, x, y));
    }

    fn draw_cross(&mut self, x: i32, y: i32, style: &DrawStyle) {
        let size = style.size as i32;
        self.fill(x - size, y, x + size, y, style.color);
        self.fill(x, y - size, x, y + size, style.color);
    }
}

fn frame_path(dir: &Path, sequence: u64) -> PathBuf {
    dir.join(format!("frame_{:06}.png", sequence))
}
