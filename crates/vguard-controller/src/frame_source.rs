//! Directory-backed frame source.
//!
//! Replays the images of a directory in file-name order as if they came
//! from the camera. Decoding happens on the blocking pool so the runtime
//! keeps serving the shutdown signal and the button reader.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use vguard_core::{ControlError, ControlResult, Frame, FrameSource};

use crate::error::{RunnerError, RunnerResult};

const FRAME_EXTENSIONS: &[&str] = &["png", "pgm", "pnm", "ppm", "jpg", "jpeg", "bmp"];

pub struct DirectoryFrameSource {
    paths: Vec<PathBuf>,
    cursor: usize,
    sequence: u64,
    cycle: bool,
}

impl DirectoryFrameSource {
    /// Index the frames in `dir`. Fails when the directory holds no images.
    pub fn open(dir: &Path, cycle: bool) -> RunnerResult<Self> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_frame_file(path))
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(RunnerError::NoFrames(dir.to_path_buf()));
        }

        info!(dir = %dir.display(), frames = paths.len(), cycle, "Frame directory indexed");
        Ok(Self {
            paths,
            cursor: 0,
            sequence: 0,
            cycle,
        })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    fn next_path(&mut self) -> Option<PathBuf> {
        if self.cursor >= self.paths.len() {
            if !self.cycle {
                return None;
            }
            debug!("Frame directory exhausted, starting over");
            self.cursor = 0;
        }
        let path = self.paths.get(self.cursor).cloned();
        self.cursor += 1;
        path
    }
}

#[async_trait]
impl FrameSource for DirectoryFrameSource {
    async fn next_frame(&mut self) -> ControlResult<Frame> {
        let path = self.next_path().ok_or(ControlError::SourceExhausted)?;

        let image = tokio::task::spawn_blocking(move || {
            image::open(&path)
                .map(|img| img.to_luma8())
                .map_err(|e| ControlError::frame_source(format!("{}: {}", path.display(), e)))
        })
        .await
        .map_err(|e| ControlError::frame_source(format!("Blocking task join error: {}", e)))??;

        let frame = Frame::new(self.sequence, image);
        self.sequence += 1;
        Ok(frame)
    }

    fn name(&self) -> &'static str {
        "directory"
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
