//! Runner configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;
use vguard_core::ControllerConfig;

use crate::error::{RunnerError, RunnerResult};

/// Default template resources, in catalog order.
pub const DEFAULT_TEMPLATES: &str = "0.pgm,1.pgm,2.pgm";

/// Configuration of the control loop and its reference devices.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Directory of frames replayed as the camera
    pub frame_dir: PathBuf,
    /// Template images, in catalog order
    pub templates: Vec<PathBuf>,
    /// Restart from the first frame after the last one
    pub loop_frames: bool,
    /// Target loop rate
    pub target_fps: u32,
    /// Stop after this many frames (unbounded when unset)
    pub max_frames: Option<u64>,
    /// Where annotated frames are written, if anywhere
    pub overlay_dir: Option<PathBuf>,
    /// File that receives the Prometheus snapshot on exit
    pub metrics_dump: Option<PathBuf>,
    /// Controller tuning
    pub controller: ControllerConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            frame_dir: PathBuf::from("frames"),
            templates: parse_template_list(DEFAULT_TEMPLATES),
            loop_frames: true,
            target_fps: 30,
            max_frames: None,
            overlay_dir: None,
            metrics_dump: None,
            controller: ControllerConfig::default(),
        }
    }
}

impl RunnerConfig {
    /// Create config from environment variables. Controller tuning comes
    /// from `VGUARD_CONFIG_FILE` when set, otherwise from `VGUARD_*`
    /// variables.
    pub fn from_env() -> RunnerResult<Self> {
        let defaults = Self::default();

        let controller = match std::env::var("VGUARD_CONFIG_FILE") {
            Ok(path) => ControllerConfig::from_json_file(Path::new(&path))?,
            Err(_) => ControllerConfig::from_env(),
        };

        Ok(Self {
            frame_dir: std::env::var("VGUARD_FRAME_DIR")
                .ok()
                .map(PathBuf::from)
                .unwrap_or(defaults.frame_dir),
            templates: std::env::var("VGUARD_TEMPLATES")
                .ok()
                .map(|s| parse_template_list(&s))
                .unwrap_or(defaults.templates),
            loop_frames: std::env::var("VGUARD_LOOP_FRAMES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.loop_frames),
            target_fps: std::env::var("VGUARD_FPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.target_fps),
            max_frames: std::env::var("VGUARD_MAX_FRAMES")
                .ok()
                .and_then(|s| s.parse().ok()),
            overlay_dir: std::env::var("VGUARD_OVERLAY_DIR").ok().map(PathBuf::from),
            metrics_dump: std::env::var("VGUARD_METRICS_DUMP").ok().map(PathBuf::from),
            controller,
        })
    }

    /// Time allotted to one loop iteration.
    pub fn frame_budget(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.target_fps.max(1)))
    }

    pub fn validate(&self) -> RunnerResult<()> {
        if self.target_fps == 0 {
            return Err(RunnerError::config_error("target fps must be at least 1"));
        }
        if self.templates.is_empty() {
            return Err(RunnerError::config_error("at least one template path is required"));
        }
        self.controller.validate()?;
        Ok(())
    }
}

/// Split a comma-separated list of paths, ignoring blanks.
pub fn parse_template_list(value: &str) -> Vec<PathBuf> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}
