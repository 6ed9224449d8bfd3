//! Paced frame loop.
//!
//! One iteration acquires a frame, polls the button, advances the
//! [`SafetySystem`] by one frame, draws the HUD and sleeps off the rest of
//! the frame budget. Frames that overrun the budget are counted as
//! deadline misses; the worst case is kept for the exit summary.

use std::collections::VecDeque;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{info, trace, warn, Instrument};
use vguard_core::{metrics, ButtonInput, ControlError, Devices, Frame, FrameSource, SafetySystem, TemplateMatcher};
use vguard_models::FrameReport;

use crate::error::RunnerResult;
use crate::logging::SessionLogger;
use crate::renderer::FrameRenderer;

/// Frames averaged by the FPS counter.
const FPS_WINDOW: usize = 30;

/// Frame accounting for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub frames: u64,
    pub deadline_misses: u64,
    pub worst_case: Duration,
    pub source_errors: u64,
}

/// Rolling frame rate over the last [`FPS_WINDOW`] frames.
#[derive(Debug, Default)]
pub struct FpsCounter {
    stamps: VecDeque<Instant>,
}

impl FpsCounter {
    pub fn tick(&mut self, now: Instant) {
        if self.stamps.len() == FPS_WINDOW {
            self.stamps.pop_front();
        }
        self.stamps.push_back(now);
    }

    /// Frames per second, once at least two frames were seen.
    pub fn fps(&self) -> Option<f32> {
        let (first, last) = (self.stamps.front()?, self.stamps.back()?);
        let span = last.saturating_duration_since(*first).as_secs_f32();
        if span <= 0.0 {
            return None;
        }
        Some((self.stamps.len() - 1) as f32 / span)
    }
}

pub struct ControlLoop<S, M> {
    system: SafetySystem<M>,
    source: S,
    button: Box<dyn ButtonInput>,
    devices: Devices,
    renderer: FrameRenderer,
    frame_budget: Duration,
    max_frames: Option<u64>,
    logger: SessionLogger,
    stats: LoopStats,
    fps: FpsCounter,
}

impl<S: FrameSource, M: TemplateMatcher> ControlLoop<S, M> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        system: SafetySystem<M>,
        source: S,
        button: Box<dyn ButtonInput>,
        devices: Devices,
        renderer: FrameRenderer,
        frame_budget: Duration,
        max_frames: Option<u64>,
        logger: SessionLogger,
    ) -> Self {
        Self {
            system,
            source,
            button,
            devices,
            renderer,
            frame_budget,
            max_frames,
            logger,
            stats: LoopStats::default(),
            fps: FpsCounter::default(),
        }
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn system(&self) -> &SafetySystem<M> {
        &self.system
    }

    pub fn devices(&self) -> &Devices {
        &self.devices
    }

    /// Run until `shutdown` resolves, the frame limit is reached or the
    /// source runs dry. Actuators are parked on every exit path.
    pub async fn run<F>(&mut self, shutdown: F) -> RunnerResult<LoopStats>
    where
        F: Future<Output = ()>,
    {
        let span = self.logger.create_span();
        let result = self.run_inner(shutdown).instrument(span).await;

        self.devices.park();
        info!(mode = %self.system.mode(), "Actuators parked");
        self.logger.log_completion(
            self.stats.frames,
            self.stats.deadline_misses,
            self.stats.worst_case,
        );

        result.map(|_| self.stats)
    }

    async fn run_inner<F>(&mut self, shutdown: F) -> RunnerResult<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        self.logger.log_start(self.source.name());

        loop {
            if self.max_frames.is_some_and(|max| self.stats.frames >= max) {
                info!(frames = self.stats.frames, "Frame limit reached");
                return Ok(());
            }

            let cycle_start = Instant::now();

            let acquired = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    return Ok(());
                }
                acquired = self.source.next_frame() => acquired,
            };

            match acquired {
                Ok(frame) => {
                    self.tick(&frame)?;
                }
                Err(ControlError::SourceExhausted) => {
                    info!(frames = self.stats.frames, "Frame source exhausted");
                    return Ok(());
                }
                Err(e) if e.is_retryable() => {
                    self.stats.source_errors += 1;
                    metrics::record_frame_source_error();
                    self.logger.log_warning(&format!("Frame skipped: {}", e));
                }
                Err(e) => return Err(e.into()),
            }

            let elapsed = cycle_start.elapsed();
            if elapsed < self.frame_budget {
                tokio::time::sleep(self.frame_budget - elapsed).await;
            }
        }
    }

    /// Process one acquired frame.
    pub fn tick(&mut self, frame: &Frame) -> RunnerResult<FrameReport> {
        let start = Instant::now();
        let event = self.button.poll(start);

        self.renderer.begin(frame);
        let report = self
            .system
            .process_frame(frame, event, start, &mut self.devices, &mut self.renderer);
        self.system
            .draw_hud(&mut self.renderer, frame.width(), frame.height(), start, self.fps.fps());

        if let Err(e) = self.renderer.finish() {
            if !e.is_retryable() {
                return Err(e);
            }
            self.logger.log_warning(&e.to_string());
        }

        if report.transitioned {
            self.logger.log_transition(frame.sequence, report.mode);
        }
        if let Ok(json) = serde_json::to_string(&report) {
            trace!(frame = frame.sequence, report = %json, "Frame processed");
        }

        let elapsed = start.elapsed();
        if elapsed > self.frame_budget {
            self.stats.deadline_misses += 1;
            metrics::record_deadline_miss();
            warn!(
                frame = frame.sequence,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                "Frame deadline missed"
            );
        }
        if elapsed > self.stats.worst_case {
            self.stats.worst_case = elapsed;
        }
        self.stats.frames += 1;
        metrics::record_frame(elapsed.as_secs_f64());

        self.fps.tick(start);
        if let Some(fps) = self.fps.fps() {
            metrics::set_loop_fps(fps);
        }

        Ok(report)
    }
}
