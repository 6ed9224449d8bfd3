//! The controller aggregate.
//!
//! [`SafetySystem`] owns every piece of control state and advances it one
//! frame at a time: evaluate one mode transition, run the mode's per-frame
//! work, then describe what happened in a [`FrameReport`]. Hardware is lent
//! in through [`Devices`] and drawing goes through a [`Renderer`]; the
//! system itself performs no I/O.

use std::time::Instant;
use tracing::{debug, info, warn};
use vguard_models::{ButtonEvent, FrameReport, MatchRect, Mode, PixelOffset, TemplateId};

use crate::alert::AlertSignaler;
use crate::catalog::TemplateCatalog;
use crate::centering::CenteringGate;
use crate::config::ControllerConfig;
use crate::confirmation::ConfirmationEngine;
use crate::controller::{ArmedTarget, ModeController, Transition};
use crate::error::ControlResult;
use crate::hardware::Devices;
use crate::metrics;
use crate::overlay::{self, Hud, Renderer};
use crate::tracking::{TrackingController, ANGLE_LIMIT};
use crate::vision::{Frame, TemplateMatcher};

/// One template located in a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub id: TemplateId,
    pub rect: MatchRect,
}

/// Snapshot of the confirmation streaks held by a [`SafetySystem`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmationCounts {
    pub mark: u32,
    pub mark_candidate: Option<TemplateId>,
    pub danger: u32,
    pub danger_candidate: Option<TemplateId>,
    pub centering: u32,
}

impl ConfirmationCounts {
    /// True when no engine holds a candidate or a streak.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Outcome of a mode's per-frame work.
#[derive(Debug, Default)]
struct Tick {
    matched: Vec<TemplateId>,
    danger_confirmed: bool,
    target_offset: Option<PixelOffset>,
}

/// Vision-guarded targeting controller.
pub struct SafetySystem<M> {
    config: ControllerConfig,
    controller: ModeController,
    catalog: TemplateCatalog,
    matcher: M,
    /// Enrollment confirmation, scoped to `Mark`
    mark: ConfirmationEngine<TemplateId>,
    /// Danger confirmation, scoped to `Detect`
    danger: ConfirmationEngine<TemplateId>,
    tracking: TrackingController,
    centering: CenteringGate,
    alert: AlertSignaler,
    safe_reports: u64,
    last_safe_report: Option<Instant>,
}

impl<M: TemplateMatcher> SafetySystem<M> {
    /// Build the controller in `Normal` mode. Fails only on invalid config;
    /// an empty catalog is accepted and simply never matches.
    pub fn new(config: ControllerConfig, catalog: TemplateCatalog, matcher: M) -> ControlResult<Self> {
        config.validate()?;

        info!(
            templates = catalog.len(),
            matcher = matcher.name(),
            confirm_frames = config.confirm_frames,
            delay_ms = config.delay_ms,
            "Safety system initialized"
        );

        Ok(Self {
            controller: ModeController::new(config.delay()),
            mark: ConfirmationEngine::new(config.confirm_frames),
            danger: ConfirmationEngine::new(config.confirm_frames),
            tracking: TrackingController::new(&config),
            centering: CenteringGate::new(config.confirm_frames, config.dead_zone),
            alert: AlertSignaler::new(config.alert_period()),
            safe_reports: 0,
            last_safe_report: None,
            config,
            catalog,
            matcher,
        })
    }

    pub fn mode(&self) -> Mode {
        self.controller.mode()
    }

    pub fn danger_target(&self) -> Option<&TemplateId> {
        self.controller.state().danger_target().map(|t| &t.id)
    }

    pub fn controller(&self) -> &ModeController {
        &self.controller
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn tracking(&self) -> &TrackingController {
        &self.tracking
    }

    /// Progress of the mark, danger and centering streaks.
    pub fn confirmation_counts(&self) -> ConfirmationCounts {
        ConfirmationCounts {
            mark: self.mark.count(),
            mark_candidate: self.mark.candidate().cloned(),
            danger: self.danger.count(),
            danger_candidate: self.danger.candidate().cloned(),
            centering: self.centering.streak(),
        }
    }

    /// Number of SAFE reports logged so far.
    pub fn safe_reports(&self) -> u64 {
        self.safe_reports
    }

    /// Advance the controller by one frame.
    pub fn process_frame(
        &mut self,
        frame: &Frame,
        event: Option<ButtonEvent>,
        now: Instant,
        devices: &mut Devices,
        renderer: &mut dyn Renderer,
    ) -> FrameReport {
        if let Some(event) = event {
            debug!(event = %event, mode = %self.mode(), "Button event");
        }

        let transitioned = self.step_mode(event, now, devices);

        let tick = match self.mode() {
            Mode::Normal => self.tick_normal(frame, devices, renderer),
            Mode::Mark => self.tick_mark(frame, now, devices, renderer),
            Mode::Detect => self.tick_detect(frame, now, devices, renderer),
            Mode::DelayToMark | Mode::DelayToDetect | Mode::DelayToNormal => {
                self.alert.hold_off(devices.alert.as_mut());
                Tick::default()
            }
        };

        FrameReport {
            mode: self.mode(),
            transitioned,
            danger_target: self.danger_target().cloned(),
            matched: tick.matched,
            danger_confirmed: tick.danger_confirmed,
            target_offset: tick.target_offset,
            centered_output: self.centering.is_high(),
            alert_output: self.alert.is_on(),
        }
    }

    /// Draw the HUD for the current state.
    pub fn draw_hud(
        &self,
        renderer: &mut dyn Renderer,
        frame_width: u32,
        frame_height: u32,
        now: Instant,
        fps: Option<f32>,
    ) {
        let hud = Hud {
            mode: self.mode(),
            target: self.danger_target(),
            countdown: self.controller.remaining_delay(now),
            fps,
            frame_width,
            frame_height,
        };
        overlay::draw_hud(renderer, &hud);
    }

    /// Evaluate and apply exactly one transition. Returns true when the mode changed.
    fn step_mode(&mut self, event: Option<ButtonEvent>, now: Instant, devices: &mut Devices) -> bool {
        let transition = self.controller.evaluate(event, now, &self.catalog);

        match &transition {
            Transition::TargetRequired => {
                warn!("Danger target required before detection, long press to select one");
                metrics::record_target_required();
            }
            Transition::NothingToArm => {
                warn!("No templates loaded, nothing to arm");
            }
            Transition::Retarget(target) => {
                info!(target_id = %target.id, index = target.index, "Danger target selected");
            }
            Transition::Stay | Transition::Enter(_) => {}
        }

        match self.controller.apply(transition) {
            Some((from, to)) => {
                info!(from = %from, to = %to, "Mode changed");
                metrics::record_transition(to);
                self.on_enter(to, devices);
                true
            }
            None => false,
        }
    }

    /// Entry actions. Confirmation state is mode-scoped, so every entry
    /// starts both engines from zero.
    ///
    /// Actuator writes for the delay modes and `Mark` are made once here
    /// rather than every frame. Nothing else drives the servos or outputs
    /// while those modes are active, so the level written on entry holds.
    fn on_enter(&mut self, mode: Mode, devices: &mut Devices) {
        self.mark.reset();
        self.danger.reset();

        match mode {
            Mode::Normal => {
                self.tracking.reset();
                self.centering.clear(devices.centering.as_mut());
                self.alert.hold_off(devices.alert.as_mut());
            }
            Mode::Mark => {
                let limit = ANGLE_LIMIT as i32;
                devices.pan.set_angle(self.config.mark_pan_angle.clamp(-limit, limit));
                metrics::record_actuator_command("pan");
            }
            Mode::DelayToDetect => {
                devices.pan.set_angle(0);
                metrics::record_actuator_command("pan");
            }
            Mode::Detect => {
                self.tracking.reset();
                self.last_safe_report = None;
            }
            Mode::DelayToNormal => {
                self.tracking.reset();
                devices.pan.set_angle(0);
                devices.tilt.set_angle(0);
                self.centering.clear(devices.centering.as_mut());
                self.alert.hold_off(devices.alert.as_mut());
            }
            Mode::DelayToMark => {}
        }
    }

    fn tick_normal(&mut self, frame: &Frame, devices: &mut Devices, renderer: &mut dyn Renderer) -> Tick {
        let detections = self.match_all(frame);
        for detection in &detections {
            overlay::draw_match(renderer, &detection.id, detection.rect, false);
        }
        self.alert.hold_off(devices.alert.as_mut());

        Tick {
            matched: detections.into_iter().map(|d| d.id).collect(),
            ..Tick::default()
        }
    }

    fn tick_mark(
        &mut self,
        frame: &Frame,
        now: Instant,
        devices: &mut Devices,
        renderer: &mut dyn Renderer,
    ) -> Tick {
        self.alert.hold_off(devices.alert.as_mut());

        if self.controller.state().elapsed(now) < self.config.mark_settle() {
            self.mark.reset();
            overlay::draw_status(renderer, "WAIT STABLE...");
            return Tick::default();
        }

        let detections = self.match_all(frame);
        for detection in &detections {
            overlay::draw_match(renderer, &detection.id, detection.rect, false);
        }

        // Only the first match in catalog order is an enrollment candidate.
        let candidate = detections.first().map(|d| d.id.clone());
        let confirmation = self.mark.update(candidate);
        overlay::draw_status(renderer, &format!("CONFIRM_NUM:{}", self.mark.count()));

        if confirmation.confirmed {
            if let Some(id) = confirmation.identity {
                self.enroll(id);
            }
            self.mark.reset();
        }

        Tick {
            matched: detections.into_iter().map(|d| d.id).collect(),
            ..Tick::default()
        }
    }

    fn enroll(&mut self, id: TemplateId) {
        let Some(index) = self.catalog.index_of(&id) else {
            warn!(target_id = %id, "Confirmed identity is not in the catalog");
            return;
        };

        metrics::record_confirmation("enrollment");
        if self.controller.arm(ArmedTarget::new(id.clone(), index)) {
            info!(target_id = %id, index, "Danger target enrolled");
        }
    }

    fn tick_detect(
        &mut self,
        frame: &Frame,
        now: Instant,
        devices: &mut Devices,
        renderer: &mut dyn Renderer,
    ) -> Tick {
        let Some(target) = self.controller.state().danger_target().map(|t| t.id.clone()) else {
            return Tick::default();
        };

        let detections = self.match_all(frame);
        for detection in &detections {
            overlay::draw_match(renderer, &detection.id, detection.rect, detection.id == target);
        }

        let hit = detections.iter().find(|d| d.id == target);
        let was_confirmed = self.danger.is_confirmed();
        let confirmation = self.danger.update(hit.map(|d| d.id.clone()));
        overlay::draw_status(
            renderer,
            &format!("confirm:{}/{}", self.danger.count(), self.danger.threshold()),
        );

        let mut target_offset = None;
        match (confirmation.confirmed, hit) {
            (true, Some(hit)) => {
                if !was_confirmed {
                    info!(target_id = %target, "Danger target confirmed");
                    metrics::record_confirmation("danger");
                }
                let offset = hit
                    .rect
                    .offset_from(self.config.frame_center_x, self.config.frame_center_y);
                self.tracking.track(offset, devices);
                self.centering.update(Some(offset), devices.centering.as_mut());
                self.alert.signal(&target, now, devices.alert.as_mut());
                target_offset = Some(offset);
            }
            _ => {
                self.centering.update(None, devices.centering.as_mut());
                self.alert.hold_off(devices.alert.as_mut());
                self.report_safe(now);
            }
        }

        Tick {
            danger_confirmed: target_offset.is_some(),
            target_offset,
            matched: detections.into_iter().map(|d| d.id).collect(),
        }
    }

    fn report_safe(&mut self, now: Instant) {
        let due = self.last_safe_report.map_or(true, |last| {
            now.saturating_duration_since(last) >= self.config.safe_report_interval()
        });
        if !due {
            return;
        }

        self.safe_reports += 1;
        self.last_safe_report = Some(now);
        metrics::record_safe_report();
        info!(count = self.safe_reports, "[SAFE] {}", self.safe_reports);
    }

    /// Run the matcher against every template, in catalog order.
    fn match_all(&self, frame: &Frame) -> Vec<Detection> {
        let threshold = self.config.match_threshold;
        let step = self.config.search_step;

        self.catalog
            .iter()
            .filter_map(|template| {
                self.matcher
                    .find(frame, &template.descriptor, threshold, step)
                    .map(|rect| Detection {
                        id: template.id.clone(),
                        rect,
                    })
            })
            .collect()
    }
}
