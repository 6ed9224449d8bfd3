//! End-to-end controller scenarios.
//!
//! Every test drives a [`SafetySystem`](crate::system::SafetySystem) frame
//! by frame with a scripted matcher and recording devices, advancing a
//! synthetic monotonic clock.

mod harness {
    use image::{GrayImage, Luma};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};
    use vguard_models::{ButtonEvent, FrameReport, MatchRect, TemplateId};

    use crate::catalog::{Template, TemplateCatalog};
    use crate::config::ControllerConfig;
    use crate::hardware::{BinaryOutput, Devices, SteeringActuator};
    use crate::overlay::testing::RecordingRenderer;
    use crate::system::SafetySystem;
    use crate::vision::{Frame, TemplateMatcher};

    pub const FRAME_MS: u64 = 33;

    /// Matcher whose hits are set by the test. Templates are told apart by
    /// their single pixel value, which equals their catalog index.
    #[derive(Clone, Default)]
    pub struct ScriptedMatcher {
        visible: Arc<Mutex<HashMap<u8, MatchRect>>>,
    }

    impl ScriptedMatcher {
        pub fn show(&self, index: u8, rect: MatchRect) {
            self.visible.lock().unwrap().insert(index, rect);
        }

        pub fn hide(&self, index: u8) {
            self.visible.lock().unwrap().remove(&index);
        }

        pub fn hide_all(&self) {
            self.visible.lock().unwrap().clear();
        }
    }

    impl TemplateMatcher for ScriptedMatcher {
        fn find(&self, _frame: &Frame, template: &GrayImage, _threshold: f32, _step: u32) -> Option<MatchRect> {
            let key = template.get_pixel(0, 0).0[0];
            self.visible.lock().unwrap().get(&key).copied()
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    #[derive(Clone, Default)]
    pub struct ServoLog(pub Arc<Mutex<Vec<i32>>>);

    impl ServoLog {
        pub fn writes(&self) -> Vec<i32> {
            self.0.lock().unwrap().clone()
        }

        pub fn last(&self) -> Option<i32> {
            self.0.lock().unwrap().last().copied()
        }
    }

    impl SteeringActuator for ServoLog {
        fn set_angle(&mut self, degrees: i32) {
            self.0.lock().unwrap().push(degrees);
        }
    }

    #[derive(Clone, Default)]
    pub struct OutputLog(pub Arc<Mutex<Vec<bool>>>);

    impl OutputLog {
        pub fn level(&self) -> bool {
            self.0.lock().unwrap().last().copied().unwrap_or(false)
        }

        /// Number of off-to-on edges written.
        pub fn rising_edges(&self) -> usize {
            let writes = self.0.lock().unwrap();
            let mut level = false;
            let mut edges = 0;
            for &on in writes.iter() {
                if on && !level {
                    edges += 1;
                }
                level = on;
            }
            edges
        }
    }

    impl BinaryOutput for OutputLog {
        fn set(&mut self, on: bool) {
            self.0.lock().unwrap().push(on);
        }
    }

    pub fn catalog(count: u8) -> TemplateCatalog {
        let templates = (0..count)
            .map(|i| {
                Template::new(
                    TemplateId::new(i.to_string()),
                    GrayImage::from_pixel(1, 1, Luma([i])),
                    PathBuf::from(format!("{}.pgm", i)),
                )
            })
            .collect();
        TemplateCatalog::from_templates(templates)
    }

    /// Rectangle whose center sits `(dx, dy)` away from the default frame center.
    pub fn rect_at(dx: i32, dy: i32) -> MatchRect {
        let config = ControllerConfig::default();
        MatchRect::new(config.frame_center_x + dx - 20, config.frame_center_y + dy - 20, 40, 40)
    }

    pub struct Rig {
        pub system: SafetySystem<ScriptedMatcher>,
        pub matcher: ScriptedMatcher,
        pub devices: Devices,
        pub pan: ServoLog,
        pub tilt: ServoLog,
        pub alert: OutputLog,
        pub centering: OutputLog,
        pub renderer: RecordingRenderer,
        pub now: Instant,
        sequence: u64,
    }

    impl Rig {
        pub fn new(templates: u8) -> Self {
            Self::with_config(templates, ControllerConfig::default())
        }

        pub fn with_config(templates: u8, config: ControllerConfig) -> Self {
            let matcher = ScriptedMatcher::default();
            let system = SafetySystem::new(config, catalog(templates), matcher.clone()).unwrap();
            let (pan, tilt) = (ServoLog::default(), ServoLog::default());
            let (alert, centering) = (OutputLog::default(), OutputLog::default());
            let devices = Devices::new(
                Box::new(pan.clone()),
                Box::new(tilt.clone()),
                Box::new(alert.clone()),
                Box::new(centering.clone()),
            );

            Self {
                system,
                matcher,
                devices,
                pan,
                tilt,
                alert,
                centering,
                renderer: RecordingRenderer::default(),
                now: Instant::now(),
                sequence: 0,
            }
        }

        /// Process one frame, then advance the clock by one frame period.
        pub fn frame(&mut self, event: Option<ButtonEvent>) -> FrameReport {
            self.renderer.calls.clear();
            let frame = Frame::new(self.sequence, GrayImage::new(350, 220));
            let report = self.system.process_frame(
                &frame,
                event,
                self.now,
                &mut self.devices,
                &mut self.renderer,
            );
            self.sequence += 1;
            self.now += Duration::from_millis(FRAME_MS);
            report
        }

        pub fn frames(&mut self, count: usize) -> FrameReport {
            let mut last = self.frame(None);
            for _ in 1..count {
                last = self.frame(None);
            }
            last
        }

        pub fn wait(&mut self, ms: u64) {
            self.now += Duration::from_millis(ms);
        }

        pub fn press(&mut self) -> FrameReport {
            self.frame(Some(ButtonEvent::ShortPress))
        }

        pub fn long_press(&mut self) -> FrameReport {
            self.frame(Some(ButtonEvent::LongPress))
        }

        /// Normal -> DelayToMark -> Mark, past the settle window.
        pub fn enter_mark(&mut self) {
            self.press();
            self.wait(3_000);
            self.frame(None);
            self.wait(1_000);
        }

        /// Arm a target with `long_presses` long presses, then enter Detect.
        pub fn enter_detect_with(&mut self, long_presses: usize) {
            self.enter_mark();
            for _ in 0..long_presses {
                self.long_press();
            }
            self.press();
            self.wait(3_000);
            self.frame(None);
        }
    }
}

mod mode_cycle_tests {
    use super::harness::*;
    use vguard_models::{Mode, TemplateId};

    #[test]
    fn test_full_cycle_enroll_detect_and_return() {
        let mut rig = Rig::new(3);
        assert_eq!(rig.frame(None).mode, Mode::Normal);

        let report = rig.press();
        assert_eq!(report.mode, Mode::DelayToMark);
        assert!(report.transitioned);

        rig.wait(3_000);
        let report = rig.frame(None);
        assert_eq!(report.mode, Mode::Mark);
        assert_eq!(rig.pan.last(), Some(-55));

        // Template "1" held steady for the confirmation window enrolls it.
        rig.wait(1_000);
        rig.matcher.show(1, rect_at(0, 0));
        let report = rig.frames(5);
        assert_eq!(report.danger_target, Some(TemplateId::new("1")));

        let report = rig.press();
        assert_eq!(report.mode, Mode::DelayToDetect);
        assert_eq!(rig.pan.last(), Some(0));

        rig.wait(3_000);
        assert_eq!(rig.frame(None).mode, Mode::Detect);

        let report = rig.frames(5);
        assert!(report.danger_confirmed);
        assert!(report.alert_output);
        let counts = rig.system.confirmation_counts();
        assert_eq!(counts.danger, rig.system.config().confirm_frames);
        assert_eq!(counts.danger_candidate, Some(TemplateId::new("1")));
        assert!(counts.centering >= 1);

        let report = rig.press();
        assert_eq!(report.mode, Mode::DelayToNormal);
        assert!(!rig.alert.level());
        assert!(!rig.centering.level());
        assert_eq!(rig.pan.last(), Some(0));
        assert_eq!(rig.tilt.last(), Some(0));

        rig.wait(3_000);
        let report = rig.frame(None);
        assert_eq!(report.mode, Mode::Normal);
        assert_eq!(report.danger_target, None);
        assert!(rig.system.confirmation_counts().is_empty());
    }

    #[test]
    fn test_short_press_in_mark_without_target_stays() {
        let mut rig = Rig::new(3);
        rig.enter_mark();

        let report = rig.press();
        assert_eq!(report.mode, Mode::Mark);
        assert!(!report.transitioned);
        assert_eq!(report.danger_target, None);
    }

    #[test]
    fn test_long_press_cycles_targets_and_wraps() {
        let mut rig = Rig::new(3);
        rig.enter_mark();

        let armed: Vec<_> = (0..4)
            .map(|_| rig.long_press().danger_target.unwrap())
            .collect();
        assert_eq!(
            armed,
            vec![
                TemplateId::new("0"),
                TemplateId::new("1"),
                TemplateId::new("2"),
                TemplateId::new("0"),
            ]
        );
    }

    #[test]
    fn test_one_transition_per_frame() {
        let mut rig = Rig::new(3);
        rig.press();
        // Delay expired and a press arrives on the same frame: only the
        // timed transition fires.
        rig.wait(3_000);
        let report = rig.press();
        assert_eq!(report.mode, Mode::Mark);
    }

    #[test]
    fn test_presses_ignored_during_delay() {
        let mut rig = Rig::new(3);
        rig.press();
        let report = rig.press();
        assert_eq!(report.mode, Mode::DelayToMark);
        let report = rig.long_press();
        assert_eq!(report.mode, Mode::DelayToMark);
    }

    #[test]
    fn test_settle_window_blocks_enrollment() {
        let mut rig = Rig::new(3);
        rig.press();
        rig.wait(3_000);
        rig.frame(None);
        rig.matcher.show(0, rect_at(0, 0));

        // 10 frames at 33 ms stay inside the 1 s settle window.
        let report = rig.frames(10);
        assert_eq!(report.danger_target, None);
        assert!(report.matched.is_empty());
        assert!(rig.renderer.texts().contains(&"WAIT STABLE..."));
    }

    #[test]
    fn test_enrollment_uses_first_match_only() {
        let mut rig = Rig::new(3);
        rig.enter_mark();
        rig.matcher.show(2, rect_at(30, 0));
        rig.matcher.show(1, rect_at(-30, 0));

        let report = rig.frames(5);
        assert_eq!(report.matched, vec![TemplateId::new("1"), TemplateId::new("2")]);
        assert_eq!(report.danger_target, Some(TemplateId::new("1")));
    }

    #[test]
    fn test_enrollment_interrupted_by_gap_restarts() {
        let mut rig = Rig::new(3);
        rig.enter_mark();
        rig.matcher.show(0, rect_at(0, 0));
        rig.frames(4);
        rig.matcher.hide(0);
        rig.frame(None);
        rig.matcher.show(0, rect_at(0, 0));

        let report = rig.frames(4);
        assert_eq!(report.danger_target, None);
        let report = rig.frame(None);
        assert_eq!(report.danger_target, Some(TemplateId::new("0")));
    }
}

mod detect_tests {
    use super::harness::*;
    use vguard_models::{Mode, PixelOffset};

    #[test]
    fn test_danger_confirmed_after_window() {
        let mut rig = Rig::new(3);
        rig.enter_detect_with(1);
        rig.matcher.show(0, rect_at(0, 0));

        for _ in 0..4 {
            let report = rig.frame(None);
            assert!(!report.danger_confirmed);
            assert!(!rig.alert.level());
        }
        let report = rig.frame(None);
        assert_eq!(report.mode, Mode::Detect);
        assert!(report.danger_confirmed);
        assert!(rig.alert.level());
    }

    #[test]
    fn test_other_template_never_confirms() {
        let mut rig = Rig::new(3);
        rig.enter_detect_with(1);
        rig.matcher.show(2, rect_at(0, 0));

        let report = rig.frames(20);
        assert!(!report.danger_confirmed);
        assert!(!rig.alert.level());
        assert_eq!(rig.alert.rising_edges(), 0);
    }

    #[test]
    fn test_tracking_steers_toward_target() {
        let mut rig = Rig::new(3);
        rig.enter_detect_with(1);
        let pan_writes = rig.pan.writes().len();
        rig.matcher.show(0, rect_at(40, 0));

        let report = rig.frames(5);
        assert_eq!(report.target_offset, Some(PixelOffset::new(40, 0)));
        // 40 px * 0.05 = 2 degrees, steering against the offset
        assert_eq!(rig.pan.writes()[pan_writes..].to_vec(), vec![-2]);
        assert_eq!(rig.system.tracking().tilt().angle(), 0.0);
    }

    #[test]
    fn test_centering_output_raised_once_and_dropped() {
        let mut rig = Rig::new(3);
        rig.enter_detect_with(1);
        rig.matcher.show(0, rect_at(2, -3));

        // Danger confirmation first, then a full centering window.
        rig.frames(4);
        let report = rig.frames(4);
        assert!(!report.centered_output);
        let report = rig.frame(None);
        assert!(report.centered_output);
        rig.frames(10);
        assert_eq!(rig.centering.rising_edges(), 1);

        rig.matcher.show(0, rect_at(30, 0));
        let report = rig.frame(None);
        assert!(!report.centered_output);
        assert!(!rig.centering.level());
    }

    #[test]
    fn test_alert_toggles_at_period() {
        let mut rig = Rig::new(3);
        rig.enter_detect_with(1);
        rig.matcher.show(0, rect_at(0, 0));

        rig.frames(5);
        assert!(rig.alert.level());
        // 15 frames of 33 ms is just under 500 ms.
        rig.frames(15);
        assert!(rig.alert.level());
        rig.frames(1);
        assert!(!rig.alert.level());
    }

    #[test]
    fn test_losing_target_holds_alert_off() {
        let mut rig = Rig::new(3);
        rig.enter_detect_with(1);
        rig.matcher.show(0, rect_at(0, 0));
        rig.frames(5);
        assert!(rig.alert.level());

        rig.matcher.hide_all();
        let report = rig.frame(None);
        assert!(!report.danger_confirmed);
        assert!(!rig.alert.level());
        assert!(!rig.centering.level());
    }

    #[test]
    fn test_safe_reports_rate_limited() {
        let mut rig = Rig::new(3);
        rig.enter_detect_with(1);
        assert_eq!(rig.system.safe_reports(), 1);

        rig.frames(10);
        assert_eq!(rig.system.safe_reports(), 1);
        rig.wait(1_000);
        rig.frame(None);
        assert_eq!(rig.system.safe_reports(), 2);
    }

    #[test]
    fn test_detect_status_line_shows_progress() {
        let mut rig = Rig::new(3);
        rig.enter_detect_with(1);
        rig.matcher.show(0, rect_at(0, 0));
        rig.frames(3);
        assert!(rig.renderer.texts().contains(&"confirm:3/5"));
    }
}

mod degraded_tests {
    use super::harness::*;
    use crate::config::ControllerConfig;
    use vguard_models::Mode;

    #[test]
    fn test_empty_catalog_never_arms() {
        let mut rig = Rig::new(0);
        let report = rig.frame(None);
        assert!(report.matched.is_empty());

        rig.enter_mark();
        let report = rig.long_press();
        assert_eq!(report.mode, Mode::Mark);
        assert_eq!(report.danger_target, None);

        let report = rig.press();
        assert_eq!(report.mode, Mode::Mark);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ControllerConfig {
            search_step: 0,
            ..ControllerConfig::default()
        };
        let matcher = ScriptedMatcher::default();
        let result = crate::system::SafetySystem::new(config, catalog(1), matcher);
        assert!(result.is_err());
    }

    #[test]
    fn test_mark_pan_offset_clamped_to_servo_range() {
        let config = ControllerConfig {
            mark_pan_angle: 120,
            ..ControllerConfig::default()
        };
        let mut rig = Rig::with_config(1, config);
        rig.enter_mark();
        assert_eq!(rig.system.mode(), Mode::Mark);
        assert_eq!(rig.pan.writes(), vec![90]);

        let config = ControllerConfig {
            mark_pan_angle: -120,
            ..ControllerConfig::default()
        };
        let mut rig = Rig::with_config(1, config);
        rig.enter_mark();
        assert_eq!(rig.pan.last(), Some(-90));
    }

    #[test]
    fn test_hud_shows_countdown_in_delay() {
        let mut rig = Rig::new(1);
        rig.press();
        // 1.5 s into the 3 s delay
        rig.wait(1_467);
        rig.renderer.calls.clear();
        rig.system.draw_hud(&mut rig.renderer, 350, 220, rig.now, Some(30.0));

        let texts = rig.renderer.texts();
        assert!(texts.contains(&"STATE:DELAY"));
        assert!(texts.contains(&"FPS:30.0"));
        assert!(texts.contains(&"1.5s"));
    }
}
