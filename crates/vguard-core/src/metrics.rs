//! Controller metrics.
//!
//! Recorded through the `metrics` facade; the binary decides whether a
//! recorder is installed. Without one every call is a no-op.

use metrics::{counter, gauge, histogram};
use vguard_models::Mode;

/// Metric names as constants for consistency.
pub mod names {
    // Loop metrics
    pub const FRAMES_PROCESSED_TOTAL: &str = "vguard_frames_processed_total";
    pub const FRAME_DURATION_SECONDS: &str = "vguard_frame_duration_seconds";
    pub const FRAME_DEADLINE_MISSES_TOTAL: &str = "vguard_frame_deadline_misses_total";
    pub const FRAME_SOURCE_ERRORS_TOTAL: &str = "vguard_frame_source_errors_total";
    pub const LOOP_FPS: &str = "vguard_loop_fps";

    // Mode metrics
    pub const MODE_TRANSITIONS_TOTAL: &str = "vguard_mode_transitions_total";
    pub const CURRENT_MODE: &str = "vguard_current_mode";
    pub const TARGET_REQUIRED_TOTAL: &str = "vguard_target_required_total";

    // Detection metrics
    pub const CONFIRMATIONS_TOTAL: &str = "vguard_confirmations_total";
    pub const SAFE_REPORTS_TOTAL: &str = "vguard_safe_reports_total";
    pub const TEMPLATE_LOAD_FAILURES_TOTAL: &str = "vguard_template_load_failures_total";

    // Output metrics
    pub const ALERT_TOGGLES_TOTAL: &str = "vguard_alert_toggles_total";
    pub const ACTUATOR_COMMANDS_TOTAL: &str = "vguard_actuator_commands_total";
}

/// Record one processed frame and how long the controller spent on it.
pub fn record_frame(duration_secs: f64) {
    counter!(names::FRAMES_PROCESSED_TOTAL).increment(1);
    histogram!(names::FRAME_DURATION_SECONDS).record(duration_secs);
}

pub fn record_deadline_miss() {
    counter!(names::FRAME_DEADLINE_MISSES_TOTAL).increment(1);
}

/// Publish the rolling frame rate of the control loop.
pub fn set_loop_fps(fps: f32) {
    gauge!(names::LOOP_FPS).set(fps as f64);
}

pub fn record_frame_source_error() {
    counter!(names::FRAME_SOURCE_ERRORS_TOTAL).increment(1);
}

/// Record a mode change and publish the new mode as a gauge.
pub fn record_transition(to: Mode) {
    let labels = [("mode", to.as_str().to_string())];
    counter!(names::MODE_TRANSITIONS_TOTAL, &labels).increment(1);
    gauge!(names::CURRENT_MODE).set(mode_index(to) as f64);
}

pub fn record_target_required() {
    counter!(names::TARGET_REQUIRED_TOTAL).increment(1);
}

/// Record a confirmation reaching its threshold (`kind`: enrollment, danger).
pub fn record_confirmation(kind: &'static str) {
    counter!(names::CONFIRMATIONS_TOTAL, "kind" => kind).increment(1);
}

pub fn record_safe_report() {
    counter!(names::SAFE_REPORTS_TOTAL).increment(1);
}

pub fn record_template_load_failure() {
    counter!(names::TEMPLATE_LOAD_FAILURES_TOTAL).increment(1);
}

pub fn record_alert_toggle() {
    counter!(names::ALERT_TOGGLES_TOTAL).increment(1);
}

pub fn record_actuator_command(axis: &'static str) {
    counter!(names::ACTUATOR_COMMANDS_TOTAL, "axis" => axis).increment(1);
}

fn mode_index(mode: Mode) -> usize {
    Mode::ALL.iter().position(|m| *m == mode).unwrap_or(0)
}
