//! Structured session logging.
//!
//! Every line carries the session id and the component that emitted it, so
//! a run can be followed in JSON logs across restarts.

use std::time::Duration;
use tracing::{error, info, warn, Span};
use vguard_models::{Mode, SessionId};

/// Logger bound to one controller session.
#[derive(Debug, Clone)]
pub struct SessionLogger {
    session_id: String,
    component: String,
}

impl SessionLogger {
    pub fn new(session_id: &SessionId, component: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            component: component.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            session_id = %self.session_id,
            component = %self.component,
            "Session started: {}", message
        );
    }

    /// Log a mode change observed by the loop.
    pub fn log_transition(&self, frame: u64, to: Mode) {
        info!(
            session_id = %self.session_id,
            component = %self.component,
            frame,
            mode = %to,
            "Entered {}", to.label()
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            session_id = %self.session_id,
            component = %self.component,
            "Session warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            session_id = %self.session_id,
            component = %self.component,
            "Session error: {}", message
        );
    }

    /// Log the end of the session with its frame accounting.
    pub fn log_completion(&self, frames: u64, deadline_misses: u64, worst_case: Duration) {
        info!(
            session_id = %self.session_id,
            component = %self.component,
            frames,
            deadline_misses,
            worst_case_ms = worst_case.as_secs_f64() * 1000.0,
            "Session completed"
        );
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    /// Span wrapping the whole run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "session",
            session_id = %self.session_id,
            component = %self.component
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_logger_creation() {
        let session_id = SessionId::new();
        let logger = SessionLogger::new(&session_id, "control_loop");

        assert_eq!(logger.session_id(), session_id.to_string());
        assert_eq!(logger.component(), "control_loop");
    }

    #[test]
    fn test_session_logger_methods_do_not_panic_without_subscriber() {
        let logger = SessionLogger::new(&SessionId::from_string("run-1"), "test");
        logger.log_start("frames");
        logger.log_transition(3, Mode::Detect);
        logger.log_warning("slow frame");
        logger.log_error("decode failed");
        logger.log_completion(10, 1, Duration::from_millis(40));
        let _span = logger.create_span().entered();
    }
}
