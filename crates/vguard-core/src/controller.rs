//! Mode state machine.
//!
//! The state is a tagged union: the modes that require a danger target
//! carry it, so detection without an armed target cannot be represented.
//! Transition evaluation is a pure function of the state captured at the
//! start of the frame, the frame's button event and the elapsed time in
//! the current mode. Per-frame work lives in [`crate::system`].
//!
//! | Mode            | Trigger         | Next            |
//! |-----------------|-----------------|-----------------|
//! | Normal          | short press     | DelayToMark     |
//! | DelayToMark     | delay elapsed   | Mark            |
//! | Mark            | short press     | DelayToDetect (target armed) |
//! | Mark            | long press      | Mark (arm first / cycle)     |
//! | DelayToDetect   | delay elapsed   | Detect          |
//! | Detect          | short press     | DelayToNormal   |
//! | DelayToNormal   | delay elapsed   | Normal          |

use std::time::{Duration, Instant};
use vguard_models::{ButtonEvent, Mode, TemplateId};

use crate::catalog::TemplateCatalog;

/// Danger target together with its catalog position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmedTarget {
    pub id: TemplateId,
    pub index: usize,
}

impl ArmedTarget {
    pub fn new(id: TemplateId, index: usize) -> Self {
        Self { id, index }
    }
}

/// Controller state. `since` is the monotonic time the mode was entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerState {
    Normal,
    DelayToMark { since: Instant },
    Mark { since: Instant, target: Option<ArmedTarget> },
    DelayToDetect { since: Instant, target: ArmedTarget },
    Detect { since: Instant, target: ArmedTarget },
    DelayToNormal { since: Instant, target: ArmedTarget },
}

impl ControllerState {
    /// Fieldless projection used for display, logging and metrics.
    pub fn mode(&self) -> Mode {
        match self {
            ControllerState::Normal => Mode::Normal,
            ControllerState::DelayToMark { .. } => Mode::DelayToMark,
            ControllerState::Mark { .. } => Mode::Mark,
            ControllerState::DelayToDetect { .. } => Mode::DelayToDetect,
            ControllerState::Detect { .. } => Mode::Detect,
            ControllerState::DelayToNormal { .. } => Mode::DelayToNormal,
        }
    }

    pub fn since(&self) -> Option<Instant> {
        match self {
            ControllerState::Normal => None,
            ControllerState::DelayToMark { since }
            | ControllerState::Mark { since, .. }
            | ControllerState::DelayToDetect { since, .. }
            | ControllerState::Detect { since, .. }
            | ControllerState::DelayToNormal { since, .. } => Some(*since),
        }
    }

    /// Time spent in the current mode. Zero in `Normal`, which is untimed.
    pub fn elapsed(&self, now: Instant) -> Duration {
        self.since()
            .map(|since| now.saturating_duration_since(since))
            .unwrap_or_default()
    }

    pub fn danger_target(&self) -> Option<&ArmedTarget> {
        match self {
            ControllerState::Normal | ControllerState::DelayToMark { .. } => None,
            ControllerState::Mark { target, .. } => target.as_ref(),
            ControllerState::DelayToDetect { target, .. }
            | ControllerState::Detect { target, .. }
            | ControllerState::DelayToNormal { target, .. } => Some(target),
        }
    }
}

/// Result of evaluating one frame against the transition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Remain in the current state.
    Stay,
    /// Enter a new mode.
    Enter(ControllerState),
    /// Long press in mark mode armed or cycled the danger target.
    Retarget(ArmedTarget),
    /// Short press in mark mode with no target armed.
    TargetRequired,
    /// Long press in mark mode with an empty catalog.
    NothingToArm,
}

/// Owns the current state and evaluates transitions.
#[derive(Debug, Clone)]
pub struct ModeController {
    state: ControllerState,
    delay: Duration,
}

impl ModeController {
    pub fn new(delay: Duration) -> Self {
        Self {
            state: ControllerState::Normal,
            delay,
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Time left in the current delay mode, if in one.
    pub fn remaining_delay(&self, now: Instant) -> Option<Duration> {
        self.mode()
            .is_delay()
            .then(|| self.delay.saturating_sub(self.state.elapsed(now)))
    }

    /// Evaluate the transition table for this frame without changing state.
    pub fn evaluate(
        &self,
        event: Option<ButtonEvent>,
        now: Instant,
        catalog: &TemplateCatalog,
    ) -> Transition {
        let expired = self.state.elapsed(now) >= self.delay;

        match (&self.state, event) {
            (ControllerState::Normal, Some(ButtonEvent::ShortPress)) => {
                Transition::Enter(ControllerState::DelayToMark { since: now })
            }
            (ControllerState::DelayToMark { .. }, _) if expired => {
                Transition::Enter(ControllerState::Mark { since: now, target: None })
            }
            (ControllerState::Mark { target, .. }, Some(ButtonEvent::ShortPress)) => match target {
                Some(target) => Transition::Enter(ControllerState::DelayToDetect {
                    since: now,
                    target: target.clone(),
                }),
                None => Transition::TargetRequired,
            },
            (ControllerState::Mark { target, .. }, Some(ButtonEvent::LongPress)) => {
                if catalog.is_empty() {
                    return Transition::NothingToArm;
                }
                let index = match target {
                    Some(current) => (current.index + 1) % catalog.len(),
                    None => 0,
                };
                match catalog.get(index) {
                    Some(template) => Transition::Retarget(ArmedTarget::new(template.id.clone(), index)),
                    None => Transition::NothingToArm,
                }
            }
            (ControllerState::DelayToDetect { target, .. }, _) if expired => {
                Transition::Enter(ControllerState::Detect {
                    since: now,
                    target: target.clone(),
                })
            }
            (ControllerState::Detect { target, .. }, Some(ButtonEvent::ShortPress)) => {
                Transition::Enter(ControllerState::DelayToNormal {
                    since: now,
                    target: target.clone(),
                })
            }
            (ControllerState::DelayToNormal { .. }, _) if expired => {
                Transition::Enter(ControllerState::Normal)
            }
            _ => Transition::Stay,
        }
    }

    /// Apply a transition. Returns the `(from, to)` modes when the mode changed.
    pub fn apply(&mut self, transition: Transition) -> Option<(Mode, Mode)> {
        match transition {
            Transition::Enter(next) => {
                let from = self.mode();
                self.state = next;
                Some((from, self.mode()))
            }
            Transition::Retarget(target) => {
                self.arm(target);
                None
            }
            Transition::Stay | Transition::TargetRequired | Transition::NothingToArm => None,
        }
    }

    /// Arm a danger target. Only effective in mark mode; returns whether
    /// the armed target changed.
    pub fn arm(&mut self, armed: ArmedTarget) -> bool {
        match &mut self.state {
            ControllerState::Mark { target, .. } => {
                if target.as_ref() == Some(&armed) {
                    return false;
                }
                *target = Some(armed);
                true
            }
            _ => false,
        }
    }
}
