//! Console button.
//!
//! Lines read from stdin stand in for the physical key: `down`/`up` drive
//! the raw level through a [`PressClassifier`], while `short`/`long` inject
//! a classified event directly.

use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use vguard_core::{ButtonInput, PressClassifier};
use vguard_models::ButtonEvent;

/// One parsed console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonCommand {
    Down,
    Up,
    Press(ButtonEvent),
}

impl ButtonCommand {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "down" | "d" => Some(Self::Down),
            "up" | "u" => Some(Self::Up),
            "short" | "s" | "" => Some(Self::Press(ButtonEvent::ShortPress)),
            "long" | "l" => Some(Self::Press(ButtonEvent::LongPress)),
            _ => None,
        }
    }
}

pub struct StdinButton {
    commands: mpsc::UnboundedReceiver<ButtonCommand>,
    classifier: PressClassifier,
    /// Last raw level reported by `down`/`up`
    level: bool,
}

impl StdinButton {
    /// Start reading stdin on a background task. Must be called inside a
    /// tokio runtime.
    pub fn spawn(classifier: PressClassifier) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => match ButtonCommand::parse(&line) {
                        Some(command) => {
                            if tx.send(command).is_err() {
                                break;
                            }
                        }
                        None => warn!(input = %line.trim(), "Unknown button command"),
                    },
                    Ok(None) => {
                        debug!("Stdin closed, button input idle");
                        break;
                    }
                    Err(e) => {
                        warn!("Failed to read stdin: {}", e);
                        break;
                    }
                }
            }
        });

        Self::from_receiver(rx, classifier)
    }

    pub fn from_receiver(commands: mpsc::UnboundedReceiver<ButtonCommand>, classifier: PressClassifier) -> Self {
        Self {
            commands,
            classifier,
            level: false,
        }
    }
}

impl ButtonInput for StdinButton {
    /// Consume queued commands until one yields an event, then sample the
    /// held level once more so a release rejected by the debounce window is
    /// picked up on a later frame. Commands after an event stay queued.
    fn poll(&mut self, now: Instant) -> Option<ButtonEvent> {
        while let Ok(command) = self.commands.try_recv() {
            match command {
                ButtonCommand::Down => self.level = true,
                ButtonCommand::Up => self.level = false,
                ButtonCommand::Press(event) => return Some(event),
            }
            if let Some(event) = self.classifier.sample(self.level, now) {
                return Some(event);
            }
        }
        self.classifier.sample(self.level, now)
    }
}
