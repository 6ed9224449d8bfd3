//! Consecutive-frame confirmation.
//!
//! Turns a noisy per-frame "which identity did I see" signal into a stable
//! decision: an identity is confirmed once it has been observed on
//! `threshold` consecutive frames. One engine type backs enrollment in
//! mark mode, danger confirmation in detect mode and the centering gate.

/// Outcome of feeding one frame into a [`ConfirmationEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation<T> {
    /// True once the current candidate reached the threshold.
    pub confirmed: bool,
    /// Candidate currently being counted.
    pub identity: Option<T>,
}

/// N-consecutive-frame debouncer.
#[derive(Debug, Clone)]
pub struct ConfirmationEngine<T> {
    candidate: Option<T>,
    count: u32,
    threshold: u32,
}

impl<T: Clone + PartialEq> ConfirmationEngine<T> {
    /// Create an engine that confirms after `threshold` consecutive frames.
    ///
    /// A threshold of zero is treated as one: an identity has to be seen at
    /// least once to be confirmed.
    pub fn new(threshold: u32) -> Self {
        Self {
            candidate: None,
            count: 0,
            threshold: threshold.max(1),
        }
    }

    /// Feed one frame's observation.
    pub fn update(&mut self, observed: Option<T>) -> Confirmation<T> {
        match observed {
            None => {
                self.candidate = None;
                self.count = 0;
            }
            Some(identity) if self.candidate.as_ref() == Some(&identity) => {
                // Saturates so a long streak never overflows.
                self.count = (self.count + 1).min(self.threshold);
            }
            Some(identity) => {
                self.candidate = Some(identity);
                self.count = 1;
            }
        }

        Confirmation {
            confirmed: self.is_confirmed(),
            identity: self.candidate.clone(),
        }
    }

    /// Drop the candidate and the streak.
    pub fn reset(&mut self) {
        self.candidate = None;
        self.count = 0;
    }

    pub fn is_confirmed(&self) -> bool {
        self.count >= self.threshold
    }

    pub fn candidate(&self) -> Option<&T> {
        self.candidate.as_ref()
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}
