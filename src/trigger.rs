//! Debounced relayout scheduling.
//!
//! A resize storm must collapse into one placement pass after the burst
//! quiets. Rather than a callback on a timer thread, the debouncer is an
//! explicit cancellable scheduled task: scheduling records a deadline,
//! scheduling again supersedes it, and the host's frame loop asks whether
//! the deadline has passed. Everything runs on the host's single thread,
//! matching the engine's run-to-completion model — a pass reads a geometric
//! snapshot and must never be interleaved with reflow.

use std::time::{Duration, Instant};

/// A cancellable one-shot deadline.
///
/// At most one deadline is pending at a time; only the last schedule in a
/// burst survives to fire.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arm (or re-arm) the deadline at `now + delay`, superseding any
    /// pending one.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True once the armed deadline has passed; disarms on firing, so a
    /// burst of schedules yields exactly one `true`.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
