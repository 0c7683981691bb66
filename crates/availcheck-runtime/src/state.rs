#![forbid(unsafe_code)]

//! Observable validation state.
//!
//! ```text
//!            keystroke / below min length
//!        ┌──────────────────────────────────┐
//!        v                                  │
//!      IDLE ──sequence allocated──> CHECKING ──guarded result──> SETTLED
//!        ^                             │                           │
//!        └─────────keystroke───────────┴────────keystroke──────────┘
//! ```
//!
//! There is no terminal state. Only the field controller mutates the
//! machine, and only after the stale-response guard has admitted a result.

use availcheck_core::{CheckSequence, ValidationResult};
use serde::Serialize;

/// Coarse lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing to show: value too short, malformed, or just edited.
    Idle,
    /// The current sequence is outstanding.
    Checking,
    /// The current sequence has a committed verdict.
    Settled,
}

/// The four externally visible statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// No verdict and no check running.
    Idle,
    /// A check is running.
    Checking,
    /// The value is free.
    Available,
    /// The value is taken, or could not be verified.
    Unavailable,
}

impl Status {
    /// Stable name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Checking => "checking",
            Self::Available => "available",
            Self::Unavailable => "unavailable",
        }
    }
}

/// Full state of one field's validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationState {
    /// Lifecycle phase.
    pub phase: Phase,
    /// Latest committed result, or undetermined.
    pub result: ValidationResult,
    /// Sequence of the latest committed result. Never decreases.
    pub last_sequence_applied: CheckSequence,
}

impl Default for ValidationState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            result: ValidationResult::undetermined(),
            last_sequence_applied: CheckSequence::NONE,
        }
    }
}

/// Reactive snapshot handed to UI collaborators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityHandle {
    /// A check for the current value is outstanding.
    pub is_checking: bool,
    /// Verdict for the current value, if any.
    pub is_available: Option<bool>,
    /// Alternatives to offer when the value is taken.
    pub suggestions: Vec<String>,
}

/// Owner of [`ValidationState`].
#[derive(Debug, Clone, Default)]
pub struct ValidationStateMachine {
    state: ValidationState,
    awaiting: CheckSequence,
    transitions: u64,
}

impl ValidationStateMachine {
    /// Create a machine in `IDLE`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn enter(&mut self, phase: Phase) {
        if self.state.phase != phase {
            tracing::trace!(from = ?self.state.phase, to = ?phase, "validation phase change");
            self.transitions += 1;
        }
        self.state.phase = phase;
    }

    /// Drop any verdict and return to `IDLE`.
    ///
    /// Used both when the value falls below its gate and on every keystroke,
    /// so the old value's verdict is never shown next to a new value.
    pub fn clear(&mut self) {
        self.state.result = ValidationResult::undetermined();
        self.awaiting = CheckSequence::NONE;
        self.enter(Phase::Idle);
    }

    /// A new sequence was allocated: enter `CHECKING`.
    pub fn begin_check(&mut self, sequence: CheckSequence) {
        self.state.result = ValidationResult::undetermined();
        self.awaiting = sequence;
        self.enter(Phase::Checking);
    }

    /// Commit a guarded result: enter `SETTLED`.
    ///
    /// Callers must only pass results the stale-response guard applied.
    pub fn commit(&mut self, sequence: CheckSequence, result: ValidationResult) {
        debug_assert!(
            sequence > self.state.last_sequence_applied,
            "commit of {sequence} after {}",
            self.state.last_sequence_applied
        );
        self.state.result = result;
        self.state.last_sequence_applied = sequence;
        self.awaiting = CheckSequence::NONE;
        self.enter(Phase::Settled);
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &ValidationState {
        &self.state
    }

    /// Current phase.
    #[inline]
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Sequence being awaited while `CHECKING`.
    #[must_use]
    pub fn awaiting(&self) -> Option<CheckSequence> {
        self.awaiting.is_issued().then_some(self.awaiting)
    }

    /// External status.
    #[must_use]
    pub fn status(&self) -> Status {
        match self.state.phase {
            Phase::Idle => Status::Idle,
            Phase::Checking => Status::Checking,
            Phase::Settled => match self.state.result.is_available {
                Some(true) => Status::Available,
                Some(false) => Status::Unavailable,
                None => Status::Idle,
            },
        }
    }

    /// Snapshot for UI collaborators.
    #[must_use]
    pub fn handle(&self) -> AvailabilityHandle {
        let settled = self.state.phase == Phase::Settled;
        AvailabilityHandle {
            is_checking: self.state.phase == Phase::Checking,
            is_available: if settled {
                self.state.result.is_available
            } else {
                None
            },
            suggestions: if settled && self.state.result.is_available == Some(false) {
                self.state.result.suggestions.clone()
            } else {
                Vec::new()
            },
        }
    }

    /// Number of phase changes so far.
    #[must_use]
    pub fn transitions(&self) -> u64 {
        self.transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use availcheck_core::ErrorKind;

    fn seq(n: u64) -> CheckSequence {
        CheckSequence::from_raw(n)
    }

    #[test]
    fn starts_idle() {
        let m = ValidationStateMachine::new();
        assert_eq!(m.phase(), Phase::Idle);
        assert_eq!(m.status(), Status::Idle);
        assert_eq!(m.handle(), AvailabilityHandle::default());
        assert!(m.awaiting().is_none());
    }

    #[test]
    fn check_then_settle_available() {
        let mut m = ValidationStateMachine::new();
        m.begin_check(seq(1));
        assert!(m.handle().is_checking);
        assert_eq!(m.awaiting(), Some(seq(1)));
        m.commit(seq(1), ValidationResult::available());
        assert_eq!(m.status(), Status::Available);
        let h = m.handle();
        assert!(!h.is_checking);
        assert_eq!(h.is_available, Some(true));
        assert_eq!(m.state().last_sequence_applied, seq(1));
    }

    #[test]
    fn unavailable_exposes_suggestions() {
        let mut m = ValidationStateMachine::new();
        m.begin_check(seq(1));
        m.commit(
            seq(1),
            ValidationResult::unavailable(vec!["my-slug-1".into(), "my-slug-2".into()]),
        );
        assert_eq!(m.status(), Status::Unavailable);
        assert_eq!(m.handle().suggestions, vec!["my-slug-1", "my-slug-2"]);
    }

    #[test]
    fn clear_drops_verdict_synchronously() {
        let mut m = ValidationStateMachine::new();
        m.begin_check(seq(1));
        m.commit(seq(1), ValidationResult::unavailable(vec!["a-1".into()]));
        m.clear();
        assert_eq!(m.status(), Status::Idle);
        assert_eq!(m.handle(), AvailabilityHandle::default());
        // The applied sequence is history and does not go backwards.
        assert_eq!(m.state().last_sequence_applied, seq(1));
    }

    #[test]
    fn failure_shows_as_unavailable() {
        let mut m = ValidationStateMachine::new();
        m.begin_check(seq(2));
        m.commit(seq(2), ValidationResult::fail_closed(ErrorKind::Network));
        assert_eq!(m.status(), Status::Unavailable);
        assert!(m.handle().suggestions.is_empty());
    }

    #[test]
    fn reentrant_indefinitely() {
        let mut m = ValidationStateMachine::new();
        for i in 1..=3 {
            m.begin_check(seq(i));
            m.commit(seq(i), ValidationResult::available());
            m.clear();
        }
        assert_eq!(m.transitions(), 9);
        assert_eq!(m.state().last_sequence_applied, seq(3));
    }

    #[test]
    fn handle_serializes_camel_case() {
        let handle = AvailabilityHandle {
            is_checking: false,
            is_available: Some(false),
            suggestions: vec!["x".into()],
        };
        let json = serde_json::to_string(&handle).unwrap();
        assert_eq!(
            json,
            r#"{"isChecking":false,"isAvailable":false,"suggestions":["x"]}"#
        );
    }
}
