#![forbid(unsafe_code)]

//! Deterministic field simulator for testing.
//!
//! [`FieldSimulator`] drives an [`AvailabilityField`] on a virtual clock.
//! Issued requests are parked instead of executed; the test decides when
//! and in which order each one resolves, which makes reordering and
//! timeout scenarios reproducible.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use availcheck_core::FieldKind;
//! use availcheck_runtime::{FieldConfig, FieldSimulator, Status};
//! use serde_json::json;
//!
//! let mut sim = FieldSimulator::new(FieldKind::Slug, FieldConfig::default());
//! sim.type_str("my-slug", Duration::from_millis(30));
//! sim.advance(Duration::from_millis(500));
//! let seq = sim.pending()[0].sequence;
//! sim.respond(seq, json!({ "available": true }));
//! assert_eq!(sim.status(), Status::Available);
//! ```

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use availcheck_core::{CheckError, CheckSequence, FieldKind};
use serde_json::Value;

use crate::client::{AvailabilityBackend, CheckRequest};
use crate::config::FieldConfig;
use crate::field::{AvailabilityField, FieldError, InputOutcome};
use crate::guard::GuardDecision;
use crate::state::{AvailabilityHandle, Status};

/// Record of something that happened during simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimRecord {
    /// A keystroke and what it did.
    Typed(String, InputOutcome),
    /// A check was issued.
    Issued(CheckSequence, String),
    /// A parked request resolved.
    Resolved(CheckSequence, GuardDecision),
    /// A suggestion was accepted.
    Selected(String),
    /// The externally visible status changed.
    StatusChanged(Status),
    /// The field unmounted.
    Unmounted,
}

/// Deterministic simulator for [`AvailabilityField`].
#[derive(Debug)]
pub struct FieldSimulator {
    field: AvailabilityField,
    origin: Instant,
    now: Instant,
    pending: Vec<CheckRequest>,
    log: Vec<SimRecord>,
    last_status: Status,
}

impl FieldSimulator {
    /// Mount a field of `kind` at virtual time zero.
    #[must_use]
    pub fn new(kind: FieldKind, config: FieldConfig) -> Self {
        let origin = Instant::now();
        Self {
            field: AvailabilityField::new_at(kind, config.with_trace(true), origin),
            origin,
            now: origin,
            pending: Vec::new(),
            log: Vec::new(),
            last_status: Status::Idle,
        }
    }

    fn observe(&mut self) {
        let status = self.field.status();
        if status != self.last_status {
            self.last_status = status;
            self.log.push(SimRecord::StatusChanged(status));
        }
    }

    fn park(&mut self, request: CheckRequest) {
        self.log
            .push(SimRecord::Issued(request.sequence, request.value.clone()));
        self.pending.push(request);
    }

    fn take(&mut self, sequence: CheckSequence) -> Option<CheckRequest> {
        let idx = self.pending.iter().position(|r| r.sequence == sequence)?;
        Some(self.pending.remove(idx))
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Virtual time since mount.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.now.duration_since(self.origin)
    }

    /// Advance the virtual clock and fire whatever became due.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
        self.tick();
    }

    /// Fire due timers at the current virtual time.
    pub fn tick(&mut self) {
        if let Some(request) = self.field.tick_at(self.now) {
            self.park(request);
        }
        self.observe();
    }

    /// Set the whole value in one keystroke.
    pub fn type_value(&mut self, value: &str) -> InputOutcome {
        let outcome = self.field.input_at(value, self.now);
        self.log.push(SimRecord::Typed(value.to_string(), outcome));
        self.observe();
        outcome
    }

    /// Type `text` one character at a time, `gap` apart, appending to the
    /// current value. The first character lands immediately.
    pub fn type_str(&mut self, text: &str, gap: Duration) {
        let mut value = self.field.value().to_string();
        for (i, ch) in text.chars().enumerate() {
            if i > 0 {
                self.advance(gap);
            }
            value.push(ch);
            self.type_value(&value);
        }
    }

    /// Delete the last `count` characters, `gap` apart.
    pub fn backspace(&mut self, count: usize, gap: Duration) {
        let mut value = self.field.value().to_string();
        for i in 0..count {
            if value.pop().is_none() {
                break;
            }
            if i > 0 {
                self.advance(gap);
            }
            self.type_value(&value);
        }
    }

    /// Resolve a parked request with a JSON payload.
    ///
    /// Returns `None` if no such request is parked.
    pub fn respond(&mut self, sequence: CheckSequence, payload: Value) -> Option<GuardDecision> {
        self.resolve(sequence, Ok(payload))
    }

    /// Resolve a parked request with a transport or protocol failure.
    pub fn fail(&mut self, sequence: CheckSequence, error: CheckError) -> Option<GuardDecision> {
        self.resolve(sequence, Err(error))
    }

    /// Resolve a parked request by running it against `backend`.
    pub fn resolve_with(
        &mut self,
        sequence: CheckSequence,
        backend: &dyn AvailabilityBackend,
    ) -> Option<GuardDecision> {
        let request = self.take(sequence)?;
        let outcome = backend.check(request.kind, &request.value);
        Some(self.finish(request, outcome))
    }

    fn resolve(
        &mut self,
        sequence: CheckSequence,
        outcome: Result<Value, CheckError>,
    ) -> Option<GuardDecision> {
        let request = self.take(sequence)?;
        Some(self.finish(request, outcome))
    }

    fn finish(
        &mut self,
        request: CheckRequest,
        outcome: Result<Value, CheckError>,
    ) -> GuardDecision {
        let latency = self.now.saturating_duration_since(request.issued_at);
        let completion = request.complete_with(outcome, latency);
        let decision = self.field.apply_at(completion, self.now);
        self.log.push(SimRecord::Resolved(request.sequence, decision));
        self.observe();
        decision
    }

    /// Accept an offered suggestion; its request is parked immediately.
    pub fn select_suggestion(&mut self, suggestion: &str) -> Result<CheckSequence, FieldError> {
        let request = self.field.select_suggestion_at(suggestion, self.now)?;
        let sequence = request.sequence;
        self.log.push(SimRecord::Selected(suggestion.to_string()));
        self.park(request);
        self.observe();
        Ok(sequence)
    }

    /// Unmount the field. Parked requests stay parked and can still be
    /// resolved, to exercise late delivery.
    pub fn unmount(&mut self) {
        self.field.unmount_at(self.now);
        self.log.push(SimRecord::Unmounted);
        self.observe();
    }

    /// Requests issued and not yet resolved, oldest first.
    #[must_use]
    pub fn pending(&self) -> &[CheckRequest] {
        &self.pending
    }

    /// The most recently issued parked request.
    #[must_use]
    pub fn latest_pending(&self) -> Option<&CheckRequest> {
        self.pending.last()
    }

    /// The simulated field.
    #[must_use]
    pub fn field(&self) -> &AvailabilityField {
        &self.field
    }

    /// Reactive snapshot.
    #[must_use]
    pub fn handle(&self) -> AvailabilityHandle {
        self.field.handle()
    }

    /// External status.
    #[must_use]
    pub fn status(&self) -> Status {
        self.field.status()
    }

    /// Everything recorded so far.
    #[must_use]
    pub fn log(&self) -> &[SimRecord] {
        &self.log
    }

    /// Status changes in order, starting from the first change.
    #[must_use]
    pub fn status_history(&self) -> Vec<Status> {
        self.log
            .iter()
            .filter_map(|r| match r {
                SimRecord::StatusChanged(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    /// Values for which a check was issued, in order.
    #[must_use]
    pub fn issued_values(&self) -> Vec<String> {
        self.log
            .iter()
            .filter_map(|r| match r {
                SimRecord::Issued(_, v) => Some(v.clone()),
                _ => None,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// ScriptedBackend
// ---------------------------------------------------------------------------

/// A backend answering from a fixed table, recording every call.
///
/// Values without an entry get the fallback answer, `{"available": true}`
/// unless changed.
#[derive(Debug)]
pub struct ScriptedBackend {
    answers: HashMap<String, Result<Value, CheckError>>,
    fallback: Result<Value, CheckError>,
    calls: Mutex<Vec<(FieldKind, String)>>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBackend {
    /// Create a backend that reports every value as available.
    #[must_use]
    pub fn new() -> Self {
        Self {
            answers: HashMap::new(),
            fallback: Ok(serde_json::json!({ "available": true })),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer `value` with `payload`.
    #[must_use]
    pub fn with_answer(mut self, value: impl Into<String>, payload: Value) -> Self {
        self.answers.insert(value.into(), Ok(payload));
        self
    }

    /// Fail requests for `value` with `error`.
    #[must_use]
    pub fn with_failure(mut self, value: impl Into<String>, error: CheckError) -> Self {
        self.answers.insert(value.into(), Err(error));
        self
    }

    /// Answer unknown values with `fallback`.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Result<Value, CheckError>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Every call made so far.
    #[must_use]
    pub fn calls(&self) -> Vec<(FieldKind, String)> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl AvailabilityBackend for ScriptedBackend {
    fn check(&self, kind: FieldKind, value: &str) -> Result<Value, CheckError> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((kind, value.to_string()));
        self.answers
            .get(value)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn typing_burst_parks_one_request() {
        let mut sim = FieldSimulator::new(FieldKind::Slug, FieldConfig::default());
        sim.type_str("my-slug", ms(30));
        assert!(sim.pending().is_empty());
        sim.advance(ms(499));
        assert!(sim.pending().is_empty());
        sim.advance(ms(1));
        assert_eq!(sim.issued_values(), vec!["my-slug"]);
        assert_eq!(sim.status(), Status::Checking);
    }

    #[test]
    fn respond_settles_and_logs() {
        let mut sim = FieldSimulator::new(FieldKind::Slug, FieldConfig::default());
        sim.type_value("bistro");
        sim.advance(ms(500));
        let seq = sim.pending()[0].sequence;
        assert_eq!(
            sim.respond(seq, json!({ "available": true })),
            Some(GuardDecision::Applied)
        );
        assert_eq!(sim.respond(seq, json!({ "available": true })), None);
        assert_eq!(
            sim.status_history(),
            vec![Status::Checking, Status::Available]
        );
    }

    #[test]
    fn backspace_below_gate_goes_idle() {
        let mut sim = FieldSimulator::new(FieldKind::Slug, FieldConfig::default());
        sim.type_value("abcd");
        sim.backspace(2, ms(20));
        assert_eq!(sim.field().value(), "ab");
        assert!(!sim.field().is_debouncing());
        sim.advance(ms(1000));
        assert!(sim.pending().is_empty());
    }

    #[test]
    fn resolve_with_scripted_backend() {
        let backend = ScriptedBackend::new()
            .with_answer("taken", json!({ "available": false, "suggestions": ["taken-1"] }));
        let mut sim = FieldSimulator::new(FieldKind::Slug, FieldConfig::default());
        sim.type_value("taken");
        sim.advance(ms(500));
        let seq = sim.pending()[0].sequence;
        sim.resolve_with(seq, &backend);
        assert_eq!(sim.handle().suggestions, vec!["taken-1"]);
        assert_eq!(backend.calls(), vec![(FieldKind::Slug, "taken".to_string())]);
    }

    #[test]
    fn scripted_failure_and_fallback() {
        let backend = ScriptedBackend::new()
            .with_failure("down", CheckError::Status(503))
            .with_fallback(Ok(json!({ "isAvailable": false })));
        assert_eq!(
            backend.check(FieldKind::Email, "down"),
            Err(CheckError::Status(503))
        );
        assert_eq!(
            backend.check(FieldKind::Email, "other"),
            Ok(json!({ "isAvailable": false }))
        );
        assert_eq!(backend.calls().len(), 2);
    }
}
