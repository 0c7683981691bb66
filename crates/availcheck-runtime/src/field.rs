#![forbid(unsafe_code)]

//! Field controller: one bound input field, start to unmount.
//!
//! [`AvailabilityField`] composes the debounce scheduler, the sequenced
//! client, the stale-response guard, and the state machine. It is the only
//! way to mutate a field's validation state.
//!
//! The controller performs no I/O and never reads the clock on its own in
//! the `*_at` methods. Its owner (an event loop, a simulator, or a UI
//! binding) feeds it keystrokes and completions, calls [`tick_at`] when
//! [`next_wakeup`] is due, and executes whatever [`CheckRequest`]s come back.
//!
//! # Flow
//!
//! 1. [`input_at`] stores the value, retires outstanding checks, clears the
//!    verdict, and either gates the value (`IDLE`) or re-arms the debounce.
//! 2. [`tick_at`] fires a due timer: a sequence is allocated and the field
//!    enters `CHECKING`. It also settles the current check fail-closed once
//!    it exceeds the request timeout.
//! 3. [`apply_at`] offers a completion to the guard and commits it only if
//!    the guard applies it.
//! 4. [`select_suggestion_at`] re-enters step 2 immediately for an offered
//!    alternative.
//!
//! [`input_at`]: AvailabilityField::input_at
//! [`tick_at`]: AvailabilityField::tick_at
//! [`apply_at`]: AvailabilityField::apply_at
//! [`select_suggestion_at`]: AvailabilityField::select_suggestion_at
//! [`next_wakeup`]: AvailabilityField::next_wakeup

use std::fmt;
use std::time::Instant;

use availcheck_core::{FieldKind, ValidationInput};

use crate::client::{CheckCompletion, CheckRequest, SequencedClient};
use crate::config::FieldConfig;
use crate::debounce::{ArmOutcome, DebounceScheduler, DebounceStats};
use crate::guard::{CheckTrace, GuardDecision, StaleResponseGuard};
use crate::state::{AvailabilityHandle, Phase, Status, ValidationState, ValidationStateMachine};

/// Misuse of the field API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The selected value is not among the currently offered suggestions.
    SuggestionNotOffered(String),
    /// The suggestion is too short or malformed for this field kind.
    SuggestionNotCheckable(String),
    /// The field has been unmounted.
    Unmounted,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SuggestionNotOffered(value) => {
                write!(f, "suggestion {value:?} is not currently offered")
            }
            Self::SuggestionNotCheckable(value) => {
                write!(f, "suggestion {value:?} does not pass the input gate")
            }
            Self::Unmounted => write!(f, "field is unmounted"),
        }
    }
}

impl std::error::Error for FieldError {}

/// What a keystroke did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// The value is below its minimum length or malformed; no timer armed.
    Gated,
    /// The debounce timer was armed for the new value.
    Scheduled(ArmOutcome),
    /// The value did not change.
    Unchanged,
    /// The field is unmounted; the keystroke was ignored.
    Unmounted,
}

/// Live availability validation for one input field.
#[derive(Debug)]
pub struct AvailabilityField {
    kind: FieldKind,
    config: FieldConfig,
    value: String,
    debounce: DebounceScheduler<String>,
    client: SequencedClient,
    guard: StaleResponseGuard,
    machine: ValidationStateMachine,
    current_value: Option<String>,
    mounted: bool,
}

impl AvailabilityField {
    /// Mount a field now.
    #[must_use]
    pub fn new(kind: FieldKind, config: FieldConfig) -> Self {
        Self::new_at(kind, config, Instant::now())
    }

    /// Mount a field at a specific time (for testing).
    #[must_use]
    pub fn new_at(kind: FieldKind, config: FieldConfig, now: Instant) -> Self {
        tracing::debug!(
            kind = kind.as_str(),
            debounce_ms = config.debounce.as_millis() as u64,
            min_length = config.min_length_for(kind),
            "availability field mounted"
        );
        Self {
            kind,
            debounce: DebounceScheduler::new(config.debounce),
            client: SequencedClient::new(kind),
            guard: StaleResponseGuard::new(now, config.enable_trace),
            machine: ValidationStateMachine::new(),
            config,
            value: String::new(),
            current_value: None,
            mounted: true,
        }
    }

    fn gate(&self, value: &str) -> ValidationInput {
        ValidationInput::new(self.kind, value).with_min_length(self.config.min_length_for(self.kind))
    }

    fn issue(&mut self, value: String, now: Instant) -> CheckRequest {
        let request = self.client.begin(value, now);
        self.guard.track(request.sequence, now);
        self.machine.begin_check(request.sequence);
        self.current_value = Some(request.value.clone());
        request
    }

    /// Handle a keystroke using the current time.
    pub fn input(&mut self, value: impl Into<String>) -> InputOutcome {
        self.input_at(value, Instant::now())
    }

    /// Handle a keystroke at `now`.
    pub fn input_at(&mut self, value: impl Into<String>, now: Instant) -> InputOutcome {
        if !self.mounted {
            return InputOutcome::Unmounted;
        }
        let value = value.into();
        if value == self.value {
            return InputOutcome::Unchanged;
        }

        self.value = value;
        let retired = self.guard.retire_outstanding(now);
        self.current_value = None;
        self.machine.clear();

        if !self.gate(&self.value).is_checkable() {
            self.debounce.cancel();
            tracing::trace!(kind = self.kind.as_str(), retired, "input gated");
            return InputOutcome::Gated;
        }

        let armed = self.debounce.arm_at(self.value.clone(), now);
        tracing::trace!(kind = self.kind.as_str(), retired, "input scheduled");
        InputOutcome::Scheduled(armed)
    }

    /// Advance timers using the current time.
    pub fn tick(&mut self) -> Option<CheckRequest> {
        self.tick_at(Instant::now())
    }

    /// Advance timers at `now`.
    ///
    /// Settles a check that exceeded the request timeout, then fires a due
    /// debounce timer. Returns the request to execute, if one was issued.
    pub fn tick_at(&mut self, now: Instant) -> Option<CheckRequest> {
        if !self.mounted {
            return None;
        }

        if let Some(sequence) = self.guard.expire(self.config.request_timeout, now) {
            tracing::warn!(
                sequence = sequence.raw(),
                kind = self.kind.as_str(),
                timeout_ms = self.config.request_timeout.as_millis() as u64,
                "availability check timed out"
            );
            let value = self.current_value.clone().unwrap_or_default();
            let completion =
                CheckCompletion::timed_out(sequence, value, self.config.request_timeout);
            self.apply_at(completion, now);
        }

        let value = self.debounce.poll_at(now)?;
        Some(self.issue(value, now))
    }

    /// Offer a completion to the guard using the current time.
    pub fn apply(&mut self, completion: CheckCompletion) -> GuardDecision {
        self.apply_at(completion, Instant::now())
    }

    /// Offer a completion to the guard at `now`, committing it if applied.
    pub fn apply_at(&mut self, completion: CheckCompletion, now: Instant) -> GuardDecision {
        let decision = self.guard.apply(
            completion.sequence,
            completion.result.is_available,
            completion.latency,
            now,
        );
        if decision.is_applied() {
            tracing::debug!(
                sequence = completion.sequence.raw(),
                kind = self.kind.as_str(),
                is_available = ?completion.result.is_available,
                suggestions = completion.result.suggestions.len(),
                error = completion.result.error.map(|e| e.as_str()),
                "availability verdict applied"
            );
            self.current_value = None;
            self.machine.commit(completion.sequence, completion.result);
        }
        decision
    }

    /// Accept an offered suggestion using the current time.
    pub fn select_suggestion(&mut self, suggestion: &str) -> Result<CheckRequest, FieldError> {
        self.select_suggestion_at(suggestion, Instant::now())
    }

    /// Accept an offered suggestion at `now`.
    ///
    /// The suggestion replaces the value and is checked immediately under a
    /// fresh sequence; it is never treated as already available. A
    /// suggestion that fails the length or shape gate is rejected and the
    /// field is left as it was.
    pub fn select_suggestion_at(
        &mut self,
        suggestion: &str,
        now: Instant,
    ) -> Result<CheckRequest, FieldError> {
        if !self.mounted {
            return Err(FieldError::Unmounted);
        }
        let offered = self.machine.phase() == Phase::Settled
            && self.machine.state().result.is_available == Some(false)
            && self.machine.state().result.offers(suggestion);
        if !offered {
            return Err(FieldError::SuggestionNotOffered(suggestion.to_string()));
        }
        if !self.gate(suggestion).is_checkable() {
            tracing::debug!(kind = self.kind.as_str(), "suggestion rejected by input gate");
            return Err(FieldError::SuggestionNotCheckable(suggestion.to_string()));
        }

        self.debounce.cancel();
        self.guard.retire_outstanding(now);
        self.value = suggestion.to_string();
        tracing::debug!(kind = self.kind.as_str(), "suggestion selected");
        Ok(self.issue(self.value.clone(), now))
    }

    /// Unmount using the current time.
    pub fn unmount(&mut self) {
        self.unmount_at(Instant::now());
    }

    /// Unmount at `now`: drop the timer, abandon outstanding checks, and
    /// return to `IDLE`.
    ///
    /// Nothing is cancelled on the transport; late completions are dropped.
    pub fn unmount_at(&mut self, now: Instant) {
        if !self.mounted {
            return;
        }
        self.debounce.cancel();
        self.guard.abandon_all(now);
        self.current_value = None;
        self.machine.clear();
        self.mounted = false;
        tracing::debug!(
            kind = self.kind.as_str(),
            issued = self.client.issued(),
            "availability field unmounted"
        );
    }

    /// Earliest instant at which [`tick_at`](Self::tick_at) has work to do.
    #[must_use]
    pub fn next_wakeup(&self) -> Option<Instant> {
        if !self.mounted {
            return None;
        }
        let debounce = self.debounce.deadline();
        let timeout = self
            .guard
            .current_in_flight()
            .map(|c| c.issued_at + self.config.request_timeout);
        match (debounce, timeout) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// The field's current value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The field's kind.
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// The field's configuration.
    #[must_use]
    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Reactive snapshot for UI collaborators.
    #[must_use]
    pub fn handle(&self) -> AvailabilityHandle {
        self.machine.handle()
    }

    /// External status.
    #[must_use]
    pub fn status(&self) -> Status {
        self.machine.status()
    }

    /// Full validation state.
    #[must_use]
    pub fn state(&self) -> &ValidationState {
        self.machine.state()
    }

    /// Check if a debounce timer is armed.
    #[must_use]
    pub fn is_debouncing(&self) -> bool {
        self.debounce.is_armed()
    }

    /// Check if the field is still mounted.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Number of checks issued so far.
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.client.issued()
    }

    /// Number of issued checks still awaited by the guard.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.guard.in_flight_count()
    }

    /// Debounce counters.
    #[must_use]
    pub fn debounce_stats(&self) -> DebounceStats {
        self.debounce.stats()
    }

    /// Check trace (empty unless tracing is enabled).
    #[must_use]
    pub fn trace(&self) -> &CheckTrace {
        self.guard.trace()
    }

    /// Verify the check trace invariants.
    pub fn verify_trace(&self) -> Result<(), Vec<String>> {
        self.guard.verify_trace()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use availcheck_core::ValidationResult;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn slug_field(base: Instant) -> AvailabilityField {
        AvailabilityField::new_at(FieldKind::Slug, FieldConfig::default().with_trace(true), base)
    }

    fn completion(req: &CheckRequest, result: ValidationResult) -> CheckCompletion {
        CheckCompletion {
            sequence: req.sequence,
            value: req.value.clone(),
            result,
            latency: ms(30),
        }
    }

    #[test]
    fn short_values_are_gated() {
        let base = Instant::now();
        let mut field = slug_field(base);
        assert_eq!(field.input_at("ab", base), InputOutcome::Gated);
        assert!(!field.is_debouncing());
        assert_eq!(field.tick_at(base + ms(5000)), None);
        assert_eq!(field.status(), Status::Idle);
        assert_eq!(field.issued(), 0);
    }

    #[test]
    fn settle_issues_one_request() {
        let base = Instant::now();
        let mut field = slug_field(base);
        field.input_at("abc", base);
        assert_eq!(field.tick_at(base + ms(499)), None);
        let req = field.tick_at(base + ms(500)).expect("request after quiet window");
        assert_eq!(req.value, "abc");
        assert_eq!(field.status(), Status::Checking);
        assert!(field.handle().is_checking);
    }

    #[test]
    fn keystroke_clears_verdict_immediately() {
        let base = Instant::now();
        let mut field = slug_field(base);
        field.input_at("abc", base);
        let req = field.tick_at(base + ms(500)).unwrap();
        field.apply_at(completion(&req, ValidationResult::available()), base + ms(550));
        assert_eq!(field.status(), Status::Available);

        field.input_at("abcd", base + ms(600));
        assert_eq!(field.status(), Status::Idle);
        assert_eq!(field.handle().is_available, None);
    }

    #[test]
    fn edit_during_flight_retires_the_check() {
        let base = Instant::now();
        let mut field = slug_field(base);
        field.input_at("abc", base);
        let req = field.tick_at(base + ms(500)).unwrap();
        field.input_at("abcd", base + ms(520));

        let decision =
            field.apply_at(completion(&req, ValidationResult::available()), base + ms(600));
        assert_eq!(decision, GuardDecision::Retired);
        assert_eq!(field.status(), Status::Idle);
    }

    #[test]
    fn unchanged_input_is_a_no_op() {
        let base = Instant::now();
        let mut field = slug_field(base);
        field.input_at("abc", base);
        assert_eq!(field.input_at("abc", base + ms(400)), InputOutcome::Unchanged);
        assert!(field.tick_at(base + ms(500)).is_some());
    }

    #[test]
    fn suggestion_must_be_offered() {
        let base = Instant::now();
        let mut field = slug_field(base);
        assert_eq!(
            field.select_suggestion_at("abc-1", base),
            Err(FieldError::SuggestionNotOffered("abc-1".into()))
        );

        field.input_at("abc", base);
        let req = field.tick_at(base + ms(500)).unwrap();
        field.apply_at(
            completion(&req, ValidationResult::unavailable(vec!["abc-1".into()])),
            base + ms(540),
        );
        assert!(field.select_suggestion_at("abc-2", base + ms(600)).is_err());

        let next = field.select_suggestion_at("abc-1", base + ms(600)).unwrap();
        assert!(next.sequence > req.sequence);
        assert_eq!(next.value, "abc-1");
        assert_eq!(field.value(), "abc-1");
        assert_eq!(field.status(), Status::Checking);
    }

    #[test]
    fn gated_suggestion_is_rejected() {
        let base = Instant::now();
        let mut field = slug_field(base);
        field.input_at("abc", base);
        let req = field.tick_at(base + ms(500)).unwrap();
        field.apply_at(
            completion(&req, ValidationResult::unavailable(vec!["ab".into(), "My Slug".into()])),
            base + ms(540),
        );

        for bad in ["ab", "My Slug"] {
            assert_eq!(
                field.select_suggestion_at(bad, base + ms(600)),
                Err(FieldError::SuggestionNotCheckable(bad.into()))
            );
        }
        assert_eq!(field.value(), "abc");
        assert_eq!(field.status(), Status::Unavailable);
        assert_eq!(field.issued(), 1);
        assert!(field.verify_trace().is_ok());
    }

    #[test]
    fn timeout_settles_fail_closed() {
        let base = Instant::now();
        let config = FieldConfig::default()
            .with_request_timeout(ms(2000))
            .with_trace(true);
        let mut field = AvailabilityField::new_at(FieldKind::Slug, config, base);
        field.input_at("abc", base);
        let req = field.tick_at(base + ms(500)).unwrap();
        assert_eq!(field.next_wakeup(), Some(base + ms(2500)));

        assert_eq!(field.tick_at(base + ms(2499)), None);
        assert_eq!(field.status(), Status::Checking);
        assert_eq!(field.tick_at(base + ms(2500)), None);
        assert_eq!(field.status(), Status::Unavailable);
        assert_eq!(
            field.state().result.error,
            Some(availcheck_core::ErrorKind::Timeout)
        );

        let late = field.apply_at(completion(&req, ValidationResult::available()), base + ms(3000));
        assert_eq!(late, GuardDecision::AlreadySettled);
        assert_eq!(field.status(), Status::Unavailable);
        assert!(field.verify_trace().is_ok());
    }

    #[test]
    fn unmount_abandons_everything() {
        let base = Instant::now();
        let mut field = slug_field(base);
        field.input_at("abc", base);
        let req = field.tick_at(base + ms(500)).unwrap();
        field.input_at("abcd", base + ms(510));
        field.unmount_at(base + ms(520));

        assert!(!field.is_mounted());
        assert_eq!(field.next_wakeup(), None);
        assert_eq!(field.tick_at(base + ms(5000)), None);
        assert_eq!(field.input_at("abcde", base + ms(5000)), InputOutcome::Unmounted);
        assert!(!field.apply_at(completion(&req, ValidationResult::available()), base + ms(600)).is_applied());
        assert_eq!(field.select_suggestion_at("x", base), Err(FieldError::Unmounted));
    }

    #[test]
    fn next_wakeup_tracks_debounce() {
        let base = Instant::now();
        let mut field = slug_field(base);
        assert_eq!(field.next_wakeup(), None);
        field.input_at("abc", base + ms(100));
        assert_eq!(field.next_wakeup(), Some(base + ms(600)));
    }

    #[test]
    fn error_display() {
        assert_eq!(FieldError::Unmounted.to_string(), "field is unmounted");
        assert_eq!(
            FieldError::SuggestionNotOffered("x".into()).to_string(),
            "suggestion \"x\" is not currently offered"
        );
        assert_eq!(
            FieldError::SuggestionNotCheckable("ab".into()).to_string(),
            "suggestion \"ab\" does not pass the input gate"
        );
    }
}
