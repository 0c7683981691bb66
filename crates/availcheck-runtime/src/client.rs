#![forbid(unsafe_code)]

//! Sequenced availability client.
//!
//! [`SequencedClient::begin`] allocates the next [`CheckSequence`] for its
//! field *before* anything touches the network and hands back a
//! [`CheckRequest`]. Executing the request against an
//! [`AvailabilityBackend`] yields a [`CheckCompletion`] that always carries a
//! normalized [`ValidationResult`]: backend failures are absorbed here and
//! never propagate further.

use std::sync::Arc;
use std::time::{Duration, Instant};

use availcheck_core::{
    CheckError, CheckSequence, ErrorKind, FieldKind, SequenceCounter, ValidationResult,
    normalize_outcome,
};
use serde_json::Value;

/// A remote "is this value taken" endpoint.
///
/// Implementations perform one blocking request per call and return the
/// decoded JSON payload. They hold no per-field state; ordering and
/// staleness are handled by the caller.
pub trait AvailabilityBackend: Send + Sync {
    /// Ask whether `value` is available for `kind`.
    fn check(&self, kind: FieldKind, value: &str) -> Result<Value, CheckError>;

    /// Short name for logs.
    fn name(&self) -> &str {
        "backend"
    }
}

impl<B: AvailabilityBackend + ?Sized> AvailabilityBackend for Arc<B> {
    fn check(&self, kind: FieldKind, value: &str) -> Result<Value, CheckError> {
        (**self).check(kind, value)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<B: AvailabilityBackend + ?Sized> AvailabilityBackend for Box<B> {
    fn check(&self, kind: FieldKind, value: &str) -> Result<Value, CheckError> {
        (**self).check(kind, value)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// An issued, not yet executed availability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRequest {
    /// Sequence allocated for this check.
    pub sequence: CheckSequence,
    /// Which uniqueness rule applies.
    pub kind: FieldKind,
    /// The value being checked.
    pub value: String,
    /// When the sequence was allocated.
    pub issued_at: Instant,
}

impl CheckRequest {
    /// Run the request against `backend`, blocking the calling thread.
    ///
    /// Never fails: errors become fail-closed results.
    pub fn execute(&self, backend: &dyn AvailabilityBackend) -> CheckCompletion {
        let started = Instant::now();
        let outcome = backend.check(self.kind, &self.value);
        let latency = started.elapsed();
        tracing::debug!(
            sequence = self.sequence.raw(),
            kind = self.kind.as_str(),
            backend = backend.name(),
            latency_ms = latency.as_millis() as u64,
            ok = outcome.is_ok(),
            "availability check finished"
        );
        self.complete_with(outcome, latency)
    }

    /// Build the completion for an already obtained backend outcome.
    #[must_use]
    pub fn complete_with(
        &self,
        outcome: Result<Value, CheckError>,
        latency: Duration,
    ) -> CheckCompletion {
        CheckCompletion {
            sequence: self.sequence,
            value: self.value.clone(),
            result: normalize_outcome(outcome),
            latency,
        }
    }
}

/// A finished check, ready to be offered to the stale-response guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckCompletion {
    /// Sequence of the originating request.
    pub sequence: CheckSequence,
    /// The value that was checked.
    pub value: String,
    /// Normalized verdict.
    pub result: ValidationResult,
    /// Time the backend took.
    pub latency: Duration,
}

impl CheckCompletion {
    /// A fail-closed completion for a check that exceeded its time bound.
    #[must_use]
    pub fn timed_out(sequence: CheckSequence, value: impl Into<String>, after: Duration) -> Self {
        Self {
            sequence,
            value: value.into(),
            result: ValidationResult::fail_closed(ErrorKind::Timeout),
            latency: after,
        }
    }
}

/// Allocates sequences for one field and builds requests.
#[derive(Debug, Clone)]
pub struct SequencedClient {
    kind: FieldKind,
    counter: SequenceCounter,
}

impl SequencedClient {
    /// Create a client for one field instance.
    #[must_use]
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            counter: SequenceCounter::new(),
        }
    }

    /// The kind this client checks.
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Allocate the next sequence and build its request.
    pub fn begin(&mut self, value: impl Into<String>, now: Instant) -> CheckRequest {
        let sequence = self.counter.allocate();
        let value = value.into();
        tracing::debug!(
            sequence = sequence.raw(),
            kind = self.kind.as_str(),
            value_len = value.chars().count(),
            "availability check issued"
        );
        CheckRequest {
            sequence,
            kind: self.kind,
            value,
            issued_at: now,
        }
    }

    /// Highest sequence allocated so far.
    #[must_use]
    pub fn highest(&self) -> CheckSequence {
        self.counter.highest()
    }

    /// Number of checks issued so far.
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.counter.allocated()
    }
}
