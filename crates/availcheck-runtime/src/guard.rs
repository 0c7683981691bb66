#![forbid(unsafe_code)]

//! Stale-response guard with a traceable decision log.
//!
//! The guard decides, for every arriving response, whether it may be
//! committed to the field's state. Responses never cancel anything at the
//! transport level; older requests simply lose.
//!
//! # Decision Rule
//!
//! For a response tagged `seq`:
//!
//! 1) If `seq != highest_issued`, **discard** as stale.
//! 2) If `seq <= retired_floor` (the user edited the value after `seq` was
//!    issued), **discard** as retired.
//! 3) If `seq <= last_applied` (already settled, e.g. by a timeout), **discard**.
//! 4) Otherwise **apply**; `last_applied = seq`.
//!
//! # Invariants
//!
//! - **Monotonic issue**: tracked sequences strictly increase.
//! - **Last-writer-wins**: only the highest issued sequence can ever apply,
//!   whatever the arrival order.
//! - **Apply once**: `last_applied` strictly increases across applies.
//! - **Stale is not an error**: discards are traced and logged at `debug`,
//!   never reported as failures.
//!
//! # Trace
//!
//! When enabled, every lifecycle transition is appended to a [`CheckTrace`].
//! The trace checksum is an FNV-1a hash over the events, so identical
//! operation sequences on identical clocks give identical checksums across
//! runs.

use std::collections::VecDeque;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use availcheck_core::CheckSequence;
use serde::Serialize;

/// FNV-1a 64-bit offset basis.
const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
/// FNV-1a 64-bit prime.
const FNV_PRIME: u64 = 0x100000001b3;

struct FnvHasher(u64);

impl Hasher for FnvHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.0 ^= u64::from(*byte);
            self.0 = self.0.wrapping_mul(FNV_PRIME);
        }
    }
}

#[inline]
fn nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

// ---------------------------------------------------------------------------
// CheckEvent
// ---------------------------------------------------------------------------

/// One transition in a field's check lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CheckEvent {
    /// A sequence was allocated and its request issued.
    Issued {
        sequence: CheckSequence,
        elapsed_ns: u64,
    },

    /// An in-flight sequence lost to a newer one.
    Superseded {
        sequence: CheckSequence,
        superseded_by: CheckSequence,
        elapsed_ns: u64,
    },

    /// An in-flight sequence was retired because the value was edited.
    Retired {
        sequence: CheckSequence,
        elapsed_ns: u64,
    },

    /// A response (or timeout verdict) arrived.
    Completed {
        sequence: CheckSequence,
        is_available: Option<bool>,
        latency_ns: u64,
        elapsed_ns: u64,
    },

    /// The result was committed to the field state.
    Applied {
        sequence: CheckSequence,
        is_available: Option<bool>,
        elapsed_ns: u64,
    },

    /// A result for a superseded sequence was discarded.
    StaleDiscarded {
        sequence: CheckSequence,
        /// Highest issued sequence when the result arrived.
        current: CheckSequence,
        elapsed_ns: u64,
    },

    /// The result was for the current sequence but may not apply: the value
    /// was edited since, or the sequence already settled.
    Dropped {
        sequence: CheckSequence,
        /// `"retired"` or `"already_settled"`.
        reason: &'static str,
        elapsed_ns: u64,
    },

    /// The current sequence exceeded the request timeout.
    TimedOut {
        sequence: CheckSequence,
        elapsed_ns: u64,
    },

    /// The field unmounted with this sequence outstanding.
    Abandoned {
        sequence: CheckSequence,
        elapsed_ns: u64,
    },
}

impl CheckEvent {
    /// The sequence this event concerns.
    #[must_use]
    pub fn sequence(&self) -> CheckSequence {
        match self {
            Self::Issued { sequence, .. }
            | Self::Superseded { sequence, .. }
            | Self::Retired { sequence, .. }
            | Self::Completed { sequence, .. }
            | Self::Applied { sequence, .. }
            | Self::StaleDiscarded { sequence, .. }
            | Self::Dropped { sequence, .. }
            | Self::TimedOut { sequence, .. }
            | Self::Abandoned { sequence, .. } => *sequence,
        }
    }

    /// Event type name for logging and lookups.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Issued { .. } => "issued",
            Self::Superseded { .. } => "superseded",
            Self::Retired { .. } => "retired",
            Self::Completed { .. } => "completed",
            Self::Applied { .. } => "applied",
            Self::StaleDiscarded { .. } => "stale_discarded",
            Self::Dropped { .. } => "dropped",
            Self::TimedOut { .. } => "timed_out",
            Self::Abandoned { .. } => "abandoned",
        }
    }
}

// ---------------------------------------------------------------------------
// CheckTrace
// ---------------------------------------------------------------------------

/// Append-only log of check events.
#[derive(Debug, Clone, Default)]
pub struct CheckTrace {
    events: Vec<CheckEvent>,
}

impl CheckTrace {
    /// Create an empty trace.
    #[must_use]
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append an event.
    pub fn push(&mut self, event: CheckEvent) {
        self.events.push(event);
    }

    /// All events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[CheckEvent] {
        &self.events
    }

    /// Check if the trace has an event of `event_type` for `sequence`.
    #[must_use]
    pub fn contains_event_type(&self, sequence: CheckSequence, event_type: &str) -> bool {
        self.events
            .iter()
            .any(|e| e.sequence() == sequence && e.event_type() == event_type)
    }

    /// All events for one sequence.
    #[must_use]
    pub fn events_for(&self, sequence: CheckSequence) -> Vec<&CheckEvent> {
        self.events
            .iter()
            .filter(|e| e.sequence() == sequence)
            .collect()
    }

    /// Number of events of a given type.
    #[must_use]
    pub fn count(&self, event_type: &str) -> usize {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .count()
    }

    /// Deterministic checksum over all events and their order.
    #[must_use]
    pub fn checksum(&self) -> u64 {
        let mut hasher = FnvHasher(FNV_OFFSET_BASIS);
        for event in &self.events {
            event.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Checksum as a fixed-width hex string, for golden files.
    #[must_use]
    pub fn checksum_hex(&self) -> String {
        format!("{:016x}", self.checksum())
    }

    /// Serialize the trace as JSON lines, one event per line.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        let mut out = String::new();
        for event in &self.events {
            if let Ok(line) = serde_json::to_string(event) {
                out.push_str(&line);
                out.push('\n');
            }
        }
        out
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the trace is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop all events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Check the trace against the guard's invariants.
    ///
    /// Returns one description per violation.
    #[must_use]
    pub fn verify_invariants(&self) -> Vec<String> {
        let mut violations = Vec::new();
        let mut last_issued = CheckSequence::NONE;
        let mut last_applied = CheckSequence::NONE;

        for event in &self.events {
            match event {
                CheckEvent::Issued { sequence, .. } => {
                    if *sequence <= last_issued {
                        violations.push(format!(
                            "non-monotonic issue: {sequence} after {last_issued}"
                        ));
                    }
                    last_issued = *sequence;
                }
                CheckEvent::Applied { sequence, .. } => {
                    if *sequence != last_issued {
                        violations.push(format!(
                            "applied {sequence} while {last_issued} was current"
                        ));
                    }
                    if *sequence <= last_applied {
                        violations.push(format!(
                            "applied {sequence} after {last_applied} was applied"
                        ));
                    }
                    last_applied = *sequence;
                }
                CheckEvent::StaleDiscarded {
                    sequence, current, ..
                } if sequence >= current => {
                    violations.push(format!(
                        "stale discard of non-stale {sequence} (current {current})"
                    ));
                }
                CheckEvent::Superseded {
                    sequence,
                    superseded_by,
                    ..
                } if sequence >= superseded_by => {
                    violations.push(format!(
                        "{sequence} superseded by older {superseded_by}"
                    ));
                }
                _ => {}
            }
        }

        violations
    }
}

// ---------------------------------------------------------------------------
// StaleResponseGuard
// ---------------------------------------------------------------------------

/// A check that has been issued and not yet answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InFlightCheck {
    /// The sequence of the request.
    pub sequence: CheckSequence,
    /// When the request was issued.
    pub issued_at: Instant,
}

/// Outcome of [`StaleResponseGuard::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// The result belongs to the current sequence and must be committed.
    Applied,
    /// A newer sequence has been issued since.
    Stale {
        /// The highest issued sequence at arrival.
        current: CheckSequence,
    },
    /// The value was edited after this sequence was issued.
    Retired,
    /// This sequence already has a committed verdict.
    AlreadySettled,
}

impl GuardDecision {
    /// Check if the result must be committed.
    #[inline]
    #[must_use]
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }

    /// Stable name for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Stale { .. } => "stale",
            Self::Retired => "retired",
            Self::AlreadySettled => "already_settled",
        }
    }
}

/// Sequence-comparison gate between responses and field state.
///
/// Single-owner: the field that allocates sequences owns its guard.
#[derive(Debug)]
pub struct StaleResponseGuard {
    highest: CheckSequence,
    retired_floor: CheckSequence,
    last_applied: CheckSequence,
    in_flight: VecDeque<InFlightCheck>,
    trace: CheckTrace,
    recording: bool,
    created_at: Instant,
}

impl StaleResponseGuard {
    /// Create a guard. `record` enables the check trace.
    #[must_use]
    pub fn new(created_at: Instant, record: bool) -> Self {
        Self {
            highest: CheckSequence::NONE,
            retired_floor: CheckSequence::NONE,
            last_applied: CheckSequence::NONE,
            in_flight: VecDeque::new(),
            trace: CheckTrace::new(),
            recording: record,
            created_at,
        }
    }

    fn elapsed_ns(&self, now: Instant) -> u64 {
        nanos(now.saturating_duration_since(self.created_at))
    }

    fn record(&mut self, event: CheckEvent) {
        if self.recording {
            self.trace.push(event);
        }
    }

    /// Register a freshly allocated sequence as the current one.
    ///
    /// Every older in-flight sequence is superseded: it stays logically in
    /// flight on the transport but can no longer apply.
    pub fn track(&mut self, sequence: CheckSequence, now: Instant) {
        debug_assert!(
            sequence > self.highest,
            "sequence {sequence} tracked after {}",
            self.highest
        );
        let elapsed_ns = self.elapsed_ns(now);

        let superseded: Vec<InFlightCheck> = self.in_flight.drain(..).collect();
        for check in superseded {
            tracing::trace!(
                sequence = check.sequence.raw(),
                superseded_by = sequence.raw(),
                "check superseded"
            );
            self.record(CheckEvent::Superseded {
                sequence: check.sequence,
                superseded_by: sequence,
                elapsed_ns,
            });
        }

        self.in_flight.push_back(InFlightCheck {
            sequence,
            issued_at: now,
        });
        self.highest = sequence;
        self.record(CheckEvent::Issued {
            sequence,
            elapsed_ns,
        });
    }

    /// Retire every outstanding sequence because the value changed.
    ///
    /// Returns how many checks were retired.
    pub fn retire_outstanding(&mut self, now: Instant) -> usize {
        self.retired_floor = self.highest;
        let elapsed_ns = self.elapsed_ns(now);
        let retired: Vec<InFlightCheck> = self.in_flight.drain(..).collect();
        for check in &retired {
            self.record(CheckEvent::Retired {
                sequence: check.sequence,
                elapsed_ns,
            });
        }
        retired.len()
    }

    /// Abandon everything: the field is unmounting.
    pub fn abandon_all(&mut self, now: Instant) {
        self.retired_floor = self.highest;
        let elapsed_ns = self.elapsed_ns(now);
        let abandoned: Vec<InFlightCheck> = self.in_flight.drain(..).collect();
        for check in abandoned {
            self.record(CheckEvent::Abandoned {
                sequence: check.sequence,
                elapsed_ns,
            });
        }
    }

    /// Decide whether a result for `sequence` may be committed.
    ///
    /// The caller commits the result if and only if this returns
    /// [`GuardDecision::Applied`].
    pub fn apply(
        &mut self,
        sequence: CheckSequence,
        is_available: Option<bool>,
        latency: Duration,
        now: Instant,
    ) -> GuardDecision {
        let elapsed_ns = self.elapsed_ns(now);
        self.record(CheckEvent::Completed {
            sequence,
            is_available,
            latency_ns: nanos(latency),
            elapsed_ns,
        });
        self.in_flight.retain(|c| c.sequence != sequence);

        let decision = if sequence != self.highest {
            GuardDecision::Stale {
                current: self.highest,
            }
        } else if sequence <= self.retired_floor {
            GuardDecision::Retired
        } else if sequence <= self.last_applied {
            GuardDecision::AlreadySettled
        } else {
            GuardDecision::Applied
        };

        match decision {
            GuardDecision::Applied => {
                self.last_applied = sequence;
                self.record(CheckEvent::Applied {
                    sequence,
                    is_available,
                    elapsed_ns,
                });
            }
            GuardDecision::Stale { current } => {
                tracing::debug!(
                    sequence = sequence.raw(),
                    current = current.raw(),
                    "stale check result discarded"
                );
                self.record(CheckEvent::StaleDiscarded {
                    sequence,
                    current,
                    elapsed_ns,
                });
            }
            GuardDecision::Retired | GuardDecision::AlreadySettled => {
                tracing::debug!(
                    sequence = sequence.raw(),
                    decision = decision.as_str(),
                    "check result dropped"
                );
                self.record(CheckEvent::Dropped {
                    sequence,
                    reason: decision.as_str(),
                    elapsed_ns,
                });
            }
        }

        decision
    }

    /// Return the current sequence if it has been outstanding for at least
    /// `timeout`, recording the timeout.
    ///
    /// The caller settles it through [`apply`](Self::apply) with a
    /// fail-closed result; a late real response then reports
    /// [`GuardDecision::AlreadySettled`].
    pub fn expire(&mut self, timeout: Duration, now: Instant) -> Option<CheckSequence> {
        let current = self.current_in_flight()?;
        if now.saturating_duration_since(current.issued_at) < timeout {
            return None;
        }
        let elapsed_ns = self.elapsed_ns(now);
        self.record(CheckEvent::TimedOut {
            sequence: current.sequence,
            elapsed_ns,
        });
        Some(current.sequence)
    }

    /// The in-flight entry for the current sequence, if it is still awaited.
    #[must_use]
    pub fn current_in_flight(&self) -> Option<InFlightCheck> {
        self.in_flight
            .iter()
            .find(|c| c.sequence == self.highest)
            .copied()
    }

    /// Highest sequence tracked so far.
    #[inline]
    #[must_use]
    pub fn highest(&self) -> CheckSequence {
        self.highest
    }

    /// Most recently applied sequence.
    #[inline]
    #[must_use]
    pub fn last_applied(&self) -> CheckSequence {
        self.last_applied
    }

    /// Sequences at or below this can no longer apply.
    #[inline]
    #[must_use]
    pub fn retired_floor(&self) -> CheckSequence {
        self.retired_floor
    }

    /// Number of checks still awaited.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Check if any check is still awaited.
    #[must_use]
    pub fn has_in_flight(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// The event trace.
    #[must_use]
    pub fn trace(&self) -> &CheckTrace {
        &self.trace
    }

    /// Clear the trace (for reuse).
    pub fn clear_trace(&mut self) {
        self.trace.clear();
    }

    /// Verify that the trace satisfies all invariants.
    pub fn verify_trace(&self) -> Result<(), Vec<String>> {
        let violations = self.trace.verify_invariants();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(n: u64) -> CheckSequence {
        CheckSequence::from_raw(n)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn initial_state() {
        let guard = StaleResponseGuard::new(Instant::now(), true);
        assert!(!guard.highest().is_issued());
        assert!(!guard.last_applied().is_issued());
        assert!(!guard.has_in_flight());
        assert!(guard.trace().is_empty());
    }

    #[test]
    fn current_result_applies() {
        let base = Instant::now();
        let mut guard = StaleResponseGuard::new(base, true);
        guard.track(seq(1), base);
        assert_eq!(guard.in_flight_count(), 1);

        let decision = guard.apply(seq(1), Some(true), ms(40), base + ms(40));
        assert_eq!(decision, GuardDecision::Applied);
        assert_eq!(guard.last_applied(), seq(1));
        assert_eq!(guard.in_flight_count(), 0);

        let trace = guard.trace();
        assert!(trace.contains_event_type(seq(1), "issued"));
        assert!(trace.contains_event_type(seq(1), "completed"));
        assert!(trace.contains_event_type(seq(1), "applied"));
        assert_eq!(trace.events_for(seq(1)).len(), 3);
    }

    #[test]
    fn out_of_order_older_response_is_rejected() {
        let base = Instant::now();
        let mut guard = StaleResponseGuard::new(base, true);
        guard.track(seq(1), base);
        guard.track(seq(2), base + ms(600));

        assert_eq!(
            guard.apply(seq(2), Some(true), ms(50), base + ms(650)),
            GuardDecision::Applied
        );
        assert_eq!(
            guard.apply(seq(1), Some(false), ms(900), base + ms(900)),
            GuardDecision::Stale { current: seq(2) }
        );
        assert_eq!(guard.last_applied(), seq(2));
        assert!(guard.trace().contains_event_type(seq(1), "superseded"));
        assert!(guard.trace().contains_event_type(seq(1), "stale_discarded"));
        assert!(guard.verify_trace().is_ok());
    }

    #[test]
    fn older_response_first_is_still_rejected() {
        let base = Instant::now();
        let mut guard = StaleResponseGuard::new(base, false);
        guard.track(seq(1), base);
        guard.track(seq(2), base + ms(10));
        assert!(!guard.apply(seq(1), Some(true), ms(20), base + ms(20)).is_applied());
        assert!(guard.apply(seq(2), Some(false), ms(30), base + ms(40)).is_applied());
    }

    #[test]
    fn retired_sequence_cannot_apply() {
        let base = Instant::now();
        let mut guard = StaleResponseGuard::new(base, true);
        guard.track(seq(1), base);
        assert_eq!(guard.retire_outstanding(base + ms(100)), 1);
        assert_eq!(
            guard.apply(seq(1), Some(true), ms(200), base + ms(200)),
            GuardDecision::Retired
        );
        assert!(!guard.last_applied().is_issued());
        assert!(guard.trace().contains_event_type(seq(1), "retired"));
        assert!(guard.trace().contains_event_type(seq(1), "dropped"));
        assert!(guard.verify_trace().is_ok());
    }

    #[test]
    fn second_delivery_is_already_settled() {
        let base = Instant::now();
        let mut guard = StaleResponseGuard::new(base, true);
        guard.track(seq(3), base);
        assert!(guard.apply(seq(3), Some(false), ms(10), base).is_applied());
        assert_eq!(
            guard.apply(seq(3), Some(true), ms(10), base + ms(1)),
            GuardDecision::AlreadySettled
        );
        assert!(guard.verify_trace().is_ok());
    }

    #[test]
    fn expire_only_after_timeout() {
        let base = Instant::now();
        let mut guard = StaleResponseGuard::new(base, true);
        guard.track(seq(1), base);
        assert_eq!(guard.expire(ms(1000), base + ms(999)), None);
        assert_eq!(guard.expire(ms(1000), base + ms(1000)), Some(seq(1)));
        assert!(guard.trace().contains_event_type(seq(1), "timed_out"));
    }

    #[test]
    fn expire_ignores_superseded_and_answered_checks() {
        let base = Instant::now();
        let mut guard = StaleResponseGuard::new(base, false);
        guard.track(seq(1), base);
        guard.track(seq(2), base + ms(500));
        // seq 1 is older than the timeout but no longer current.
        assert_eq!(guard.expire(ms(1000), base + ms(1200)), None);
        guard.apply(seq(2), Some(true), ms(10), base + ms(1300));
        assert_eq!(guard.expire(ms(1000), base + ms(5000)), None);
    }

    #[test]
    fn abandon_all_blocks_later_results() {
        let base = Instant::now();
        let mut guard = StaleResponseGuard::new(base, true);
        guard.track(seq(1), base);
        guard.abandon_all(base + ms(5));
        assert!(!guard.has_in_flight());
        assert_eq!(
            guard.apply(seq(1), Some(true), ms(50), base + ms(50)),
            GuardDecision::Retired
        );
        assert!(guard.trace().contains_event_type(seq(1), "abandoned"));
    }

    #[test]
    fn disabled_trace_records_nothing() {
        let base = Instant::now();
        let mut guard = StaleResponseGuard::new(base, false);
        guard.track(seq(1), base);
        guard.apply(seq(1), Some(true), ms(1), base);
        assert!(guard.trace().is_empty());
    }

    #[test]
    fn checksum_is_deterministic() {
        let base = Instant::now();
        let run = || {
            let mut guard = StaleResponseGuard::new(base, true);
            for i in 1..=5 {
                let at = base + ms(i * 1000);
                guard.track(seq(i), at);
                guard.apply(seq(i), Some(i % 2 == 0), ms(40), at + ms(40));
            }
            guard.trace().checksum()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn checksum_differs_on_different_outcomes() {
        let base = Instant::now();
        let mut a = StaleResponseGuard::new(base, true);
        let mut b = StaleResponseGuard::new(base, true);
        a.track(seq(1), base);
        b.track(seq(1), base);
        a.apply(seq(1), Some(true), ms(10), base + ms(10));
        b.apply(seq(1), Some(false), ms(10), base + ms(10));
        assert_ne!(a.trace().checksum(), b.trace().checksum());
        assert_eq!(a.trace().checksum_hex().len(), 16);
    }

    #[test]
    fn jsonl_has_one_line_per_event() {
        let base = Instant::now();
        let mut guard = StaleResponseGuard::new(base, true);
        guard.track(seq(1), base);
        guard.apply(seq(1), None, ms(1), base);
        let jsonl = guard.trace().to_jsonl();
        let lines: Vec<&str> = jsonl.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains(r#""event":"issued""#));
        assert!(lines[0].contains(r#""sequence":1"#));
        assert!(lines[2].contains(r#""event":"applied""#));
    }

    #[test]
    fn verify_flags_out_of_order_applies() {
        let mut trace = CheckTrace::new();
        trace.push(CheckEvent::Issued {
            sequence: seq(2),
            elapsed_ns: 0,
        });
        trace.push(CheckEvent::Issued {
            sequence: seq(1),
            elapsed_ns: 1,
        });
        trace.push(CheckEvent::StaleDiscarded {
            sequence: seq(3),
            current: seq(1),
            elapsed_ns: 2,
        });
        assert_eq!(trace.verify_invariants().len(), 2);
    }

    #[test]
    fn event_type_names() {
        let s = seq(1);
        let events = [
            (CheckEvent::Issued { sequence: s, elapsed_ns: 0 }, "issued"),
            (
                CheckEvent::Superseded {
                    sequence: s,
                    superseded_by: seq(2),
                    elapsed_ns: 0,
                },
                "superseded",
            ),
            (CheckEvent::Retired { sequence: s, elapsed_ns: 0 }, "retired"),
            (
                CheckEvent::Completed {
                    sequence: s,
                    is_available: None,
                    latency_ns: 0,
                    elapsed_ns: 0,
                },
                "completed",
            ),
            (
                CheckEvent::Applied {
                    sequence: s,
                    is_available: Some(true),
                    elapsed_ns: 0,
                },
                "applied",
            ),
            (
                CheckEvent::StaleDiscarded {
                    sequence: s,
                    current: seq(2),
                    elapsed_ns: 0,
                },
                "stale_discarded",
            ),
            (
                CheckEvent::Dropped {
                    sequence: s,
                    reason: "retired",
                    elapsed_ns: 0,
                },
                "dropped",
            ),
            (CheckEvent::TimedOut { sequence: s, elapsed_ns: 0 }, "timed_out"),
            (CheckEvent::Abandoned { sequence: s, elapsed_ns: 0 }, "abandoned"),
        ];
        for (event, name) in events {
            assert_eq!(event.event_type(), name);
            assert_eq!(event.sequence(), s);
        }
    }
}
