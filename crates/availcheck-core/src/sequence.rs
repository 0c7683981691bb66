#![forbid(unsafe_code)]

//! Per-field check sequence numbers.
//!
//! A field bumps its [`SequenceCounter`] exactly once when a debounce timer
//! settles and once when a suggestion is accepted. Nothing else allocates.
//! The guard compares an arriving response's sequence against the counter's
//! [`highest`](SequenceCounter::highest), so the order in which checks were
//! *started* decides which verdict may land, whatever order the replies
//! come back in.
//!
//! `0` never leaves a counter; it stands for "no check issued yet" in
//! states and traces.

use serde::Serialize;

/// Tag of one availability check attempt on one field.
///
/// Comparable only with sequences from the same field's counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CheckSequence(u64);

impl CheckSequence {
    /// Placeholder held before the first allocation.
    pub const NONE: Self = Self(0);

    /// Wrap a number taken from a trace or a test fixture.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// The number carried in log fields and trace records.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// `true` once a counter has handed this value out.
    #[must_use]
    pub const fn is_issued(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for CheckSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Allocator for [`CheckSequence`] values.
///
/// Single-owner: each field instance holds its own counter and nothing is
/// shared between fields, so no atomics or locks are involved.
#[derive(Debug, Clone)]
pub struct SequenceCounter {
    next: u64,
    highest: CheckSequence,
}

impl Default for SequenceCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceCounter {
    /// Create a counter whose first allocation is `#1`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: 1,
            highest: CheckSequence::NONE,
        }
    }

    /// Allocate the next sequence.
    pub fn allocate(&mut self) -> CheckSequence {
        let seq = CheckSequence(self.next);
        self.next += 1;
        self.highest = seq;
        seq
    }

    /// The most recently allocated sequence, or [`CheckSequence::NONE`].
    #[must_use]
    pub const fn highest(&self) -> CheckSequence {
        self.highest
    }

    /// Number of sequences allocated so far.
    #[must_use]
    pub const fn allocated(&self) -> u64 {
        self.next - 1
    }
}
