#![forbid(unsafe_code)]

//! Owned debounce timer.
//!
//! A [`DebounceScheduler`] holds at most one pending value. Arming replaces
//! the pending value and restarts the quiet window; [`poll`] hands the value
//! back exactly once when the window has elapsed without another arm.
//!
//! The scheduler never sleeps and never spawns anything. The owner asks
//! [`time_until_fire`] how long it may wait, then calls [`poll`].
//!
//! # Invariants
//!
//! - **Latest-wins**: only the value from the most recent arm can fire.
//! - **Fires at most once**: a fired or cancelled timer stays disarmed until
//!   the next arm.
//! - **Deterministic**: identical arm/poll instants yield identical firings.
//!
//! [`poll`]: DebounceScheduler::poll
//! [`time_until_fire`]: DebounceScheduler::time_until_fire

use std::time::{Duration, Instant};

#[inline]
fn duration_since_or_zero(now: Instant, earlier: Instant) -> Duration {
    now.checked_duration_since(earlier)
        .unwrap_or(Duration::ZERO)
}

/// What an arm did to the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmOutcome {
    /// No timer was pending; a new one was armed.
    Armed,
    /// A pending timer was replaced and its value dropped.
    Rearmed,
}

/// Counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebounceStats {
    /// Total arms.
    pub armed: u64,
    /// Timers that fired.
    pub fired: u64,
    /// Pending timers replaced by a newer arm.
    pub superseded: u64,
    /// Pending timers removed by [`DebounceScheduler::cancel`].
    pub cancelled: u64,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

/// A single-slot, latest-wins debounce timer.
#[derive(Debug, Clone)]
pub struct DebounceScheduler<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
    stats: DebounceStats,
}

impl<T> DebounceScheduler<T> {
    /// Create a scheduler with the given quiet window.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            stats: DebounceStats::default(),
        }
    }

    /// The configured quiet window.
    #[inline]
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm the timer with `value`, using the current time.
    pub fn arm(&mut self, value: T) -> ArmOutcome {
        self.arm_at(value, Instant::now())
    }

    /// Arm the timer with `value` at a specific time (for testing).
    pub fn arm_at(&mut self, value: T, now: Instant) -> ArmOutcome {
        self.schedule_at(value, self.delay, now)
    }

    /// Arm the timer with an explicit quiet window for this arm only.
    pub fn schedule_at(&mut self, value: T, delay: Duration, now: Instant) -> ArmOutcome {
        self.stats.armed += 1;
        let outcome = if self.pending.is_some() {
            self.stats.superseded += 1;
            ArmOutcome::Rearmed
        } else {
            ArmOutcome::Armed
        };
        self.pending = Some(Pending {
            value,
            deadline: now + delay,
        });
        tracing::trace!(
            delay_ms = delay.as_millis() as u64,
            rearmed = outcome == ArmOutcome::Rearmed,
            "debounce armed"
        );
        outcome
    }

    /// Disarm the timer, returning the value that will no longer fire.
    pub fn cancel(&mut self) -> Option<T> {
        let pending = self.pending.take()?;
        self.stats.cancelled += 1;
        Some(pending.value)
    }

    /// Fire the timer if its quiet window has elapsed, using the current time.
    pub fn poll(&mut self) -> Option<T> {
        self.poll_at(Instant::now())
    }

    /// Fire the timer if its quiet window has elapsed at `now`.
    pub fn poll_at(&mut self, now: Instant) -> Option<T> {
        let deadline = self.pending.as_ref()?.deadline;
        if now < deadline {
            return None;
        }
        let pending = self.pending.take()?;
        self.stats.fired += 1;
        tracing::trace!(
            late_ms = duration_since_or_zero(now, deadline).as_millis() as u64,
            "debounce fired"
        );
        Some(pending.value)
    }

    /// When the pending timer will fire, if one is armed.
    #[inline]
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Time remaining until the pending timer fires.
    ///
    /// Returns `Some(Duration::ZERO)` when the timer is already due.
    #[must_use]
    pub fn time_until_fire(&self, now: Instant) -> Option<Duration> {
        let deadline = self.deadline()?;
        Some(deadline.saturating_duration_since(now))
    }

    /// Check if a timer is armed.
    #[inline]
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// The value that would fire, if a timer is armed.
    #[must_use]
    pub fn pending_value(&self) -> Option<&T> {
        self.pending.as_ref().map(|p| &p.value)
    }

    /// Diagnostic counters.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> DebounceStats {
        self.stats
    }
}
