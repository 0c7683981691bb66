#![forbid(unsafe_code)]

//! Normalized availability verdicts.

use serde::Serialize;

use crate::error::ErrorKind;

/// The normalized outcome of one availability check.
///
/// `is_available == None` means "not yet determined". Every failure path
/// produces `Some(false)` with no suggestions (fail-closed).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// Whether the value is free to claim, if known.
    pub is_available: Option<bool>,
    /// Alternative values offered by the backend, in backend order.
    pub suggestions: Vec<String>,
    /// Why no real verdict was obtained, if that is the case.
    pub error: Option<ErrorKind>,
}

impl ValidationResult {
    /// A result with no verdict yet.
    #[must_use]
    pub fn undetermined() -> Self {
        Self::default()
    }

    /// The value is free.
    #[must_use]
    pub fn available() -> Self {
        Self {
            is_available: Some(true),
            suggestions: Vec::new(),
            error: None,
        }
    }

    /// The value is taken, optionally with alternatives.
    #[must_use]
    pub fn unavailable(suggestions: Vec<String>) -> Self {
        Self {
            is_available: Some(false),
            suggestions,
            error: None,
        }
    }

    /// Conservative verdict used for every failure.
    #[must_use]
    pub fn fail_closed(kind: ErrorKind) -> Self {
        Self {
            is_available: Some(false),
            suggestions: Vec::new(),
            error: Some(kind),
        }
    }

    /// Whether a verdict (real or fail-closed) is present.
    #[must_use]
    pub fn is_determined(&self) -> bool {
        self.is_available.is_some()
    }

    /// Whether the value was confirmed free by the backend.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.is_available == Some(true)
    }

    /// Whether this verdict came from a failure rather than the backend.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    /// Whether `candidate` is one of the offered suggestions.
    #[must_use]
    pub fn offers(&self, candidate: &str) -> bool {
        self.suggestions.iter().any(|s| s == candidate)
    }
}
