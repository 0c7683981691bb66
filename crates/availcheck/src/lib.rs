#![forbid(unsafe_code)]

//! Availcheck public facade crate.
//!
//! Live "is this value taken" validation for form fields: debounced
//! keystrokes, per-field monotonic sequence numbers, a stale-response guard
//! so a slow old answer never overwrites a newer one, and a small
//! `IDLE` / `CHECKING` / `SETTLED` state machine with a suggestion loop.
//!
//! This crate re-exports the stable surface of the internal crates and
//! offers a prelude plus subscriber setup for binaries.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use availcheck::prelude::*;
//!
//! let backend = ScriptedBackend::new();
//! let config = FieldConfig::default().with_debounce(Duration::from_millis(10));
//! let mut field = FieldLoop::new(FieldKind::Slug, config, backend);
//! field.keystroke("my-slug");
//! assert_eq!(field.run_until_settled(Duration::from_secs(5)), Status::Available);
//! ```

use std::fmt;

pub mod logging;

// --- Core re-exports -------------------------------------------------------

pub use availcheck_core::{
    CheckError, CheckSequence, ErrorKind, FieldKind, SequenceCounter, ValidationInput,
    ValidationResult, normalize_body, normalize_outcome, normalize_value,
};

// --- Runtime re-exports ----------------------------------------------------

pub use availcheck_runtime::{
    AvailabilityBackend, AvailabilityField, AvailabilityHandle, CheckCompletion, CheckEvent,
    CheckRequest, CheckTrace, FieldConfig, FieldError, FieldLoop, FieldSimulator, GuardDecision,
    InputOutcome, Phase, ScriptedBackend, Status, ValidationState,
};

// --- HTTP re-exports -------------------------------------------------------

#[cfg(feature = "http")]
pub use availcheck_http::{HttpBackend, HttpConfig, HttpConfigError};

pub use logging::{LogFormat, LoggingConfig, LoggingError};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for availcheck applications.
///
/// Availability failures never appear here: they are absorbed into
/// fail-closed results. This covers setup and API misuse.
#[derive(Debug)]
pub enum Error {
    /// Invalid field API usage.
    Field(FieldError),
    /// A backend failure surfaced outside a field (direct backend calls).
    Check(CheckError),
    /// Invalid HTTP backend configuration.
    #[cfg(feature = "http")]
    Http(HttpConfigError),
    /// Subscriber installation failed.
    Logging(LoggingError),
    /// I/O failure.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(err) => write!(f, "{err}"),
            Self::Check(err) => write!(f, "{err}"),
            #[cfg(feature = "http")]
            Self::Http(err) => write!(f, "{err}"),
            Self::Logging(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Field(err) => Some(err),
            Self::Check(err) => Some(err),
            #[cfg(feature = "http")]
            Self::Http(err) => Some(err),
            Self::Logging(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<FieldError> for Error {
    fn from(err: FieldError) -> Self {
        Self::Field(err)
    }
}

impl From<CheckError> for Error {
    fn from(err: CheckError) -> Self {
        Self::Check(err)
    }
}

#[cfg(feature = "http")]
impl From<HttpConfigError> for Error {
    fn from(err: HttpConfigError) -> Self {
        Self::Http(err)
    }
}

impl From<LoggingError> for Error {
    fn from(err: LoggingError) -> Self {
        Self::Logging(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

/// Standard result type for availcheck APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        AvailabilityBackend, AvailabilityField, AvailabilityHandle, Error, FieldConfig,
        FieldError, FieldKind, FieldLoop, InputOutcome, Result, ScriptedBackend, Status,
        ValidationResult,
    };

    #[cfg(feature = "http")]
    pub use crate::{HttpBackend, HttpConfig};

    pub use crate::{core, runtime};
}

pub use availcheck_core as core;
#[cfg(feature = "http")]
pub use availcheck_http as http;
pub use availcheck_runtime as runtime;
