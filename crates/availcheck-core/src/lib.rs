#![forbid(unsafe_code)]

//! Core types for debounced, sequenced availability checks.
//!
//! This crate holds everything that does not depend on time or threads:
//!
//! - [`FieldKind`] and [`ValidationInput`] - what is being checked, and
//!   whether a value is long enough / well-formed enough to be worth asking
//!   the backend about
//! - [`CheckSequence`] and [`SequenceCounter`] - per-field monotonic tags
//!   used to detect stale responses
//! - [`ValidationResult`] and [`ErrorKind`] - the normalized verdict
//! - [`CheckError`] - backend failures, always absorbed fail-closed
//! - [`normalize`] - conversion of raw endpoint payloads into results
//!
//! # Role in availcheck
//! `availcheck-runtime` builds the debounce scheduler, stale-response guard,
//! and state machine on top of these types. Backends (for example
//! `availcheck-http`) only need [`CheckError`] and [`FieldKind`].

pub mod error;
pub mod field;
pub mod normalize;
pub mod result;
pub mod sequence;

pub use error::{CheckError, ErrorKind};
pub use field::{FieldKind, ValidationInput};
pub use normalize::{normalize_body, normalize_outcome, normalize_value, try_normalize_value};
pub use result::ValidationResult;
pub use sequence::{CheckSequence, SequenceCounter};
