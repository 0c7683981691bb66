#![forbid(unsafe_code)]

//! Availcheck Runtime
//!
//! Time- and thread-aware machinery for live availability validation of a
//! single input field.
//!
//! # Key Components
//!
//! - [`DebounceScheduler`] - latest-wins quiet-window timer
//! - [`SequencedClient`] - allocates sequences and builds [`CheckRequest`]s
//! - [`StaleResponseGuard`] - decides whether a response may apply
//! - [`ValidationStateMachine`] - `IDLE` / `CHECKING` / `SETTLED`
//! - [`AvailabilityField`] - composes the above for one field
//! - [`FieldLoop`] - runs a field against a blocking backend on worker threads
//! - [`FieldSimulator`] - deterministic virtual-clock driver for tests
//!
//! # Role in availcheck
//! `availcheck-core` supplies the data model; this crate owns ordering,
//! timing, and state. Backends implement [`AvailabilityBackend`] and know
//! nothing about sequences.

pub mod client;
pub mod config;
pub mod debounce;
pub mod event_loop;
pub mod field;
pub mod guard;
pub mod simulator;
pub mod state;

pub use client::{AvailabilityBackend, CheckCompletion, CheckRequest, SequencedClient};
pub use config::{DEFAULT_DEBOUNCE, DEFAULT_REQUEST_TIMEOUT, FieldConfig};
pub use debounce::{ArmOutcome, DebounceScheduler, DebounceStats};
pub use event_loop::FieldLoop;
pub use field::{AvailabilityField, FieldError, InputOutcome};
pub use guard::{CheckEvent, CheckTrace, GuardDecision, InFlightCheck, StaleResponseGuard};
pub use simulator::{FieldSimulator, ScriptedBackend, SimRecord};
pub use state::{AvailabilityHandle, Phase, Status, ValidationState, ValidationStateMachine};
