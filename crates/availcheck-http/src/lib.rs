#![forbid(unsafe_code)]

//! HTTP transport for availcheck.
//!
//! [`HttpBackend`] implements
//! [`AvailabilityBackend`](availcheck_runtime::AvailabilityBackend) with a
//! blocking `reqwest` client. It is stateless per field: sequencing and
//! stale-response handling stay in `availcheck-runtime`, so the same
//! backend can be shared by any number of fields.

pub mod backend;
pub mod config;

pub use backend::{Endpoint, HttpBackend};
pub use config::{DEFAULT_BASE_URL, HttpConfig, HttpConfigError};
