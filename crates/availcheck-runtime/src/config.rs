#![forbid(unsafe_code)]

//! Per-field configuration.
//!
//! # Environment contract
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `AVAILCHECK_DEBOUNCE_MS` | quiet window before a check fires | `500` |
//! | `AVAILCHECK_TIMEOUT_MS` | bound on an outstanding check | `10000` |
//! | `AVAILCHECK_MIN_LENGTH` | override the kind's minimum length | per kind |
//! | `AVAILCHECK_TRACE` | record the check trace (`1`/`true`/`on`) | off |
//!
//! Unparseable values are ignored with a warning; parsing is deterministic
//! and order-independent.

use std::time::Duration;

use availcheck_core::FieldKind;

/// Default quiet window before a check fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Default bound on how long the current check may stay outstanding.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for one availability field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldConfig {
    /// Quiet window: a check fires only after input has been stable this long.
    pub debounce: Duration,

    /// Bound on how long the current check may stay outstanding before the
    /// field settles fail-closed.
    pub request_timeout: Duration,

    /// Minimum length override. `None` uses [`FieldKind::default_min_length`].
    pub min_length: Option<usize>,

    /// Record lifecycle events in the check trace.
    pub enable_trace: bool,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            min_length: None,
            enable_trace: cfg!(feature = "trace-all"),
        }
    }
}

impl FieldConfig {
    /// Set the debounce window.
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Override the minimum length for every kind.
    #[must_use]
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    /// Enable or disable the check trace.
    #[must_use]
    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.enable_trace = enabled;
        self
    }

    /// Effective minimum length for `kind`.
    #[must_use]
    pub fn min_length_for(&self, kind: FieldKind) -> usize {
        self.min_length.unwrap_or_else(|| kind.default_min_length())
    }

    /// Parse configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(ms) = parse_u64(&lookup, "AVAILCHECK_DEBOUNCE_MS") {
            config.debounce = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_u64(&lookup, "AVAILCHECK_TIMEOUT_MS") {
            if ms == 0 {
                tracing::warn!("AVAILCHECK_TIMEOUT_MS=0 ignored, timeout must be positive");
            } else {
                config.request_timeout = Duration::from_millis(ms);
            }
        }
        if let Some(len) = parse_u64(&lookup, "AVAILCHECK_MIN_LENGTH") {
            config.min_length = usize::try_from(len).ok();
        }
        if let Some(raw) = lookup("AVAILCHECK_TRACE") {
            match parse_flag(&raw) {
                Some(flag) => config.enable_trace = flag,
                None => tracing::warn!(value = %raw, "AVAILCHECK_TRACE ignored, expected a boolean"),
            }
        }

        config
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable config value");
            None
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
