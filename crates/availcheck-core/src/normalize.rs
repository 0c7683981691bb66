#![forbid(unsafe_code)]

//! Response normalization at the backend boundary.
//!
//! The availability endpoints have been observed answering in two shapes:
//!
//! ```text
//! { "isAvailable": bool, "suggestions"?: [string] }
//! { "available":   bool, "suggestions"?: [string] }
//! ```
//!
//! Both normalize into a [`ValidationResult`]. Anything else normalizes to
//! `{ is_available: Some(false), suggestions: [] }` tagged
//! [`ErrorKind::MalformedResponse`]: a false negative can be retried by the
//! user, a false positive cannot be taken back.
//!
//! # Rules
//!
//! | Payload | Result |
//! |---------|--------|
//! | `isAvailable` is a bool | that verdict (wins over `available`) |
//! | only `available` is a bool | that verdict |
//! | neither key holds a bool | fail-closed, malformed |
//! | `suggestions` present but not `[string]` | fail-closed, malformed |
//! | verdict `true` | suggestions dropped |
//! | empty or repeated suggestions | dropped, order kept |

use serde::Deserialize;
use serde_json::Value;

use crate::error::{CheckError, ErrorKind};
use crate::result::ValidationResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAvailability {
    #[serde(default)]
    is_available: Option<bool>,
    #[serde(default)]
    available: Option<bool>,
    #[serde(default)]
    suggestions: Option<Vec<String>>,
}

impl RawAvailability {
    fn into_result(self) -> Result<ValidationResult, CheckError> {
        let verdict = self.is_available.or(self.available).ok_or_else(|| {
            CheckError::Malformed("neither `isAvailable` nor `available` is a boolean".into())
        })?;
        if verdict {
            return Ok(ValidationResult::available());
        }
        Ok(ValidationResult::unavailable(clean_suggestions(
            self.suggestions.unwrap_or_default(),
        )))
    }
}

fn clean_suggestions(raw: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for suggestion in raw {
        if suggestion.trim().is_empty() || out.contains(&suggestion) {
            continue;
        }
        out.push(suggestion);
    }
    out
}

/// Normalize a decoded JSON payload, reporting why it was rejected.
pub fn try_normalize_value(value: &Value) -> Result<ValidationResult, CheckError> {
    RawAvailability::deserialize(value)
        .map_err(|err| CheckError::Malformed(err.to_string()))?
        .into_result()
}

/// Normalize a decoded JSON payload, failing closed on unknown shapes.
#[must_use]
pub fn normalize_value(value: &Value) -> ValidationResult {
    try_normalize_value(value).unwrap_or_else(|err| {
        tracing::debug!(error = %err, "availability payload rejected");
        ValidationResult::fail_closed(ErrorKind::MalformedResponse)
    })
}

/// Normalize a raw response body, failing closed on invalid JSON or shape.
#[must_use]
pub fn normalize_body(body: &[u8]) -> ValidationResult {
    let parsed = serde_json::from_slice::<RawAvailability>(body)
        .map_err(|err| CheckError::Malformed(err.to_string()))
        .and_then(RawAvailability::into_result);
    parsed.unwrap_or_else(|err| {
        tracing::debug!(error = %err, body_len = body.len(), "availability body rejected");
        ValidationResult::fail_closed(ErrorKind::MalformedResponse)
    })
}

/// Normalize a backend outcome, absorbing every failure fail-closed.
#[must_use]
pub fn normalize_outcome(outcome: Result<Value, CheckError>) -> ValidationResult {
    match outcome {
        Ok(value) => normalize_value(&value),
        Err(err) => {
            tracing::debug!(error = %err, kind = err.kind().as_str(), "availability check failed");
            ValidationResult::fail_closed(err.kind())
        }
    }
}
