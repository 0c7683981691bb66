#![forbid(unsafe_code)]

//! Backend failure types.
//!
//! None of these ever reach a UI collaborator as an error: the sequenced
//! client absorbs them into a fail-closed [`ValidationResult`] tagged with
//! the matching [`ErrorKind`].
//!
//! [`ValidationResult`]: crate::ValidationResult

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Classification of why a check could not produce a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Transport failure (connect, DNS, reset).
    Network,
    /// The endpoint answered with a non-success status.
    HttpStatus,
    /// The payload was not one of the recognized shapes.
    MalformedResponse,
    /// No answer within the configured bound.
    Timeout,
}

impl ErrorKind {
    /// Stable name for logs and traces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::HttpStatus => "http_status",
            Self::MalformedResponse => "malformed_response",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure reported by an availability backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// The request could not be delivered or the connection failed.
    Transport(String),
    /// The endpoint returned a non-2xx status code.
    Status(u16),
    /// The body could not be decoded as JSON.
    Malformed(String),
    /// The request exceeded its time bound.
    Timeout(Duration),
}

impl CheckError {
    /// The [`ErrorKind`] this failure normalizes to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::Network,
            Self::Status(_) => ErrorKind::HttpStatus,
            Self::Malformed(_) => ErrorKind::MalformedResponse,
            Self::Timeout(_) => ErrorKind::Timeout,
        }
    }
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "availability request failed: {msg}"),
            Self::Status(code) => write!(f, "availability endpoint returned status {code}"),
            Self::Malformed(msg) => write!(f, "malformed availability response: {msg}"),
            Self::Timeout(after) => {
                write!(f, "availability request timed out after {}ms", after.as_millis())
            }
        }
    }
}

impl std::error::Error for CheckError {}
