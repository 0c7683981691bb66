#![forbid(unsafe_code)]

//! Field kinds and per-attempt input.
//!
//! A [`ValidationInput`] decides locally whether a value is worth asking the
//! backend about. Values that fail [`ValidationInput::is_checkable`] never
//! arm a debounce timer and never allocate a sequence.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which uniqueness rule a field is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Sign-up email address.
    Email,
    /// Sign-up phone number.
    Phone,
    /// Public menu slug.
    Slug,
}

impl FieldKind {
    /// Default minimum length (in characters) before a check is scheduled.
    ///
    /// Email has no length gate; it is gated by [`FieldKind::is_well_formed`]
    /// instead.
    #[must_use]
    pub const fn default_min_length(self) -> usize {
        match self {
            Self::Email => 0,
            Self::Phone => 8,
            Self::Slug => 3,
        }
    }

    /// Stable name for logs, traces, and config.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Slug => "slug",
        }
    }

    /// Parse a kind from its stable name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "email" => Some(Self::Email),
            "phone" | "phonenumber" | "phone_number" => Some(Self::Phone),
            "slug" => Some(Self::Slug),
            _ => None,
        }
    }

    /// Structural check applied before any request is scheduled.
    ///
    /// Loose: the backend is the authority on
    /// uniqueness, this only filters values that cannot possibly be valid.
    #[must_use]
    pub fn is_well_formed(self, value: &str) -> bool {
        match self {
            Self::Email => email_shape(value),
            Self::Phone => phone_shape(value),
            Self::Slug => slug_shape(value),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn email_shape(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = trimmed.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    let parts: Vec<&str> = domain.split('.').collect();
    if parts.len() < 2 || parts.iter().any(|p| p.is_empty()) {
        return false;
    }
    parts.last().is_some_and(|tld| tld.chars().count() >= 2)
}

/// Fewest digits a phone number can carry, separators aside.
const PHONE_MIN_DIGITS: usize = 8;

fn phone_shape(value: &str) -> bool {
    let mut digits = 0usize;
    for ch in value.chars() {
        match ch {
            '0'..='9' => digits += 1,
            ' ' | '+' | '-' | '(' | ')' => {}
            _ => return false,
        }
    }
    digits >= PHONE_MIN_DIGITS
}

fn slug_shape(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// The value and gating rules for one check attempt.
///
/// Immutable once constructed; a new keystroke produces a new input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationInput {
    /// The raw field value.
    pub value: String,
    /// Which uniqueness rule applies.
    pub kind: FieldKind,
    /// Minimum length in characters before a check may be scheduled.
    pub min_length: usize,
}

impl ValidationInput {
    /// Create an input with the kind's default minimum length.
    #[must_use]
    pub fn new(kind: FieldKind, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind,
            min_length: kind.default_min_length(),
        }
    }

    /// Override the minimum length.
    #[must_use]
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    /// Length of the value in characters.
    #[must_use]
    pub fn length(&self) -> usize {
        self.value.chars().count()
    }

    /// Whether the value is at least `min_length` characters long.
    #[must_use]
    pub fn meets_min_length(&self) -> bool {
        self.length() >= self.min_length
    }

    /// Whether the value should be sent to the backend at all.
    #[must_use]
    pub fn is_checkable(&self) -> bool {
        self.meets_min_length() && self.kind.is_well_formed(&self.value)
    }
}
