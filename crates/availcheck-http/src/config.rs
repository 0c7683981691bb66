#![forbid(unsafe_code)]

//! HTTP backend configuration.
//!
//! # Environment contract
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `AVAILCHECK_BASE_URL` | API root the endpoint paths are joined to | `http://localhost:3000/api` |
//! | `AVAILCHECK_TIMEOUT_MS` | transport timeout per request | `10000` |
//!
//! A bad base URL is an error; a bad timeout is ignored with a warning.

use std::fmt;
use std::time::Duration;

use availcheck_runtime::DEFAULT_REQUEST_TIMEOUT;
use reqwest::Url;

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

/// Invalid HTTP backend configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpConfigError {
    /// The base URL does not parse.
    InvalidBaseUrl {
        /// The rejected input.
        value: String,
        /// Parser message.
        reason: String,
    },
    /// The base URL is not `http` or `https`.
    UnsupportedScheme(String),
    /// The HTTP client could not be built.
    Client(String),
}

impl fmt::Display for HttpConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBaseUrl { value, reason } => {
                write!(f, "invalid base url {value:?}: {reason}")
            }
            Self::UnsupportedScheme(scheme) => {
                write!(f, "unsupported base url scheme {scheme:?} (expected http or https)")
            }
            Self::Client(msg) => write!(f, "failed to build http client: {msg}"),
        }
    }
}

impl std::error::Error for HttpConfigError {}

/// Configuration for [`HttpBackend`](crate::HttpBackend).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// API root; endpoint paths are appended to its path.
    pub base_url: Url,
    /// Transport timeout for one request.
    pub timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl HttpConfig {
    /// Configuration for `base_url` with default timeout and user agent.
    pub fn new(base_url: &str) -> Result<Self, HttpConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: concat!("availcheck/", env!("CARGO_PKG_VERSION")).to_string(),
        })
    }

    /// Set the transport timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Parse configuration from the process environment.
    pub fn from_env() -> Result<Self, HttpConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, HttpConfigError> {
        let base = lookup("AVAILCHECK_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(&base)?;

        if let Some(raw) = lookup("AVAILCHECK_TIMEOUT_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.timeout = Duration::from_millis(ms),
                _ => tracing::warn!(value = %raw, "AVAILCHECK_TIMEOUT_MS ignored, expected positive milliseconds"),
            }
        }

        Ok(config)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, HttpConfigError> {
    let url = Url::parse(raw.trim()).map_err(|err| HttpConfigError::InvalidBaseUrl {
        value: raw.to_string(),
        reason: err.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(HttpConfigError::UnsupportedScheme(other.to_string())),
    }
}
