#![forbid(unsafe_code)]

//! Blocking `reqwest` implementation of [`AvailabilityBackend`].
//!
//! Endpoints:
//!
//! | kind | request |
//! |------|---------|
//! | email | `GET {base}/auth/check-availability?email=<v>` |
//! | phone | `GET {base}/auth/check-availability?phoneNumber=<v>` |
//! | slug | `GET {base}/menus/check-slug?slug=<v>` |
//!
//! Non-2xx statuses become [`CheckError::Status`], undecodable bodies
//! [`CheckError::Malformed`], transport timeouts [`CheckError::Timeout`],
//! and everything else [`CheckError::Transport`]. No retries.

use availcheck_core::{CheckError, FieldKind};
use availcheck_runtime::AvailabilityBackend;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;

use crate::config::{HttpConfig, HttpConfigError};

/// Path and query parameter for one field kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// Path segments below the base URL.
    pub segments: &'static [&'static str],
    /// Query parameter carrying the value.
    pub param: &'static str,
}

impl Endpoint {
    /// The endpoint that checks `kind`.
    #[must_use]
    pub const fn for_kind(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Email => Self {
                segments: &["auth", "check-availability"],
                param: "email",
            },
            FieldKind::Phone => Self {
                segments: &["auth", "check-availability"],
                param: "phoneNumber",
            },
            FieldKind::Slug => Self {
                segments: &["menus", "check-slug"],
                param: "slug",
            },
        }
    }
}

/// Availability backend talking to the real HTTP endpoints.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    config: HttpConfig,
}

impl HttpBackend {
    /// Build a backend and its HTTP client.
    pub fn new(config: HttpConfig) -> Result<Self, HttpConfigError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|err| HttpConfigError::Client(err.to_string()))?;
        tracing::debug!(
            base_url = %config.base_url,
            timeout_ms = config.timeout.as_millis() as u64,
            "http availability backend ready"
        );
        Ok(Self { client, config })
    }

    /// Build a backend from the process environment.
    pub fn from_env() -> Result<Self, HttpConfigError> {
        Self::new(HttpConfig::from_env()?)
    }

    /// The backend's configuration.
    #[must_use]
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Full request URL for checking `value` as `kind`.
    pub fn endpoint_url(&self, kind: FieldKind, value: &str) -> Result<Url, CheckError> {
        let endpoint = Endpoint::for_kind(kind);
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                CheckError::Transport(format!(
                    "base url {} cannot carry a path",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .extend(endpoint.segments);
        url.set_query(None);
        url.query_pairs_mut().append_pair(endpoint.param, value);
        Ok(url)
    }

    fn map_send_error(&self, err: &reqwest::Error) -> CheckError {
        if err.is_timeout() {
            CheckError::Timeout(self.config.timeout)
        } else {
            CheckError::Transport(err.to_string())
        }
    }
}

impl AvailabilityBackend for HttpBackend {
    fn check(&self, kind: FieldKind, value: &str) -> Result<Value, CheckError> {
        let url = self.endpoint_url(kind, value)?;
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|err| self.map_send_error(&err))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(
                kind = kind.as_str(),
                status = status.as_u16(),
                "availability endpoint rejected request"
            );
            return Err(CheckError::Status(status.as_u16()));
        }

        response.json::<Value>().map_err(|err| {
            if err.is_timeout() {
                CheckError::Timeout(self.config.timeout)
            } else {
                CheckError::Malformed(err.to_string())
            }
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}
