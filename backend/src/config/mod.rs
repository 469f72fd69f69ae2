//! Runtime configuration.
//!
//! Tunables load through OrthoConfig (`ROCKTAGS_*` environment variables,
//! CLI flags and config files). Tracker keys are secrets and load
//! separately through [`keyring_from_env`].

mod keyring;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use campus_data::{CampusRoster, RosterError};
use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{
    DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_CACHE_TTL, DEFAULT_PROBE_TIMEOUT, DEFAULT_REFRESH_INTERVAL,
    RetryPolicy, TrackerClientConfig,
};

pub use keyring::{KEY_FILE_ENV, KEYS_ENV, KeyringConfigError, keyring_from_env};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const TRACKER_PATH: &str = "/api/tracker";
const DEFAULT_UPSTREAM_URL: &str = "https://rocktags-backend-147809513475.us-south1.run.app/findmy/";
const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The bind address does not parse.
    #[error("invalid bind address '{value}': {message}")]
    BindAddr {
        /// Configured value.
        value: String,
        /// Parser message.
        message: String,
    },
    /// A URL setting does not parse.
    #[error("invalid {field} '{value}': {message}")]
    Url {
        /// Setting name.
        field: &'static str,
        /// Configured value.
        value: String,
        /// Parser message.
        message: String,
    },
    /// The roster override failed to load.
    #[error("failed to load roster: {0}")]
    Roster(#[from] RosterError),
}

/// Service tunables loaded via OrthoConfig.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ROCKTAGS")]
pub struct RocktagsSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// Tracker endpoint polled by the tracker client.
    pub tracker_endpoint: Option<String>,
    /// Upstream locator backend behind the proxy.
    pub upstream_url: Option<String>,
    /// Per-attempt deadline for tracker fetches, in milliseconds.
    pub request_timeout_ms: Option<u64>,
    /// Deadline for proxy calls to the locator backend, in milliseconds.
    pub upstream_timeout_ms: Option<u64>,
    /// Cache lifetime for tracker responses, in milliseconds.
    pub cache_ttl_ms: Option<u64>,
    /// Retries after the first failed attempt.
    pub max_retries: Option<u32>,
    /// Delay before the first retry, in milliseconds; doubles per retry.
    pub retry_base_delay_ms: Option<u64>,
    /// Map refresh period, in milliseconds.
    #[ortho_config(default = 10000)]
    pub refresh_interval_ms: u64,
    /// Deadline for the health probe, in milliseconds.
    pub health_probe_timeout_ms: Option<u64>,
    /// Roster JSON file replacing the bundled roster.
    pub roster_path: Option<PathBuf>,
}

impl Default for RocktagsSettings {
    fn default() -> Self {
        Self {
            bind_addr: None,
            tracker_endpoint: None,
            upstream_url: None,
            request_timeout_ms: None,
            upstream_timeout_ms: None,
            cache_ttl_ms: None,
            max_retries: None,
            retry_base_delay_ms: None,
            refresh_interval_ms: millis_of(DEFAULT_REFRESH_INTERVAL),
            health_probe_timeout_ms: None,
            roster_path: None,
        }
    }
}

fn millis_of(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn millis_or(value: Option<u64>, default: Duration) -> Duration {
    value.map_or(default, Duration::from_millis)
}

fn parse_url(field: &'static str, value: &str) -> Result<Url, SettingsError> {
    Url::parse(value).map_err(|error| SettingsError::Url {
        field,
        value: value.to_owned(),
        message: error.to_string(),
    })
}

impl RocktagsSettings {
    /// Address the server binds to.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|error: std::net::AddrParseError| SettingsError::BindAddr {
            value: value.to_owned(),
            message: error.to_string(),
        })
    }

    /// Tracker endpoint URL.
    ///
    /// Unset, it points at this service's own proxy on loopback, using the
    /// port from [`Self::bind_addr`].
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Url`] when the value does not parse, or
    /// [`SettingsError::BindAddr`] when the default cannot be derived.
    pub fn tracker_endpoint(&self) -> Result<Url, SettingsError> {
        match self.tracker_endpoint.as_deref() {
            Some(value) => parse_url("tracker endpoint", value),
            None => {
                let port = self.bind_addr()?.port();
                parse_url(
                    "tracker endpoint",
                    &format!("http://127.0.0.1:{port}{TRACKER_PATH}"),
                )
            }
        }
    }

    /// Upstream locator backend URL.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Url`] when the value does not parse.
    pub fn upstream_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            "upstream url",
            self.upstream_url.as_deref().unwrap_or(DEFAULT_UPSTREAM_URL),
        )
    }

    /// Deadline for proxy calls to the locator backend.
    #[must_use]
    pub fn upstream_timeout(&self) -> Duration {
        millis_or(self.upstream_timeout_ms, DEFAULT_UPSTREAM_TIMEOUT)
    }

    /// Cache lifetime for tracker responses.
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        millis_or(self.cache_ttl_ms, DEFAULT_CACHE_TTL)
    }

    /// Map refresh period. Zero is raised to one millisecond.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms).max(Duration::from_millis(1))
    }

    /// Deadline for one health probe.
    #[must_use]
    pub fn health_probe_timeout(&self) -> Duration {
        millis_or(self.health_probe_timeout_ms, DEFAULT_PROBE_TIMEOUT)
    }

    /// Tracker client tuning.
    #[must_use]
    pub fn tracker_client_config(&self) -> TrackerClientConfig {
        let defaults = RetryPolicy::default();
        TrackerClientConfig {
            attempt_timeout: millis_or(self.request_timeout_ms, DEFAULT_ATTEMPT_TIMEOUT),
            retry: RetryPolicy {
                max_retries: self.max_retries.unwrap_or(defaults.max_retries),
                base_delay: millis_or(self.retry_base_delay_ms, defaults.base_delay),
            },
        }
    }

    /// The configured roster, or the bundled one.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Roster`] when the roster fails to load.
    pub fn roster(&self) -> Result<CampusRoster, SettingsError> {
        Ok(match &self.roster_path {
            Some(path) => CampusRoster::from_file(path)?,
            None => CampusRoster::bundled()?,
        })
    }
}
