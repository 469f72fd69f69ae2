//! Driven port for the upstream locator backend behind the tracker proxy.
//!
//! The backend resolves tracker names plus private keys into fixes. It is
//! also probed by the health endpoint.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::define_port_error;
use crate::domain::TrackerKey;

/// Upstream response passed through to proxy clients unchanged.
pub type UpstreamLocations = Map<String, Value>;

/// One tracker name paired with its private key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedTracker {
    /// Tracker name.
    pub name: String,
    /// Private key resolved from the keyring.
    pub private_key: TrackerKey,
}

define_port_error! {
    /// Errors surfaced while calling the locator backend.
    pub enum TrackerBackendError {
        /// The call exceeded its deadline.
        Timeout {
            /// Failure description.
            message: String,
        } => "locator backend timed out: {message}",
        /// Network transport failed before a response arrived.
        Transport {
            /// Failure description.
            message: String,
        } => "locator backend transport failed: {message}",
        /// The backend answered with a non-success status.
        Status {
            /// HTTP status code.
            status: u16,
        } => "locator backend returned status {status}",
        /// The backend answered with something other than a JSON object.
        Decode {
            /// Failure description.
            message: String,
        } => "locator backend response decode failed: {message}",
    }
}

/// Port for the upstream locator backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrackerBackend: Send + Sync {
    /// Resolve keyed trackers into fixes.
    async fn locate(
        &self,
        trackers: &[KeyedTracker],
    ) -> Result<UpstreamLocations, TrackerBackendError>;

    /// Check that the backend answers at all.
    async fn probe(&self) -> Result<(), TrackerBackendError>;
}

/// Fixture backend that knows no trackers and is always reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureTrackerBackend;

#[async_trait]
impl TrackerBackend for FixtureTrackerBackend {
    async fn locate(
        &self,
        _trackers: &[KeyedTracker],
    ) -> Result<UpstreamLocations, TrackerBackendError> {
        Ok(UpstreamLocations::new())
    }

    async fn probe(&self) -> Result<(), TrackerBackendError> {
        Ok(())
    }
}
