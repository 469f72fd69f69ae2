//! Driven port for fetching tracker fixes from the tracker endpoint.
//!
//! The tracker client owns caching, retry and bounds filtering; adapters only
//! move bytes and classify failures.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{TrackerRequest, TrackerResponse};

define_port_error! {
    /// Errors surfaced while calling the tracker endpoint.
    pub enum TrackerLocationSourceError {
        /// The attempt exceeded its deadline.
        Timeout {
            /// Failure description.
            message: String,
        } => "tracker request timed out: {message}",
        /// Network transport failed before a response arrived.
        Transport {
            /// Failure description.
            message: String,
        } => "tracker transport failed: {message}",
        /// The endpoint answered with a non-success status.
        Status {
            /// HTTP status code.
            status: u16,
            /// Body preview or description.
            message: String,
        } => "tracker endpoint returned {status}: {message}",
        /// The response body could not be decoded.
        Decode {
            /// Failure description.
            message: String,
        } => "tracker response decode failed: {message}",
    }
}

/// Port for fetching the latest fixes for a batch of trackers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrackerLocationSource: Send + Sync {
    /// Fetch fixes for `requests`.
    async fn fetch(
        &self,
        requests: &[TrackerRequest],
    ) -> Result<TrackerResponse, TrackerLocationSourceError>;
}
