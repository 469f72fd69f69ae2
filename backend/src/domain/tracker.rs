//! Tracker request and response payloads.
//!
//! A [`TrackerResponse`] maps tracker names to their latest fix. A name that
//! is absent from the response means "keep the last known position".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum tracker name length accepted by the proxy.
pub use campus_data::TRACKER_NAME_MAX;

/// Identifies one trackable cat by tracker name.
///
/// Secret keys never travel with a request; the proxy attaches them
/// server-side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub struct TrackerRequest {
    /// Tracker name as registered with the locator backend.
    #[schema(example = "cat1")]
    pub name: String,
}

impl TrackerRequest {
    /// Build a request for one tracker name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Latest reported fix for one tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TrackerLocation {
    /// Latitude in decimal degrees.
    #[schema(example = 32.7315)]
    pub latitude: f64,
    /// Longitude in decimal degrees.
    #[schema(example = -97.11)]
    pub longitude: f64,
    /// ISO-8601 timestamp of the fix.
    #[schema(example = "2025-09-18T16:04:05Z")]
    pub timestamp: String,
    /// Status code reported by the locator backend.
    #[schema(example = 0)]
    pub status: i64,
}

/// Tracker name to latest fix. Serialises as a plain JSON object; `{}`
/// signals that no fresh data is available.
pub type TrackerResponse = BTreeMap<String, TrackerLocation>;

/// Reasons a tracker name is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackerNameError {
    /// The name is empty.
    #[error("tracker name must not be empty")]
    Empty,
    /// The name is longer than [`TRACKER_NAME_MAX`] characters.
    #[error("tracker name must be at most {max} characters, got {length}")]
    TooLong {
        /// Configured maximum.
        max: usize,
        /// Observed length.
        length: usize,
    },
    /// The name contains characters other than letters, digits, `-` or `_`.
    #[error("tracker name may only contain letters, digits, '-' and '_'")]
    InvalidCharacters,
}

/// Validates a tracker name for forwarding to the locator backend.
///
/// # Errors
///
/// Returns [`TrackerNameError`] describing the first rule the name breaks.
///
/// # Examples
/// ```
/// use rocktags::domain::{validate_tracker_name, TrackerNameError};
///
/// assert!(validate_tracker_name("cat1").is_ok());
/// assert_eq!(validate_tracker_name(""), Err(TrackerNameError::Empty));
/// ```
pub fn validate_tracker_name(name: &str) -> Result<(), TrackerNameError> {
    let length = name.chars().count();
    if length == 0 {
        return Err(TrackerNameError::Empty);
    }
    if length > TRACKER_NAME_MAX {
        return Err(TrackerNameError::TooLong {
            max: TRACKER_NAME_MAX,
            length,
        });
    }
    if !campus_data::is_valid_tracker_name(name) {
        return Err(TrackerNameError::InvalidCharacters);
    }
    Ok(())
}
