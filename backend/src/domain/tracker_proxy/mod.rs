//! Tracker proxy: validates client batches, attaches private keys from the
//! server-side keyring and forwards them to the locator backend.
//!
//! The proxy never fails once a batch is valid. Missing keys and upstream
//! failures both answer with an empty object so callers fall back to static
//! positions.

mod keyring;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::domain::ports::{TrackerBackend, UpstreamLocations};
use crate::domain::{Error, TrackerNameError, TrackerRequest, validate_tracker_name};

pub use keyring::{KeyringParseError, TrackerKey, TrackerKeyring};

/// Largest batch accepted in one proxy call.
pub const MAX_TRACKERS_PER_REQUEST: usize = 50;

/// Body accepted by `POST /api/tracker`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TrackerProxyRequest {
    /// Trackers to locate.
    pub trackers: Vec<TrackerRequest>,
}

impl TrackerProxyRequest {
    /// Build a request from tracker names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            trackers: names.into_iter().map(TrackerRequest::new).collect(),
        }
    }
}

/// A single validation problem in a proxy request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidationIssue {
    /// JSON path of the offending value.
    #[schema(example = "trackers[0].name")]
    pub path: String,
    /// Human-readable problem description.
    #[schema(example = "Tracker name cannot be empty")]
    pub message: String,
}

impl ValidationIssue {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

const fn name_issue_message(error: &TrackerNameError) -> &'static str {
    match error {
        TrackerNameError::Empty => "Tracker name cannot be empty",
        TrackerNameError::TooLong { .. } => "Tracker name too long",
        TrackerNameError::InvalidCharacters => "Tracker name contains invalid characters",
    }
}

/// Collect every problem with a batch.
#[must_use]
pub fn batch_issues(request: &TrackerProxyRequest) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    if request.trackers.is_empty() {
        issues.push(ValidationIssue::new(
            "trackers",
            "At least one tracker required",
        ));
    }
    if request.trackers.len() > MAX_TRACKERS_PER_REQUEST {
        issues.push(ValidationIssue::new("trackers", "Too many trackers requested"));
    }
    issues.extend(
        request
            .trackers
            .iter()
            .enumerate()
            .filter_map(|(index, tracker)| {
                validate_tracker_name(&tracker.name).err().map(|error| {
                    ValidationIssue::new(
                        format!("trackers[{index}].name"),
                        name_issue_message(&error),
                    )
                })
            }),
    );
    issues
}

/// Validate a batch, reporting every problem in `details.issues`.
///
/// # Errors
///
/// Returns an `invalid_request` [`Error`] when the batch is empty, too large
/// or contains an invalid name.
///
/// # Examples
/// ```
/// use rocktags::domain::{validate_batch, ErrorCode, TrackerProxyRequest};
///
/// assert!(validate_batch(&TrackerProxyRequest::from_names(["cat1"])).is_ok());
/// let err = validate_batch(&TrackerProxyRequest::from_names(Vec::<String>::new()))
///     .expect_err("empty batch");
/// assert_eq!(err.code(), ErrorCode::InvalidRequest);
/// ```
pub fn validate_batch(request: &TrackerProxyRequest) -> Result<(), Error> {
    let issues = batch_issues(request);
    if issues.is_empty() {
        return Ok(());
    }
    Err(Error::invalid_request("Invalid request format")
        .with_details(json!({ "issues": issues })))
}

/// Validates, keys and forwards tracker batches.
#[derive(Clone)]
pub struct TrackerProxyService {
    keyring: Arc<TrackerKeyring>,
    backend: Arc<dyn TrackerBackend>,
}

impl TrackerProxyService {
    /// Build the service.
    pub fn new(keyring: Arc<TrackerKeyring>, backend: Arc<dyn TrackerBackend>) -> Self {
        Self { keyring, backend }
    }

    /// Whether any tracker keys are configured.
    #[must_use]
    pub fn has_keys(&self) -> bool {
        !self.keyring.is_empty()
    }

    /// Locate a validated batch through the backend.
    ///
    /// # Errors
    ///
    /// Only validation failures are reported. Missing keys and backend
    /// failures yield an empty object.
    pub async fn locate(&self, request: &TrackerProxyRequest) -> Result<UpstreamLocations, Error> {
        validate_batch(request)?;
        let keyed = self.keyring.resolve(&request.trackers);
        if keyed.is_empty() {
            warn!(
                requested = request.trackers.len(),
                configured = self.keyring.len(),
                "no tracker keys configured for requested trackers"
            );
            return Ok(UpstreamLocations::new());
        }
        debug!(
            trackers = ?keyed
                .iter()
                .map(|tracker| (tracker.name.as_str(), tracker.private_key.fingerprint()))
                .collect::<Vec<_>>(),
            "forwarding keyed trackers"
        );
        match self.backend.locate(&keyed).await {
            Ok(locations) => Ok(locations),
            Err(error) => {
                warn!(%error, trackers = keyed.len(), "locator backend call failed");
                Ok(UpstreamLocations::new())
            }
        }
    }
}
