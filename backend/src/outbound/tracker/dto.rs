//! Wire DTOs for the tracker endpoint and the locator backend.
//!
//! Request bodies always wrap the tracker list in an object. Keys are
//! borrowed from the keyring for the lifetime of the request only.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::ports::KeyedTracker;
use crate::domain::{TrackerLocation, TrackerRequest, TrackerResponse};

#[derive(Debug, Serialize)]
pub(super) struct TrackerBatchDto<'a> {
    pub(super) trackers: Vec<TrackerNameDto<'a>>,
}

#[derive(Debug, Serialize)]
pub(super) struct TrackerNameDto<'a> {
    pub(super) name: &'a str,
}

impl<'a> TrackerBatchDto<'a> {
    pub(super) fn from_requests(requests: &'a [TrackerRequest]) -> Self {
        Self {
            trackers: requests
                .iter()
                .map(|request| TrackerNameDto {
                    name: request.name.as_str(),
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
pub(super) struct KeyedBatchDto<'a> {
    pub(super) trackers: Vec<KeyedTrackerDto<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct KeyedTrackerDto<'a> {
    pub(super) name: &'a str,
    pub(super) private_key: &'a str,
}

impl<'a> KeyedBatchDto<'a> {
    pub(super) fn from_keyed(trackers: &'a [KeyedTracker]) -> Self {
        Self {
            trackers: trackers
                .iter()
                .map(|tracker| KeyedTrackerDto {
                    name: tracker.name.as_str(),
                    private_key: tracker.private_key.expose(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TrackerLocationDto {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    timestamp: String,
    #[serde(default)]
    status: i64,
}

/// Decode a tracker endpoint body.
///
/// The body must be a JSON object. Entries that do not look like a fix are
/// skipped so one bad tracker does not discard the rest.
pub(super) fn decode_locations(body: &[u8]) -> Result<TrackerResponse, String> {
    let raw: Map<String, Value> = serde_json::from_slice(body)
        .map_err(|error| format!("invalid tracker JSON payload: {error}"))?;
    Ok(raw
        .into_iter()
        .filter_map(|(name, value)| {
            match serde_json::from_value::<TrackerLocationDto>(value) {
                Ok(dto) => Some((
                    name,
                    TrackerLocation {
                        latitude: dto.latitude,
                        longitude: dto.longitude,
                        timestamp: dto.timestamp,
                        status: dto.status,
                    },
                )),
                Err(error) => {
                    debug!(tracker = %name, %error, "skipping malformed tracker entry");
                    None
                }
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TrackerKey;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn keyed_batch_uses_camel_case_keys() {
        let trackers = [KeyedTracker {
            name: "cat1".to_owned(),
            private_key: TrackerKey::new("secret"),
        }];
        let value = serde_json::to_value(KeyedBatchDto::from_keyed(&trackers))
            .expect("serialise keyed batch");
        assert_eq!(
            value,
            json!({ "trackers": [{ "name": "cat1", "privateKey": "secret" }] })
        );
    }

    #[rstest]
    fn name_batch_carries_no_keys() {
        let requests = [TrackerRequest::new("cat1"), TrackerRequest::new("cat2")];
        let value = serde_json::to_value(TrackerBatchDto::from_requests(&requests))
            .expect("serialise batch");
        assert_eq!(
            value,
            json!({ "trackers": [{ "name": "cat1" }, { "name": "cat2" }] })
        );
    }

    #[rstest]
    fn skips_malformed_entries() {
        let body = json!({
            "cat1": { "latitude": 32.73, "longitude": -97.11, "timestamp": "t", "status": 0 },
            "cat2": { "latitude": "north" }
        })
        .to_string();
        let decoded = decode_locations(body.as_bytes()).expect("object decodes");
        assert_eq!(decoded.len(), 1);
        assert!(decoded.contains_key("cat1"));
    }

    #[rstest]
    #[case::array(b"[]".as_slice())]
    #[case::html(b"<html>".as_slice())]
    fn rejects_non_object_bodies(#[case] body: &[u8]) {
        assert!(decode_locations(body).is_err());
    }
}
