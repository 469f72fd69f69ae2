//! Reqwest-backed adapter for the upstream locator backend.
//!
//! Bodies carry private keys, so neither request bodies nor keys are ever
//! logged or embedded in errors.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

use super::dto::KeyedBatchDto;
use super::preview::body_preview;
use crate::domain::ports::{KeyedTracker, TrackerBackend, TrackerBackendError, UpstreamLocations};

const USER_AGENT: &str = concat!("rocktags-proxy/", env!("CARGO_PKG_VERSION"));

/// Locator backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct FindMyBackend {
    client: Client,
    url: Url,
}

impl FindMyBackend {
    /// Build an adapter whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl TrackerBackend for FindMyBackend {
    async fn locate(
        &self,
        trackers: &[KeyedTracker],
    ) -> Result<UpstreamLocations, TrackerBackendError> {
        let response = self
            .client
            .post(self.url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&KeyedBatchDto::from_keyed(trackers))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            debug!(
                status = status.as_u16(),
                body = %body_preview(body.as_ref()),
                "locator backend rejected request"
            );
            return Err(TrackerBackendError::status(status.as_u16()));
        }
        match serde_json::from_slice::<Value>(body.as_ref()) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(TrackerBackendError::decode(
                "locator backend response is not a JSON object",
            )),
            Err(error) => Err(TrackerBackendError::decode(format!(
                "invalid locator backend JSON payload: {error}"
            ))),
        }
    }

    async fn probe(&self) -> Result<(), TrackerBackendError> {
        let response = self
            .client
            .head(self.url.clone())
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(TrackerBackendError::status(status.as_u16()))
        }
    }
}

fn map_transport_error(error: reqwest::Error) -> TrackerBackendError {
    // reqwest errors can echo the URL but never the body.
    if error.is_timeout() {
        TrackerBackendError::timeout(error.to_string())
    } else {
        TrackerBackendError::transport(error.to_string())
    }
}
