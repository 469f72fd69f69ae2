//! Reqwest-backed tracker endpoint adapter.
//!
//! Owns transport details only: request serialisation, HTTP error mapping and
//! JSON decoding. Deadlines and retries belong to the tracker client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::dto::{TrackerBatchDto, decode_locations};
use super::preview::body_preview;
use crate::domain::ports::{TrackerLocationSource, TrackerLocationSourceError};
use crate::domain::{TrackerRequest, TrackerResponse};

const USER_AGENT: &str = concat!("rocktags/", env!("CARGO_PKG_VERSION"));

/// Tracker source that POSTs `{ "trackers": [{ "name" }] }` to one endpoint.
#[derive(Debug, Clone)]
pub struct TrackerHttpSource {
    client: Client,
    endpoint: Url,
}

impl TrackerHttpSource {
    /// Build an adapter for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url) -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::with_client(client, endpoint))
    }

    /// Build an adapter around an existing client.
    #[must_use]
    pub const fn with_client(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    /// Endpoint the adapter calls.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl TrackerLocationSource for TrackerHttpSource {
    async fn fetch(
        &self,
        requests: &[TrackerRequest],
    ) -> Result<TrackerResponse, TrackerLocationSourceError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&TrackerBatchDto::from_requests(requests))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        decode_locations(body.as_ref()).map_err(TrackerLocationSourceError::decode)
    }
}

fn map_transport_error(error: reqwest::Error) -> TrackerLocationSourceError {
    if error.is_timeout() {
        TrackerLocationSourceError::timeout(error.to_string())
    } else {
        TrackerLocationSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> TrackerLocationSourceError {
    let preview = body_preview(body);
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            TrackerLocationSourceError::timeout(format!("status {}", status.as_u16()))
        }
        _ => TrackerLocationSourceError::status(status.as_u16(), preview),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::request_timeout(StatusCode::REQUEST_TIMEOUT)]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT)]
    fn timeout_statuses_map_to_timeout(#[case] status: StatusCode) {
        assert!(matches!(
            map_status_error(status, b""),
            TrackerLocationSourceError::Timeout { .. }
        ));
    }

    #[rstest]
    #[case::bad_request(StatusCode::BAD_REQUEST)]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR)]
    #[case::bad_gateway(StatusCode::BAD_GATEWAY)]
    fn other_statuses_keep_their_code(#[case] status: StatusCode) {
        let error = map_status_error(status, b"{ \"error\": \"upstream down\" }");
        assert_eq!(
            error,
            TrackerLocationSourceError::status(
                status.as_u16(),
                "{ \"error\": \"upstream down\" }"
            )
        );
    }

    #[rstest]
    fn adapter_reports_its_endpoint() {
        let endpoint = Url::parse("http://127.0.0.1:9000/api/tracker").expect("valid url");
        let source = TrackerHttpSource::new(endpoint.clone()).expect("http client");
        assert_eq!(source.endpoint(), &endpoint);
    }
}
