//! Locator backend adapter against a fake upstream.

use std::time::Duration;

use actix_web::http::StatusCode;
use rocktags::domain::TrackerKey;
use rocktags::domain::ports::{KeyedTracker, TrackerBackend, TrackerBackendError};
use rocktags::outbound::tracker::FindMyBackend;
use rstest::rstest;
use serde_json::json;

mod support;

use support::{FakeUpstream, Reply};

fn keyed(name: &str, key: &str) -> KeyedTracker {
    KeyedTracker {
        name: name.to_owned(),
        private_key: TrackerKey::new(key),
    }
}

fn backend(upstream: &FakeUpstream) -> FindMyBackend {
    FindMyBackend::new(upstream.url(), Duration::from_secs(5)).expect("http client")
}

#[rstest]
#[actix_web::test]
async fn locate_sends_keys_and_passes_the_object_through() {
    let upstream = FakeUpstream::start();
    let body = json!({
        "cat1": {"latitude": 32.73, "longitude": -97.11, "timestamp": "2025-09-18T16:00:00Z", "status": 0, "battery": 80}
    });
    upstream.always(Reply::json(&body));

    let located = backend(&upstream)
        .locate(&[keyed("cat1", "secret-one")])
        .await
        .expect("locate succeeds");

    assert_eq!(serde_json::Value::Object(located), body);
    assert_eq!(
        upstream.received(),
        vec![json!({"trackers": [{"name": "cat1", "privateKey": "secret-one"}]})]
    );
    upstream.stop().await;
}

#[rstest]
#[case::array("[1, 2]")]
#[case::garbage("not json")]
#[actix_web::test]
async fn non_object_bodies_are_decode_errors(#[case] body: &str) {
    let upstream = FakeUpstream::start();
    upstream.always(Reply::status(StatusCode::OK, body));

    let error = backend(&upstream)
        .locate(&[keyed("cat1", "k")])
        .await
        .expect_err("decode failure");

    assert!(matches!(error, TrackerBackendError::Decode { .. }));
    upstream.stop().await;
}

#[rstest]
#[actix_web::test]
async fn error_status_is_reported_without_the_key() {
    let upstream = FakeUpstream::start();
    upstream.always(Reply::status(
        StatusCode::INTERNAL_SERVER_ERROR,
        "{\"error\":\"bad key\"}",
    ));

    let error = backend(&upstream)
        .locate(&[keyed("cat1", "very-secret")])
        .await
        .expect_err("status failure");

    assert_eq!(error, TrackerBackendError::status(500_u16));
    assert!(!error.to_string().contains("very-secret"));
    upstream.stop().await;
}

#[rstest]
#[actix_web::test]
async fn probe_reports_reachability() {
    let upstream = FakeUpstream::start();
    let adapter = backend(&upstream);
    adapter.probe().await.expect("probe succeeds");

    upstream.stop().await;
    let error = adapter.probe().await.expect_err("server stopped");
    assert!(matches!(
        error,
        TrackerBackendError::Transport { .. } | TrackerBackendError::Timeout { .. }
    ));
}
