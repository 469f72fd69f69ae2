//! End-to-end checks for the tracker client over a real HTTP endpoint.

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use chrono::{TimeZone, Utc};
use rocktags::domain::ports::NoOpTrackerFetchMetrics;
use rocktags::domain::{
    LocationCache, RetryPolicy, TrackerClient, TrackerClientConfig, TrackerClientPorts,
    TrackerRequest,
};
use rocktags::outbound::tracker::TrackerHttpSource;
use rocktags::test_support::clock::MutableClock;
use rocktags::test_support::sleep::RecordingSleeper;
use rstest::rstest;
use serde_json::json;

mod support;

use support::{FakeUpstream, Reply};

struct Harness {
    client: TrackerClient,
    clock: Arc<MutableClock>,
    sleeper: Arc<RecordingSleeper>,
}

fn harness(upstream: &FakeUpstream) -> Harness {
    let start = Utc
        .with_ymd_and_hms(2025, 9, 18, 16, 0, 0)
        .single()
        .expect("valid start");
    let clock = Arc::new(MutableClock::new(start));
    let sleeper = Arc::new(RecordingSleeper::default());
    let source = TrackerHttpSource::new(upstream.url()).expect("http client");
    let client = TrackerClient::with_sleeper(
        TrackerClientPorts::new(Arc::new(source), Arc::new(NoOpTrackerFetchMetrics)),
        Arc::new(LocationCache::new(clock.clone(), Duration::from_secs(30))),
        sleeper.clone(),
        TrackerClientConfig {
            attempt_timeout: Duration::from_secs(5),
            retry: RetryPolicy {
                max_retries: 2,
                base_delay: Duration::from_millis(100),
            },
        },
    );
    Harness {
        client,
        clock,
        sleeper,
    }
}

fn requests() -> Vec<TrackerRequest> {
    vec![TrackerRequest::new("cat1"), TrackerRequest::new("cat2")]
}

#[rstest]
#[actix_web::test]
async fn out_of_bounds_fixes_are_dropped_and_the_rest_cached() {
    let upstream = FakeUpstream::start();
    upstream.always(Reply::json(&json!({
        "cat1": {"latitude": 32.7315, "longitude": -97.11, "timestamp": "2025-09-18T15:59:00Z", "status": 0},
        "cat2": {"latitude": 40.0, "longitude": -97.11, "timestamp": "2025-09-18T15:59:00Z", "status": 0}
    })));
    let h = harness(&upstream);

    let first = h.client.fetch_locations(&requests()).await;
    assert_eq!(first.keys().collect::<Vec<_>>(), vec!["cat1"]);

    let second = h.client.fetch_locations(&requests()).await;
    assert_eq!(second, first);
    assert_eq!(upstream.received().len(), 1, "second call served from cache");
    assert_eq!(
        upstream.received().first(),
        Some(&json!({"trackers": [{"name": "cat1"}, {"name": "cat2"}]}))
    );

    h.clock.advance_seconds(31);
    let _ = h.client.fetch_locations(&requests()).await;
    assert_eq!(upstream.received().len(), 2, "expired entry refetched");

    upstream.stop().await;
}

#[rstest]
#[actix_web::test]
async fn persistent_server_errors_exhaust_retries_and_yield_empty() {
    let upstream = FakeUpstream::start();
    upstream.always(Reply::status(StatusCode::INTERNAL_SERVER_ERROR, "boom"));
    let h = harness(&upstream);

    let response = h.client.fetch_locations(&requests()).await;

    assert!(response.is_empty());
    assert_eq!(upstream.received().len(), 3);
    assert_eq!(
        h.sleeper.recorded(),
        vec![Duration::from_millis(100), Duration::from_millis(200)]
    );
    upstream.stop().await;
}

#[rstest]
#[actix_web::test]
async fn a_transient_failure_recovers_on_retry() {
    let upstream = FakeUpstream::start();
    upstream.push(Reply::status(StatusCode::BAD_GATEWAY, "upstream down"));
    upstream.always(Reply::json(&json!({
        "cat1": {"latitude": 32.73, "longitude": -97.112, "timestamp": "2025-09-18T15:59:30Z", "status": 0}
    })));
    let h = harness(&upstream);

    let response = h.client.fetch_locations(&requests()).await;

    assert!(response.contains_key("cat1"));
    assert_eq!(upstream.received().len(), 2);
    assert_eq!(h.sleeper.recorded(), vec![Duration::from_millis(100)]);
    upstream.stop().await;
}

#[rstest]
#[actix_web::test]
async fn unreachable_endpoint_yields_empty() {
    let upstream = FakeUpstream::start();
    let h = harness(&upstream);
    upstream.stop().await;

    let response = h.client.fetch_locations(&requests()).await;

    assert!(response.is_empty());
    assert_eq!(h.sleeper.recorded().len(), 2);
}
