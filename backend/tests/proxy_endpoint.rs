//! `/api/tracker` and `/api/health` wired to a real locator backend adapter.

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use campus_data::CampusRoster;
use mockable::{Clock, DefaultClock};
use rocktags::Trace;
use rocktags::domain::ports::TrackerBackend;
use rocktags::domain::{BackendHealthService, PositionBoard, TrackerKeyring, TrackerProxyService};
use rocktags::inbound::http::health::backend_health;
use rocktags::inbound::http::json_error_handler;
use rocktags::inbound::http::state::HttpState;
use rocktags::inbound::http::tracker::locate_trackers;
use rocktags::outbound::tracker::FindMyBackend;
use rstest::rstest;
use serde_json::{Value, json};

mod support;

use support::{FakeUpstream, Reply};

fn state_for(upstream: &FakeUpstream, keys: &str) -> HttpState {
    let keyring = Arc::new(TrackerKeyring::parse(keys).expect("valid keyring"));
    let backend: Arc<dyn TrackerBackend> = Arc::new(
        FindMyBackend::new(upstream.url(), Duration::from_secs(5)).expect("http client"),
    );
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let roster = Arc::new(CampusRoster::bundled().expect("bundled roster"));
    HttpState::new(
        TrackerProxyService::new(Arc::clone(&keyring), Arc::clone(&backend)),
        BackendHealthService::new(backend, Arc::clone(&clock), !keyring.is_empty()),
        Arc::new(PositionBoard::from_roster(&roster, clock)),
        roster,
    )
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                .wrap(Trace)
                .service(locate_trackers)
                .service(backend_health),
        )
        .await
    };
}

#[rstest]
#[actix_web::test]
async fn keyed_trackers_are_forwarded_and_answered_verbatim() {
    let upstream = FakeUpstream::start();
    let fixes = json!({
        "cat1": {"latitude": 32.7315, "longitude": -97.11, "timestamp": "2025-09-18T16:00:00Z", "status": 0}
    });
    upstream.always(Reply::json(&fixes));
    let app = app!(state_for(&upstream, "cat1=secret-one;cat2=secret-two"));

    let req = test::TestRequest::post()
        .uri("/api/tracker")
        .set_json(json!({"trackers": [{"name": "cat1"}, {"name": "stray"}]}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()
            .get("cache-control")
            .and_then(|v| v.to_str().ok()),
        Some("no-store")
    );
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, fixes);
    assert_eq!(
        upstream.received(),
        vec![json!({"trackers": [{"name": "cat1", "privateKey": "secret-one"}]})]
    );
    upstream.stop().await;
}

#[rstest]
#[actix_web::test]
async fn upstream_failure_answers_empty_object() {
    let upstream = FakeUpstream::start();
    upstream.always(Reply::status(StatusCode::BAD_GATEWAY, "nope"));
    let app = app!(state_for(&upstream, "cat1=secret-one"));

    let req = test::TestRequest::post()
        .uri("/api/tracker")
        .set_json(json!({"trackers": [{"name": "cat1"}]}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!({}));
    upstream.stop().await;
}

#[rstest]
#[actix_web::test]
async fn invalid_batches_never_reach_upstream() {
    let upstream = FakeUpstream::start();
    let app = app!(state_for(&upstream, "cat1=secret-one"));

    let req = test::TestRequest::post()
        .uri("/api/tracker")
        .set_json(json!({"trackers": []}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body.pointer("/details/issues/0/message"),
        Some(&json!("At least one tracker required"))
    );
    assert!(upstream.received().is_empty());
    upstream.stop().await;
}

#[rstest]
#[actix_web::test]
async fn unparseable_bodies_answer_empty_object() {
    let upstream = FakeUpstream::start();
    let app = app!(state_for(&upstream, "cat1=secret-one"));

    let req = test::TestRequest::post()
        .uri("/api/tracker")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{\"trackers\": [")
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!({}));
    assert!(upstream.received().is_empty());
    upstream.stop().await;
}

#[rstest]
#[actix_web::test]
async fn health_follows_upstream_reachability() {
    let upstream = FakeUpstream::start();
    let app = app!(state_for(&upstream, "cat1=secret-one"));

    let res = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body.get("status"), Some(&json!("healthy")));
    assert_eq!(body.get("backend"), Some(&json!("up")));
    assert_eq!(body.pointer("/environment/hasTrackerKey"), Some(&json!(true)));

    upstream.stop().await;
    let res = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body.get("backend"), Some(&json!("down")));
    assert_eq!(body.get("backendLatency"), Some(&json!("timeout")));
}
