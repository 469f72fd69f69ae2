//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use campus_data::CampusRoster;
use chrono::{TimeZone, Utc};
use mockable::Clock;

use super::state::HttpState;
use crate::domain::ports::TrackerBackend;
use crate::domain::{BackendHealthService, PositionBoard, TrackerKeyring, TrackerProxyService};
use crate::test_support::clock::MutableClock;

/// Fixed clock at 2025-09-18T16:00:00Z.
pub fn fixed_clock() -> Arc<MutableClock> {
    let start = Utc
        .with_ymd_and_hms(2025, 9, 18, 16, 0, 0)
        .single()
        .expect("valid start time");
    Arc::new(MutableClock::new(start))
}

/// Keyring holding a key for the bundled roster's only tracker.
pub fn test_keyring() -> Arc<TrackerKeyring> {
    Arc::new(TrackerKeyring::parse("cat1=test-key").expect("valid keyring"))
}

/// Build handler state around `backend`, the bundled roster and a fixed
/// clock.
pub fn http_state_with_backend(backend: impl TrackerBackend + 'static) -> HttpState {
    http_state_with(Arc::new(backend), fixed_clock())
}

/// Build handler state around explicit collaborators.
pub fn http_state_with(backend: Arc<dyn TrackerBackend>, clock: Arc<MutableClock>) -> HttpState {
    let roster = Arc::new(CampusRoster::bundled().expect("bundled roster is valid"));
    let clock: Arc<dyn Clock> = clock;
    let keyring = test_keyring();
    let board = Arc::new(PositionBoard::from_roster(&roster, Arc::clone(&clock)));
    HttpState::new(
        TrackerProxyService::new(Arc::clone(&keyring), Arc::clone(&backend)),
        BackendHealthService::new(backend, clock, !keyring.is_empty()),
        board,
        roster,
    )
}
