//! Domain types and services for the campus cat tracker.
//!
//! Purpose: fetch tracker fixes reliably, keep them inside the campus
//! geofence, merge them into the roster's static positions and proxy keyed
//! requests to the locator backend. Adapters live in `inbound` and
//! `outbound`; this module depends only on its ports.
//!
//! Public surface:
//! - `TrackerClient`: cached, retried and geofenced fixes.
//! - `PositionBoard` and `RefreshLoop`: the merged map feed.
//! - `TrackerProxyService`: validation and key injection for the proxy.
//! - `BackendHealthService`: upstream health reporting.
//! - `Error` and `ErrorCode`: the API error envelope.

pub mod backend_health;
pub mod error;
pub mod geofence;
pub mod location_cache;
pub mod ports;
pub mod position_board;
pub mod refresh_loop;
pub mod retry;
pub mod trace_id;
pub mod tracker;
pub mod tracker_client;
pub mod tracker_proxy;

pub use self::backend_health::{
    BackendHealthService, BackendStatus, BuildMode, DEFAULT_PROBE_TIMEOUT, HealthEnvironment,
    HealthReport, HealthStatus,
};
pub use self::error::{Error, ErrorCode};
pub use self::geofence::{CAMPUS_GEOFENCE, Geofence, is_within_bounds};
pub use self::location_cache::{DEFAULT_CACHE_TTL, LocationCache, LocationCacheKey};
pub use self::position_board::{
    BoardSnapshot, CatPosition, FeedSnapshot, FeedStatus, PositionBoard, STALE_AFTER,
    format_time_ago,
};
pub use self::refresh_loop::{DEFAULT_REFRESH_INTERVAL, RefreshLoop, RefreshLoopHandle};
pub use self::retry::{Attempted, RetryPolicy, RetrySleeper, TokioSleeper};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::tracker::{
    TRACKER_NAME_MAX, TrackerLocation, TrackerNameError, TrackerRequest, TrackerResponse,
    validate_tracker_name,
};
pub use self::tracker_client::{
    DEFAULT_ATTEMPT_TIMEOUT, TrackerClient, TrackerClientConfig, TrackerClientPorts,
};
pub use self::tracker_proxy::{
    KeyringParseError, MAX_TRACKERS_PER_REQUEST, TrackerKey, TrackerKeyring,
    TrackerProxyRequest, TrackerProxyService, ValidationIssue, batch_issues, validate_batch,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use rocktags::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::not_found("no such cat"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
