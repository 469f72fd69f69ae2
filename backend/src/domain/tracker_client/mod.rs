//! Tracker client: cached, retried, geofenced tracker lookups.
//!
//! `fetch_locations` never fails. A cache hit skips the network entirely; a
//! miss runs one logical request through the retry policy with a hard
//! per-attempt timeout, drops fixes outside the geofence and caches what is
//! left when anything is left. Exhausted retries collapse to an empty
//! response, with the discarded error logged and reported to the metrics port.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::ports::{
    TrackerFetchFailure, TrackerFetchFailureKind, TrackerFetchMetrics, TrackerFetchSuccess,
    TrackerLocationSource, TrackerLocationSourceError,
};
use crate::domain::{
    Attempted, CAMPUS_GEOFENCE, Geofence, LocationCache, LocationCacheKey, RetryPolicy,
    RetrySleeper, TokioSleeper, TrackerRequest, TrackerResponse, validate_tracker_name,
};

/// Default deadline for one attempt.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Tracker client tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerClientConfig {
    /// Deadline applied to each attempt separately.
    pub attempt_timeout: Duration,
    /// Retry budget and backoff.
    pub retry: RetryPolicy,
}

impl Default for TrackerClientConfig {
    fn default() -> Self {
        Self {
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

/// Port bundle required by the tracker client.
pub struct TrackerClientPorts {
    /// Outbound tracker endpoint adapter.
    pub source: Arc<dyn TrackerLocationSource>,
    /// Fetch outcome metrics adapter.
    pub metrics: Arc<dyn TrackerFetchMetrics>,
}

impl TrackerClientPorts {
    /// Build a port bundle.
    pub fn new(
        source: Arc<dyn TrackerLocationSource>,
        metrics: Arc<dyn TrackerFetchMetrics>,
    ) -> Self {
        Self { source, metrics }
    }
}

/// Client-side entry point for tracker fixes.
pub struct TrackerClient {
    source: Arc<dyn TrackerLocationSource>,
    metrics: Arc<dyn TrackerFetchMetrics>,
    cache: Arc<LocationCache>,
    sleeper: Arc<dyn RetrySleeper>,
    geofence: Geofence,
    config: TrackerClientConfig,
}

impl TrackerClient {
    /// Build a client that sleeps on the Tokio timer between attempts.
    pub fn new(
        ports: TrackerClientPorts,
        cache: Arc<LocationCache>,
        config: TrackerClientConfig,
    ) -> Self {
        Self::with_sleeper(ports, cache, Arc::new(TokioSleeper), config)
    }

    /// Build a client with an injected backoff sleeper.
    pub fn with_sleeper(
        ports: TrackerClientPorts,
        cache: Arc<LocationCache>,
        sleeper: Arc<dyn RetrySleeper>,
        config: TrackerClientConfig,
    ) -> Self {
        Self {
            source: ports.source,
            metrics: ports.metrics,
            cache,
            sleeper,
            geofence: CAMPUS_GEOFENCE,
            config,
        }
    }

    /// Return the latest in-bounds fixes for `requests`.
    ///
    /// Names that fail [`validate_tracker_name`] are skipped, so the cache
    /// key delimiter can never appear inside a name. A batch with no valid
    /// names answers `{}` without touching the cache or network. Any failure
    /// also answers `{}`; callers keep their last known positions.
    ///
    /// ```rust,ignore
    /// let response = client.fetch_locations(&[TrackerRequest::new("cat1")]).await;
    /// for (name, fix) in &response {
    ///     println!("{name}: {}, {}", fix.latitude, fix.longitude);
    /// }
    /// ```
    pub async fn fetch_locations(&self, requests: &[TrackerRequest]) -> TrackerResponse {
        let valid: Vec<TrackerRequest> = requests
            .iter()
            .filter(|request| match validate_tracker_name(&request.name) {
                Ok(()) => true,
                Err(error) => {
                    debug!(tracker = %request.name, %error, "skipping invalid tracker name");
                    false
                }
            })
            .cloned()
            .collect();
        if valid.is_empty() {
            return TrackerResponse::new();
        }
        let requests = valid.as_slice();

        let key = LocationCacheKey::from_requests(requests);
        if let Some(cached) = self.cache.get(&key) {
            debug!(key = %key, entries = cached.len(), "tracker cache hit");
            let _ = self.metrics.record_cache_hit().await;
            return cached;
        }

        match self
            .config
            .retry
            .run(self.sleeper.as_ref(), |_| self.fetch_once(requests))
            .await
        {
            Ok(Attempted { value, attempts }) => self.accept(key, value, attempts).await,
            Err(Attempted {
                value: error,
                attempts,
            }) => {
                warn!(
                    key = %key,
                    attempts,
                    %error,
                    "tracker fetch failed; serving empty response"
                );
                let payload = TrackerFetchFailure {
                    attempt_count: attempts,
                    kind: TrackerFetchFailureKind::from(&error),
                };
                let _ = self.metrics.record_failure(&payload).await;
                TrackerResponse::new()
            }
        }
    }

    async fn fetch_once(
        &self,
        requests: &[TrackerRequest],
    ) -> Result<TrackerResponse, TrackerLocationSourceError> {
        let deadline = self.config.attempt_timeout;
        tokio::time::timeout(deadline, self.source.fetch(requests))
            .await
            .unwrap_or_else(|_| {
                Err(TrackerLocationSourceError::timeout(format!(
                    "no response within {} ms",
                    deadline.as_millis()
                )))
            })
    }

    async fn accept(
        &self,
        key: LocationCacheKey,
        response: TrackerResponse,
        attempts: u32,
    ) -> TrackerResponse {
        let (accepted, rejected): (TrackerResponse, TrackerResponse) = response
            .into_iter()
            .partition(|(_, fix)| self.geofence.contains(fix.latitude, fix.longitude));

        for (name, fix) in &rejected {
            debug!(
                tracker = %name,
                latitude = fix.latitude,
                longitude = fix.longitude,
                "dropping fix outside campus geofence"
            );
        }

        if !accepted.is_empty() {
            self.cache.set(key, accepted.clone());
        }

        let payload = TrackerFetchSuccess {
            attempt_count: attempts,
            accepted: accepted.len(),
            out_of_bounds: rejected.len(),
        };
        let _ = self.metrics.record_success(&payload).await;
        accepted
    }
}
