//! Prometheus adapter for tracker fetch metrics.
//!
//! Metrics are registered with a provided registry and served from
//! `/metrics` by the server.
//!
//! # Metric Specification
//!
//! - `rocktags_tracker_fetches_total` (counter): labels `outcome`
//!   (`cache_hit`, `success`, `failure`) and `kind` (failure kind or `none`).
//! - `rocktags_tracker_fetch_attempts_total` (counter): upstream attempts made
//!   by completed fetches.
//! - `rocktags_tracker_fixes_dropped_total` (counter): fixes discarded for
//!   falling outside the campus geofence.

use async_trait::async_trait;
use prometheus::{CounterVec, IntCounter, Opts, Registry};

use crate::domain::ports::{
    TrackerFetchFailure, TrackerFetchMetrics, TrackerFetchMetricsError, TrackerFetchSuccess,
};

const NO_KIND: &str = "none";

/// Prometheus-backed tracker fetch recorder.
pub struct PrometheusTrackerFetchMetrics {
    fetches_total: CounterVec,
    attempts_total: IntCounter,
    dropped_total: IntCounter,
}

impl PrometheusTrackerFetchMetrics {
    /// Create and register metrics with the given registry.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric cannot be registered, for example when
    /// one with the same name already exists in the registry.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let fetches_total = CounterVec::new(
            Opts::new(
                "rocktags_tracker_fetches_total",
                "Tracker lookups by outcome",
            ),
            &["outcome", "kind"],
        )?;
        let attempts_total = IntCounter::new(
            "rocktags_tracker_fetch_attempts_total",
            "Upstream attempts made by tracker lookups",
        )?;
        let dropped_total = IntCounter::new(
            "rocktags_tracker_fixes_dropped_total",
            "Tracker fixes dropped outside the campus geofence",
        )?;
        registry.register(Box::new(fetches_total.clone()))?;
        registry.register(Box::new(attempts_total.clone()))?;
        registry.register(Box::new(dropped_total.clone()))?;
        Ok(Self {
            fetches_total,
            attempts_total,
            dropped_total,
        })
    }

    fn record(&self, outcome: &str, kind: &str) {
        self.fetches_total.with_label_values(&[outcome, kind]).inc();
    }
}

#[async_trait]
impl TrackerFetchMetrics for PrometheusTrackerFetchMetrics {
    async fn record_cache_hit(&self) -> Result<(), TrackerFetchMetricsError> {
        self.record("cache_hit", NO_KIND);
        Ok(())
    }

    async fn record_success(
        &self,
        payload: &TrackerFetchSuccess,
    ) -> Result<(), TrackerFetchMetricsError> {
        self.record("success", NO_KIND);
        self.attempts_total.inc_by(u64::from(payload.attempt_count));
        self.dropped_total
            .inc_by(u64::try_from(payload.out_of_bounds).unwrap_or(u64::MAX));
        Ok(())
    }

    async fn record_failure(
        &self,
        payload: &TrackerFetchFailure,
    ) -> Result<(), TrackerFetchMetricsError> {
        self.record("failure", payload.kind.as_label());
        self.attempts_total.inc_by(u64::from(payload.attempt_count));
        Ok(())
    }
}
