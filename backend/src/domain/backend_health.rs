//! Health report for the upstream locator backend.
//!
//! The probe is bounded by a timeout. Latency is measured with the injected
//! clock so tests can control it.

use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;
use serde::{Deserialize, Serialize};
use tokio::time;
use tracing::warn;
use utoipa::ToSchema;

use super::ports::{TrackerBackend, TrackerBackendError};

/// Default deadline for one backend probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Overall service status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// The backend answered.
    Healthy,
    /// The backend is unreachable.
    Degraded,
}

/// Reachability of the locator backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BackendStatus {
    /// The probe got a response.
    Up,
    /// The probe failed.
    Down,
}

/// Build profile the server was compiled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Debug build.
    Development,
    /// Release build.
    Production,
}

impl BuildMode {
    /// Mode of the running binary.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(debug_assertions) {
            Self::Development
        } else {
            Self::Production
        }
    }
}

/// Deployment facts reported alongside health.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthEnvironment {
    /// Whether any tracker key is configured.
    pub has_tracker_key: bool,
    /// Build profile.
    pub build_mode: BuildMode,
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// Overall status.
    pub status: HealthStatus,
    /// Backend reachability.
    pub backend: BackendStatus,
    /// Time spent building the report, e.g. `"12ms"`.
    #[schema(example = "12ms")]
    pub api_latency: String,
    /// Probe round-trip time, or `"timeout"` when no response arrived.
    #[schema(example = "9ms")]
    pub backend_latency: String,
    /// RFC 3339 time the report was produced.
    pub timestamp: String,
    /// Deployment facts.
    pub environment: HealthEnvironment,
}

impl HealthReport {
    /// Whether the report should be served with a success status.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

fn format_millis(elapsed: chrono::TimeDelta) -> String {
    format!("{}ms", elapsed.num_milliseconds().max(0))
}

/// Produces [`HealthReport`]s by probing the backend.
#[derive(Clone)]
pub struct BackendHealthService {
    backend: Arc<dyn TrackerBackend>,
    clock: Arc<dyn Clock>,
    probe_timeout: Duration,
    has_tracker_key: bool,
}

impl BackendHealthService {
    /// Build the service with [`DEFAULT_PROBE_TIMEOUT`].
    pub fn new(backend: Arc<dyn TrackerBackend>, clock: Arc<dyn Clock>, has_tracker_key: bool) -> Self {
        Self {
            backend,
            clock,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            has_tracker_key,
        }
    }

    /// Override the probe deadline.
    #[must_use]
    pub const fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }

    /// Probe the backend and assemble a report.
    ///
    /// A response with any status counts as a latency sample but only a
    /// successful probe marks the backend up.
    pub async fn report(&self) -> HealthReport {
        let started = self.clock.utc();
        let outcome = time::timeout(self.probe_timeout, self.backend.probe()).await;
        let probed = self.clock.utc();

        let (backend, backend_latency) = match outcome {
            Ok(Ok(())) => (BackendStatus::Up, format_millis(probed - started)),
            Ok(Err(error @ TrackerBackendError::Status { .. })) => {
                warn!(%error, "locator backend probe answered with failure status");
                (BackendStatus::Down, format_millis(probed - started))
            }
            Ok(Err(error)) => {
                warn!(%error, "locator backend probe failed");
                (BackendStatus::Down, "timeout".to_owned())
            }
            Err(_) => {
                warn!(timeout = ?self.probe_timeout, "locator backend probe timed out");
                (BackendStatus::Down, "timeout".to_owned())
            }
        };

        let status = match backend {
            BackendStatus::Up => HealthStatus::Healthy,
            BackendStatus::Down => HealthStatus::Degraded,
        };
        let finished = self.clock.utc();
        HealthReport {
            status,
            backend,
            api_latency: format_millis(finished - started),
            backend_latency,
            timestamp: finished.to_rfc3339(),
            environment: HealthEnvironment {
                has_tracker_key: self.has_tracker_key,
                build_mode: BuildMode::current(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockTrackerBackend;
    use crate::test_support::clock::MutableClock;
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};

    #[fixture]
    fn clock() -> Arc<MutableClock> {
        let start = Utc
            .with_ymd_and_hms(2025, 9, 18, 16, 0, 0)
            .single()
            .expect("valid start time");
        Arc::new(MutableClock::new(start))
    }

    fn backend_advancing(
        clock: &Arc<MutableClock>,
        by: Duration,
        result: Result<(), TrackerBackendError>,
    ) -> MockTrackerBackend {
        let probe_clock = Arc::clone(clock);
        let mut backend = MockTrackerBackend::new();
        backend.expect_probe().times(1).return_once(move || {
            probe_clock.advance(by);
            result
        });
        backend
    }

    #[rstest]
    #[tokio::test]
    async fn reachable_backend_is_healthy(clock: Arc<MutableClock>) {
        let backend = backend_advancing(&clock, Duration::from_millis(42), Ok(()));
        let service = BackendHealthService::new(Arc::new(backend), clock, true);

        let report = service.report().await;

        assert!(report.is_healthy());
        assert_eq!(report.backend, BackendStatus::Up);
        assert_eq!(report.backend_latency, "42ms");
        assert_eq!(report.api_latency, "42ms");
        assert!(report.environment.has_tracker_key);
        assert_eq!(report.timestamp, "2025-09-18T16:00:00.042+00:00");
    }

    #[rstest]
    #[tokio::test]
    async fn failure_status_reports_latency_but_degrades(clock: Arc<MutableClock>) {
        let backend = backend_advancing(
            &clock,
            Duration::from_millis(7),
            Err(TrackerBackendError::status(503_u16)),
        );
        let service = BackendHealthService::new(Arc::new(backend), clock, false);

        let report = service.report().await;

        assert!(!report.is_healthy());
        assert_eq!(report.status, HealthStatus::Degraded);
        assert_eq!(report.backend, BackendStatus::Down);
        assert_eq!(report.backend_latency, "7ms");
    }

    #[rstest]
    #[case::transport(TrackerBackendError::transport("connection refused"))]
    #[case::timeout(TrackerBackendError::timeout("deadline elapsed"))]
    #[tokio::test]
    async fn unreachable_backend_reports_timeout(
        clock: Arc<MutableClock>,
        #[case] failure: TrackerBackendError,
    ) {
        let backend = backend_advancing(&clock, Duration::ZERO, Err(failure));
        let service = BackendHealthService::new(Arc::new(backend), clock, true);

        let report = service.report().await;

        assert_eq!(report.backend, BackendStatus::Down);
        assert_eq!(report.backend_latency, "timeout");
    }

    struct HangingBackend;

    #[async_trait::async_trait]
    impl TrackerBackend for HangingBackend {
        async fn locate(
            &self,
            _trackers: &[crate::domain::ports::KeyedTracker],
        ) -> Result<crate::domain::ports::UpstreamLocations, TrackerBackendError> {
            std::future::pending().await
        }

        async fn probe(&self) -> Result<(), TrackerBackendError> {
            std::future::pending().await
        }
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn probe_is_bounded_by_the_timeout(clock: Arc<MutableClock>) {
        let service = BackendHealthService::new(Arc::new(HangingBackend), clock, true)
            .with_probe_timeout(Duration::from_millis(50));

        let report = service.report().await;

        assert_eq!(report.status, HealthStatus::Degraded);
        assert_eq!(report.backend_latency, "timeout");
    }

    #[rstest]
    fn report_serialises_in_camel_case(clock: Arc<MutableClock>) {
        let report = HealthReport {
            status: HealthStatus::Healthy,
            backend: BackendStatus::Up,
            api_latency: "1ms".to_owned(),
            backend_latency: "1ms".to_owned(),
            timestamp: clock.utc().to_rfc3339(),
            environment: HealthEnvironment {
                has_tracker_key: false,
                build_mode: BuildMode::Production,
            },
        };
        let value = serde_json::to_value(&report).expect("serialise report");
        assert_eq!(
            value,
            serde_json::json!({
                "status": "healthy",
                "backend": "up",
                "apiLatency": "1ms",
                "backendLatency": "1ms",
                "timestamp": "2025-09-18T16:00:00+00:00",
                "environment": { "hasTrackerKey": false, "buildMode": "production" }
            })
        );
    }
}
