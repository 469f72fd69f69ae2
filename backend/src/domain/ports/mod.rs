//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod tracker_backend;
mod tracker_fetch_metrics;
mod tracker_location_source;

#[cfg(test)]
pub use tracker_backend::MockTrackerBackend;
pub use tracker_backend::{
    FixtureTrackerBackend, KeyedTracker, TrackerBackend, TrackerBackendError, UpstreamLocations,
};
#[cfg(test)]
pub use tracker_fetch_metrics::MockTrackerFetchMetrics;
pub use tracker_fetch_metrics::{
    NoOpTrackerFetchMetrics, TrackerFetchFailure, TrackerFetchFailureKind, TrackerFetchMetrics,
    TrackerFetchMetricsError, TrackerFetchSuccess,
};
#[cfg(test)]
pub use tracker_location_source::MockTrackerLocationSource;
pub use tracker_location_source::{TrackerLocationSource, TrackerLocationSourceError};
