//! Outbound adapters for metrics exporting.
//!
//! Prometheus-backed implementations of domain metrics ports, compiled only
//! with the `metrics` feature.

mod prometheus_tracker_fetch;

pub use prometheus_tracker_fetch::PrometheusTrackerFetchMetrics;
