//! Outbound adapters implementing domain ports for external services.
//!
//! - **tracker**: reqwest clients for the tracker endpoint and the locator
//!   backend
//! - **metrics**: Prometheus exporters (feature-gated)
//!
//! Adapters translate between domain types and wire formats. They contain no
//! business logic.

#[cfg(feature = "metrics")]
pub mod metrics;
pub mod tracker;
