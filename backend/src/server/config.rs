//! HTTP server configuration object.

use std::net::SocketAddr;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

/// Settings consumed by [`super::create_server`].
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: PrometheusMetrics,
}

impl ServerConfig {
    /// Bind to `bind_addr`.
    #[cfg(not(feature = "metrics"))]
    #[must_use]
    pub const fn new(bind_addr: SocketAddr) -> Self {
        Self { bind_addr }
    }

    /// Bind to `bind_addr` and wrap every request in the Prometheus
    /// middleware, which also serves `/metrics`.
    #[cfg(feature = "metrics")]
    #[must_use]
    pub const fn new(bind_addr: SocketAddr, prometheus: PrometheusMetrics) -> Self {
        Self {
            bind_addr,
            prometheus,
        }
    }
}
