//! Service entry-point: loads settings and the tracker keyring, starts the
//! refresh loop and serves the HTTP API.

mod server;

use std::io;
use std::sync::Arc;

use actix_web::web;
#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetricsBuilder;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use rocktags::config::{RocktagsSettings, keyring_from_env};
use rocktags::domain::ports::TrackerFetchMetrics;
#[cfg(not(feature = "metrics"))]
use rocktags::domain::ports::NoOpTrackerFetchMetrics;
use rocktags::inbound::http::health::HealthState;
#[cfg(feature = "metrics")]
use rocktags::outbound::metrics::PrometheusTrackerFetchMetrics;

use server::{AppRuntime, ServerConfig, build_runtime, create_server};

#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = RocktagsSettings::load_from_iter(std::env::args_os())
        .map_err(|e| io::Error::other(format!("configuration: {e}")))?;
    let keyring =
        keyring_from_env(&DefaultEnv::new()).map_err(|e| io::Error::other(e.to_string()))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    #[cfg(feature = "metrics")]
    let (fetch_metrics, server_config) = {
        let prometheus = PrometheusMetricsBuilder::new("rocktags")
            .endpoint("/metrics")
            .build()
            .map_err(|e| io::Error::other(format!("prometheus: {e}")))?;
        let fetch_metrics: Arc<dyn TrackerFetchMetrics> = Arc::new(
            PrometheusTrackerFetchMetrics::new(&prometheus.registry)
                .map_err(|e| io::Error::other(format!("tracker metrics: {e}")))?,
        );
        (fetch_metrics, ServerConfig::new(bind_addr, prometheus))
    };
    #[cfg(not(feature = "metrics"))]
    let (fetch_metrics, server_config): (Arc<dyn TrackerFetchMetrics>, ServerConfig) = (
        Arc::new(NoOpTrackerFetchMetrics),
        ServerConfig::new(bind_addr),
    );

    let AppRuntime {
        http_state,
        refresh,
    } = build_runtime(&settings, keyring, fetch_metrics)?;
    let refresh_handle = refresh.start();

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), http_state, server_config)?;
    info!(%bind_addr, "rocktags listening");

    let result = server.await;
    health_state.mark_unhealthy();
    refresh_handle.stop().await;
    result
}
