//! Builders wiring configuration, adapters and domain services together.

use std::io;
use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::info;

use rocktags::config::RocktagsSettings;
use rocktags::domain::ports::{TrackerBackend, TrackerFetchMetrics};
use rocktags::domain::{
    BackendHealthService, LocationCache, PositionBoard, RefreshLoop, TrackerClient,
    TrackerClientPorts, TrackerKeyring, TrackerProxyService,
};
use rocktags::inbound::http::state::HttpState;
use rocktags::outbound::tracker::{FindMyBackend, TrackerHttpSource};

/// Everything the server needs at runtime.
pub(crate) struct AppRuntime {
    pub(crate) http_state: HttpState,
    pub(crate) refresh: RefreshLoop,
}

fn other(context: &str, error: impl std::fmt::Display) -> io::Error {
    io::Error::other(format!("{context}: {error}"))
}

/// Build the HTTP state and the refresh loop feeding it.
///
/// # Errors
///
/// Returns [`io::Error`] when a setting is invalid, the roster fails to load
/// or an HTTP client cannot be constructed.
pub(crate) fn build_runtime(
    settings: &RocktagsSettings,
    keyring: TrackerKeyring,
    metrics: Arc<dyn TrackerFetchMetrics>,
) -> io::Result<AppRuntime> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let roster = Arc::new(settings.roster().map_err(|e| other("roster", e))?);
    info!(
        cats = roster.cats().len(),
        tracked = roster.tracked_cats().count(),
        buildings = roster.buildings().len(),
        "campus roster loaded"
    );

    let upstream_url = settings.upstream_url().map_err(|e| other("settings", e))?;
    let backend: Arc<dyn TrackerBackend> = Arc::new(
        FindMyBackend::new(upstream_url, settings.upstream_timeout())
            .map_err(|e| other("locator backend client", e))?,
    );
    let keyring = Arc::new(keyring);
    let tracker_proxy = TrackerProxyService::new(Arc::clone(&keyring), Arc::clone(&backend));
    let backend_health = BackendHealthService::new(backend, Arc::clone(&clock), !keyring.is_empty())
        .with_probe_timeout(settings.health_probe_timeout());

    let endpoint = settings.tracker_endpoint().map_err(|e| other("settings", e))?;
    let source = TrackerHttpSource::new(endpoint).map_err(|e| other("tracker client", e))?;
    let cache = Arc::new(LocationCache::new(Arc::clone(&clock), settings.cache_ttl()));
    let client = Arc::new(TrackerClient::new(
        TrackerClientPorts::new(Arc::new(source), metrics),
        cache,
        settings.tracker_client_config(),
    ));

    let board = Arc::new(PositionBoard::from_roster(&roster, clock));
    let refresh = RefreshLoop::new(client, Arc::clone(&board), settings.refresh_interval());

    Ok(AppRuntime {
        http_state: HttpState::new(tracker_proxy, backend_health, board, roster),
        refresh,
    })
}
