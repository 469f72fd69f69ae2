//! One-shot tracker lookup through the same client the map refresh uses.
//!
//! Settings come from `ROCKTAGS_*` variables; flags override the endpoint
//! and timeout. With no names, every tracked cat in the roster is queried.

use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use reqwest::Url;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

use rocktags::config::RocktagsSettings;
use rocktags::domain::ports::NoOpTrackerFetchMetrics;
use rocktags::domain::{
    LocationCache, TrackerClient, TrackerClientPorts, TrackerRequest, validate_tracker_name,
};
use rocktags::outbound::tracker::TrackerHttpSource;

/// `locate` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(name = "locate", about = "Fetch the latest tracker fixes", version)]
struct CliArgs {
    /// Tracker names to look up.
    names: Vec<String>,
    /// Tracker endpoint, overriding `ROCKTAGS_TRACKER_ENDPOINT`.
    #[arg(long, value_name = "url")]
    endpoint: Option<Url>,
    /// Per-attempt deadline in milliseconds.
    #[arg(long = "timeout-ms", value_name = "ms")]
    timeout_ms: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init()
    {
        return Err(io::Error::other(e.to_string()));
    }

    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let settings = RocktagsSettings::load_from_iter([OsString::from("locate")])
        .map_err(|e| io::Error::other(format!("configuration: {e}")))?;
    let requests = requests_for(&args.names, &settings)?;

    let endpoint = match args.endpoint {
        Some(url) => url,
        None => settings
            .tracker_endpoint()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?,
    };
    let mut config = settings.tracker_client_config();
    if let Some(ms) = args.timeout_ms {
        config.attempt_timeout = Duration::from_millis(ms);
    }

    let source = TrackerHttpSource::new(endpoint).map_err(io::Error::other)?;
    debug!(endpoint = %source.endpoint(), trackers = requests.len(), "locating trackers");
    let client = TrackerClient::new(
        TrackerClientPorts::new(Arc::new(source), Arc::new(NoOpTrackerFetchMetrics)),
        Arc::new(LocationCache::new(Arc::new(DefaultClock), settings.cache_ttl())),
        config,
    );
    let fixes = client.fetch_locations(&requests).await;

    let json = serde_json::to_string_pretty(&fixes).map_err(io::Error::other)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{json}")
}

fn requests_for(names: &[String], settings: &RocktagsSettings) -> io::Result<Vec<TrackerRequest>> {
    if names.is_empty() {
        let roster = settings
            .roster()
            .map_err(|e| io::Error::other(e.to_string()))?;
        return Ok(roster
            .tracked_cats()
            .filter_map(|cat| cat.tracker.as_deref())
            .map(TrackerRequest::new)
            .collect());
    }
    names
        .iter()
        .map(|name| {
            validate_tracker_name(name)
                .map(|()| TrackerRequest::new(name.as_str()))
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("{name}: {e}")))
        })
        .collect()
}
