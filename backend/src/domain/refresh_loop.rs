//! Periodic refresh of the position board.
//!
//! The loop fetches once on start and then on every tick. It stops when the
//! handle is stopped or dropped; an in-flight refresh is abandoned at that
//! point rather than awaited.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

use super::{PositionBoard, TrackerClient};

/// Default refresh cadence.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Scheduled refresh task feeding a [`PositionBoard`].
pub struct RefreshLoop {
    client: Arc<TrackerClient>,
    board: Arc<PositionBoard>,
    interval: Duration,
}

/// Running refresh task. Dropping the handle cancels the task.
pub struct RefreshLoopHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl RefreshLoop {
    /// Configure a loop; nothing runs until [`RefreshLoop::start`].
    pub fn new(client: Arc<TrackerClient>, board: Arc<PositionBoard>, interval: Duration) -> Self {
        Self {
            client,
            board,
            interval,
        }
    }

    /// Spawn the loop on the current Tokio runtime.
    ///
    /// The first refresh runs immediately.
    #[must_use = "dropping the handle stops the refresh loop"]
    pub fn start(self) -> RefreshLoopHandle {
        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(self.run(shutdown_rx));
        RefreshLoopHandle { shutdown, task }
    }

    async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        let mut ticker = time::interval(self.interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX),
            "refresh loop started"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    tokio::select! {
                        _ = &mut shutdown => break,
                        () = self.refresh_once() => {}
                    }
                }
            }
        }

        info!("refresh loop stopped");
    }

    async fn refresh_once(&self) {
        self.board.begin_refresh();
        let requests = self.board.tracker_requests();
        let response = self.client.fetch_locations(&requests).await;
        let updated = self.board.apply(&response);
        debug!(
            requested = requests.len(),
            updated, "position board refreshed"
        );
    }
}

impl RefreshLoopHandle {
    /// Signal the loop to stop and wait for the task to finish.
    pub async fn stop(self) {
        let Self { shutdown, task } = self;
        let _ = shutdown.send(());
        if let Err(join_error) = task.await {
            error!(error = %join_error, "refresh loop task failed");
        }
    }

    /// Whether the task has already exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        NoOpTrackerFetchMetrics, TrackerLocationSource, TrackerLocationSourceError,
    };
    use crate::domain::{
        DEFAULT_CACHE_TTL, LocationCache, TrackerClientConfig, TrackerClientPorts, TrackerLocation,
        TrackerRequest, TrackerResponse,
    };
    use crate::test_support::clock::MutableClock;
    use async_trait::async_trait;
    use campus_data::CampusRoster;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TrackerLocationSource for CountingSource {
        async fn fetch(
            &self,
            _requests: &[TrackerRequest],
        ) -> Result<TrackerResponse, TrackerLocationSourceError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let latitude = if call == 0 { 32.7301 } else { 32.7302 };
            Ok(TrackerResponse::from([(
                "cat1".to_owned(),
                TrackerLocation {
                    latitude,
                    longitude: -97.1123,
                    timestamp: "2025-09-18T16:00:05Z".to_owned(),
                    status: 0,
                },
            )]))
        }
    }

    struct Fixture {
        clock: Arc<MutableClock>,
        source: Arc<CountingSource>,
        board: Arc<PositionBoard>,
        refresh: RefreshLoop,
    }

    fn fixture() -> Fixture {
        let start = Utc
            .with_ymd_and_hms(2025, 9, 18, 16, 0, 0)
            .single()
            .expect("valid start time");
        let clock = Arc::new(MutableClock::new(start));
        let source = Arc::new(CountingSource::default());
        let cache = Arc::new(LocationCache::new(clock.clone(), DEFAULT_CACHE_TTL));
        let client = Arc::new(TrackerClient::new(
            TrackerClientPorts::new(source.clone(), Arc::new(NoOpTrackerFetchMetrics)),
            cache,
            TrackerClientConfig::default(),
        ));
        let roster = CampusRoster::bundled().expect("bundled roster");
        let board = Arc::new(PositionBoard::from_roster(&roster, clock.clone()));
        let refresh = RefreshLoop::new(client, board.clone(), DEFAULT_REFRESH_INTERVAL);
        Fixture {
            clock,
            source,
            board,
            refresh,
        }
    }

    async fn tick(clock: &MutableClock, by: Duration) {
        clock.advance(by);
        time::advance(by).await;
        settle().await;
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn refreshes_immediately_and_on_every_tick() {
        let Fixture {
            clock,
            source,
            board,
            refresh,
        } = fixture();
        let handle = refresh.start();

        settle().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1, "first refresh on start");
        let first = board.position("Microwave").expect("Microwave present");
        assert!(first.is_real_time);
        assert_eq!(first.lat, 32.7301);

        tick(&clock, DEFAULT_REFRESH_INTERVAL).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            board.position("Microwave").map(|p| p.lat),
            Some(32.7302)
        );

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_further_refreshes() {
        let Fixture {
            clock,
            source,
            refresh,
            ..
        } = fixture();
        let handle = refresh.start();
        settle().await;
        assert!(!handle.is_finished(), "loop keeps running until stopped");

        handle.stop().await;
        tick(&clock, DEFAULT_REFRESH_INTERVAL * 3).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_cancels_the_task() {
        let Fixture {
            clock,
            source,
            refresh,
            ..
        } = fixture();
        let handle = refresh.start();
        settle().await;

        drop(handle);
        tick(&clock, DEFAULT_REFRESH_INTERVAL * 2).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
