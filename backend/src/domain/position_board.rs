//! Displayed cat positions and the feed status shown next to the map.
//!
//! The board starts from the roster's static positions. Each refresh merges
//! fresh fixes by tracker name; a cat whose tracker is absent from the
//! response keeps whatever position it had.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use campus_data::CampusRoster;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use serde::Serialize;
use utoipa::ToSchema;

use super::{TrackerRequest, TrackerResponse};

/// Age after which the last refresh is reported as stale.
pub const STALE_AFTER: TimeDelta = TimeDelta::seconds(30);

/// Current displayed position for one cat.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatPosition {
    /// Roster identifier.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Tracker name, when the cat wears one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracker: Option<String>,
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
    /// Whether the position came from a live tracker fix.
    pub is_real_time: bool,
    /// Timestamp of the live fix, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// Feed health label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FeedStatus {
    /// No refresh has completed yet.
    Offline,
    /// A refresh is in flight.
    Updating,
    /// The last refresh completed at most 30 seconds ago.
    Live,
    /// The last refresh completed more than 30 seconds ago.
    Stale,
}

impl FeedStatus {
    /// Classify the feed from the refresh state.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeDelta, Utc};
    /// use rocktags::domain::FeedStatus;
    ///
    /// let now = Utc::now();
    /// assert_eq!(FeedStatus::classify(false, None, now), FeedStatus::Offline);
    /// assert_eq!(FeedStatus::classify(true, None, now), FeedStatus::Updating);
    /// assert_eq!(
    ///     FeedStatus::classify(false, Some(now - TimeDelta::seconds(31)), now),
    ///     FeedStatus::Stale
    /// );
    /// ```
    #[must_use]
    pub fn classify(updating: bool, last_update: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        if updating {
            return Self::Updating;
        }
        match last_update {
            None => Self::Offline,
            Some(at) if now - at > STALE_AFTER => Self::Stale,
            Some(_) => Self::Live,
        }
    }
}

/// Feed summary rendered alongside the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    /// Current feed label.
    pub status: FeedStatus,
    /// Completion time of the last refresh.
    pub last_update: Option<DateTime<Utc>>,
    /// Human-friendly age of the last refresh.
    #[schema(example = "12s ago")]
    pub last_update_ago: String,
}

/// Render the age of `last_update` as `Ns ago`, `Nm ago`, `Nh ago` or
/// `Never`, rounding to the nearest unit.
///
/// # Examples
/// ```
/// use chrono::{TimeDelta, Utc};
/// use rocktags::domain::format_time_ago;
///
/// let now = Utc::now();
/// assert_eq!(format_time_ago(None, now), "Never");
/// assert_eq!(format_time_ago(Some(now - TimeDelta::seconds(42)), now), "42s ago");
/// assert_eq!(format_time_ago(Some(now - TimeDelta::minutes(5)), now), "5m ago");
/// assert_eq!(format_time_ago(Some(now - TimeDelta::hours(3)), now), "3h ago");
/// ```
#[must_use]
pub fn format_time_ago(last_update: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    const SECOND_MS: i64 = 1_000;
    const MINUTE_MS: i64 = 60 * SECOND_MS;
    const HOUR_MS: i64 = 60 * MINUTE_MS;

    let Some(at) = last_update else {
        return "Never".to_owned();
    };
    let elapsed_ms = (now - at).num_milliseconds().max(0);
    let rounded = |unit: i64| elapsed_ms.saturating_add(unit.div_euclid(2)).div_euclid(unit);

    if elapsed_ms < MINUTE_MS {
        format!("{}s ago", rounded(SECOND_MS))
    } else if elapsed_ms < HOUR_MS {
        format!("{}m ago", rounded(MINUTE_MS))
    } else {
        format!("{}h ago", rounded(HOUR_MS))
    }
}

/// Point-in-time copy of the board.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BoardSnapshot {
    /// Every roster cat in roster order.
    pub cats: Vec<CatPosition>,
    /// Feed summary.
    pub feed: FeedSnapshot,
}

#[derive(Debug)]
struct BoardState {
    positions: Vec<CatPosition>,
    last_refresh: Option<DateTime<Utc>>,
    updating: bool,
}

/// Shared, mutex-guarded set of displayed positions.
pub struct PositionBoard {
    clock: Arc<dyn Clock>,
    state: Mutex<BoardState>,
}

impl PositionBoard {
    /// Seed the board with every roster cat at its static position.
    pub fn from_roster(roster: &CampusRoster, clock: Arc<dyn Clock>) -> Self {
        let positions = roster
            .cats()
            .iter()
            .map(|cat| CatPosition {
                id: cat.id,
                name: cat.name.clone(),
                tracker: cat.tracker.clone(),
                lat: cat.home.lat,
                lng: cat.home.lng,
                is_real_time: false,
                last_updated: None,
            })
            .collect();
        Self {
            clock,
            state: Mutex::new(BoardState {
                positions,
                last_refresh: None,
                updating: false,
            }),
        }
    }

    /// Tracker requests for every cat that wears a tracker.
    pub fn tracker_requests(&self) -> Vec<TrackerRequest> {
        self.lock_state()
            .positions
            .iter()
            .filter_map(|position| position.tracker.as_deref().map(TrackerRequest::new))
            .collect()
    }

    /// Flag that a refresh is in flight.
    pub fn begin_refresh(&self) {
        self.lock_state().updating = true;
    }

    /// Merge a tracker response and mark the refresh complete.
    ///
    /// Returns how many cats received a fresh position.
    pub fn apply(&self, response: &TrackerResponse) -> usize {
        let now = self.clock.utc();
        let mut state = self.lock_state();
        let mut updated = 0_usize;
        for position in &mut state.positions {
            let Some(fix) = position
                .tracker
                .as_deref()
                .and_then(|tracker| response.get(tracker))
            else {
                continue;
            };
            position.lat = fix.latitude;
            position.lng = fix.longitude;
            position.is_real_time = true;
            position.last_updated = Some(fix.timestamp.clone());
            updated = updated.saturating_add(1);
        }
        state.last_refresh = Some(now);
        state.updating = false;
        updated
    }

    /// Position of one cat by display name.
    pub fn position(&self, name: &str) -> Option<CatPosition> {
        self.lock_state()
            .positions
            .iter()
            .find(|position| position.name == name)
            .cloned()
    }

    /// Copy of all positions plus the feed summary.
    pub fn snapshot(&self) -> BoardSnapshot {
        let now = self.clock.utc();
        let state = self.lock_state();
        BoardSnapshot {
            cats: state.positions.clone(),
            feed: FeedSnapshot {
                status: FeedStatus::classify(state.updating, state.last_refresh, now),
                last_update: state.last_refresh,
                last_update_ago: format_time_ago(state.last_refresh, now),
            },
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
