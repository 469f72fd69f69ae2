//! In-memory cache of tracker responses keyed by the requested tracker set.
//!
//! Entries expire after a fixed TTL and are evicted lazily: a lookup that
//! finds a stale entry deletes it and reports a miss. The mutex is never held
//! across an `.await`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;

use super::{TrackerRequest, TrackerResponse};

/// Default time-to-live for cached responses.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(5_000);

/// Canonical cache key for a batch of tracker requests.
///
/// Names are sorted and joined with `,`, so the key does not depend on the
/// order the caller listed them in. Valid tracker names never contain `,`;
/// the tracker client drops invalid names before keying.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationCacheKey(String);

impl LocationCacheKey {
    /// Derive the key for a request batch.
    ///
    /// # Examples
    /// ```
    /// use rocktags::domain::{LocationCacheKey, TrackerRequest};
    ///
    /// let forward = LocationCacheKey::from_requests(&[
    ///     TrackerRequest::new("cat2"),
    ///     TrackerRequest::new("cat1"),
    /// ]);
    /// let reverse = LocationCacheKey::from_requests(&[
    ///     TrackerRequest::new("cat1"),
    ///     TrackerRequest::new("cat2"),
    /// ]);
    /// assert_eq!(forward, reverse);
    /// assert_eq!(forward.as_str(), "cat1,cat2");
    /// ```
    #[must_use]
    pub fn from_requests(requests: &[TrackerRequest]) -> Self {
        let mut names: Vec<&str> = requests.iter().map(|r| r.name.as_str()).collect();
        names.sort_unstable();
        Self(names.join(","))
    }

    /// Borrow the underlying key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for LocationCacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: TrackerResponse,
    stored_at: DateTime<Utc>,
}

/// TTL cache for tracker responses with an injected clock.
pub struct LocationCache {
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
    entries: Mutex<HashMap<LocationCacheKey, CacheEntry>>,
}

impl LocationCache {
    /// Build a cache with the given TTL.
    ///
    /// TTLs too large for [`TimeDelta`] saturate to the maximum.
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            clock,
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached response when it is no older than the TTL.
    ///
    /// A stale entry is removed before reporting the miss.
    pub fn get(&self, key: &LocationCacheKey) -> Option<TrackerResponse> {
        let now = self.clock.utc();
        let mut entries = self.lock_entries();
        let age = now - entries.get(key)?.stored_at;
        if age > self.ttl {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|entry| entry.data.clone())
    }

    /// Store `data` under `key`, replacing any previous entry.
    pub fn set(&self, key: LocationCacheKey, data: TrackerResponse) {
        let stored_at = self.clock.utc();
        self.lock_entries()
            .insert(key, CacheEntry { data, stored_at });
    }

    /// Number of entries currently held, stale or not.
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    /// Returns `true` when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<LocationCacheKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
