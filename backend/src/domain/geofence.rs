//! Campus geofence used to reject implausible tracker positions.
//!
//! Tracker hardware occasionally reports fixes far from campus (stale cell
//! tower lookups, relays in other cities). Anything outside the rectangle is
//! dropped before it can move a marker on the map.

use serde::Serialize;
use utoipa::ToSchema;

/// Inclusive latitude/longitude rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Geofence {
    /// Southern edge.
    pub min_lat: f64,
    /// Northern edge.
    pub max_lat: f64,
    /// Western edge.
    pub min_lng: f64,
    /// Eastern edge.
    pub max_lng: f64,
}

/// Bounds of the campus map.
pub const CAMPUS_GEOFENCE: Geofence = Geofence {
    min_lat: 32.725,
    max_lat: 32.738,
    min_lng: -97.118,
    max_lng: -97.105,
};

impl Geofence {
    /// Returns `true` when the coordinate lies inside the rectangle, edges
    /// included. NaN never matches.
    ///
    /// # Examples
    /// ```
    /// use rocktags::domain::CAMPUS_GEOFENCE;
    ///
    /// assert!(CAMPUS_GEOFENCE.contains(32.73, -97.11));
    /// assert!(CAMPUS_GEOFENCE.contains(32.725, -97.118));
    /// assert!(!CAMPUS_GEOFENCE.contains(40.71, -74.0));
    /// assert!(!CAMPUS_GEOFENCE.contains(f64::NAN, -97.11));
    /// ```
    #[must_use]
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lng..=self.max_lng).contains(&lng)
    }
}

/// Classifies a coordinate against [`CAMPUS_GEOFENCE`].
#[must_use]
pub fn is_within_bounds(lat: f64, lng: f64) -> bool {
    CAMPUS_GEOFENCE.contains(lat, lng)
}
