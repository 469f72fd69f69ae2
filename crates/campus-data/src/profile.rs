//! Roster record types.

use serde::Serialize;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
}

impl Coordinates {
    /// Creates a coordinate pair.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns `true` when both components are finite and within the WGS84
    /// ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// A campus cat with its static home position.
///
/// Cats with a `tracker` name may receive live positions from the tracker
/// feed; the rest always appear at their static position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatProfile {
    /// Stable numeric identifier.
    pub id: u32,
    /// Display name, unique within the roster.
    pub name: String,
    /// Tracker name used when asking the tracker proxy for a live position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracker: Option<String>,
    /// Static fallback position.
    #[serde(flatten)]
    pub home: Coordinates,
    /// Coat description.
    pub color: String,
    /// One-word temperament.
    pub personality: String,
    /// What the cat is usually up to.
    pub activity: String,
    /// Approximate age in years.
    pub age: u8,
    /// Friendliness on a 1 to 5 scale.
    pub friendliness: u8,
    /// Favourite spot on campus.
    pub fav_spot: String,
    /// Short biography.
    pub bio: String,
    /// Reported sightings so far.
    pub sightings: u32,
    /// Best time of day to spot the cat.
    pub best_time: String,
}

/// A campus landmark drawn on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Building {
    /// Full building name.
    pub name: String,
    /// Short label shown on the map.
    pub abbr: String,
    /// Building position.
    #[serde(flatten)]
    pub position: Coordinates,
    /// Label priority; lower values are drawn at wider zoom levels.
    pub priority: u8,
}
