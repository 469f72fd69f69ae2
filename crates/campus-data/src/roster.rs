//! Campus roster loading and validation.
//!
//! The roster is loaded from JSON, validated once, and then exposed through
//! read-only accessors. A copy is compiled into the crate so the backend
//! starts without any file on disk.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::RosterError;
use crate::profile::{Building, CatProfile, Coordinates};
use crate::validation::is_valid_tracker_name;

/// Current supported roster version.
const SUPPORTED_VERSION: u32 = 1;

const BUNDLED_ROSTER: &str = include_str!("../data/campus.json");

/// Validated campus roster of cats and buildings.
#[derive(Debug, Clone, PartialEq)]
pub struct CampusRoster {
    version: u32,
    cats: Vec<CatProfile>,
    buildings: Vec<Building>,
}

impl CampusRoster {
    /// Parses the roster compiled into the crate.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError`] if the bundled data fails validation.
    pub fn bundled() -> Result<Self, RosterError> {
        Self::from_json(BUNDLED_ROSTER)
    }

    /// Parses a roster from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError`] if:
    /// - The JSON is malformed or missing fields
    /// - The version is unsupported
    /// - No cats are listed
    /// - A name is blank or a cat name repeats
    /// - Coordinates are non-finite or out of range
    /// - A tracker name is invalid or shared between cats
    pub fn from_json(json: &str) -> Result<Self, RosterError> {
        let raw: RawRoster = serde_json::from_str(json).map_err(|e| RosterError::ParseError {
            message: e.to_string(),
        })?;

        Self::from_raw(raw)
    }

    /// Loads a roster from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, RosterError> {
        let contents = fs::read_to_string(path).map_err(|e| RosterError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Self::from_json(&contents)
    }

    fn from_raw(raw: RawRoster) -> Result<Self, RosterError> {
        if raw.version != SUPPORTED_VERSION {
            return Err(RosterError::UnsupportedVersion {
                expected: SUPPORTED_VERSION,
                actual: raw.version,
            });
        }

        if raw.cats.is_empty() {
            return Err(RosterError::EmptyCats);
        }

        let mut names = HashSet::new();
        let mut trackers = HashSet::new();
        let cats = raw
            .cats
            .into_iter()
            .enumerate()
            .map(|(index, cat)| {
                let profile = cat.into_profile(index)?;
                if !names.insert(profile.name.clone()) {
                    return Err(RosterError::DuplicateCat { name: profile.name });
                }
                if let Some(tracker) = &profile.tracker {
                    check_tracker(&profile.name, tracker)?;
                    if !trackers.insert(tracker.clone()) {
                        return Err(RosterError::DuplicateTracker {
                            tracker: tracker.clone(),
                        });
                    }
                }
                Ok(profile)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let buildings = raw
            .buildings
            .into_iter()
            .enumerate()
            .map(|(index, building)| building.into_building(index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            version: raw.version,
            cats,
            buildings,
        })
    }

    /// Returns the roster version.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Returns every cat in roster order.
    #[must_use]
    pub fn cats(&self) -> &[CatProfile] {
        &self.cats
    }

    /// Returns every building in roster order.
    #[must_use]
    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    /// Finds a cat by display name.
    #[must_use]
    pub fn find_cat(&self, name: &str) -> Option<&CatProfile> {
        self.cats.iter().find(|cat| cat.name == name)
    }

    /// Returns the cats that carry a tracker.
    pub fn tracked_cats(&self) -> impl Iterator<Item = &CatProfile> {
        self.cats.iter().filter(|cat| cat.tracker.is_some())
    }
}

fn check_tracker(cat: &str, tracker: &str) -> Result<(), RosterError> {
    if is_valid_tracker_name(tracker) {
        Ok(())
    } else {
        Err(RosterError::InvalidTrackerName {
            cat: cat.to_owned(),
            tracker: tracker.to_owned(),
        })
    }
}

fn check_position(name: &str, lat: f64, lng: f64) -> Result<Coordinates, RosterError> {
    let position = Coordinates::new(lat, lng);
    if position.is_valid() {
        Ok(position)
    } else {
        Err(RosterError::InvalidCoordinates {
            name: name.to_owned(),
            lat: lat.to_string(),
            lng: lng.to_string(),
        })
    }
}

/// Raw JSON structure for deserialization.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRoster {
    version: u32,
    cats: Vec<RawCat>,
    #[serde(default)]
    buildings: Vec<RawBuilding>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCat {
    id: u32,
    name: String,
    #[serde(default)]
    tracker: Option<String>,
    lat: f64,
    lng: f64,
    color: String,
    personality: String,
    activity: String,
    age: u8,
    friendliness: u8,
    fav_spot: String,
    bio: String,
    #[serde(default)]
    sightings: u32,
    best_time: String,
}

impl RawCat {
    fn into_profile(self, index: usize) -> Result<CatProfile, RosterError> {
        if self.name.trim().is_empty() {
            return Err(RosterError::BlankName { kind: "cat", index });
        }
        let home = check_position(&self.name, self.lat, self.lng)?;
        Ok(CatProfile {
            id: self.id,
            name: self.name,
            tracker: self.tracker,
            home,
            color: self.color,
            personality: self.personality,
            activity: self.activity,
            age: self.age,
            friendliness: self.friendliness,
            fav_spot: self.fav_spot,
            bio: self.bio,
            sightings: self.sightings,
            best_time: self.best_time,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawBuilding {
    name: String,
    abbr: String,
    lat: f64,
    lng: f64,
    priority: u8,
}

impl RawBuilding {
    fn into_building(self, index: usize) -> Result<Building, RosterError> {
        if self.name.trim().is_empty() {
            return Err(RosterError::BlankName {
                kind: "building",
                index,
            });
        }
        let position = check_position(&self.name, self.lat, self.lng)?;
        Ok(Building {
            name: self.name,
            abbr: self.abbr,
            position,
            priority: self.priority,
        })
    }
}
