//! Map feed endpoint.
//!
//! ```text
//! GET /api/map
//! ```
//!
//! Joins the position board with roster profile details and buildings.

use actix_web::{HttpResponse, get, web};
use campus_data::{Building, CatProfile};
use serde::Serialize;
use utoipa::ToSchema;

use super::cache_control::no_store_header;
use super::state::HttpState;
use crate::domain::{CatPosition, FeedSnapshot};

/// One cat as rendered on the map.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MapCat {
    /// Roster identifier.
    pub id: u32,
    /// Display name.
    #[schema(example = "Microwave")]
    pub name: String,
    /// Tracker name, when the cat wears one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracker: Option<String>,
    /// Displayed latitude.
    pub lat: f64,
    /// Displayed longitude.
    pub lng: f64,
    /// Whether the position came from a live fix.
    pub is_real_time: bool,
    /// Timestamp of the live fix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    /// Coat description.
    pub color: String,
    /// Temperament.
    pub personality: String,
    /// Typical activity.
    pub activity: String,
    /// Age in years.
    pub age: u8,
    /// Friendliness score.
    pub friendliness: u8,
    /// Favourite hangout.
    pub fav_spot: String,
    /// Short biography.
    pub bio: String,
    /// Reported sightings.
    pub sightings: u32,
    /// Best time to visit.
    pub best_time: String,
}

impl MapCat {
    fn join(position: CatPosition, profile: Option<&CatProfile>) -> Self {
        let detail = |field: fn(&CatProfile) -> &str| {
            profile.map(field).map(str::to_owned).unwrap_or_default()
        };
        Self {
            color: detail(|p| p.color.as_str()),
            personality: detail(|p| p.personality.as_str()),
            activity: detail(|p| p.activity.as_str()),
            fav_spot: detail(|p| p.fav_spot.as_str()),
            bio: detail(|p| p.bio.as_str()),
            best_time: detail(|p| p.best_time.as_str()),
            age: profile.map_or(0, |p| p.age),
            friendliness: profile.map_or(0, |p| p.friendliness),
            sightings: profile.map_or(0, |p| p.sightings),
            id: position.id,
            name: position.name,
            tracker: position.tracker,
            lat: position.lat,
            lng: position.lng,
            is_real_time: position.is_real_time,
            last_updated: position.last_updated,
        }
    }
}

/// Campus landmark.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MapBuilding {
    /// Full name.
    pub name: String,
    /// Abbreviation shown on the map.
    pub abbr: String,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Label priority; lower draws first.
    pub priority: u8,
}

impl From<&Building> for MapBuilding {
    fn from(value: &Building) -> Self {
        Self {
            name: value.name.clone(),
            abbr: value.abbr.clone(),
            lat: value.position.lat,
            lng: value.position.lng,
            priority: value.priority,
        }
    }
}

/// Body of `GET /api/map`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MapResponse {
    /// Every roster cat with its current position.
    pub cats: Vec<MapCat>,
    /// Campus landmarks.
    pub buildings: Vec<MapBuilding>,
    /// Live feed status.
    pub feed: FeedSnapshot,
}

/// Current cat positions, buildings and feed status.
#[utoipa::path(
    get,
    path = "/api/map",
    responses(
        (
            status = 200,
            description = "Map feed",
            headers(("Cache-Control" = String, description = "Always no-store")),
            body = MapResponse
        )
    ),
    tags = ["map"],
    operation_id = "getMap"
)]
#[get("/api/map")]
pub async fn map_feed(state: web::Data<HttpState>) -> HttpResponse {
    let snapshot = state.board.snapshot();
    let cats = snapshot
        .cats
        .into_iter()
        .map(|position| {
            let profile = state.roster.find_cat(&position.name);
            MapCat::join(position, profile)
        })
        .collect();
    let buildings = state.roster.buildings().iter().map(MapBuilding::from).collect();
    HttpResponse::Ok()
        .insert_header(no_store_header())
        .json(MapResponse {
            cats,
            buildings,
            feed: snapshot.feed,
        })
}
