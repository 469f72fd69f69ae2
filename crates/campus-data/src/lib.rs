//! Bundled campus roster of tracked cats and landmark buildings.
//!
//! The roster supplies the static positions the map falls back to whenever
//! the live tracker feed has nothing fresh for a cat. It is independent of
//! backend domain types so the backend can convert records at the point of
//! use.
//!
//! # Example
//!
//! ```
//! use campus_data::CampusRoster;
//!
//! let roster = CampusRoster::bundled().expect("bundled roster is valid");
//! let microwave = roster.find_cat("Microwave").expect("Microwave is on campus");
//!
//! assert_eq!(microwave.tracker.as_deref(), Some("cat1"));
//! assert!(!roster.buildings().is_empty());
//! ```

mod error;
mod profile;
mod roster;
mod validation;

pub use error::RosterError;
pub use profile::{Building, CatProfile, Coordinates};
pub use roster::CampusRoster;
pub use validation::{TRACKER_NAME_MAX, is_valid_tracker_name};
