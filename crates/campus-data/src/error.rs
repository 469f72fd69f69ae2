//! Error types for the campus-data crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating a campus roster.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    /// The roster file could not be read.
    #[error("failed to read roster file at '{path}': {message}")]
    IoError {
        /// Path to the roster file.
        path: PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The roster JSON is malformed or missing required fields.
    #[error("invalid roster JSON: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
    },

    /// The roster version is not supported.
    #[error("unsupported roster version: expected {expected}, found {actual}")]
    UnsupportedVersion {
        /// Expected version number.
        expected: u32,
        /// Actual version found in the roster.
        actual: u32,
    },

    /// The roster lists no cats.
    #[error("roster contains no cats")]
    EmptyCats,

    /// A cat or building name is blank.
    #[error("{kind} at index {index} has a blank name")]
    BlankName {
        /// Record kind (`cat` or `building`).
        kind: &'static str,
        /// Index of the offending record.
        index: usize,
    },

    /// Two cats share a name.
    #[error("cat '{name}' is listed more than once")]
    DuplicateCat {
        /// The repeated cat name.
        name: String,
    },

    /// A record carries non-finite or out-of-range coordinates.
    #[error("'{name}' has invalid coordinates ({lat}, {lng})")]
    InvalidCoordinates {
        /// Name of the offending record.
        name: String,
        /// Latitude as parsed.
        lat: String,
        /// Longitude as parsed.
        lng: String,
    },

    /// A cat's tracker name would be rejected by the tracker proxy.
    #[error("cat '{cat}' has invalid tracker name '{tracker}'")]
    InvalidTrackerName {
        /// Cat owning the tracker.
        cat: String,
        /// The rejected tracker name.
        tracker: String,
    },

    /// Two cats claim the same tracker.
    #[error("tracker '{tracker}' is assigned to more than one cat")]
    DuplicateTracker {
        /// The shared tracker name.
        tracker: String,
    },
}
