//! Tracker outbound adapters.
//!
//! `TrackerHttpSource` implements the `TrackerLocationSource` port against the
//! tracker endpoint; `FindMyBackend` implements the `TrackerBackend` port
//! against the upstream locator service.

mod dto;
mod findmy_backend;
mod http_source;
mod preview;

pub use findmy_backend::FindMyBackend;
pub use http_source::TrackerHttpSource;
