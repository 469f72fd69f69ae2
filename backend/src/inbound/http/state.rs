//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` so they depend only on domain
//! services and stay testable without I/O.

use std::sync::Arc;

use campus_data::CampusRoster;

use crate::domain::{BackendHealthService, PositionBoard, TrackerProxyService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Validates and forwards proxy requests.
    pub tracker_proxy: TrackerProxyService,
    /// Produces upstream health reports.
    pub backend_health: BackendHealthService,
    /// Merged cat positions and feed state.
    pub board: Arc<PositionBoard>,
    /// Static roster used for profile details and buildings.
    pub roster: Arc<CampusRoster>,
}

impl HttpState {
    /// Bundle the handler dependencies.
    pub const fn new(
        tracker_proxy: TrackerProxyService,
        backend_health: BackendHealthService,
        board: Arc<PositionBoard>,
        roster: Arc<CampusRoster>,
    ) -> Self {
        Self {
            tracker_proxy,
            backend_health,
            board,
            roster,
        }
    }
}
