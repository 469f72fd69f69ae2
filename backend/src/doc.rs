//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint and the schemas they reference.
//! The document backs Swagger UI in debug builds and is exported by the
//! `openapi-dump` binary.

use utoipa::OpenApi;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rocktags API",
        description = "Campus cat tracker: live map feed, tracker proxy and health probes.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::map::map_feed,
        crate::inbound::http::tracker::locate_trackers,
        crate::inbound::http::health::backend_health,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        crate::domain::Error,
        crate::domain::ErrorCode,
        crate::domain::TrackerRequest,
        crate::domain::TrackerLocation,
        crate::domain::TrackerProxyRequest,
        crate::domain::ValidationIssue,
        crate::domain::HealthReport,
        crate::domain::FeedSnapshot,
        crate::domain::FeedStatus,
        crate::inbound::http::map::MapResponse,
    )),
    tags(
        (name = "map", description = "Cat positions for the campus map"),
        (name = "tracker", description = "Keyed proxy to the locator backend"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
