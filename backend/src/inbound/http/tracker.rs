//! Tracker proxy endpoint.
//!
//! ```text
//! POST /api/tracker {"trackers":[{"name":"cat1"}]}
//! ```

use std::collections::BTreeMap;

use actix_web::{HttpResponse, post, web};
use tracing::warn;

use super::cache_control::no_store_header;
use super::state::HttpState;
use crate::domain::ports::UpstreamLocations;
use crate::domain::{Error, TrackerLocation, TrackerProxyRequest};
use crate::inbound::http::ApiResult;

/// Locate trackers through the upstream backend.
///
/// Keys are attached server-side. Unknown trackers, unparseable bodies and
/// upstream failures answer `{}` so clients fall back to static positions.
/// Only a well-formed batch that breaks the batch rules gets a `400`.
#[utoipa::path(
    post,
    path = "/api/tracker",
    request_body = TrackerProxyRequest,
    responses(
        (status = 200, description = "Latest fixes keyed by tracker name; `{}` when none", body = BTreeMap<String, TrackerLocation>),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["tracker"],
    operation_id = "locateTrackers"
)]
#[post("/api/tracker")]
pub async fn locate_trackers(
    state: web::Data<HttpState>,
    payload: Result<web::Json<TrackerProxyRequest>, actix_web::Error>,
) -> ApiResult<HttpResponse> {
    let locations = match payload {
        Ok(request) => state.tracker_proxy.locate(&request.into_inner()).await?,
        Err(error) => {
            warn!(%error, "unparseable tracker batch; answering empty object");
            UpstreamLocations::new()
        }
    };
    Ok(HttpResponse::Ok()
        .insert_header(no_store_header())
        .json(locations))
}
