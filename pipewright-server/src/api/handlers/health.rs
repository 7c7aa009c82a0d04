//! Health and readiness handlers.

use crate::api::response;
use crate::api::state::AppState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::Response;

/// GET /v1beta/health/pipeline, GET /v1beta/ready/pipeline
///
/// Served without credentials.
pub fn health(state: &AppState) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "status": "SERVING_STATUS_SERVING",
        "uptimeSeconds": state.uptime_secs()
    });
    response::ok(&body)
}
