//! Trigger and operation handlers.

use crate::api::error::ApiError;
use crate::api::request;
use crate::api::response;
use crate::api::state::AppState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response};
use pipewright_core::auth::AuthContext;
use pipewright_core::Namespace;
use serde_json::json;

/// POST /v1beta/{ns}/pipelines/{id}/trigger
///
/// Returns 200 once the run is recorded, whatever its status.
pub async fn trigger(
    req: Request<Incoming>,
    state: &AppState,
    ns: &Namespace,
    id: &str,
    auth: &AuthContext,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let body = request::read_body_json(req).await?;
    let result = state
        .pipelines
        .trigger(ns, id, &body, &auth.identity)
        .await?;

    Ok(response::ok(&json!({
        "outputs": result.outputs,
        "metadata": {
            "pipelineRunUid": result.run_uid.to_string(),
            "status": result.status,
        }
    })))
}

/// POST /v1beta/{ns}/pipelines/{id}/triggerAsync
pub async fn trigger_async(
    req: Request<Incoming>,
    state: &AppState,
    ns: &Namespace,
    id: &str,
    auth: &AuthContext,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let body = request::read_body_json(req).await?;
    let operation = state
        .pipelines
        .trigger_async(ns, id, &body, &auth.identity)?;
    Ok(response::ok(&json!({ "operation": operation })))
}

/// GET /v1beta/operations/{id}
///
/// Readable by identities with access to the triggered pipeline's namespace.
pub fn get_operation(
    state: &AppState,
    id: &str,
    auth: &AuthContext,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let operation = state.pipelines.get_operation(id, auth)?;
    Ok(response::ok(&json!({ "operation": operation })))
}
