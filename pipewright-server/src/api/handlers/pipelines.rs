//! Pipeline management handlers.

use crate::api::error::ApiError;
use crate::api::request::{self, Query};
use crate::api::response;
use crate::api::state::AppState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response};
use pipewright_core::auth::AuthContext;
use pipewright_core::Namespace;
use serde_json::json;

type HandlerResult = Result<Response<Full<Bytes>>, ApiError>;

/// POST /v1beta/{ns}/pipelines
pub async fn create(req: Request<Incoming>, state: &AppState, ns: &Namespace) -> HandlerResult {
    let body = request::read_body_json(req).await?;
    let pipeline = state.pipelines.create(ns, &body)?;
    Ok(response::created(&json!({ "pipeline": pipeline })))
}

/// GET /v1beta/{ns}/pipelines
pub fn list(state: &AppState, ns: &Namespace, query: &Query) -> HandlerResult {
    let page = state.pipelines.list(Some(ns), &query.list_query()?)?;
    Ok(response::token_page("pipelines", &page))
}

/// GET /v1beta/admin/pipelines
///
/// Every namespace's pipelines.
pub fn list_admin(state: &AppState, query: &Query) -> HandlerResult {
    let page = state.pipelines.list(None, &query.list_query()?)?;
    Ok(response::token_page("pipelines", &page))
}

/// GET /v1beta/{ns}/pipelines/{id}
pub fn get(state: &AppState, ns: &Namespace, id: &str, query: &Query) -> HandlerResult {
    let pipeline = state.pipelines.get(ns, id, query.view()?)?;
    Ok(response::ok(&json!({ "pipeline": pipeline })))
}

/// PATCH /v1beta/{ns}/pipelines/{id}
pub async fn update(
    req: Request<Incoming>,
    state: &AppState,
    ns: &Namespace,
    id: &str,
    query: &Query,
) -> HandlerResult {
    let body = request::read_body_json(req).await?;
    let pipeline = state
        .pipelines
        .update(ns, id, &body, query.update_mask())?;
    Ok(response::ok(&json!({ "pipeline": pipeline })))
}

/// DELETE /v1beta/{ns}/pipelines/{id}
pub fn delete(state: &AppState, ns: &Namespace, id: &str) -> HandlerResult {
    state.pipelines.delete(ns, id)?;
    Ok(response::no_content())
}

/// POST /v1beta/{ns}/pipelines/{id}/validate
///
/// Always 200; problems are listed in the body.
pub fn validate(state: &AppState, ns: &Namespace, id: &str) -> HandlerResult {
    let report = state.pipelines.validate(ns, id)?;
    let errors: Vec<_> = report
        .issues
        .iter()
        .map(|issue| {
            json!({
                "location": issue.location,
                "message": issue.error.user_message(),
            })
        })
        .collect();
    Ok(response::ok(&json!({
        "success": errors.is_empty(),
        "errors": errors,
    })))
}

/// POST /v1beta/{ns}/pipelines/{id}/rename
pub async fn rename(
    req: Request<Incoming>,
    state: &AppState,
    ns: &Namespace,
    id: &str,
) -> HandlerResult {
    let body = request::read_body_json(req).await?;
    let pipeline = state.pipelines.rename(ns, id, &body)?;
    Ok(response::ok(&json!({ "pipeline": pipeline })))
}

/// GET /v1beta/pipelines/{uid}/lookUp, GET /v1beta/admin/pipelines/{uid}/lookUp
pub fn lookup(state: &AppState, uid: &str, query: &Query, auth: &AuthContext) -> HandlerResult {
    let pipeline = state.pipelines.lookup(uid, query.view()?, auth)?;
    Ok(response::ok(&json!({ "pipeline": pipeline })))
}
