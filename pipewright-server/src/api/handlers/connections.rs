//! Namespace connection handlers.

use crate::api::error::ApiError;
use crate::api::request::{self, Query};
use crate::api::response;
use crate::api::state::AppState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response};
use pipewright_core::Namespace;
use serde_json::json;

type HandlerResult = Result<Response<Full<Bytes>>, ApiError>;

/// POST /v1beta/namespaces/{ns}/connections
pub async fn create(req: Request<Incoming>, state: &AppState, ns: &Namespace) -> HandlerResult {
    let body = request::read_body_json(req).await?;
    let connection = state.connections.create(ns, &body)?;
    Ok(response::created(&json!({ "connection": connection })))
}

/// GET /v1beta/namespaces/{ns}/connections
pub fn list(state: &AppState, ns: &Namespace, query: &Query) -> HandlerResult {
    let page = state.connections.list(ns, &query.list_query()?)?;
    Ok(response::token_page("connections", &page))
}

/// GET /v1beta/namespaces/{ns}/connections/{id}
pub fn get(state: &AppState, ns: &Namespace, id: &str, query: &Query) -> HandlerResult {
    let connection = state.connections.get(ns, id, query.view()?)?;
    Ok(response::ok(&json!({ "connection": connection })))
}

/// PATCH /v1beta/namespaces/{ns}/connections/{id}
pub async fn update(
    req: Request<Incoming>,
    state: &AppState,
    ns: &Namespace,
    id: &str,
    query: &Query,
) -> HandlerResult {
    let body = request::read_body_json(req).await?;
    let connection = state
        .connections
        .update(ns, id, &body, query.update_mask())?;
    Ok(response::ok(&json!({ "connection": connection })))
}

/// DELETE /v1beta/namespaces/{ns}/connections/{id}
pub fn delete(state: &AppState, ns: &Namespace, id: &str) -> HandlerResult {
    state.connections.delete(ns, id)?;
    Ok(response::no_content())
}

/// GET /v1beta/namespaces/{ns}/connections/{id}/referenced-pipelines
pub fn referenced_pipelines(
    state: &AppState,
    ns: &Namespace,
    id: &str,
    query: &Query,
) -> HandlerResult {
    let page = state
        .connections
        .referenced_pipelines(ns, id, &query.list_query()?)?;
    Ok(response::token_page("pipelineIds", &page))
}
