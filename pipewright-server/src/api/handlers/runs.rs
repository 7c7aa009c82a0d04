//! Run history handlers. Both lists use page-number pagination.

use crate::api::error::ApiError;
use crate::api::request::Query;
use crate::api::response;
use crate::api::state::AppState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::Response;
use pipewright_core::auth::AuthContext;
use pipewright_core::Namespace;

/// GET /v1beta/{ns}/pipelines/{id}/runs
pub fn list_pipeline_runs(
    state: &AppState,
    ns: &Namespace,
    id: &str,
    query: &Query,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let list = query.list_query()?;
    let page = state.pipelines.list_runs(ns, id, &list)?;
    Ok(response::numbered_page("pipelineRuns", &page, &list.page, &state.limits))
}

/// GET /v1beta/pipeline-runs/{uid}/component-runs
pub fn list_component_runs(
    state: &AppState,
    run_uid: &str,
    query: &Query,
    auth: &AuthContext,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let list = query.list_query()?;
    let page = state.pipelines.list_component_runs(run_uid, &list, auth)?;
    Ok(response::numbered_page("componentRuns", &page, &list.page, &state.limits))
}
