//! Component definition, operator definition and integration handlers.
//!
//! The catalog is read-only, so these handlers query it directly.

use crate::api::error::ApiError;
use crate::api::request::Query;
use crate::api::response;
use crate::api::state::AppState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::Response;
use pipewright_core::filter::Filter;
use pipewright_core::model::{ComponentDefinition, Integration};
use pipewright_core::pagination::{paginate_by_number, paginate_by_token};
use serde_json::json;

type HandlerResult = Result<Response<Full<Bytes>>, ApiError>;

/// GET /v1beta/component-definitions
///
/// Page-number pagination over every component.
pub fn list_component_definitions(state: &AppState, query: &Query) -> HandlerResult {
    let list = query.list_query()?;
    let filter = Filter::parse_for::<ComponentDefinition>(list.filter.as_deref())?;
    let page = paginate_by_number(filter.apply(state.catalog.definitions()), &list.page, &state.limits)?
        .map(|d| d.to_component_resource(list.view));
    Ok(response::numbered_page("componentDefinitions", &page, &list.page, &state.limits))
}

/// GET /v1beta/component-definitions/{id}
pub fn get_component_definition(state: &AppState, id: &str, query: &Query) -> HandlerResult {
    let definition = state.catalog.definition(id)?;
    Ok(response::ok(&json!({
        "componentDefinition": definition.to_component_resource(query.view()?)
    })))
}

/// GET /v1beta/operator-definitions
pub fn list_operator_definitions(state: &AppState, query: &Query) -> HandlerResult {
    let list = query.list_query()?;
    let filter = Filter::parse_for::<ComponentDefinition>(list.filter.as_deref())?;
    let page = paginate_by_token(filter.apply(state.catalog.operators()), &list.page, &state.limits, |d| {
        d.id.clone()
    })?
        .map(|d| d.to_operator_resource(list.view));
    Ok(response::token_page("operatorDefinitions", &page))
}

/// GET /v1beta/operator-definitions/{id}
pub fn get_operator_definition(state: &AppState, id: &str, query: &Query) -> HandlerResult {
    let definition = state.catalog.operator(id)?;
    Ok(response::ok(&json!({
        "operatorDefinition": definition.to_operator_resource(query.view()?)
    })))
}

/// GET /v1beta/integrations
pub fn list_integrations(state: &AppState, query: &Query) -> HandlerResult {
    let list = query.list_query()?;
    let filter = Filter::parse_for::<Integration>(list.filter.as_deref())?;
    let page = paginate_by_token(filter.apply(state.catalog.integrations()), &list.page, &state.limits, |i| {
        i.id.clone()
    })?
        .map(|i| i.to_resource(list.view));
    Ok(response::token_page("integrations", &page))
}

/// GET /v1beta/integrations/{id}
pub fn get_integration(state: &AppState, id: &str, query: &Query) -> HandlerResult {
    let integration = state.catalog.integration(id)?;
    Ok(response::ok(&json!({
        "integration": integration.to_resource(query.view()?)
    })))
}
