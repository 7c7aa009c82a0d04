//! Request routing for the API.
//!
//! Paths are matched on their segments after the `/v1beta` prefix. A path
//! that names a known resource with an unsupported method gets 405 with an
//! `Allow` header; anything else unknown gets 404.

use super::error::ApiError;
use super::handlers;
use super::request::Query;
use super::response;
use super::state::AppState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Method, Request, Response};
use pipewright_core::auth::{AuthContext, AuthMiddleware, AuthScope, HeaderAccess};
use pipewright_core::{Namespace, NamespaceKind, Result};
use std::convert::Infallible;
use std::sync::Arc;

/// Route prefix for all API endpoints.
pub const API_PREFIX: &str = "/v1beta";

/// Hyper header adapter for auth middleware.
struct HyperHeaders<'a>(&'a hyper::HeaderMap);

impl<'a> HeaderAccess for HyperHeaders<'a> {
    fn get_header(&self, name: &str) -> Option<String> {
        self.0
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    }
}

/// Sub-resources of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PipelineAction {
    Validate,
    Rename,
    Trigger,
    TriggerAsync,
    Runs,
}

impl PipelineAction {
    fn parse(segment: &str) -> Option<Self> {
        match segment {
            "validate" => Some(Self::Validate),
            "rename" => Some(Self::Rename),
            "trigger" => Some(Self::Trigger),
            "triggerAsync" => Some(Self::TriggerAsync),
            "runs" => Some(Self::Runs),
            _ => None,
        }
    }
}

/// A matched resource path.
#[derive(Debug, Clone, PartialEq)]
enum Route {
    Health,
    Pipelines(Namespace),
    Pipeline(Namespace, String),
    PipelineAction(Namespace, String, PipelineAction),
    LookUp(String),
    ComponentRuns(String),
    Operation(String),
    AdminPipelines,
    AdminLookUp(String),
    ComponentDefinitions,
    ComponentDefinition(String),
    OperatorDefinitions,
    OperatorDefinition(String),
    Integrations,
    Integration(String),
    Connections(Namespace),
    Connection(Namespace, String),
    ReferencedPipelines(Namespace, String),
}

impl Route {
    /// Match path segments; `Ok(None)` means no such route.
    fn parse(segments: &[&str], state: &AppState) -> Result<Option<Self>> {
        let namespace = |collection: &str, id: &str| -> Result<Namespace> {
            let ns = Namespace::from_segments(collection, id)?;
            if collection == "namespaces" && state.auth_config.is_organization(id) {
                Ok(ns.with_kind(NamespaceKind::Organization))
            } else {
                Ok(ns)
            }
        };
        let is_namespace = |s: &str| matches!(s, "users" | "organizations" | "namespaces");

        let route = match *segments {
            ["health", "pipeline"] | ["ready", "pipeline"] => Self::Health,
            ["pipelines", uid, "lookUp"] => Self::LookUp(uid.to_string()),
            ["pipeline-runs", uid, "component-runs"] => Self::ComponentRuns(uid.to_string()),
            ["operations", id] => Self::Operation(id.to_string()),
            ["admin", "pipelines"] => Self::AdminPipelines,
            ["admin", "pipelines", uid, "lookUp"] => Self::AdminLookUp(uid.to_string()),
            ["component-definitions"] => Self::ComponentDefinitions,
            ["component-definitions", id] => Self::ComponentDefinition(id.to_string()),
            ["operator-definitions"] => Self::OperatorDefinitions,
            ["operator-definitions", id] => Self::OperatorDefinition(id.to_string()),
            ["integrations"] => Self::Integrations,
            ["integrations", id] => Self::Integration(id.to_string()),
            ["namespaces", ns, "connections"] => Self::Connections(namespace("namespaces", ns)?),
            ["namespaces", ns, "connections", id] => {
                Self::Connection(namespace("namespaces", ns)?, id.to_string())
            }
            ["namespaces", ns, "connections", id, "referenced-pipelines"] => {
                Self::ReferencedPipelines(namespace("namespaces", ns)?, id.to_string())
            }
            [collection, ns, "pipelines"] if is_namespace(collection) => {
                Self::Pipelines(namespace(collection, ns)?)
            }
            [collection, ns, "pipelines", id] if is_namespace(collection) => {
                let ns = namespace(collection, ns)?;
                // `{id}:trigger` is accepted as well as `{id}/trigger`.
                match id.split_once(':') {
                    Some((id, action)) => match PipelineAction::parse(action) {
                        Some(action) => Self::PipelineAction(ns, id.to_string(), action),
                        None => return Ok(None),
                    },
                    None => Self::Pipeline(ns, id.to_string()),
                }
            }
            [collection, ns, "pipelines", id, action] if is_namespace(collection) => {
                match PipelineAction::parse(action) {
                    Some(action) => {
                        Self::PipelineAction(namespace(collection, ns)?, id.to_string(), action)
                    }
                    None => return Ok(None),
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(route))
    }

    fn allowed_methods(&self) -> &'static [&'static str] {
        match self {
            Self::Pipelines(_) | Self::Connections(_) => &["GET", "POST"],
            Self::Pipeline(..) | Self::Connection(..) => &["GET", "PATCH", "DELETE"],
            Self::PipelineAction(_, _, PipelineAction::Runs) => &["GET"],
            Self::PipelineAction(..) => &["POST"],
            _ => &["GET"],
        }
    }
}

/// Route an incoming request to the appropriate handler.
pub async fn route(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    let path = req.uri().path().to_string();
    let method = req.method().clone();

    tracing::debug!(method = %method, path = %path, "Routing request");

    let response = match dispatch(req, state, &method, &path).await {
        Ok(response) => response,
        Err(e) => {
            if e.status.is_server_error() {
                tracing::error!(method = %method, path = %path, error = %e, "Request failed");
            } else {
                tracing::debug!(method = %method, path = %path, error = %e, "Request rejected");
            }
            e.into_response()
        }
    };
    Ok(response)
}

async fn dispatch(
    req: Request<Incoming>,
    state: Arc<AppState>,
    method: &Method,
    path: &str,
) -> std::result::Result<Response<Full<Bytes>>, ApiError> {
    let auth = AuthMiddleware::authenticate(&state.auth_config, path, &HyperHeaders(req.headers()))?;

    let Some(rest) = path.strip_prefix(API_PREFIX) else {
        return Ok(response::not_found(path));
    };
    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
    let Some(route) = Route::parse(&segments, &state)? else {
        return Ok(response::not_found(path));
    };
    if !route.allowed_methods().contains(&method.as_str()) {
        return Ok(response::method_not_allowed(route.allowed_methods()));
    }

    let query = Query::parse(req.uri().query());
    match route {
        Route::Health => Ok(handlers::health::health(&state)),

        Route::Pipelines(ns) => {
            authorize(&auth, &ns, pipeline_scope(method))?;
            if method == Method::POST {
                handlers::pipelines::create(req, &state, &ns).await
            } else {
                handlers::pipelines::list(&state, &ns, &query)
            }
        }
        Route::Pipeline(ns, id) => {
            authorize(&auth, &ns, pipeline_scope(method))?;
            match *method {
                Method::GET => handlers::pipelines::get(&state, &ns, &id, &query),
                Method::PATCH => handlers::pipelines::update(req, &state, &ns, &id, &query).await,
                _ => handlers::pipelines::delete(&state, &ns, &id),
            }
        }
        Route::PipelineAction(ns, id, action) => match action {
            PipelineAction::Validate => {
                authorize(&auth, &ns, AuthScope::PipelineRead)?;
                handlers::pipelines::validate(&state, &ns, &id)
            }
            PipelineAction::Rename => {
                authorize(&auth, &ns, AuthScope::PipelineWrite)?;
                handlers::pipelines::rename(req, &state, &ns, &id).await
            }
            PipelineAction::Trigger => {
                authorize(&auth, &ns, AuthScope::PipelineTrigger)?;
                handlers::triggers::trigger(req, &state, &ns, &id, &auth).await
            }
            PipelineAction::TriggerAsync => {
                authorize(&auth, &ns, AuthScope::PipelineTrigger)?;
                handlers::triggers::trigger_async(req, &state, &ns, &id, &auth).await
            }
            PipelineAction::Runs => {
                authorize(&auth, &ns, AuthScope::PipelineRead)?;
                handlers::runs::list_pipeline_runs(&state, &ns, &id, &query)
            }
        },
        Route::LookUp(uid) => {
            auth.require_scope(AuthScope::PipelineRead)?;
            handlers::pipelines::lookup(&state, &uid, &query, &auth)
        }
        Route::ComponentRuns(uid) => {
            auth.require_scope(AuthScope::PipelineRead)?;
            handlers::runs::list_component_runs(&state, &uid, &query, &auth)
        }
        Route::Operation(id) => {
            auth.require_scope(AuthScope::PipelineRead)?;
            handlers::triggers::get_operation(&state, &id, &auth)
        }

        Route::AdminPipelines => {
            auth.require_scope(AuthScope::Admin)?;
            handlers::pipelines::list_admin(&state, &query)
        }
        Route::AdminLookUp(uid) => {
            auth.require_scope(AuthScope::Admin)?;
            handlers::pipelines::lookup(&state, &uid, &query, &auth)
        }

        Route::ComponentDefinitions => handlers::catalog::list_component_definitions(&state, &query),
        Route::ComponentDefinition(id) => {
            handlers::catalog::get_component_definition(&state, &id, &query)
        }
        Route::OperatorDefinitions => handlers::catalog::list_operator_definitions(&state, &query),
        Route::OperatorDefinition(id) => {
            handlers::catalog::get_operator_definition(&state, &id, &query)
        }
        Route::Integrations => handlers::catalog::list_integrations(&state, &query),
        Route::Integration(id) => handlers::catalog::get_integration(&state, &id, &query),

        Route::Connections(ns) => {
            authorize(&auth, &ns, connection_scope(method))?;
            if method == Method::POST {
                handlers::connections::create(req, &state, &ns).await
            } else {
                handlers::connections::list(&state, &ns, &query)
            }
        }
        Route::Connection(ns, id) => {
            authorize(&auth, &ns, connection_scope(method))?;
            match *method {
                Method::GET => handlers::connections::get(&state, &ns, &id, &query),
                Method::PATCH => {
                    handlers::connections::update(req, &state, &ns, &id, &query).await
                }
                _ => handlers::connections::delete(&state, &ns, &id),
            }
        }
        Route::ReferencedPipelines(ns, id) => {
            authorize(&auth, &ns, AuthScope::ConnectionRead)?;
            handlers::connections::referenced_pipelines(&state, &ns, &id, &query)
        }
    }
}

fn pipeline_scope(method: &Method) -> AuthScope {
    if method == Method::GET {
        AuthScope::PipelineRead
    } else {
        AuthScope::PipelineWrite
    }
}

fn connection_scope(method: &Method) -> AuthScope {
    if method == Method::GET {
        AuthScope::ConnectionRead
    } else {
        AuthScope::ConnectionWrite
    }
}

/// Check the scope, then access to the namespace.
fn authorize(
    auth: &AuthContext,
    namespace: &Namespace,
    scope: AuthScope,
) -> std::result::Result<(), ApiError> {
    auth.require_scope(scope)?;
    auth.require_access(namespace)?;
    Ok(())
}
