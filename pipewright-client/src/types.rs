//! Type definitions for the Pipewright client.
//!
//! Re-exports resource types from pipewright-core and defines the list and
//! trigger response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// Re-export core types
pub use pipewright_core::model::{
    ComponentRunResource, ConnectionResource, DefinitionResource, IntegrationResource, Operation,
    OperationError, PipelineResource, PipelineRunResource, PipelineState,
};
pub use pipewright_core::{RunStatus, View};

/// Service health.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    /// `SERVING_STATUS_SERVING` when up.
    pub status: String,
    /// Seconds since the server started.
    #[serde(default)]
    pub uptime_seconds: u64,
}

/// One page of pipelines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineList {
    /// Pipelines on this page.
    #[serde(default)]
    pub pipelines: Vec<PipelineResource>,
    /// Token of the next page; empty on the last page.
    #[serde(default)]
    pub next_page_token: String,
    /// Total across all pages.
    #[serde(default)]
    pub total_size: usize,
}

/// One page of connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionList {
    /// Connections on this page.
    #[serde(default)]
    pub connections: Vec<ConnectionResource>,
    /// Token of the next page; empty on the last page.
    #[serde(default)]
    pub next_page_token: String,
    /// Total across all pages.
    #[serde(default)]
    pub total_size: usize,
}

/// Pipelines referencing a connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferencedPipelines {
    /// Pipeline ids.
    #[serde(default)]
    pub pipeline_ids: Vec<String>,
    /// Token of the next page; empty on the last page.
    #[serde(default)]
    pub next_page_token: String,
    /// Total across all pages.
    #[serde(default)]
    pub total_size: usize,
}

/// One page of operator definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorDefinitionList {
    /// Definitions on this page.
    #[serde(default)]
    pub operator_definitions: Vec<DefinitionResource>,
    /// Token of the next page; empty on the last page.
    #[serde(default)]
    pub next_page_token: String,
    /// Total across all pages.
    #[serde(default)]
    pub total_size: usize,
}

/// One page of integrations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationList {
    /// Integrations on this page.
    #[serde(default)]
    pub integrations: Vec<IntegrationResource>,
    /// Token of the next page; empty on the last page.
    #[serde(default)]
    pub next_page_token: String,
    /// Total across all pages.
    #[serde(default)]
    pub total_size: usize,
}

/// One page of component definitions (page-number pagination).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDefinitionList {
    /// Definitions on this page.
    #[serde(default)]
    pub component_definitions: Vec<DefinitionResource>,
    /// Total across all pages.
    #[serde(default)]
    pub total_size: usize,
    /// Effective page size.
    #[serde(default)]
    pub page_size: usize,
    /// Zero-based page number.
    #[serde(default)]
    pub page: usize,
}

/// One page of pipeline runs (page-number pagination).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunList {
    /// Runs on this page, newest first.
    #[serde(default)]
    pub pipeline_runs: Vec<PipelineRunResource>,
    /// Total across all pages.
    #[serde(default)]
    pub total_size: usize,
    /// Effective page size.
    #[serde(default)]
    pub page_size: usize,
    /// Zero-based page number.
    #[serde(default)]
    pub page: usize,
}

/// One page of component runs (page-number pagination).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRunList {
    /// Component runs on this page.
    #[serde(default)]
    pub component_runs: Vec<ComponentRunResource>,
    /// Total across all pages.
    #[serde(default)]
    pub total_size: usize,
    /// Effective page size.
    #[serde(default)]
    pub page_size: usize,
    /// Zero-based page number.
    #[serde(default)]
    pub page: usize,
}

/// Run metadata returned by a synchronous trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerMetadata {
    /// Uid of the recorded run.
    pub pipeline_run_uid: String,
    /// Final run status.
    pub status: RunStatus,
}

/// Response from a synchronous trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerResponse {
    /// One output object per input.
    #[serde(default)]
    pub outputs: Vec<Value>,
    /// Run metadata.
    pub metadata: TriggerMetadata,
}

/// A single validation problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Location in the recipe, e.g. `component.http-0.setup`.
    pub location: String,
    /// Description of the problem.
    pub message: String,
}

/// Result of validating a pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether the recipe is valid.
    pub success: bool,
    /// Problems found.
    #[serde(default)]
    pub errors: Vec<ValidationIssue>,
}

/// Status and JSON body of a response, whatever the status.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed body; `Value::Null` for empty or non-JSON bodies.
    pub body: Value,
}

impl RawResponse {
    /// Detailed error code (`E…`) of an error body.
    pub fn error_code(&self) -> Option<&str> {
        self.body["details"][0]["code"].as_str()
    }
}

/// Pagination, view and filter parameters of list calls.
///
/// Token-paginated lists use `page_token`; run and component-definition
/// lists use `page`.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Requested page size.
    pub page_size: Option<i64>,
    /// Page token from a previous response.
    pub page_token: Option<String>,
    /// Zero-based page number.
    pub page: Option<i64>,
    /// Resource view.
    pub view: Option<View>,
    /// AIP-160 filter expression.
    pub filter: Option<String>,
}

impl ListOptions {
    /// Empty options: server defaults apply.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size.
    #[must_use]
    pub fn page_size(mut self, size: i64) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Set the page token.
    #[must_use]
    pub fn page_token(mut self, token: impl Into<String>) -> Self {
        self.page_token = Some(token.into());
        self
    }

    /// Set the page number.
    #[must_use]
    pub fn page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the view.
    #[must_use]
    pub fn view(mut self, view: View) -> Self {
        self.view = Some(view);
        self
    }

    /// Set the filter expression.
    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Query parameters for the request.
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(size) = self.page_size {
            query.push(("pageSize", size.to_string()));
        }
        if let Some(token) = &self.page_token {
            query.push(("pageToken", token.clone()));
        }
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(view) = self.view {
            query.push(("view", view.as_str().to_string()));
        }
        if let Some(filter) = &self.filter {
            query.push(("filter", filter.clone()));
        }
        query
    }
}

/// Query for an optional view.
pub(crate) fn view_query(view: Option<View>) -> Vec<(&'static str, String)> {
    view.map(|v| vec![("view", v.as_str().to_string())])
        .unwrap_or_default()
}
