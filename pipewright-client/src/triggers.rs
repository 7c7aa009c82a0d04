//! Triggering, run history and operations.

use crate::client::{segment, Client};
use crate::error::Result;
use crate::types::{ComponentRunList, ListOptions, Operation, PipelineRunList, TriggerResponse};
use serde_json::{json, Value};

impl Client {
    /// Run a pipeline and wait for its outputs.
    ///
    /// A run that fails inside a component still returns `Ok`, with
    /// `metadata.status` set to `RUN_STATUS_FAILED`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pipeline is missing, its references do not
    /// resolve, or an input is invalid.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use pipewright_client::Client;
    /// # use serde_json::json;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let client = Client::new("http://localhost:8080")?;
    /// let response = client
    ///     .trigger_pipeline("users/admin", "my-pipeline", &[json!({ "text": "hi" })])
    ///     .await?;
    /// println!("Run {}: {:?}", response.metadata.pipeline_run_uid, response.metadata.status);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn trigger_pipeline(
        &self,
        namespace: &str,
        id: &str,
        inputs: &[Value],
    ) -> Result<TriggerResponse> {
        let path = format!("{}/pipelines/{}/trigger", namespace.trim_matches('/'), segment(id));
        let response = self.post(&path, &json!({ "inputs": inputs })).await?;
        self.handle_response(response).await
    }

    /// Start a run in the background and return its operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the trigger is rejected before the run starts.
    pub async fn trigger_pipeline_async(
        &self,
        namespace: &str,
        id: &str,
        inputs: &[Value],
    ) -> Result<Operation> {
        let path = format!(
            "{}/pipelines/{}/triggerAsync",
            namespace.trim_matches('/'),
            segment(id)
        );
        let response = self.post(&path, &json!({ "inputs": inputs })).await?;
        self.handle_field(response, "operation").await
    }

    /// Get an operation by name (`operations/{id}`) or bare id.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation is unknown.
    pub async fn get_operation(&self, name: &str) -> Result<Operation> {
        let id = name.strip_prefix("operations/").unwrap_or(name);
        let path = format!("operations/{}", segment(id));
        let response = self.get(&path, &[]).await?;
        self.handle_field(response, "operation").await
    }

    /// List the runs of a pipeline, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the pipeline is not found or the request fails.
    pub async fn list_pipeline_runs(
        &self,
        namespace: &str,
        id: &str,
        options: &ListOptions,
    ) -> Result<PipelineRunList> {
        let path = format!("{}/pipelines/{}/runs", namespace.trim_matches('/'), segment(id));
        let response = self.get(&path, &options.to_query()).await?;
        self.handle_response(response).await
    }

    /// List the component runs of a pipeline run.
    ///
    /// # Errors
    ///
    /// Returns an error if the run is not found or the request fails.
    pub async fn list_component_runs(
        &self,
        pipeline_run_uid: &str,
        options: &ListOptions,
    ) -> Result<ComponentRunList> {
        let path = format!("pipeline-runs/{}/component-runs", segment(pipeline_run_uid));
        let response = self.get(&path, &options.to_query()).await?;
        self.handle_response(response).await
    }
}
