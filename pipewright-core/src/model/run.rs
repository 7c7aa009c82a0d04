//! Pipeline runs and component runs.

use super::Pipeline;
use crate::filter::{FilterValue, Filterable};
use crate::types::{Namespace, RunStatus, Uid, View};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What started a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunSource {
    /// Triggered through the API.
    #[default]
    #[serde(rename = "RUN_SOURCE_API")]
    Api,
}

impl RunSource {
    /// Canonical string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Api => "RUN_SOURCE_API",
        }
    }
}

/// One trigger of a pipeline.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// Run uid.
    pub uid: Uid,
    /// Uid of the triggered pipeline.
    pub pipeline_uid: Uid,
    /// Id of the pipeline at trigger time.
    pub pipeline_id: String,
    /// Pipeline owner.
    pub namespace: Namespace,
    /// Current status.
    pub status: RunStatus,
    /// Trigger source.
    pub source: RunSource,
    /// Identity that triggered the run.
    pub triggered_by: String,
    /// Trigger inputs, one per batch element.
    pub inputs: Vec<Value>,
    /// Pipeline outputs, one per batch element.
    pub outputs: Vec<Value>,
    /// Recipe as it was when the run started.
    pub recipe_snapshot: Value,
    /// Failure description.
    pub error: Option<String>,
    /// Start time.
    pub start_time: DateTime<Utc>,
    /// Completion time.
    pub complete_time: Option<DateTime<Utc>>,
}

impl PipelineRun {
    /// Start a run of `pipeline` in the processing state.
    pub fn start(pipeline: &Pipeline, triggered_by: &str, inputs: Vec<Value>) -> Self {
        Self {
            uid: Uid::new(),
            pipeline_uid: pipeline.uid,
            pipeline_id: pipeline.id.to_string(),
            namespace: pipeline.namespace.clone(),
            status: RunStatus::Processing,
            source: RunSource::Api,
            triggered_by: triggered_by.to_string(),
            inputs,
            outputs: Vec::new(),
            recipe_snapshot: pipeline.recipe.to_json(),
            error: None,
            start_time: Utc::now(),
            complete_time: None,
        }
    }

    /// Mark the run completed with `outputs`.
    pub fn complete(&mut self, outputs: Vec<Value>) {
        self.finish(RunStatus::Completed, outputs, None);
    }

    /// Mark the run failed with `error`.
    pub fn fail(&mut self, outputs: Vec<Value>, error: impl Into<String>) {
        self.finish(RunStatus::Failed, outputs, Some(error.into()));
    }

    fn finish(&mut self, status: RunStatus, outputs: Vec<Value>, error: Option<String>) {
        self.status = status;
        self.outputs = outputs;
        self.error = error;
        self.complete_time = Some(Utc::now().max(self.start_time));
    }

    /// Wall time between start and completion.
    pub fn total_duration_ms(&self) -> Option<i64> {
        self.complete_time
            .map(|done| (done - self.start_time).num_milliseconds())
    }

    /// Render for `view`; BASIC hides inputs, outputs and the recipe snapshot.
    pub fn to_resource(&self, view: View) -> PipelineRunResource {
        let detailed = view.is_detailed();
        PipelineRunResource {
            pipeline_run_uid: self.uid.to_string(),
            pipeline_uid: self.pipeline_uid.to_string(),
            pipeline_id: self.pipeline_id.clone(),
            owner_name: self.namespace.name(),
            status: self.status,
            source: self.source,
            triggered_by: self.triggered_by.clone(),
            inputs: detailed.then(|| self.inputs.clone()),
            outputs: detailed.then(|| self.outputs.clone()),
            recipe_snapshot: detailed.then(|| self.recipe_snapshot.clone()),
            error: self.error.clone(),
            start_time: self.start_time,
            complete_time: self.complete_time,
            total_duration: self.total_duration_ms(),
        }
    }
}

impl Filterable for PipelineRun {
    fn filter_fields() -> &'static [&'static str] {
        &[
            "status",
            "source",
            "triggered_by",
            "start_time",
            "create_time",
            "complete_time",
        ]
    }

    fn filter_value(&self, field: &str) -> Option<FilterValue> {
        match field {
            "status" => Some(self.status.as_str().into()),
            "source" => Some(self.source.as_str().into()),
            "triggered_by" => Some(self.triggered_by.as_str().into()),
            "start_time" | "create_time" => Some(self.start_time.into()),
            "complete_time" => self.complete_time.map(FilterValue::from),
            _ => None,
        }
    }

    fn title_text(&self) -> String {
        self.pipeline_id.clone()
    }

    fn search_text(&self) -> String {
        format!("{} {} {}", self.uid, self.pipeline_id, self.triggered_by)
    }
}

/// Wire representation of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunResource {
    /// Run uid.
    pub pipeline_run_uid: String,
    /// Pipeline uid.
    pub pipeline_uid: String,
    /// Pipeline id at trigger time.
    pub pipeline_id: String,
    /// Owner namespace name.
    pub owner_name: String,
    /// Status.
    pub status: RunStatus,
    /// Trigger source.
    pub source: RunSource,
    /// Triggering identity.
    pub triggered_by: String,
    /// Inputs (FULL view only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<Value>>,
    /// Outputs (FULL view only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<Value>>,
    /// Recipe snapshot (FULL view only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_snapshot: Option<Value>,
    /// Failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Start time.
    pub start_time: DateTime<Utc>,
    /// Completion time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete_time: Option<DateTime<Utc>>,
    /// Duration in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<i64>,
}

/// Outcome of one component within a pipeline run.
#[derive(Debug, Clone)]
pub struct ComponentRun {
    /// Owning pipeline run.
    pub pipeline_run_uid: Uid,
    /// Component id in the recipe.
    pub component_id: String,
    /// Status.
    pub status: RunStatus,
    /// Resolved inputs, one per executed batch element.
    pub inputs: Vec<Value>,
    /// Outputs, one per executed batch element.
    pub outputs: Vec<Value>,
    /// First failure, if any element failed.
    pub error: Option<String>,
    /// Start time.
    pub start_time: DateTime<Utc>,
    /// Completion time.
    pub complete_time: Option<DateTime<Utc>>,
}

impl ComponentRun {
    /// Start a component run.
    pub fn start(pipeline_run_uid: Uid, component_id: &str) -> Self {
        Self {
            pipeline_run_uid,
            component_id: component_id.to_string(),
            status: RunStatus::Processing,
            inputs: Vec::new(),
            outputs: Vec::new(),
            error: None,
            start_time: Utc::now(),
            complete_time: None,
        }
    }

    /// Close the run: FAILED when an error was recorded, else COMPLETED.
    pub fn finish(&mut self) {
        self.status = if self.error.is_some() {
            RunStatus::Failed
        } else {
            RunStatus::Completed
        };
        self.complete_time = Some(Utc::now().max(self.start_time));
    }

    /// Wall time between start and completion.
    pub fn total_duration_ms(&self) -> Option<i64> {
        self.complete_time
            .map(|done| (done - self.start_time).num_milliseconds())
    }

    /// Render for `view`; BASIC hides inputs and outputs.
    pub fn to_resource(&self, view: View) -> ComponentRunResource {
        let detailed = view.is_detailed();
        ComponentRunResource {
            pipeline_run_uid: self.pipeline_run_uid.to_string(),
            component_id: self.component_id.clone(),
            status: self.status,
            inputs: detailed.then(|| self.inputs.clone()),
            outputs: detailed.then(|| self.outputs.clone()),
            error: self.error.clone(),
            start_time: self.start_time,
            complete_time: self.complete_time,
            total_duration: self.total_duration_ms(),
        }
    }
}

impl Filterable for ComponentRun {
    fn filter_fields() -> &'static [&'static str] {
        &["component_id", "status", "start_time", "complete_time"]
    }

    fn filter_value(&self, field: &str) -> Option<FilterValue> {
        match field {
            "component_id" => Some(self.component_id.as_str().into()),
            "status" => Some(self.status.as_str().into()),
            "start_time" => Some(self.start_time.into()),
            "complete_time" => self.complete_time.map(FilterValue::from),
            _ => None,
        }
    }

    fn title_text(&self) -> String {
        self.component_id.clone()
    }
}

/// Wire representation of a component run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRunResource {
    /// Owning pipeline run.
    pub pipeline_run_uid: String,
    /// Component id.
    pub component_id: String,
    /// Status.
    pub status: RunStatus,
    /// Inputs (FULL view only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<Value>>,
    /// Outputs (FULL view only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<Value>>,
    /// Failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Start time.
    pub start_time: DateTime<Utc>,
    /// Completion time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete_time: Option<DateTime<Utc>>,
    /// Duration in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pipeline() -> Pipeline {
        Pipeline::from_create_body(
            Namespace::parse("users/admin").unwrap(),
            &json!({ "id": "runner" }),
        )
        .unwrap()
    }

    #[test]
    fn run_lifecycle() {
        let p = pipeline();
        let mut run = PipelineRun::start(&p, "admin", vec![json!({ "a": 1 })]);
        assert_eq!(run.status, RunStatus::Processing);
        assert!(run.total_duration_ms().is_none());

        run.complete(vec![json!({ "out": 1 })]);
        assert_eq!(run.status, RunStatus::Completed);
        assert!(run.complete_time.unwrap() >= run.start_time);
        assert!(run.total_duration_ms().unwrap() >= 0);

        let mut failed = PipelineRun::start(&p, "admin", vec![]);
        failed.fail(vec![], "boom");
        assert_eq!(failed.status, RunStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("boom"));
    }

    #[test]
    fn run_view_gating() {
        let p = pipeline();
        let mut run = PipelineRun::start(&p, "admin", vec![json!({ "a": 1 })]);
        run.complete(vec![json!({ "out": 1 })]);

        let basic = serde_json::to_value(run.to_resource(View::Basic)).unwrap();
        assert!(basic.get("inputs").is_none());
        assert!(basic.get("recipeSnapshot").is_none());
        assert_eq!(basic["status"], "RUN_STATUS_COMPLETED");
        assert_eq!(basic["source"], "RUN_SOURCE_API");
        assert_eq!(basic["pipelineId"], "runner");

        let full = serde_json::to_value(run.to_resource(View::Full)).unwrap();
        assert_eq!(full["inputs"][0]["a"], 1);
        assert_eq!(full["outputs"][0]["out"], 1);
    }

    #[test]
    fn component_run_status_follows_error() {
        let mut ok = ComponentRun::start(Uid::new(), "json-0");
        ok.finish();
        assert_eq!(ok.status, RunStatus::Completed);

        let mut bad = ComponentRun::start(Uid::new(), "json-0");
        bad.error = Some("jq failed".to_string());
        bad.finish();
        assert_eq!(bad.status, RunStatus::Failed);
        assert_eq!(
            serde_json::to_value(bad.to_resource(View::Basic)).unwrap()["status"],
            "RUN_STATUS_FAILED"
        );
    }
}
