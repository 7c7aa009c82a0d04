//! Pipeline lifecycle, validation, triggering and run history.

use crate::catalog::Catalog;
use crate::controller::ListQuery;
use crate::engine::{prepare_inputs, Executor};
use crate::store::{RunRecord, Stores};
use pipewright_core::auth::AuthContext;
use pipewright_core::filter::Filter;
use pipewright_core::mask::FieldMask;
use pipewright_core::model::{
    ComponentRun, ComponentRunResource, Operation, Pipeline, PipelineResource, PipelineRun,
    PipelineRunResource, PipelineState,
};
use pipewright_core::pagination::{paginate_by_number, paginate_by_token, Page, PageLimits};
use pipewright_core::recipe::{validate_references, validate_structure, ValidationReport};
use pipewright_core::{Namespace, PipewrightError, ResourceId, Result, RunStatus, Uid, View};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Outcome of a synchronous trigger.
#[derive(Debug, Clone)]
pub struct TriggerResult {
    /// Uid of the recorded run.
    pub run_uid: Uid,
    /// Final run status.
    pub status: RunStatus,
    /// Pipeline outputs, one per batch element.
    pub outputs: Vec<Value>,
}

/// Inputs and connections checked before execution.
struct Prepared {
    inputs: Vec<Value>,
    connections: HashMap<String, Value>,
}

/// Pipeline operations.
#[derive(Clone)]
pub struct PipelineController {
    stores: Stores,
    catalog: Arc<Catalog>,
    executor: Executor,
    limits: PageLimits,
    trigger_timeout: Duration,
}

impl PipelineController {
    /// Create a controller.
    pub fn new(
        stores: Stores,
        catalog: Arc<Catalog>,
        executor: Executor,
        limits: PageLimits,
        trigger_timeout: Duration,
    ) -> Self {
        Self {
            stores,
            catalog,
            executor,
            limits,
            trigger_timeout,
        }
    }

    /// Reference validation state of a pipeline.
    pub fn state_of(&self, pipeline: &Pipeline) -> PipelineState {
        let connections = self.stores.connections.ids(&pipeline.namespace);
        if validate_references(&pipeline.recipe, &connections).is_valid() {
            PipelineState::Active
        } else {
            PipelineState::Error
        }
    }

    /// Render a pipeline with its current state.
    pub fn render(&self, pipeline: &Pipeline, view: View) -> PipelineResource {
        pipeline.to_resource(view, self.state_of(pipeline))
    }

    /// Create a pipeline from a request body.
    ///
    /// Structural recipe errors reject the request; reference errors only
    /// set the state to `STATE_ERROR`.
    pub fn create(&self, namespace: &Namespace, body: &Value) -> Result<PipelineResource> {
        let pipeline = Pipeline::from_create_body(namespace.clone(), body)?;
        validate_structure(&pipeline.recipe, self.catalog.as_ref())?;
        let created = self.stores.pipelines.create(pipeline)?;

        tracing::info!(pipeline = %created.name(), uid = %created.uid, "Pipeline created");
        Ok(self.render(&created, View::Full))
    }

    /// Get a pipeline.
    pub fn get(&self, namespace: &Namespace, id: &str, view: View) -> Result<PipelineResource> {
        let pipeline = self.stores.pipelines.get(namespace, id)?;
        Ok(self.render(&pipeline, view))
    }

    /// List pipelines of `namespace`, or of every namespace when `None`.
    pub fn list(
        &self,
        namespace: Option<&Namespace>,
        query: &ListQuery,
    ) -> Result<Page<PipelineResource>> {
        let filter = Filter::parse_for::<Pipeline>(query.filter.as_deref())?;
        let pipelines = filter.apply(self.stores.pipelines.list(namespace));
        let page = paginate_by_token(pipelines, &query.page, &self.limits, Pipeline::list_key)?;
        Ok(page.map(|p| self.render(&p, query.view)))
    }

    /// Resolve a pipeline by uid. `auth` must be able to access its namespace.
    pub fn lookup(&self, uid: &str, view: View, auth: &AuthContext) -> Result<PipelineResource> {
        let not_found = || PipewrightError::PipelineNotFound {
            name: format!("pipelines/{}", uid),
        };
        let uid = Uid::parse(uid).map_err(|_| not_found())?;
        let pipeline = self.stores.pipelines.get_by_uid(&uid).ok_or_else(not_found)?;
        auth.require_access(&pipeline.namespace)?;
        Ok(self.render(&pipeline, view))
    }

    /// Apply a partial update.
    ///
    /// Without `mask`, the top-level fields present in `body` are updated.
    pub fn update(
        &self,
        namespace: &Namespace,
        id: &str,
        body: &Value,
        mask: Option<&str>,
    ) -> Result<PipelineResource> {
        if !body.is_object() {
            return Err(PipewrightError::MissingField {
                field: "pipeline".to_string(),
            });
        }
        let mask = FieldMask::resolve(mask, body)?;
        let catalog = Arc::clone(&self.catalog);

        let (updated, recipe_changed) = self.stores.pipelines.update(namespace, id, |p| {
            let recipe_changed = p.apply_update(body, &mask)?;
            if recipe_changed {
                validate_structure(&p.recipe, catalog.as_ref())?;
            }
            Ok(recipe_changed)
        })?;

        tracing::info!(pipeline = %updated.name(), recipe_changed, "Pipeline updated");
        Ok(self.render(&updated, View::Full))
    }

    /// Delete a pipeline. Its run history is kept.
    pub fn delete(&self, namespace: &Namespace, id: &str) -> Result<()> {
        let removed = self.stores.pipelines.delete(namespace, id)?;
        tracing::info!(pipeline = %removed.name(), "Pipeline deleted");
        Ok(())
    }

    /// Rename a pipeline to `body.newPipelineId`.
    pub fn rename(&self, namespace: &Namespace, id: &str, body: &Value) -> Result<PipelineResource> {
        let new_id = body
            .get("newPipelineId")
            .or_else(|| body.get("new_pipeline_id"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PipewrightError::MissingField {
                field: "newPipelineId".to_string(),
            })?;
        let new_id = ResourceId::parse_kind("pipeline", new_id)?;

        let renamed = self.stores.pipelines.rename(namespace, id, new_id)?;
        tracing::info!(from = %id, pipeline = %renamed.name(), "Pipeline renamed");
        Ok(self.render(&renamed, View::Full))
    }

    /// Check every reference of a pipeline's recipe.
    pub fn validate(&self, namespace: &Namespace, id: &str) -> Result<ValidationReport> {
        let pipeline = self.stores.pipelines.get(namespace, id)?;
        let connections = self.stores.connections.ids(namespace);
        Ok(validate_references(&pipeline.recipe, &connections))
    }

    /// Trigger a pipeline and wait for it to finish.
    ///
    /// Invalid references or inputs are recorded as a failed run and returned
    /// as errors before anything executes. Component failures are not errors;
    /// they show up in the returned status.
    pub async fn trigger(
        &self,
        namespace: &Namespace,
        id: &str,
        body: &Value,
        triggered_by: &str,
    ) -> Result<TriggerResult> {
        let pipeline = self.stores.pipelines.get(namespace, id)?;
        let raw_inputs = trigger_inputs(body)?;
        let prepared = self.prepare(&pipeline, raw_inputs, triggered_by)?;

        let run = PipelineRun::start(&pipeline, triggered_by, prepared.inputs.clone());
        let run = self.execute(&pipeline, run, prepared).await?;
        Ok(TriggerResult {
            run_uid: run.uid,
            status: run.status,
            outputs: run.outputs,
        })
    }

    /// Trigger a pipeline in the background.
    ///
    /// Validation happens before returning. The returned operation finishes
    /// with the run's outputs, or with the error that stopped it.
    pub fn trigger_async(
        &self,
        namespace: &Namespace,
        id: &str,
        body: &Value,
        triggered_by: &str,
    ) -> Result<Operation> {
        let pipeline = self.stores.pipelines.get(namespace, id)?;
        let raw_inputs = trigger_inputs(body)?;
        let prepared = self.prepare(&pipeline, raw_inputs, triggered_by)?;

        let run = PipelineRun::start(&pipeline, triggered_by, prepared.inputs.clone());
        self.stores.record_run(RunRecord {
            run: run.clone(),
            components: Vec::new(),
        });
        let operation = self.stores.operations.start(&pipeline.namespace);
        tracing::info!(
            pipeline = %pipeline.name(),
            operation = %operation.name,
            pipeline_run_uid = %run.uid,
            "Async trigger accepted"
        );

        let controller = self.clone();
        let operation_id = operation.id().to_string();
        tokio::spawn(async move {
            let result = controller.execute(&pipeline, run, prepared).await;
            controller.stores.operations.finish(&operation_id, |op| match result {
                Ok(run) => op.succeed(json!({
                    "outputs": run.outputs,
                    "metadata": {
                        "pipelineRunUid": run.uid.to_string(),
                        "status": run.status,
                    }
                })),
                Err(e) => op.fail(i32::from(e.status_kind().grpc_code()), e.user_message()),
            });
        });

        Ok(operation)
    }

    /// Check references and inputs; a failure is recorded as a failed run.
    fn prepare(
        &self,
        pipeline: &Pipeline,
        raw_inputs: Vec<Value>,
        triggered_by: &str,
    ) -> Result<Prepared> {
        let checked = validate_references(
            &pipeline.recipe,
            &self.stores.connections.ids(&pipeline.namespace),
        )
        .into_result()
        .and_then(|()| prepare_inputs(&pipeline.recipe, &raw_inputs));

        match checked {
            Ok(inputs) => {
                let connections = self
                    .stores
                    .connections
                    .list(&pipeline.namespace)
                    .into_iter()
                    .map(|c| (c.id.to_string(), Value::Object(c.setup)))
                    .collect();
                Ok(Prepared {
                    inputs,
                    connections,
                })
            }
            Err(e) => {
                let mut run = PipelineRun::start(pipeline, triggered_by, raw_inputs);
                run.fail(Vec::new(), e.user_message());
                tracing::warn!(
                    pipeline = %pipeline.name(),
                    pipeline_run_uid = %run.uid,
                    error = %e,
                    "Trigger rejected"
                );
                self.stores.record_run(RunRecord {
                    run,
                    components: Vec::new(),
                });
                Err(e)
            }
        }
    }

    /// Run the executor under the trigger timeout and persist the result.
    async fn execute(
        &self,
        pipeline: &Pipeline,
        mut run: PipelineRun,
        prepared: Prepared,
    ) -> Result<PipelineRun> {
        let span = crate::trigger_span!(pipeline.name(), run.uid);
        let execution = self.executor.run(
            run.uid,
            &pipeline.recipe,
            &prepared.inputs,
            &prepared.connections,
        );
        let outcome = tokio::time::timeout(self.trigger_timeout, execution)
            .instrument(span)
            .await;

        let (components, result): (Vec<ComponentRun>, Result<()>) = match outcome {
            Ok(Ok(outcome)) => {
                match outcome.status {
                    RunStatus::Completed => run.complete(outcome.outputs),
                    _ => run.fail(
                        outcome.outputs,
                        outcome.error.unwrap_or_else(|| "pipeline run failed".to_string()),
                    ),
                }
                (outcome.component_runs, Ok(()))
            }
            Ok(Err(e)) => {
                run.fail(Vec::new(), e.user_message());
                (Vec::new(), Err(e))
            }
            Err(_) => {
                let e = PipewrightError::ExecutionTimeout {
                    pipeline: pipeline.name(),
                    timeout_ms: self.trigger_timeout.as_millis() as u64,
                };
                run.fail(Vec::new(), e.user_message());
                (Vec::new(), Err(e))
            }
        };

        tracing::info!(
            pipeline = %pipeline.name(),
            pipeline_run_uid = %run.uid,
            status = %run.status,
            duration_ms = run.total_duration_ms().unwrap_or_default(),
            "Pipeline run finished"
        );
        self.stores.record_run(RunRecord {
            run: run.clone(),
            components,
        });
        result.map(|()| run)
    }

    /// Runs of a pipeline, newest first, with page-number pagination.
    pub fn list_runs(
        &self,
        namespace: &Namespace,
        id: &str,
        query: &ListQuery,
    ) -> Result<Page<PipelineRunResource>> {
        let pipeline = self.stores.pipelines.get(namespace, id)?;
        let filter = Filter::parse_for::<PipelineRun>(query.filter.as_deref())?;
        let runs: Vec<PipelineRun> = self
            .stores
            .runs
            .read()
            .by_pipeline(&pipeline.uid)
            .into_iter()
            .map(|record| record.run.clone())
            .collect();
        let page = paginate_by_number(filter.apply(runs), &query.page, &self.limits)?;
        Ok(page.map(|run| run.to_resource(query.view)))
    }

    /// Component runs of a pipeline run, in execution order.
    pub fn list_component_runs(
        &self,
        run_uid: &str,
        query: &ListQuery,
        auth: &AuthContext,
    ) -> Result<Page<ComponentRunResource>> {
        let not_found = || PipewrightError::RunNotFound {
            uid: run_uid.to_string(),
        };
        let uid = Uid::parse(run_uid).map_err(|_| not_found())?;
        let record = self
            .stores
            .runs
            .read()
            .get(&uid)
            .cloned()
            .ok_or_else(not_found)?;
        auth.require_access(&record.run.namespace)?;

        let filter = Filter::parse_for::<ComponentRun>(query.filter.as_deref())?;
        let page = paginate_by_number(filter.apply(record.components), &query.page, &self.limits)?;
        Ok(page.map(|run| run.to_resource(query.view)))
    }

    /// Get an async trigger operation. `auth` must be able to access the
    /// namespace of the pipeline that started it.
    pub fn get_operation(&self, id: &str, auth: &AuthContext) -> Result<Operation> {
        let owned = self.stores.operations.get(id)?;
        auth.require_access(&owned.namespace)?;
        Ok(owned.operation)
    }
}

/// Extract `inputs` from a trigger body; a missing body means no inputs.
fn trigger_inputs(body: &Value) -> Result<Vec<Value>> {
    match body {
        Value::Null => Ok(Vec::new()),
        Value::Object(map) => match map.get("inputs") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items.clone()),
            Some(_) => Err(PipewrightError::InvalidArgument {
                field: "inputs".to_string(),
                cause: "inputs must be an array".to_string(),
            }),
        },
        _ => Err(PipewrightError::InvalidArgument {
            field: "body".to_string(),
            cause: "trigger body must be an object".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ComponentRegistry;
    use pipewright_core::auth::AuthScope;
    use pipewright_core::pagination::PageRequest;

    fn controller() -> PipelineController {
        PipelineController::new(
            Stores::new(100, 100),
            Arc::new(Catalog::standard()),
            Executor::new(Arc::new(ComponentRegistry::standard())),
            PageLimits::default(),
            Duration::from_secs(30),
        )
    }

    fn ns() -> Namespace {
        Namespace::parse("users/admin").unwrap()
    }

    fn jq_body(id: &str) -> Value {
        json!({
            "id": id,
            "recipe": {
                "version": "v1beta",
                "variable": { "jota": { "format": "json" } },
                "component": {
                    "json-0": {
                        "type": "json",
                        "task": "TASK_JQ",
                        "input": { "json-value": "${variable.jota}", "jq-filter": ".foo" }
                    }
                },
                "output": { "answer": { "value": "${json-0.output.results[0]}" } }
            }
        })
    }

    #[test]
    fn create_get_and_state() {
        let c = controller();
        let created = c.create(&ns(), &jq_body("jq")).unwrap();
        assert_eq!(created.state, PipelineState::Active);
        assert!(created.recipe.is_some());

        let basic = c.get(&ns(), "jq", View::Basic).unwrap();
        assert!(basic.recipe.is_none());
        assert_eq!(basic.uid, created.uid);

        let err = c.create(&ns(), &jq_body("jq")).unwrap_err();
        assert_eq!(err.code(), "E301");
    }

    #[test]
    fn structural_errors_reject_but_reference_errors_do_not() {
        let c = controller();
        let err = c
            .create(
                &ns(),
                &json!({ "id": "bad", "recipe": { "component": { "a": { "type": "nope", "task": "X" } } } }),
            )
            .unwrap_err();
        assert_eq!(err.code(), "E105");

        let created = c
            .create(
                &ns(),
                &json!({
                    "id": "dangling",
                    "recipe": {
                        "component": {
                            "a": { "type": "http", "task": "TASK_GET", "setup": "${connection.missing}", "input": {} }
                        }
                    }
                }),
            )
            .unwrap();
        assert_eq!(created.state, PipelineState::Error);
        assert!(!c.validate(&ns(), "dangling").unwrap().is_valid());
    }

    #[tokio::test]
    async fn trigger_records_runs() {
        let c = controller();
        c.create(&ns(), &jq_body("jq")).unwrap();

        let ok = c
            .trigger(&ns(), "jq", &json!({ "inputs": [{ "jota": { "foo": "bar" } }] }), "admin")
            .await
            .unwrap();
        assert_eq!(ok.status, RunStatus::Completed);
        assert_eq!(ok.outputs, vec![json!({ "answer": "bar" })]);

        let failed = c.trigger(&ns(), "jq", &json!({ "inputs": [{}] }), "admin").await.unwrap();
        assert_eq!(failed.status, RunStatus::Failed);

        let runs = c.list_runs(&ns(), "jq", &ListQuery::default()).unwrap();
        assert_eq!(runs.total_size, 2);
        assert_eq!(runs.items[0].status, RunStatus::Failed);

        let admin = AuthContext::new("admin", AuthScope::all());
        let components = c
            .list_component_runs(&failed.run_uid.to_string(), &ListQuery::default(), &admin)
            .unwrap();
        assert_eq!(components.total_size, 1);
        assert_eq!(components.items[0].status, RunStatus::Failed);
    }

    #[tokio::test]
    async fn invalid_input_is_recorded_and_rejected() {
        let c = controller();
        c.create(&ns(), &jq_body("jq")).unwrap();

        let err = c
            .trigger(&ns(), "jq", &json!({ "inputs": [{ "unknown": 1 }] }), "admin")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E111");

        let runs = c.list_runs(&ns(), "jq", &ListQuery::default()).unwrap();
        assert_eq!(runs.total_size, 1);
        assert_eq!(runs.items[0].status, RunStatus::Failed);
    }

    #[tokio::test]
    async fn async_trigger_finishes_operation() {
        let c = controller();
        c.create(&ns(), &jq_body("jq")).unwrap();

        let op = c
            .trigger_async(&ns(), "jq", &json!({ "inputs": [{ "jota": { "foo": 1 } }] }), "admin")
            .unwrap();
        assert!(op.name.starts_with("operations/"));

        let admin = AuthContext::new("admin", AuthScope::all());
        let mut finished = c.get_operation(op.id(), &admin).unwrap();
        for _ in 0..100 {
            if finished.done {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
            finished = c.get_operation(op.id(), &admin).unwrap();
        }
        assert!(finished.done);
        assert_eq!(finished.response.unwrap()["outputs"][0]["answer"], 1);

        let outsider = AuthContext::new("alice", AuthScope::member());
        let err = c.get_operation(op.id(), &outsider).unwrap_err();
        assert_eq!(err.code(), "E402");
    }

    #[test]
    fn rename_update_delete() {
        let c = controller();
        let created = c.create(&ns(), &jq_body("jq")).unwrap();

        let renamed = c
            .rename(&ns(), "jq", &json!({ "newPipelineId": "jq-2" }))
            .unwrap();
        assert_eq!(renamed.uid, created.uid);
        assert_eq!(c.get(&ns(), "jq", View::Basic).unwrap_err().code(), "E201");

        let updated = c
            .update(&ns(), "jq-2", &json!({ "description": "hello" }), None)
            .unwrap();
        assert_eq!(updated.description, "hello");
        assert!(updated.update_time > created.update_time);

        let err = c
            .update(&ns(), "jq-2", &json!({ "id": "other" }), None)
            .unwrap_err();
        assert_eq!(err.code(), "E106");

        c.delete(&ns(), "jq-2").unwrap();
        assert!(c.delete(&ns(), "jq-2").is_err());
    }

    #[test]
    fn list_with_filter_and_pages() {
        let c = controller();
        for i in 0..5 {
            c.create(&ns(), &json!({ "id": format!("p-{}", i) })).unwrap();
        }
        let query = ListQuery {
            page: PageRequest::with_size(2),
            ..ListQuery::default()
        };
        let page = c.list(Some(&ns()), &query).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_size, 5);
        assert!(!page.next_page_token.is_empty());

        let query = ListQuery {
            filter: Some("q_title=\"p-3\"".to_string()),
            ..ListQuery::default()
        };
        assert_eq!(c.list(Some(&ns()), &query).unwrap().total_size, 1);
    }

    #[test]
    fn lookup_checks_access() {
        let c = controller();
        let created = c.create(&ns(), &jq_body("jq")).unwrap();
        let admin = AuthContext::new("admin", AuthScope::all());
        let other = AuthContext::new("bob", AuthScope::read_only());

        assert_eq!(c.lookup(&created.uid, View::Basic, &admin).unwrap().id, "jq");
        assert_eq!(c.lookup(&created.uid, View::Basic, &other).unwrap_err().code(), "E402");
        assert_eq!(c.lookup("not-a-uid", View::Basic, &admin).unwrap_err().code(), "E201");
    }
}
