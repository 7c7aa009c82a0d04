//! Recipe executor.
//!
//! Components run one at a time in dependency order. Within a component the
//! batch elements run concurrently. An element whose dependency failed or was
//! skipped is skipped itself, so failures never reach dependents.

use super::component::{ComponentContext, ComponentRegistry};
use futures::future::join_all;
use pipewright_core::model::ComponentRun;
use pipewright_core::recipe::{ComponentConfig, DependencyGraph, Recipe, Reference, ReferenceParser};
use pipewright_core::{PipewrightError, Result, RunStatus, Uid};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Result of executing a recipe over a batch of inputs.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Pipeline outputs, one per batch element.
    pub outputs: Vec<Value>,
    /// One record per component that executed for at least one element.
    pub component_runs: Vec<ComponentRun>,
    /// `Completed` iff every executed component completed.
    pub status: RunStatus,
    /// First component failure.
    pub error: Option<String>,
}

/// Outcome of one component for one batch element.
#[derive(Debug, Clone)]
enum Slot {
    Done { input: Value, output: Value },
    Failed { input: Value, error: String },
    Skipped,
}

/// Per-element execution state.
#[derive(Debug)]
struct ElementState {
    variables: Value,
    slots: HashMap<String, Slot>,
}

impl ElementState {
    fn new(variables: Value) -> Self {
        Self {
            variables,
            slots: HashMap::new(),
        }
    }

    fn completed(&self, component_id: &str) -> bool {
        matches!(self.slots.get(component_id), Some(Slot::Done { .. }))
    }

    fn resolve(
        &self,
        holder: &str,
        reference: &Reference,
        connections: &HashMap<String, Value>,
    ) -> Result<Value> {
        let unresolved = |cause: &str| PipewrightError::UnresolvedReference {
            reference: reference.raw.clone(),
            component_id: holder.to_string(),
            cause: cause.to_string(),
        };

        match reference.root.as_str() {
            // Declared variables without a value resolve to null.
            "variable" => Ok(reference
                .lookup(&self.variables, 0)
                .cloned()
                .unwrap_or(Value::Null)),
            "connection" => {
                let id = reference
                    .first_field()
                    .ok_or_else(|| unresolved("connection id is missing"))?;
                let setup = connections
                    .get(id)
                    .ok_or_else(|| unresolved("connection does not exist"))?;
                Ok(reference.lookup(setup, 1).cloned().unwrap_or(Value::Null))
            }
            "secret" => Err(unresolved("secret references are not supported")),
            component_id => {
                let Some(Slot::Done { input, output }) = self.slots.get(component_id) else {
                    return Err(unresolved("component did not produce output"));
                };
                let base = match reference.first_field() {
                    Some("output") => output,
                    Some("input") => input,
                    _ => return Err(unresolved("expected 'output' or 'input'")),
                };
                Ok(reference.lookup(base, 1).cloned().unwrap_or(Value::Null))
            }
        }
    }
}

/// Whether a condition value lets a component run.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "false",
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Runs recipes against the component registry.
#[derive(Clone)]
pub struct Executor {
    components: Arc<ComponentRegistry>,
    http: reqwest::Client,
}

impl Executor {
    /// Create an executor over `components`.
    pub fn new(components: Arc<ComponentRegistry>) -> Self {
        Self {
            components,
            http: reqwest::Client::new(),
        }
    }

    /// Execute `recipe` once per prepared input.
    ///
    /// `connections` maps connection ids to their setup. Component failures
    /// are recorded in the outcome; an `Err` means the recipe itself could
    /// not be scheduled.
    pub async fn run(
        &self,
        run_uid: Uid,
        recipe: &Recipe,
        inputs: &[Value],
        connections: &HashMap<String, Value>,
    ) -> Result<RunOutcome> {
        let graph = DependencyGraph::from_recipe(recipe)?;
        let order = graph.topological_sort()?;
        let mut states: Vec<ElementState> =
            inputs.iter().cloned().map(ElementState::new).collect();
        let mut component_runs = Vec::new();

        for id in &order {
            let Some(config) = recipe.component.get(id) else {
                continue;
            };
            let dependencies = graph.dependencies(id);

            let slots = join_all(states.iter().map(|state| {
                self.run_element(id, config, &dependencies, state, connections)
            }))
            .await;

            let mut run = ComponentRun::start(run_uid, id);
            let mut executed = false;
            for (state, slot) in states.iter_mut().zip(slots) {
                match &slot {
                    Slot::Done { input, output } => {
                        executed = true;
                        run.inputs.push(input.clone());
                        run.outputs.push(output.clone());
                    }
                    Slot::Failed { input, error } => {
                        executed = true;
                        run.inputs.push(input.clone());
                        run.outputs.push(Value::Null);
                        if run.error.is_none() {
                            run.error = Some(error.clone());
                        }
                    }
                    Slot::Skipped => {}
                }
                state.slots.insert(id.clone(), slot);
            }

            if executed {
                run.finish();
                tracing::debug!(
                    pipeline_run_uid = %run_uid,
                    component_id = %id,
                    status = %run.status,
                    "Component finished"
                );
                component_runs.push(run);
            } else {
                tracing::debug!(component_id = %id, "Component skipped");
            }
        }

        let outputs = states
            .iter()
            .map(|state| {
                let mut out = Map::new();
                for (key, field) in &recipe.output {
                    let location = format!("output.{}", key);
                    let value = ReferenceParser::interpolate(
                        &Value::String(field.value.clone()),
                        &|reference: &Reference| state.resolve(&location, reference, connections),
                    )
                    .unwrap_or(Value::Null);
                    out.insert(key.clone(), value);
                }
                Value::Object(out)
            })
            .collect();

        let error = component_runs.iter().find_map(|r| r.error.clone());
        let status = if component_runs.iter().all(|r| r.status == RunStatus::Completed) {
            RunStatus::Completed
        } else {
            RunStatus::Failed
        };

        Ok(RunOutcome {
            outputs,
            component_runs,
            status,
            error,
        })
    }

    async fn run_element(
        &self,
        id: &str,
        config: &ComponentConfig,
        dependencies: &[&str],
        state: &ElementState,
        connections: &HashMap<String, Value>,
    ) -> Slot {
        if dependencies.iter().any(|d| !state.completed(d)) {
            return Slot::Skipped;
        }

        let resolver = |reference: &Reference| state.resolve(id, reference, connections);

        if let Some(condition) = &config.condition {
            match ReferenceParser::interpolate(&Value::String(condition.clone()), &resolver) {
                Ok(value) if is_truthy(&value) => {}
                Ok(_) => return Slot::Skipped,
                Err(e) => {
                    return Slot::Failed {
                        input: Value::Null,
                        error: e.user_message(),
                    }
                }
            }
        }

        let input = match ReferenceParser::interpolate(&config.input, &resolver) {
            Ok(input) => input,
            Err(e) => {
                return Slot::Failed {
                    input: Value::Null,
                    error: e.user_message(),
                }
            }
        };
        let setup = match config
            .setup
            .as_ref()
            .map(|s| ReferenceParser::interpolate(s, &resolver))
            .transpose()
        {
            Ok(setup) => setup,
            Err(e) => {
                return Slot::Failed {
                    input,
                    error: e.user_message(),
                }
            }
        };

        let Some(component) = self.components.get(&config.component_type) else {
            let error = PipewrightError::ExecutorUnavailable {
                component_type: config.component_type.clone(),
            };
            return Slot::Failed {
                input,
                error: error.user_message(),
            };
        };

        let ctx = ComponentContext::new(id, self.http.clone()).with_setup(setup);
        match component.execute(&ctx, &config.task, input.clone()).await {
            Ok(output) => Slot::Done { input, output },
            Err(e) => {
                tracing::warn!(component_id = %id, error = %e, "Component failed");
                Slot::Failed {
                    input,
                    error: e.user_message(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn executor() -> Executor {
        Executor::new(Arc::new(ComponentRegistry::standard()))
    }

    fn jq_recipe() -> Recipe {
        Recipe::from_json(json!({
            "variable": { "jota": { "format": "json" } },
            "component": {
                "json-0": {
                    "type": "json",
                    "task": "TASK_JQ",
                    "input": { "json-value": "${variable.jota}", "jq-filter": ".foo" }
                }
            },
            "output": { "answer": { "value": "${json-0.output.results[0]}" } }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn jq_pipeline_completes() {
        let outcome = executor()
            .run(
                Uid::new(),
                &jq_recipe(),
                &[json!({ "jota": { "foo": "bar" } })],
                &HashMap::new(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.status, RunStatus::Completed);
        assert_eq!(outcome.outputs, vec![json!({ "answer": "bar" })]);
        assert_eq!(outcome.component_runs.len(), 1);
        assert_eq!(outcome.component_runs[0].status, RunStatus::Completed);
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn missing_variable_fails_component() {
        let outcome = executor()
            .run(Uid::new(), &jq_recipe(), &[json!({})], &HashMap::new())
            .await
            .unwrap();

        assert_eq!(outcome.status, RunStatus::Failed);
        assert_eq!(outcome.component_runs[0].status, RunStatus::Failed);
        assert_eq!(outcome.outputs, vec![json!({ "answer": null })]);
        assert!(outcome.error.unwrap().contains("json-0"));
    }

    #[tokio::test]
    async fn failed_element_skips_dependents() {
        let recipe = Recipe::from_json(json!({
            "variable": { "s": { "format": "string" } },
            "component": {
                "parse": { "type": "json", "task": "TASK_UNMARSHAL", "input": { "string": "${variable.s}" } },
                "pick": {
                    "type": "json",
                    "task": "TASK_JQ",
                    "input": { "json-value": "${parse.output.json}", "jq-filter": ".a" }
                }
            },
            "output": { "a": { "value": "${pick.output.results[0]}" } }
        }))
        .unwrap();

        let outcome = executor()
            .run(
                Uid::new(),
                &recipe,
                &[json!({ "s": "{\"a\":1}" }), json!({ "s": "{" })],
                &HashMap::new(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.outputs, vec![json!({ "a": 1 }), json!({ "a": null })]);
        let parse = &outcome.component_runs[0];
        assert_eq!(parse.status, RunStatus::Failed);
        assert_eq!(parse.inputs.len(), 2);
        let pick = &outcome.component_runs[1];
        assert_eq!(pick.status, RunStatus::Completed);
        assert_eq!(pick.inputs.len(), 1);
        assert_eq!(outcome.status, RunStatus::Failed);
    }

    #[tokio::test]
    async fn false_condition_skips_component_and_dependents() {
        let recipe = Recipe::from_json(json!({
            "variable": { "go": { "format": "boolean" }, "t": { "format": "string" } },
            "component": {
                "enc": {
                    "type": "base64",
                    "task": "TASK_ENCODE",
                    "input": { "data": "${variable.t}" },
                    "condition": "${variable.go}"
                },
                "dec": { "type": "base64", "task": "TASK_DECODE", "input": { "data": "${enc.output.data}" } }
            },
            "output": { "round": { "value": "${dec.output.data}" } }
        }))
        .unwrap();

        let outcome = executor()
            .run(
                Uid::new(),
                &recipe,
                &[json!({ "go": false, "t": "x" })],
                &HashMap::new(),
            )
            .await
            .unwrap();
        assert!(outcome.component_runs.is_empty());
        assert_eq!(outcome.status, RunStatus::Completed);
        assert_eq!(outcome.outputs, vec![json!({ "round": null })]);

        let outcome = executor()
            .run(
                Uid::new(),
                &recipe,
                &[json!({ "go": true, "t": "x" })],
                &HashMap::new(),
            )
            .await
            .unwrap();
        assert_eq!(outcome.component_runs.len(), 2);
        assert_eq!(outcome.outputs, vec![json!({ "round": "x" })]);
    }

    #[tokio::test]
    async fn catalog_only_component_is_unavailable() {
        let recipe = Recipe::from_json(json!({
            "component": {
                "ai": { "type": "openai", "task": "TASK_TEXT_GENERATION", "input": {} }
            }
        }))
        .unwrap();
        let outcome = executor()
            .run(Uid::new(), &recipe, &[json!({})], &HashMap::new())
            .await
            .unwrap();
        assert_eq!(outcome.status, RunStatus::Failed);
        assert!(outcome.component_runs[0]
            .error
            .as_deref()
            .unwrap()
            .contains("openai"));
    }

    #[tokio::test]
    async fn connection_setup_is_resolved() {
        let recipe = Recipe::from_json(json!({
            "component": {
                "enc": {
                    "type": "base64",
                    "task": "TASK_ENCODE",
                    "input": { "data": "${connection.creds.user}" }
                }
            },
            "output": { "user": { "value": "${enc.input.data}" } }
        }))
        .unwrap();
        let connections: HashMap<String, Value> =
            [("creds".to_string(), json!({ "user": "alice" }))].into_iter().collect();

        let outcome = executor()
            .run(Uid::new(), &recipe, &[json!({})], &connections)
            .await
            .unwrap();
        assert_eq!(outcome.outputs, vec![json!({ "user": "alice" })]);
    }

    #[test]
    fn truthiness() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!("false")));
        assert!(!is_truthy(&json!(0)));
        assert!(is_truthy(&json!("yes")));
        assert!(is_truthy(&json!({})));
    }
}
