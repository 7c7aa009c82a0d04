//! JSON component: marshal, unmarshal and jq.
//!
//! # Tasks
//! - `TASK_MARSHAL`: `{ json }` → `{ string }`
//! - `TASK_UNMARSHAL`: `{ string }` → `{ json }`
//! - `TASK_JQ`: `{ json-value | json-string, jq-filter }` → `{ results }`

use crate::catalog::{definition, ComponentMetadata};
use crate::engine::component::{Component, ComponentContext, ComponentFuture};
use crate::engine::jq::JqFilter;
use pipewright_core::model::{ComponentDefinition, ComponentType, TaskInfo};
use pipewright_core::Result;
use serde_json::{json, Value};

/// JSON manipulation.
pub struct JsonComponent;

impl JsonComponent {
    fn marshal(ctx: &ComponentContext, input: &Value) -> Result<Value> {
        let value = ctx.required(input, "json")?;
        let string = serde_json::to_string(value).map_err(|e| ctx.fail(e.to_string()))?;
        Ok(json!({ "string": string }))
    }

    fn unmarshal(ctx: &ComponentContext, input: &Value) -> Result<Value> {
        let raw = ctx.required_str(input, "string")?;
        let value: Value =
            serde_json::from_str(raw).map_err(|e| ctx.fail(format!("invalid JSON string: {}", e)))?;
        Ok(json!({ "json": value }))
    }

    fn jq(ctx: &ComponentContext, input: &Value) -> Result<Value> {
        let filter = ctx.required_str(input, "jq-filter")?;
        let value = match input.get("json-value") {
            Some(Value::Null) | None => {
                let raw = input
                    .get("json-string")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ctx.fail("missing required input 'json-value'"))?;
                serde_json::from_str(raw)
                    .map_err(|e| ctx.fail(format!("invalid JSON string: {}", e)))?
            }
            Some(value) => value.clone(),
        };

        let results = JqFilter::compile(filter)
            .and_then(|f| f.run(&value))
            .map_err(|e| ctx.fail(format!("jq: {}", e)))?;
        Ok(json!({ "results": results }))
    }
}

impl Component for JsonComponent {
    fn id(&self) -> &'static str {
        "json"
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a ComponentContext,
        task: &'a str,
        input: Value,
    ) -> ComponentFuture<'a> {
        Box::pin(async move {
            match task {
                "TASK_MARSHAL" => Self::marshal(ctx, &input),
                "TASK_UNMARSHAL" => Self::unmarshal(ctx, &input),
                "TASK_JQ" => Self::jq(ctx, &input),
                other => Err(ctx.unsupported_task(other)),
            }
        })
    }
}

impl ComponentMetadata for JsonComponent {
    fn definition() -> ComponentDefinition {
        definition(
            "json",
            "JSON",
            ComponentType::Operator,
            "Manipulate and convert JSON values",
            vec![
                TaskInfo::new("TASK_MARSHAL", "Marshal", "Convert a JSON value to a string"),
                TaskInfo::new("TASK_UNMARSHAL", "Unmarshal", "Parse a string into a JSON value"),
                TaskInfo::new("TASK_JQ", "jq", "Process JSON through a jq filter"),
            ],
            json!({
                "tasks": {
                    "TASK_MARSHAL": {
                        "input": {
                            "type": "object",
                            "required": ["json"],
                            "properties": { "json": { "title": "JSON" } }
                        },
                        "output": {
                            "type": "object",
                            "properties": { "string": { "type": "string" } }
                        }
                    },
                    "TASK_UNMARSHAL": {
                        "input": {
                            "type": "object",
                            "required": ["string"],
                            "properties": { "string": { "type": "string" } }
                        },
                        "output": {
                            "type": "object",
                            "properties": { "json": { "title": "JSON" } }
                        }
                    },
                    "TASK_JQ": {
                        "input": {
                            "type": "object",
                            "required": ["jq-filter"],
                            "properties": {
                                "json-value": { "title": "JSON value" },
                                "json-string": { "type": "string" },
                                "jq-filter": { "type": "string" }
                            }
                        },
                        "output": {
                            "type": "object",
                            "properties": { "results": { "type": "array" } }
                        }
                    }
                }
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ComponentContext {
        ComponentContext::new("json-0", reqwest::Client::new())
    }

    #[tokio::test]
    async fn jq_extracts_field() {
        let ctx = ctx();
        let out = JsonComponent
            .execute(
                &ctx,
                "TASK_JQ",
                json!({ "json-value": { "foo": "bar" }, "jq-filter": ".foo" }),
            )
            .await
            .unwrap();
        assert_eq!(out, json!({ "results": ["bar"] }));
    }

    #[tokio::test]
    async fn jq_accepts_json_string() {
        let ctx = ctx();
        let out = JsonComponent
            .execute(
                &ctx,
                "TASK_JQ",
                json!({ "json-string": "[1,2]", "jq-filter": ".[]" }),
            )
            .await
            .unwrap();
        assert_eq!(out["results"], json!([1, 2]));
    }

    #[tokio::test]
    async fn jq_without_value_fails() {
        let ctx = ctx();
        let err = JsonComponent
            .execute(&ctx, "TASK_JQ", json!({ "json-value": null, "jq-filter": ".foo" }))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E501");
    }

    #[tokio::test]
    async fn marshal_and_unmarshal() {
        let ctx = ctx();
        let out = JsonComponent
            .execute(&ctx, "TASK_MARSHAL", json!({ "json": { "a": 1 } }))
            .await
            .unwrap();
        assert_eq!(out["string"], "{\"a\":1}");

        let out = JsonComponent
            .execute(&ctx, "TASK_UNMARSHAL", json!({ "string": "{\"a\":1}" }))
            .await
            .unwrap();
        assert_eq!(out["json"], json!({ "a": 1 }));

        assert!(JsonComponent
            .execute(&ctx, "TASK_UNMARSHAL", json!({ "string": "{" }))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn unknown_task() {
        let ctx = ctx();
        assert!(JsonComponent
            .execute(&ctx, "TASK_NOPE", json!({}))
            .await
            .is_err());
    }
}
