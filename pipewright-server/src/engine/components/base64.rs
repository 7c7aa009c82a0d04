//! Base64 component.

use crate::catalog::{definition, ComponentMetadata};
use crate::engine::component::{Component, ComponentContext, ComponentFuture};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pipewright_core::model::{ComponentDefinition, ComponentType, TaskInfo};
use serde_json::{json, Value};

/// Encode and decode base64 text.
pub struct Base64Component;

impl Component for Base64Component {
    fn id(&self) -> &'static str {
        "base64"
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a ComponentContext,
        task: &'a str,
        input: Value,
    ) -> ComponentFuture<'a> {
        Box::pin(async move {
            let data = ctx.required_str(&input, "data")?;
            match task {
                "TASK_ENCODE" => Ok(json!({ "data": STANDARD.encode(data) })),
                "TASK_DECODE" => {
                    let bytes = STANDARD
                        .decode(data.trim())
                        .map_err(|e| ctx.fail(format!("invalid base64: {}", e)))?;
                    let text = String::from_utf8(bytes)
                        .map_err(|_| ctx.fail("decoded data is not UTF-8 text"))?;
                    Ok(json!({ "data": text }))
                }
                other => Err(ctx.unsupported_task(other)),
            }
        })
    }
}

impl ComponentMetadata for Base64Component {
    fn definition() -> ComponentDefinition {
        let data = json!({
            "type": "object",
            "required": ["data"],
            "properties": { "data": { "type": "string" } }
        });
        definition(
            "base64",
            "Base64",
            ComponentType::Operator,
            "Encode or decode a string in base64",
            vec![
                TaskInfo::new("TASK_ENCODE", "Encode", "Encode text as base64"),
                TaskInfo::new("TASK_DECODE", "Decode", "Decode base64 to text"),
            ],
            json!({
                "tasks": {
                    "TASK_ENCODE": { "input": data.clone(), "output": data.clone() },
                    "TASK_DECODE": { "input": data.clone(), "output": data }
                }
            }),
        )
    }
}
