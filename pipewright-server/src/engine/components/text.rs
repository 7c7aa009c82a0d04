//! Text component: fixed-size chunking with overlap.

use crate::catalog::{definition, ComponentMetadata};
use crate::engine::component::{Component, ComponentContext, ComponentFuture};
use pipewright_core::model::{ComponentDefinition, ComponentType, TaskInfo};
use pipewright_core::Result;
use serde_json::{json, Value};

const DEFAULT_CHUNK_SIZE: u64 = 512;

/// Text processing.
pub struct TextComponent;

impl TextComponent {
    fn chunk(ctx: &ComponentContext, input: &Value) -> Result<Value> {
        let text = ctx.required_str(input, "text")?;
        let size = optional_u64(ctx, input, "chunk-size")?.unwrap_or(DEFAULT_CHUNK_SIZE) as usize;
        let overlap = optional_u64(ctx, input, "chunk-overlap")?.unwrap_or(0) as usize;
        if size == 0 {
            return Err(ctx.fail("chunk-size must be positive"));
        }
        if overlap >= size {
            return Err(ctx.fail("chunk-overlap must be smaller than chunk-size"));
        }

        let chars: Vec<char> = text.chars().collect();
        let mut chunks = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let end = (start + size).min(chars.len());
            chunks.push(json!({
                "text": chars[start..end].iter().collect::<String>(),
                "start-position": start,
                "end-position": end - 1,
            }));
            if end == chars.len() {
                break;
            }
            start = end - overlap;
        }

        Ok(json!({ "chunk-num": chunks.len(), "text-chunks": chunks }))
    }
}

fn optional_u64(ctx: &ComponentContext, input: &Value, field: &str) -> Result<Option<u64>> {
    match input.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or_else(|| ctx.fail(format!("input '{}' must be a non-negative integer", field))),
    }
}

impl Component for TextComponent {
    fn id(&self) -> &'static str {
        "text"
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a ComponentContext,
        task: &'a str,
        input: Value,
    ) -> ComponentFuture<'a> {
        Box::pin(async move {
            match task {
                "TASK_CHUNK_TEXT" => Self::chunk(ctx, &input),
                other => Err(ctx.unsupported_task(other)),
            }
        })
    }
}

impl ComponentMetadata for TextComponent {
    fn definition() -> ComponentDefinition {
        definition(
            "text",
            "Text",
            ComponentType::Operator,
            "Split text into overlapping chunks",
            vec![TaskInfo::new(
                "TASK_CHUNK_TEXT",
                "Chunk Text",
                "Split text into fixed-size chunks",
            )],
            json!({
                "tasks": {
                    "TASK_CHUNK_TEXT": {
                        "input": {
                            "type": "object",
                            "required": ["text"],
                            "properties": {
                                "text": { "type": "string" },
                                "chunk-size": { "type": "integer", "default": DEFAULT_CHUNK_SIZE },
                                "chunk-overlap": { "type": "integer", "default": 0 }
                            }
                        },
                        "output": {
                            "type": "object",
                            "properties": {
                                "chunk-num": { "type": "integer" },
                                "text-chunks": { "type": "array" }
                            }
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

    async fn chunk(input: Value) -> Result<Value> {
        let ctx = ComponentContext::new("text-0", reqwest::Client::new());
        TextComponent.execute(&ctx, "TASK_CHUNK_TEXT", input).await
    }

    #[tokio::test]
    async fn chunks_with_overlap() {
        let out = chunk(json!({ "text": "abcdefghij", "chunk-size": 4, "chunk-overlap": 1 }))
            .await
            .unwrap();
        let texts: Vec<&str> = out["text-chunks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["text"].as_str().unwrap())
            .collect();
        assert_eq!(texts, vec!["abcd", "defg", "ghij"]);
        assert_eq!(out["chunk-num"], 3);
        assert_eq!(out["text-chunks"][1]["start-position"], 3);
        assert_eq!(out["text-chunks"][1]["end-position"], 6);
    }

    #[tokio::test]
    async fn short_and_empty_text() {
        let out = chunk(json!({ "text": "hi" })).await.unwrap();
        assert_eq!(out["chunk-num"], 1);

        let out = chunk(json!({ "text": "" })).await.unwrap();
        assert_eq!(out["chunk-num"], 0);
    }

    #[tokio::test]
    async fn rejects_bad_sizes() {
        assert!(chunk(json!({ "text": "abc", "chunk-size": 0 })).await.is_err());
        assert!(chunk(json!({ "text": "abc", "chunk-size": 2, "chunk-overlap": 2 }))
            .await
            .is_err());
    }
}
