//! Third-party components listed in the catalog without a runtime executor.

use super::{definition, ComponentMetadata};
use pipewright_core::model::{ComponentDefinition, ComponentType, OAuthConfig, TaskInfo};
use serde_json::json;

/// OpenAI text generation and embeddings.
pub struct OpenAiComponent;

impl ComponentMetadata for OpenAiComponent {
    fn definition() -> ComponentDefinition {
        let mut def = definition(
            "openai",
            "OpenAI",
            ComponentType::Ai,
            "Connect the AI models served on the OpenAI Platform",
            vec![
                TaskInfo::new("TASK_TEXT_GENERATION", "Text Generation", "Generate text from a prompt"),
                TaskInfo::new("TASK_TEXT_EMBEDDINGS", "Text Embeddings", "Embed text into vectors"),
            ],
            json!({
                "setup": {
                    "type": "object",
                    "required": ["api-key"],
                    "properties": {
                        "api-key": { "type": "string", "title": "API Key", "secret": true },
                        "organization": { "type": "string", "title": "Organization ID" }
                    }
                },
                "tasks": {
                    "TASK_TEXT_GENERATION": {
                        "input": {
                            "type": "object",
                            "required": ["model", "prompt"],
                            "properties": {
                                "model": { "type": "string" },
                                "prompt": { "type": "string" },
                                "system-message": { "type": "string" }
                            }
                        },
                        "output": {
                            "type": "object",
                            "properties": { "texts": { "type": "array" } }
                        }
                    },
                    "TASK_TEXT_EMBEDDINGS": {
                        "input": {
                            "type": "object",
                            "required": ["model", "text"],
                            "properties": {
                                "model": { "type": "string" },
                                "text": { "type": "string" }
                            }
                        },
                        "output": {
                            "type": "object",
                            "properties": { "embedding": { "type": "array" } }
                        }
                    }
                }
            }),
        );
        def.vendor = "OpenAI".to_string();
        def.executable = false;
        def
    }
}

/// Pinecone vector database.
pub struct PineconeComponent;

impl ComponentMetadata for PineconeComponent {
    fn definition() -> ComponentDefinition {
        let mut def = definition(
            "pinecone",
            "Pinecone",
            ComponentType::Data,
            "Build generative AI applications with a vector database",
            vec![
                TaskInfo::new("TASK_QUERY", "Query", "Retrieve the nearest vectors"),
                TaskInfo::new("TASK_UPSERT", "Upsert", "Write vectors into a namespace"),
            ],
            json!({
                "setup": {
                    "type": "object",
                    "required": ["api-key", "url"],
                    "properties": {
                        "api-key": { "type": "string", "title": "API Key", "secret": true },
                        "url": { "type": "string", "title": "Pinecone Base URL" }
                    }
                },
                "tasks": {
                    "TASK_QUERY": {
                        "input": {
                            "type": "object",
                            "required": ["vector", "top-k"],
                            "properties": {
                                "vector": { "type": "array" },
                                "top-k": { "type": "integer" },
                                "namespace": { "type": "string" }
                            }
                        }
                    },
                    "TASK_UPSERT": {
                        "input": {
                            "type": "object",
                            "required": ["id", "values"],
                            "properties": {
                                "id": { "type": "string" },
                                "values": { "type": "array" },
                                "metadata": { "type": "object" }
                            }
                        }
                    }
                }
            }),
        );
        def.vendor = "Pinecone".to_string();
        def.executable = false;
        def
    }
}

/// Slack messaging.
pub struct SlackComponent;

impl ComponentMetadata for SlackComponent {
    fn definition() -> ComponentDefinition {
        let mut def = definition(
            "slack",
            "Slack",
            ComponentType::Application,
            "Read and write messages in Slack channels",
            vec![
                TaskInfo::new("TASK_READ_MESSAGE", "Read Message", "Read messages from a channel"),
                TaskInfo::new("TASK_WRITE_MESSAGE", "Write Message", "Post a message to a channel"),
            ],
            json!({
                "setup": {
                    "type": "object",
                    "required": ["bot-token"],
                    "properties": {
                        "bot-token": { "type": "string", "title": "Bot OAuth Token", "secret": true },
                        "user-token": { "type": "string", "title": "User OAuth Token", "secret": true }
                    }
                },
                "tasks": {
                    "TASK_READ_MESSAGE": {
                        "input": {
                            "type": "object",
                            "required": ["channel-name"],
                            "properties": { "channel-name": { "type": "string" } }
                        }
                    },
                    "TASK_WRITE_MESSAGE": {
                        "input": {
                            "type": "object",
                            "required": ["channel-name", "message"],
                            "properties": {
                                "channel-name": { "type": "string" },
                                "message": { "type": "string" }
                            }
                        }
                    }
                }
            }),
        );
        def.vendor = "Slack".to_string();
        def.executable = false;
        def
    }

    fn oauth() -> Option<OAuthConfig> {
        Some(OAuthConfig {
            auth_url: "https://slack.com/oauth/v2/authorize".to_string(),
            access_url: "https://slack.com/api/oauth.v2.access".to_string(),
            scopes: vec![
                "channels:history".to_string(),
                "channels:read".to_string(),
                "chat:write".to_string(),
            ],
        })
    }
}
