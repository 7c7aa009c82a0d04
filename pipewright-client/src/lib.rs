//! Type-safe Rust client for the Pipewright pipeline API.
//!
//! This crate provides a high-level, ergonomic interface to a Pipewright
//! server, reusing the resource types from `pipewright-core`.
//!
//! # Features
//!
//! - Type-safe API client with builder pattern
//! - Authentication support (Bearer token)
//! - Pipeline management (create, list, get, update, delete, rename, look up)
//! - Triggering, run history and operations
//! - Connections and referenced pipelines
//! - Component definitions, operator definitions and integrations
//! - Raw requests for negative-path checks
//!
//! # Example
//!
//! ```no_run
//! use pipewright_client::Client;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new("http://localhost:8080")?
//!     .with_api_key("my-secret-key");
//!
//! let pipeline = client
//!     .create_pipeline("users/admin", &json!({ "id": "hello", "recipe": {} }))
//!     .await?;
//! println!("Created: {}", pipeline.name);
//!
//! let response = client.trigger_pipeline("users/admin", "hello", &[json!({})]).await?;
//! println!("Run {} finished: {:?}", response.metadata.pipeline_run_uid, response.metadata.status);
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All operations return `Result<T, ClientError>`:
//!
//! ```no_run
//! # use pipewright_client::{Client, ClientError};
//! # async fn example() -> Result<(), ClientError> {
//! # let client = Client::new("http://localhost:8080")?;
//! match client.get_pipeline("users/admin", "my-pipeline", None).await {
//!     Ok(pipeline) => println!("Found: {}", pipeline.name),
//!     Err(ClientError::Api { status: 404, .. }) => println!("Pipeline not found"),
//!     Err(e) => println!("Error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```

mod catalog;
mod client;
mod connections;
mod error;
mod pipelines;
mod triggers;
mod types;

pub use client::{Client, DEFAULT_TIMEOUT};
pub use error::{ClientError, Result};
pub use reqwest::Method;
pub use types::{
    ComponentDefinitionList, ComponentRunList, ComponentRunResource, ConnectionList,
    ConnectionResource, DefinitionResource, HealthStatus, IntegrationList, IntegrationResource,
    ListOptions, Operation, OperationError, OperatorDefinitionList, PipelineList,
    PipelineResource, PipelineRunList, PipelineRunResource, PipelineState, RawResponse,
    ReferencedPipelines, RunStatus, TriggerMetadata, TriggerResponse, ValidationIssue,
    ValidationReport, View,
};
