//! Pipewright Server - reference pipeline service.
//!
//! This crate provides:
//! - REST API over hyper 1.x (`/v1beta/...`)
//! - In-memory pipeline, connection, run and operation stores
//! - Built-in component catalog and integrations
//! - Recipe executor with sync and async triggering
//! - Service configuration and logging setup

#![warn(missing_docs)]

pub mod api;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod engine;
pub mod observability;
pub mod store;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::api::{ApiError, ApiServer, AppState, ServerConfig, ServerHandle};
    pub use crate::catalog::{Catalog, ComponentMetadata};
    pub use crate::config::ServiceConfig;
    pub use crate::controller::{ConnectionController, ListQuery, PipelineController};
    pub use crate::engine::{
        Component, ComponentContext, ComponentFuture, ComponentRegistry, Executor, RunOutcome,
    };
    pub use crate::observability::{init_tracing, LogFormat, TracingConfig, TracingGuard};
    pub use crate::store::{RunRecord, Stores};
}
