//! Shared application state for API handlers.

use crate::catalog::Catalog;
use crate::config::ServiceConfig;
use crate::controller::{ConnectionController, PipelineController};
use crate::engine::{ComponentRegistry, Executor};
use crate::store::Stores;
use pipewright_core::auth::AuthConfig;
use pipewright_core::pagination::PageLimits;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state passed to all handlers.
pub struct AppState {
    /// Pipeline, trigger and run operations.
    pub pipelines: PipelineController,
    /// Connection operations.
    pub connections: ConnectionController,
    /// Component definitions and integrations.
    pub catalog: Arc<Catalog>,
    /// Authentication configuration.
    pub auth_config: AuthConfig,
    /// List page size limits.
    pub limits: PageLimits,
    /// Server start time.
    pub start_time: Instant,
}

impl AppState {
    /// Build the state for `config` with the built-in catalog and components.
    pub fn new(config: &ServiceConfig) -> Self {
        Self::with_components(config, ComponentRegistry::standard())
    }

    /// Build the state with a custom component registry.
    pub fn with_components(config: &ServiceConfig, components: ComponentRegistry) -> Self {
        let stores = Stores::new(
            config.runs.history_capacity,
            config.trigger.operation_capacity,
        );
        let catalog = Arc::new(Catalog::standard());
        let executor = Executor::new(Arc::new(components));

        Self {
            pipelines: PipelineController::new(
                stores.clone(),
                Arc::clone(&catalog),
                executor,
                config.listing,
                config.trigger_timeout(),
            ),
            connections: ConnectionController::new(stores, Arc::clone(&catalog), config.listing),
            catalog,
            auth_config: config.auth.clone(),
            limits: config.listing,
            start_time: Instant::now(),
        }
    }

    /// Get uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
