//! In-memory registries.
//!
//! Each store guards its indexes with one lock, so create, rename and delete
//! are atomic with respect to concurrent requests.

mod connections;
mod operations;
mod pipelines;
mod runs;

pub use connections::ConnectionStore;
pub use operations::{OperationStore, OwnedOperation};
pub use pipelines::PipelineStore;
pub use runs::{RunHistory, RunRecord};

use parking_lot::RwLock;
use std::sync::Arc;

/// Handles to every store, shared by the controllers.
#[derive(Clone)]
pub struct Stores {
    /// Pipelines.
    pub pipelines: Arc<PipelineStore>,
    /// Connections.
    pub connections: Arc<ConnectionStore>,
    /// Pipeline and component runs.
    pub runs: Arc<RwLock<RunHistory>>,
    /// Async trigger operations.
    pub operations: Arc<OperationStore>,
}

impl Stores {
    /// Empty stores keeping at most `run_capacity` runs and
    /// `operation_capacity` async trigger operations.
    pub fn new(run_capacity: usize, operation_capacity: usize) -> Self {
        Self {
            pipelines: Arc::new(PipelineStore::new()),
            connections: Arc::new(ConnectionStore::new()),
            runs: Arc::new(RwLock::new(RunHistory::new(run_capacity))),
            operations: Arc::new(OperationStore::new(operation_capacity)),
        }
    }

    /// Insert or replace a run record.
    pub fn record_run(&self, record: RunRecord) {
        self.runs.write().upsert(record);
    }
}
