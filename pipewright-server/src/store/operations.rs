//! Asynchronous trigger operations.

use dashmap::DashMap;
use parking_lot::Mutex;
use pipewright_core::model::{Operation, OPERATION_PREFIX};
use pipewright_core::{Namespace, PipewrightError, Result};
use std::collections::VecDeque;

/// An operation and the namespace of the pipeline that started it.
#[derive(Debug, Clone)]
pub struct OwnedOperation {
    /// Namespace of the triggered pipeline.
    pub namespace: Namespace,
    /// The operation.
    pub operation: Operation,
}

/// Operations keyed by id (the part after `operations/`).
///
/// Holds at most `capacity` operations. When full, the oldest finished
/// operation is evicted, or the oldest pending one if none has finished.
pub struct OperationStore {
    capacity: usize,
    operations: DashMap<String, OwnedOperation>,
    order: Mutex<VecDeque<String>>,
}

impl OperationStore {
    /// Create an empty store holding at most `capacity` operations.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            operations: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
        }
    }

    /// Register a new pending operation owned by `namespace` and return it.
    pub fn start(&self, namespace: &Namespace) -> Operation {
        let operation = Operation::pending();
        let id = operation.id().to_string();

        let mut order = self.order.lock();
        self.operations.insert(
            id.clone(),
            OwnedOperation {
                namespace: namespace.clone(),
                operation: operation.clone(),
            },
        );
        order.push_back(id);
        while order.len() > self.capacity {
            let victim = order
                .iter()
                .position(|id| {
                    self.operations
                        .get(id)
                        .map_or(true, |entry| entry.operation.done)
                })
                .unwrap_or(0);
            if let Some(evicted) = order.remove(victim) {
                self.operations.remove(&evicted);
                tracing::debug!(operation = %evicted, "Operation evicted");
            }
        }
        operation
    }

    /// Get an operation by id or by full name.
    pub fn get(&self, id: &str) -> Result<OwnedOperation> {
        let id = id.strip_prefix(OPERATION_PREFIX).unwrap_or(id);
        self.operations
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| PipewrightError::OperationNotFound {
                name: format!("{}{}", OPERATION_PREFIX, id),
            })
    }

    /// Modify a stored operation. Evicted operations are ignored.
    pub fn finish(&self, id: &str, f: impl FnOnce(&mut Operation)) {
        if let Some(mut entry) = self.operations.get_mut(id) {
            f(&mut entry.value_mut().operation);
        }
    }

    /// Number of operations held.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
