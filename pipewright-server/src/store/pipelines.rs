//! Pipeline registry.

use parking_lot::RwLock;
use pipewright_core::model::Pipeline;
use pipewright_core::types::{Namespace, ResourceId, Uid};
use pipewright_core::{PipewrightError, Result};
use std::collections::HashMap;

type Key = (String, String);

fn key(namespace: &Namespace, id: &str) -> Key {
    (namespace.name(), id.to_string())
}

fn not_found(namespace: &Namespace, id: &str) -> PipewrightError {
    PipewrightError::PipelineNotFound {
        name: format!("{}/pipelines/{}", namespace, id),
    }
}

#[derive(Default)]
struct Index {
    by_name: HashMap<Key, Pipeline>,
    by_uid: HashMap<Uid, Key>,
}

/// Pipelines keyed by `(namespace, id)` with a uid index.
#[derive(Default)]
pub struct PipelineStore {
    inner: RwLock<Index>,
}

impl PipelineStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new pipeline; fails if the id is taken in its namespace.
    pub fn create(&self, pipeline: Pipeline) -> Result<Pipeline> {
        let key = key(&pipeline.namespace, pipeline.id.as_str());
        let mut index = self.inner.write();
        if index.by_name.contains_key(&key) {
            return Err(PipewrightError::AlreadyExists {
                kind: "pipeline",
                name: pipeline.name(),
            });
        }
        index.by_uid.insert(pipeline.uid, key.clone());
        index.by_name.insert(key, pipeline.clone());
        Ok(pipeline)
    }

    /// Get a pipeline by namespace and id.
    pub fn get(&self, namespace: &Namespace, id: &str) -> Result<Pipeline> {
        self.inner
            .read()
            .by_name
            .get(&key(namespace, id))
            .cloned()
            .ok_or_else(|| not_found(namespace, id))
    }

    /// Get a pipeline by uid.
    pub fn get_by_uid(&self, uid: &Uid) -> Option<Pipeline> {
        let index = self.inner.read();
        index
            .by_uid
            .get(uid)
            .and_then(|key| index.by_name.get(key))
            .cloned()
    }

    /// Pipelines in `namespace` (all when `None`), newest first.
    pub fn list(&self, namespace: Option<&Namespace>) -> Vec<Pipeline> {
        let owner = namespace.map(Namespace::name);
        let mut pipelines: Vec<Pipeline> = self
            .inner
            .read()
            .by_name
            .iter()
            .filter(|((ns, _), _)| owner.as_ref().map_or(true, |owner| owner == ns))
            .map(|(_, p)| p.clone())
            .collect();
        pipelines.sort_by_cached_key(Pipeline::list_key);
        pipelines
    }

    /// Modify a pipeline in place.
    ///
    /// `f` works on a copy; the stored pipeline changes only if it succeeds.
    pub fn update<T>(
        &self,
        namespace: &Namespace,
        id: &str,
        f: impl FnOnce(&mut Pipeline) -> Result<T>,
    ) -> Result<(Pipeline, T)> {
        let mut index = self.inner.write();
        let slot = index
            .by_name
            .get_mut(&key(namespace, id))
            .ok_or_else(|| not_found(namespace, id))?;
        let mut updated = slot.clone();
        let out = f(&mut updated)?;
        *slot = updated.clone();
        Ok((updated, out))
    }

    /// Move a pipeline to a new id under one lock, keeping its uid.
    pub fn rename(&self, namespace: &Namespace, id: &str, new_id: ResourceId) -> Result<Pipeline> {
        let mut index = self.inner.write();
        let old_key = key(namespace, id);
        let new_key = key(namespace, new_id.as_str());

        let current = index
            .by_name
            .get(&old_key)
            .ok_or_else(|| not_found(namespace, id))?;
        if old_key != new_key && index.by_name.contains_key(&new_key) {
            return Err(PipewrightError::AlreadyExists {
                kind: "pipeline",
                name: format!("{}/pipelines/{}", namespace, new_id),
            });
        }

        let renamed = current.renamed(new_id);
        index.by_name.remove(&old_key);
        index.by_uid.insert(renamed.uid, new_key.clone());
        index.by_name.insert(new_key, renamed.clone());
        Ok(renamed)
    }

    /// Remove a pipeline.
    pub fn delete(&self, namespace: &Namespace, id: &str) -> Result<Pipeline> {
        let mut index = self.inner.write();
        let removed = index
            .by_name
            .remove(&key(namespace, id))
            .ok_or_else(|| not_found(namespace, id))?;
        index.by_uid.remove(&removed.uid);
        Ok(removed)
    }

    /// Number of stored pipelines.
    pub fn len(&self) -> usize {
        self.inner.read().by_name.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
