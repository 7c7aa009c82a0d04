//! Connection registry.

use parking_lot::RwLock;
use pipewright_core::model::Connection;
use pipewright_core::types::Namespace;
use pipewright_core::{PipewrightError, Result};
use std::collections::{HashMap, HashSet};

type Key = (String, String);

fn key(namespace: &Namespace, id: &str) -> Key {
    (namespace.id.to_string(), id.to_string())
}

fn not_found(namespace: &Namespace, id: &str) -> PipewrightError {
    PipewrightError::ConnectionNotFound {
        name: format!("namespaces/{}/connections/{}", namespace.id, id),
    }
}

/// Connections keyed by `(namespace id, connection id)`.
#[derive(Default)]
pub struct ConnectionStore {
    inner: RwLock<HashMap<Key, Connection>>,
}

impl ConnectionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new connection; fails if the id is taken in its namespace.
    pub fn create(&self, connection: Connection) -> Result<Connection> {
        let key = key(&connection.namespace, connection.id.as_str());
        let mut map = self.inner.write();
        if map.contains_key(&key) {
            return Err(PipewrightError::AlreadyExists {
                kind: "connection",
                name: connection.name(),
            });
        }
        map.insert(key, connection.clone());
        Ok(connection)
    }

    /// Get a connection.
    pub fn get(&self, namespace: &Namespace, id: &str) -> Result<Connection> {
        self.inner
            .read()
            .get(&key(namespace, id))
            .cloned()
            .ok_or_else(|| not_found(namespace, id))
    }

    /// Connections of `namespace`, newest first.
    pub fn list(&self, namespace: &Namespace) -> Vec<Connection> {
        let owner = namespace.id.as_str();
        let mut connections: Vec<Connection> = self
            .inner
            .read()
            .iter()
            .filter(|((ns, _), _)| ns == owner)
            .map(|(_, c)| c.clone())
            .collect();
        connections.sort_by_cached_key(Connection::list_key);
        connections
    }

    /// Ids of the connections in `namespace`.
    pub fn ids(&self, namespace: &Namespace) -> HashSet<String> {
        let owner = namespace.id.as_str();
        self.inner
            .read()
            .keys()
            .filter(|(ns, _)| ns == owner)
            .map(|(_, id)| id.clone())
            .collect()
    }

    /// Modify a connection; the stored value changes only if `f` succeeds.
    pub fn update(
        &self,
        namespace: &Namespace,
        id: &str,
        f: impl FnOnce(&mut Connection) -> Result<()>,
    ) -> Result<Connection> {
        let mut map = self.inner.write();
        let slot = map
            .get_mut(&key(namespace, id))
            .ok_or_else(|| not_found(namespace, id))?;
        let mut updated = slot.clone();
        f(&mut updated)?;
        *slot = updated.clone();
        Ok(updated)
    }

    /// Remove a connection.
    pub fn delete(&self, namespace: &Namespace, id: &str) -> Result<Connection> {
        self.inner
            .write()
            .remove(&key(namespace, id))
            .ok_or_else(|| not_found(namespace, id))
    }
}
