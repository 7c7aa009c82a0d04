//! Per-virtual-user context handed to suites.

use crate::checks::Checks;
use pipewright_client::{Client, Method, RawResponse};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::Value;
use std::sync::Arc;

/// Length of the random part of generated resource ids.
const SUFFIX_LEN: usize = 8;

/// One virtual user: its clients, namespace and the shared check recorder.
pub struct VirtualUser {
    /// Zero-based virtual user number.
    pub number: usize,
    /// Client authenticated as the namespace owner.
    pub client: Client,
    /// Client with no credentials.
    pub anonymous: Client,
    /// Client authenticated as an identity outside the namespace.
    pub foreign: Option<Client>,
    /// Namespace resource name, e.g. `users/admin`.
    pub namespace: String,
    /// Namespace id, e.g. `admin`.
    pub namespace_id: String,
    checks: Arc<Checks>,
}

impl VirtualUser {
    /// Create a virtual user.
    pub fn new(
        number: usize,
        client: Client,
        anonymous: Client,
        foreign: Option<Client>,
        namespace: impl Into<String>,
        namespace_id: impl Into<String>,
        checks: Arc<Checks>,
    ) -> Self {
        Self {
            number,
            client,
            anonymous,
            foreign,
            namespace: namespace.into(),
            namespace_id: namespace_id.into(),
            checks,
        }
    }

    /// Record a check.
    pub fn check(&self, name: &str, ok: bool) -> bool {
        self.checks.check(name, ok)
    }

    /// A fresh resource id, e.g. `lt-pipe-3-k2x9a0qz`.
    pub fn unique_id(&self, prefix: &str) -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SUFFIX_LEN)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect();
        format!("lt-{}-{}-{}", prefix, self.number, suffix)
    }

    /// `{ns}/pipelines`.
    pub fn pipelines_path(&self) -> String {
        format!("{}/pipelines", self.namespace)
    }

    /// `{ns}/pipelines/{id}`.
    pub fn pipeline_path(&self, id: &str) -> String {
        format!("{}/pipelines/{}", self.namespace, id)
    }

    /// `namespaces/{id}/connections`.
    pub fn connections_path(&self) -> String {
        format!("namespaces/{}/connections", self.namespace_id)
    }

    /// `namespaces/{id}/connections/{connection}`.
    pub fn connection_path(&self, id: &str) -> String {
        format!("{}/{}", self.connections_path(), id)
    }

    /// Send a request as the namespace owner.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> pipewright_client::Result<RawResponse> {
        self.client.raw(method, path, body).await
    }

    /// Delete a pipeline, ignoring the outcome.
    pub async fn cleanup_pipeline(&self, id: &str) {
        if let Err(e) = self.send(Method::DELETE, &self.pipeline_path(id), None).await {
            tracing::debug!(vu = self.number, pipeline = id, error = %e, "Cleanup failed");
        }
    }

    /// Delete a connection, ignoring the outcome.
    pub async fn cleanup_connection(&self, id: &str) {
        if let Err(e) = self.send(Method::DELETE, &self.connection_path(id), None).await {
            tracing::debug!(vu = self.number, connection = id, error = %e, "Cleanup failed");
        }
    }
}
