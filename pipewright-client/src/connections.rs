//! Namespace connection operations.
//!
//! Connections live under `namespaces/{namespace_id}`, where the id is a
//! user or organization id.

use crate::client::{segment, Client};
use crate::error::Result;
use crate::types::{view_query, ConnectionList, ConnectionResource, ListOptions, ReferencedPipelines, View};
use serde_json::Value;

fn connections_path(namespace_id: &str) -> String {
    format!("namespaces/{}/connections", segment(namespace_id))
}

fn connection_path(namespace_id: &str, id: &str) -> String {
    format!("{}/{}", connections_path(namespace_id), segment(id))
}

impl Client {
    /// Create a connection (`id`, `integrationId`, `method`, `setup`).
    ///
    /// # Errors
    ///
    /// Returns an error if the integration is unknown or the id is taken.
    pub async fn create_connection(&self, namespace_id: &str, body: &Value) -> Result<ConnectionResource> {
        let response = self.post(&connections_path(namespace_id), body).await?;
        self.handle_field(response, "connection").await
    }

    /// List the connections of a namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_connections(
        &self,
        namespace_id: &str,
        options: &ListOptions,
    ) -> Result<ConnectionList> {
        let response = self
            .get(&connections_path(namespace_id), &options.to_query())
            .await?;
        self.handle_response(response).await
    }

    /// Get a connection. Secret setup fields come back redacted.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is not found.
    pub async fn get_connection(
        &self,
        namespace_id: &str,
        id: &str,
        view: Option<View>,
    ) -> Result<ConnectionResource> {
        let response = self
            .get(&connection_path(namespace_id, id), &view_query(view))
            .await?;
        self.handle_field(response, "connection").await
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns an error if an immutable field is touched or the request fails.
    pub async fn update_connection(
        &self,
        namespace_id: &str,
        id: &str,
        patch: &Value,
        update_mask: Option<&str>,
    ) -> Result<ConnectionResource> {
        let query: Vec<(&str, String)> = update_mask
            .map(|mask| vec![("updateMask", mask.to_string())])
            .unwrap_or_default();
        let response = self
            .patch(&connection_path(namespace_id, id), patch, &query)
            .await?;
        self.handle_field(response, "connection").await
    }

    /// Delete a connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is not found.
    pub async fn delete_connection(&self, namespace_id: &str, id: &str) -> Result<()> {
        let response = self.delete(&connection_path(namespace_id, id)).await?;
        self.handle_empty_response(response).await
    }

    /// Ids of the pipelines whose recipes reference a connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is not found.
    pub async fn referenced_pipelines(
        &self,
        namespace_id: &str,
        id: &str,
        options: &ListOptions,
    ) -> Result<ReferencedPipelines> {
        let path = format!("{}/referenced-pipelines", connection_path(namespace_id, id));
        let response = self.get(&path, &options.to_query()).await?;
        self.handle_response(response).await
    }
}
