//! Pipeline management operations.
//!
//! `namespace` arguments are resource names such as `users/admin` or
//! `organizations/acme`.

use crate::client::{segment, Client};
use crate::error::Result;
use crate::types::{view_query, ListOptions, PipelineList, PipelineResource, ValidationReport, View};
use serde_json::{json, Value};

fn pipelines_path(namespace: &str) -> String {
    format!("{}/pipelines", namespace.trim_matches('/'))
}

fn pipeline_path(namespace: &str, id: &str) -> String {
    format!("{}/{}", pipelines_path(namespace), segment(id))
}

impl Client {
    /// Create a pipeline from a JSON body (`id`, `description`, `recipe`
    /// or `rawRecipe`, `tags`).
    ///
    /// # Errors
    ///
    /// Returns an error if the body is rejected or the id is taken.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use pipewright_client::Client;
    /// # use serde_json::json;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let client = Client::new("http://localhost:8080")?;
    /// let pipeline = client
    ///     .create_pipeline("users/admin", &json!({ "id": "my-pipeline", "recipe": {} }))
    ///     .await?;
    /// println!("Created {}", pipeline.name);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_pipeline(&self, namespace: &str, body: &Value) -> Result<PipelineResource> {
        let response = self.post(&pipelines_path(namespace), body).await?;
        self.handle_field(response, "pipeline").await
    }

    /// List the pipelines of a namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_pipelines(&self, namespace: &str, options: &ListOptions) -> Result<PipelineList> {
        let response = self
            .get(&pipelines_path(namespace), &options.to_query())
            .await?;
        self.handle_response(response).await
    }

    /// List pipelines across every namespace. Requires the admin scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_pipelines_admin(&self, options: &ListOptions) -> Result<PipelineList> {
        let response = self.get("admin/pipelines", &options.to_query()).await?;
        self.handle_response(response).await
    }

    /// Get a pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the pipeline is not found or the request fails.
    pub async fn get_pipeline(
        &self,
        namespace: &str,
        id: &str,
        view: Option<View>,
    ) -> Result<PipelineResource> {
        let response = self
            .get(&pipeline_path(namespace, id), &view_query(view))
            .await?;
        self.handle_field(response, "pipeline").await
    }

    /// Apply a partial update. Without `update_mask`, every top-level field
    /// of `patch` is updated.
    ///
    /// # Errors
    ///
    /// Returns an error if an immutable field is touched or the request fails.
    pub async fn update_pipeline(
        &self,
        namespace: &str,
        id: &str,
        patch: &Value,
        update_mask: Option<&str>,
    ) -> Result<PipelineResource> {
        let query: Vec<(&str, String)> = update_mask
            .map(|mask| vec![("updateMask", mask.to_string())])
            .unwrap_or_default();
        let response = self
            .patch(&pipeline_path(namespace, id), patch, &query)
            .await?;
        self.handle_field(response, "pipeline").await
    }

    /// Delete a pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the pipeline is not found or the request fails.
    pub async fn delete_pipeline(&self, namespace: &str, id: &str) -> Result<()> {
        let response = self.delete(&pipeline_path(namespace, id)).await?;
        self.handle_empty_response(response).await
    }

    /// Validate a pipeline's recipe against the current connections.
    ///
    /// # Errors
    ///
    /// Returns an error if the pipeline is not found or the request fails.
    pub async fn validate_pipeline(&self, namespace: &str, id: &str) -> Result<ValidationReport> {
        let path = format!("{}/validate", pipeline_path(namespace, id));
        let response = self.post(&path, &json!({})).await?;
        self.handle_response(response).await
    }

    /// Rename a pipeline, keeping its uid.
    ///
    /// # Errors
    ///
    /// Returns an error if the new id is invalid or taken.
    pub async fn rename_pipeline(
        &self,
        namespace: &str,
        id: &str,
        new_id: &str,
    ) -> Result<PipelineResource> {
        let path = format!("{}/rename", pipeline_path(namespace, id));
        let response = self
            .post(&path, &json!({ "newPipelineId": new_id }))
            .await?;
        self.handle_field(response, "pipeline").await
    }

    /// Find a pipeline by uid.
    ///
    /// # Errors
    ///
    /// Returns an error if no accessible pipeline has this uid.
    pub async fn lookup_pipeline(&self, uid: &str, view: Option<View>) -> Result<PipelineResource> {
        let path = format!("pipelines/{}/lookUp", segment(uid));
        let response = self.get(&path, &view_query(view)).await?;
        self.handle_field(response, "pipeline").await
    }

    /// Find a pipeline by uid in any namespace. Requires the admin scope.
    ///
    /// # Errors
    ///
    /// Returns an error if no pipeline has this uid.
    pub async fn lookup_pipeline_admin(
        &self,
        uid: &str,
        view: Option<View>,
    ) -> Result<PipelineResource> {
        let path = format!("admin/pipelines/{}/lookUp", segment(uid));
        let response = self.get(&path, &view_query(view)).await?;
        self.handle_field(response, "pipeline").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths() {
        assert_eq!(pipelines_path("users/admin"), "users/admin/pipelines");
        assert_eq!(pipeline_path("/organizations/acme/", "p-1"), "organizations/acme/pipelines/p-1");
    }
}
