//! Health, component definitions, operator definitions and integrations.

use crate::client::{segment, Client};
use crate::error::Result;
use crate::types::{
    view_query, ComponentDefinitionList, DefinitionResource, HealthStatus, IntegrationList,
    IntegrationResource, ListOptions, OperatorDefinitionList, View,
};

impl Client {
    /// Check service health. Needs no credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable.
    pub async fn health(&self) -> Result<HealthStatus> {
        let response = self.get("health/pipeline", &[]).await?;
        self.handle_response(response).await
    }

    /// List component definitions (page-number pagination).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_component_definitions(
        &self,
        options: &ListOptions,
    ) -> Result<ComponentDefinitionList> {
        let response = self
            .get("component-definitions", &options.to_query())
            .await?;
        self.handle_response(response).await
    }

    /// Get a component definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the definition is unknown.
    pub async fn get_component_definition(
        &self,
        id: &str,
        view: Option<View>,
    ) -> Result<DefinitionResource> {
        let path = format!("component-definitions/{}", segment(id));
        let response = self.get(&path, &view_query(view)).await?;
        self.handle_field(response, "componentDefinition").await
    }

    /// List operator definitions.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_operator_definitions(
        &self,
        options: &ListOptions,
    ) -> Result<OperatorDefinitionList> {
        let response = self.get("operator-definitions", &options.to_query()).await?;
        self.handle_response(response).await
    }

    /// Get an operator definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is unknown or not an operator.
    pub async fn get_operator_definition(
        &self,
        id: &str,
        view: Option<View>,
    ) -> Result<DefinitionResource> {
        let path = format!("operator-definitions/{}", segment(id));
        let response = self.get(&path, &view_query(view)).await?;
        self.handle_field(response, "operatorDefinition").await
    }

    /// List integrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_integrations(&self, options: &ListOptions) -> Result<IntegrationList> {
        let response = self.get("integrations", &options.to_query()).await?;
        self.handle_response(response).await
    }

    /// Get an integration.
    ///
    /// # Errors
    ///
    /// Returns an error if the integration is unknown.
    pub async fn get_integration(&self, id: &str, view: Option<View>) -> Result<IntegrationResource> {
        let path = format!("integrations/{}", segment(id));
        let response = self.get(&path, &view_query(view)).await?;
        self.handle_field(response, "integration").await
    }
}
