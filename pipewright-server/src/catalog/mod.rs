//! Built-in component definitions and the integrations derived from them.
//!
//! Every component declares its catalog entry through [`ComponentMetadata`];
//! [`Catalog::standard`] registers the built-ins in listing order.

mod vendors;

pub use vendors::{OpenAiComponent, PineconeComponent, SlackComponent};

use crate::engine::components::{Base64Component, HttpComponent, JsonComponent, TextComponent};
use indexmap::IndexMap;
use pipewright_core::model::{
    ComponentDefinition, ComponentType, Integration, OAuthConfig, ReleaseStage, TaskInfo,
};
use pipewright_core::recipe::ComponentCatalog;
use pipewright_core::{PipewrightError, Result, Uid};
use serde_json::Value;

/// Vendor name of the built-in components.
pub const BUILTIN_VENDOR: &str = "Pipewright";

/// Version of the built-in definitions.
pub const DEFINITION_VERSION: &str = "0.1.0";

/// Trait for components to declare their catalog entry.
///
/// # Example
///
/// ```rust
/// use pipewright_core::model::{ComponentDefinition, ComponentType, TaskInfo};
/// use pipewright_server::catalog::{definition, ComponentMetadata};
///
/// struct Echo;
///
/// impl ComponentMetadata for Echo {
///     fn definition() -> ComponentDefinition {
///         definition(
///             "echo",
///             "Echo",
///             ComponentType::Operator,
///             "Returns its input",
///             vec![TaskInfo::new("TASK_ECHO", "Echo", "Return the input")],
///             serde_json::json!({ "tasks": { "TASK_ECHO": {} } }),
///         )
///     }
/// }
///
/// assert_eq!(Echo::definition().id, "echo");
/// ```
pub trait ComponentMetadata {
    /// Catalog entry for this component.
    fn definition() -> ComponentDefinition;

    /// OAuth endpoints, for components whose integration supports OAuth.
    fn oauth() -> Option<OAuthConfig> {
        None
    }
}

/// Build a public, executable alpha definition from the built-in vendor.
pub fn definition(
    id: &str,
    title: &str,
    component_type: ComponentType,
    description: &str,
    tasks: Vec<TaskInfo>,
    spec: Value,
) -> ComponentDefinition {
    ComponentDefinition {
        uid: Uid::new(),
        id: id.to_string(),
        title: title.to_string(),
        component_type,
        description: description.to_string(),
        vendor: BUILTIN_VENDOR.to_string(),
        version: DEFINITION_VERSION.to_string(),
        tasks,
        spec,
        release_stage: ReleaseStage::Alpha,
        public: true,
        tombstone: false,
        executable: true,
    }
}

/// Component definitions and integrations, in registration order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    definitions: IndexMap<String, ComponentDefinition>,
    integrations: IndexMap<String, Integration>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every built-in component.
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        catalog.register::<JsonComponent>();
        catalog.register::<Base64Component>();
        catalog.register::<TextComponent>();
        catalog.register::<HttpComponent>();
        catalog.register::<OpenAiComponent>();
        catalog.register::<PineconeComponent>();
        catalog.register::<SlackComponent>();
        catalog
    }

    /// Register a component; components with a setup schema also become
    /// integrations.
    pub fn register<T: ComponentMetadata>(&mut self) {
        let definition = T::definition();
        if let Some(setup) = definition.spec.get("setup") {
            let integration = Integration {
                uid: Uid::new(),
                id: definition.id.clone(),
                title: definition.title.clone(),
                vendor: definition.vendor.clone(),
                description: definition.description.clone(),
                icon: format!("assets/{}.svg", definition.id),
                setup_schema: setup.clone(),
                oauth_config: T::oauth(),
                help_link: None,
            };
            self.integrations.insert(integration.id.clone(), integration);
        }
        self.definitions.insert(definition.id.clone(), definition);
    }

    /// Look up a component definition.
    pub fn definition(&self, id: &str) -> Result<&ComponentDefinition> {
        self.definitions
            .get(id)
            .ok_or_else(|| PipewrightError::DefinitionNotFound { id: id.to_string() })
    }

    /// Every component definition.
    pub fn definitions(&self) -> Vec<ComponentDefinition> {
        self.definitions.values().cloned().collect()
    }

    /// Definitions of type `COMPONENT_TYPE_OPERATOR`.
    pub fn operators(&self) -> Vec<ComponentDefinition> {
        self.definitions
            .values()
            .filter(|d| d.component_type == ComponentType::Operator)
            .cloned()
            .collect()
    }

    /// Look up an operator definition.
    pub fn operator(&self, id: &str) -> Result<&ComponentDefinition> {
        self.definitions
            .get(id)
            .filter(|d| d.component_type == ComponentType::Operator)
            .ok_or_else(|| PipewrightError::DefinitionNotFound { id: id.to_string() })
    }

    /// Every integration.
    pub fn integrations(&self) -> Vec<Integration> {
        self.integrations.values().cloned().collect()
    }

    /// Look up an integration.
    pub fn integration(&self, id: &str) -> Result<&Integration> {
        self.integrations
            .get(id)
            .ok_or_else(|| PipewrightError::IntegrationNotFound { id: id.to_string() })
    }

    /// Setup fields of `integration_id` that must be redacted.
    pub fn secret_fields(&self, integration_id: &str) -> Vec<String> {
        self.integrations
            .get(integration_id)
            .map(Integration::secret_fields)
            .unwrap_or_default()
    }
}

impl ComponentCatalog for Catalog {
    fn has_component(&self, component_type: &str) -> bool {
        self.definitions.contains_key(component_type)
    }

    fn has_task(&self, component_type: &str, task: &str) -> bool {
        self.definitions
            .get(component_type)
            .is_some_and(|d| d.has_task(task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_contents() {
        let catalog = Catalog::standard();
        let ids: Vec<String> = catalog.definitions().into_iter().map(|d| d.id).collect();
        assert_eq!(
            ids,
            vec!["json", "base64", "text", "http", "openai", "pinecone", "slack"]
        );

        let operators: Vec<String> = catalog.operators().into_iter().map(|d| d.id).collect();
        assert_eq!(operators, vec!["json", "base64", "text"]);

        assert!(catalog.has_task("json", "TASK_JQ"));
        assert!(!catalog.has_task("json", "TASK_ENCODE"));
        assert!(!catalog.has_component("nope"));
    }

    #[test]
    fn integrations_come_from_setup_schemas() {
        let catalog = Catalog::standard();
        let ids: Vec<String> = catalog.integrations().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["http", "openai", "pinecone", "slack"]);

        assert_eq!(catalog.secret_fields("openai"), vec!["api-key".to_string()]);
        assert!(catalog.integration("slack").unwrap().oauth_config.is_some());
        assert_eq!(catalog.integration("json").unwrap_err().code(), "E204");
    }

    #[test]
    fn operator_lookup_excludes_other_types() {
        let catalog = Catalog::standard();
        assert!(catalog.operator("json").is_ok());
        assert_eq!(catalog.operator("http").unwrap_err().code(), "E203");
        assert!(catalog.definition("http").is_ok());
    }

    #[test]
    fn only_builtins_are_executable() {
        let catalog = Catalog::standard();
        assert!(catalog.definition("json").unwrap().executable);
        assert!(!catalog.definition("openai").unwrap().executable);
    }
}
