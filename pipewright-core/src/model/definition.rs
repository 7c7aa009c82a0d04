//! Component and operator definitions.

use crate::filter::{FilterValue, Filterable};
use crate::types::{Uid, View};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Category of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentType {
    /// Pure data transformation.
    #[serde(rename = "COMPONENT_TYPE_OPERATOR")]
    Operator,
    /// AI model vendor.
    #[serde(rename = "COMPONENT_TYPE_AI")]
    Ai,
    /// Data store.
    #[serde(rename = "COMPONENT_TYPE_DATA")]
    Data,
    /// Third-party application.
    #[serde(rename = "COMPONENT_TYPE_APPLICATION")]
    Application,
    /// Generic building block.
    #[serde(rename = "COMPONENT_TYPE_GENERIC")]
    Generic,
}

impl ComponentType {
    /// Canonical string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operator => "COMPONENT_TYPE_OPERATOR",
            Self::Ai => "COMPONENT_TYPE_AI",
            Self::Data => "COMPONENT_TYPE_DATA",
            Self::Application => "COMPONENT_TYPE_APPLICATION",
            Self::Generic => "COMPONENT_TYPE_GENERIC",
        }
    }
}

/// Maturity of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseStage {
    /// Experimental.
    #[serde(rename = "RELEASE_STAGE_ALPHA")]
    Alpha,
    /// Feature complete.
    #[serde(rename = "RELEASE_STAGE_BETA")]
    Beta,
    /// Generally available.
    #[serde(rename = "RELEASE_STAGE_GA")]
    Ga,
}

impl ReleaseStage {
    /// Canonical string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alpha => "RELEASE_STAGE_ALPHA",
            Self::Beta => "RELEASE_STAGE_BETA",
            Self::Ga => "RELEASE_STAGE_GA",
        }
    }
}

/// A task a component can perform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInfo {
    /// Task name, e.g. `TASK_JQ`.
    pub name: String,
    /// Display title.
    pub title: String,
    /// Description.
    #[serde(default)]
    pub description: String,
}

impl TaskInfo {
    /// Create a task entry.
    pub fn new(name: &str, title: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            description: description.to_string(),
        }
    }
}

/// Catalog entry for a component.
#[derive(Debug, Clone)]
pub struct ComponentDefinition {
    /// Permalink uid.
    pub uid: Uid,
    /// Id used as the recipe `type`.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Category.
    pub component_type: ComponentType,
    /// Description.
    pub description: String,
    /// Vendor name.
    pub vendor: String,
    /// Definition version.
    pub version: String,
    /// Supported tasks.
    pub tasks: Vec<TaskInfo>,
    /// Input/output schemas per task and the setup schema.
    pub spec: Value,
    /// Maturity.
    pub release_stage: ReleaseStage,
    /// Whether the component is listed publicly.
    pub public: bool,
    /// Whether the component is retired.
    pub tombstone: bool,
    /// Whether a runtime executor exists for the component.
    pub executable: bool,
}

impl ComponentDefinition {
    /// Whether the component supports `task`.
    pub fn has_task(&self, task: &str) -> bool {
        self.tasks.iter().any(|t| t.name == task)
    }

    /// Render under the `component-definitions` collection.
    pub fn to_component_resource(&self, view: View) -> DefinitionResource {
        self.resource("component-definitions", view)
    }

    /// Render under the `operator-definitions` collection.
    pub fn to_operator_resource(&self, view: View) -> DefinitionResource {
        self.resource("operator-definitions", view)
    }

    fn resource(&self, collection: &str, view: View) -> DefinitionResource {
        DefinitionResource {
            name: format!("{}/{}", collection, self.id),
            uid: self.uid.to_string(),
            id: self.id.clone(),
            title: self.title.clone(),
            component_type: self.component_type,
            description: self.description.clone(),
            vendor: self.vendor.clone(),
            version: self.version.clone(),
            tasks: self.tasks.clone(),
            spec: view.is_detailed().then(|| self.spec.clone()),
            release_stage: self.release_stage,
            public: self.public,
            tombstone: self.tombstone,
            view,
        }
    }
}

impl Filterable for ComponentDefinition {
    fn filter_fields() -> &'static [&'static str] {
        &[
            "id",
            "title",
            "component_type",
            "vendor",
            "release_stage",
            "public",
            "tombstone",
        ]
    }

    fn filter_value(&self, field: &str) -> Option<FilterValue> {
        match field {
            "id" => Some(self.id.as_str().into()),
            "title" => Some(self.title.as_str().into()),
            "component_type" => Some(self.component_type.as_str().into()),
            "vendor" => Some(self.vendor.as_str().into()),
            "release_stage" => Some(self.release_stage.as_str().into()),
            "public" => Some(self.public.into()),
            "tombstone" => Some(self.tombstone.into()),
            _ => None,
        }
    }

    fn title_text(&self) -> String {
        self.title.clone()
    }

    fn search_text(&self) -> String {
        format!("{} {} {}", self.id, self.title, self.vendor)
    }
}

/// Wire representation of a component or operator definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionResource {
    /// Full resource name.
    pub name: String,
    /// Permalink uid.
    pub uid: String,
    /// Id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Category.
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Vendor name.
    #[serde(default)]
    pub vendor: String,
    /// Definition version.
    #[serde(default)]
    pub version: String,
    /// Supported tasks.
    #[serde(default)]
    pub tasks: Vec<TaskInfo>,
    /// Schemas (FULL view only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<Value>,
    /// Maturity.
    pub release_stage: ReleaseStage,
    /// Whether listed publicly.
    pub public: bool,
    /// Whether retired.
    pub tombstone: bool,
    /// View this representation was rendered with.
    pub view: View,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn json_definition() -> ComponentDefinition {
        ComponentDefinition {
            uid: Uid::new(),
            id: "json".to_string(),
            title: "JSON".to_string(),
            component_type: ComponentType::Operator,
            description: "Manipulate JSON".to_string(),
            vendor: "Pipewright".to_string(),
            version: "0.1.0".to_string(),
            tasks: vec![TaskInfo::new("TASK_JQ", "jq", "Run a jq filter")],
            spec: json!({ "TASK_JQ": {} }),
            release_stage: ReleaseStage::Alpha,
            public: true,
            tombstone: false,
            executable: true,
        }
    }

    #[test]
    fn names_by_collection() {
        let def = json_definition();
        assert_eq!(
            def.to_component_resource(View::Basic).name,
            "component-definitions/json"
        );
        assert_eq!(
            def.to_operator_resource(View::Basic).name,
            "operator-definitions/json"
        );
    }

    #[test]
    fn basic_view_omits_spec() {
        let def = json_definition();
        assert!(def.to_component_resource(View::Basic).spec.is_none());
        assert!(def.to_component_resource(View::Full).spec.is_some());

        let json = serde_json::to_value(def.to_component_resource(View::Basic)).unwrap();
        assert_eq!(json["type"], "COMPONENT_TYPE_OPERATOR");
        assert_eq!(json["releaseStage"], "RELEASE_STAGE_ALPHA");
    }

    #[test]
    fn task_lookup() {
        let def = json_definition();
        assert!(def.has_task("TASK_JQ"));
        assert!(!def.has_task("TASK_MARSHAL"));
    }
}
