//! Recipe definition types.

use crate::error::{PipewrightError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Current recipe version.
pub const RECIPE_VERSION: &str = "v1beta";

/// A pipeline recipe: declared variables, ordered components and outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Recipe schema version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Trigger-time variables, in declaration order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variable: IndexMap<String, Variable>,
    /// Pipeline outputs, in declaration order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub output: IndexMap<String, OutputField>,
    /// Components keyed by id, in declaration order.
    #[serde(default)]
    pub component: IndexMap<String, ComponentConfig>,
}

fn default_version() -> String {
    RECIPE_VERSION.to_string()
}

impl Default for Recipe {
    fn default() -> Self {
        Self {
            version: default_version(),
            variable: IndexMap::new(),
            output: IndexMap::new(),
            component: IndexMap::new(),
        }
    }
}

impl Recipe {
    /// Parse a recipe from its JSON form.
    pub fn from_json(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(PipewrightError::InvalidRecipe {
                cause: "recipe must be an object".to_string(),
            });
        }
        serde_json::from_value(value).map_err(|e| PipewrightError::InvalidRecipe {
            cause: e.to_string(),
        })
    }

    /// Parse a recipe from YAML text (the `rawRecipe` form).
    pub fn from_yaml(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).map_err(|e| PipewrightError::InvalidRecipe {
            cause: e.to_string(),
        })
    }

    /// Render the recipe as JSON.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Render the recipe as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| PipewrightError::InvalidRecipe {
            cause: e.to_string(),
        })
    }

    /// Component ids in declaration order.
    pub fn component_ids(&self) -> impl Iterator<Item = &str> {
        self.component.keys().map(String::as_str)
    }
}

/// Declared trigger variable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Variable {
    /// Display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Expected value format.
    #[serde(default)]
    pub format: VariableFormat,
    /// Value used when the trigger input omits the variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl Variable {
    /// Create a variable of the given format.
    pub fn new(format: VariableFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }
}

/// Format a variable's value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VariableFormat {
    /// JSON string.
    #[serde(rename = "string")]
    String,
    /// JSON number.
    #[serde(rename = "number")]
    Number,
    /// JSON number without fractional part.
    #[serde(rename = "integer")]
    Integer,
    /// JSON boolean.
    #[serde(rename = "boolean")]
    Boolean,
    /// JSON object.
    #[serde(rename = "json")]
    Json,
    /// JSON array.
    #[serde(rename = "array")]
    Array,
    /// Any value.
    #[default]
    #[serde(rename = "*")]
    Any,
}

impl VariableFormat {
    /// Check whether `value` conforms to this format.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Boolean => value.is_boolean(),
            Self::Json => value.is_object(),
            Self::Array => value.is_array(),
            Self::Any => true,
        }
    }

    /// Canonical string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Json => "json",
            Self::Array => "array",
            Self::Any => "*",
        }
    }
}

impl fmt::Display for VariableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared pipeline output.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutputField {
    /// Display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Reference expression producing the value.
    pub value: String,
}

impl OutputField {
    /// Create an output bound to a reference expression.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }
}

/// One component of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfig {
    /// Catalog component id (e.g. `json`).
    #[serde(rename = "type")]
    pub component_type: String,
    /// Task name (e.g. `TASK_JQ`).
    #[serde(default)]
    pub task: String,
    /// Input template; strings may contain references.
    #[serde(default = "empty_object")]
    pub input: Value,
    /// Setup template, usually `${connection.<id>}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup: Option<Value>,
    /// Reference expression; the component runs only when it is truthy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

impl ComponentConfig {
    /// Create a component with an empty input.
    pub fn new(component_type: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            component_type: component_type.into(),
            task: task.into(),
            input: empty_object(),
            setup: None,
            condition: None,
        }
    }

    /// Set the input template.
    pub fn with_input(mut self, input: Value) -> Self {
        self.input = input;
        self
    }

    /// Set the setup template.
    pub fn with_setup(mut self, setup: Value) -> Self {
        self.setup = Some(setup);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_json_preserves_order() {
        let recipe = Recipe::from_json(json!({
            "version": "v1beta",
            "variable": { "jota": { "format": "json" } },
            "component": {
                "zeta": { "type": "json", "task": "TASK_MARSHAL", "input": {} },
                "alpha": { "type": "json", "task": "TASK_JQ", "input": {} }
            },
            "output": { "answer": { "value": "${alpha.output.results}" } }
        }))
        .unwrap();

        let ids: Vec<&str> = recipe.component_ids().collect();
        assert_eq!(ids, vec!["zeta", "alpha"]);
        assert_eq!(recipe.variable["jota"].format, VariableFormat::Json);
        assert_eq!(recipe.output["answer"].value, "${alpha.output.results}");
    }

    #[test]
    fn parse_yaml() {
        let raw = r#"
version: v1beta
variable:
  text:
    format: string
component:
  enc:
    type: base64
    task: TASK_ENCODE
    input:
      data: ${variable.text}
output:
  encoded:
    value: ${enc.output.data}
"#;
        let recipe = Recipe::from_yaml(raw).unwrap();
        assert_eq!(recipe.component["enc"].component_type, "base64");
        assert_eq!(recipe.component["enc"].input["data"], "${variable.text}");
    }

    #[test]
    fn rejects_non_object() {
        assert!(Recipe::from_json(json!("nope")).is_err());
        assert!(Recipe::from_json(json!({ "component": { "a": { "task": "X" } } })).is_err());
        assert!(Recipe::from_json(json!({ "variable": { "v": { "format": "blob" } } })).is_err());
    }

    #[test]
    fn variable_format_acceptance() {
        assert!(VariableFormat::String.accepts(&json!("x")));
        assert!(!VariableFormat::String.accepts(&json!(1)));
        assert!(VariableFormat::Integer.accepts(&json!(3)));
        assert!(!VariableFormat::Integer.accepts(&json!(3.5)));
        assert!(VariableFormat::Json.accepts(&json!({ "foo": "bar" })));
        assert!(VariableFormat::Any.accepts(&Value::Null));
    }

    #[test]
    fn defaults_fill_in() {
        let recipe = Recipe::from_json(json!({})).unwrap();
        assert_eq!(recipe.version, RECIPE_VERSION);
        assert!(recipe.component.is_empty());
    }
}
