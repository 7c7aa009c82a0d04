//! Component trait and runtime registry.

use pipewright_core::{PipewrightError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future returned by [`Component::execute`].
pub type ComponentFuture<'a> = Pin<Box<dyn Future<Output = Result<Value>> + Send + 'a>>;

/// What a component sees while executing one batch element.
#[derive(Debug, Clone)]
pub struct ComponentContext {
    /// Component id in the recipe.
    pub component_id: String,
    /// Resolved setup (typically a connection's setup).
    pub setup: Option<Value>,
    /// Shared HTTP client.
    pub http: reqwest::Client,
}

impl ComponentContext {
    /// Create a context without setup.
    pub fn new(component_id: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            component_id: component_id.into(),
            setup: None,
            http,
        }
    }

    /// Attach resolved setup.
    pub fn with_setup(mut self, setup: Option<Value>) -> Self {
        self.setup = setup;
        self
    }

    /// Execution error attributed to this component.
    pub fn fail(&self, cause: impl Into<String>) -> PipewrightError {
        PipewrightError::ComponentExecution {
            component_id: self.component_id.clone(),
            cause: cause.into(),
        }
    }

    /// Required input field.
    pub fn required<'v>(&self, input: &'v Value, field: &str) -> Result<&'v Value> {
        match input.get(field) {
            Some(Value::Null) | None => Err(self.fail(format!("missing required input '{}'", field))),
            Some(value) => Ok(value),
        }
    }

    /// Required string input field.
    pub fn required_str<'v>(&self, input: &'v Value, field: &str) -> Result<&'v str> {
        self.required(input, field)?
            .as_str()
            .ok_or_else(|| self.fail(format!("input '{}' must be a string", field)))
    }

    /// Error for a task this component does not implement.
    pub fn unsupported_task(&self, task: &str) -> PipewrightError {
        self.fail(format!("unsupported task '{}'", task))
    }
}

/// A runnable component.
///
/// One instance serves every pipeline; per-call state lives in the
/// [`ComponentContext`].
pub trait Component: Send + Sync {
    /// Component id, matching the recipe `type`.
    fn id(&self) -> &'static str;

    /// Run `task` on one resolved input.
    fn execute<'a>(
        &'a self,
        ctx: &'a ComponentContext,
        task: &'a str,
        input: Value,
    ) -> ComponentFuture<'a>;
}

/// Components that can run, by id.
#[derive(Default, Clone)]
pub struct ComponentRegistry {
    components: HashMap<&'static str, Arc<dyn Component>>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in executable component.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(super::components::JsonComponent);
        registry.register(super::components::Base64Component);
        registry.register(super::components::TextComponent);
        registry.register(super::components::HttpComponent);
        registry
    }

    /// Add a component.
    pub fn register(&mut self, component: impl Component + 'static) {
        self.components.insert(component.id(), Arc::new(component));
    }

    /// Look up a component by id.
    pub fn get(&self, id: &str) -> Option<Arc<dyn Component>> {
        self.components.get(id).cloned()
    }

    /// Whether a component can run.
    pub fn contains(&self, id: &str) -> bool {
        self.components.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn standard_registry() {
        let registry = ComponentRegistry::standard();
        for id in ["json", "base64", "text", "http"] {
            assert!(registry.contains(id), "{} missing", id);
        }
        assert!(!registry.contains("openai"));
    }

    #[test]
    fn context_input_helpers() {
        let ctx = ComponentContext::new("c0", reqwest::Client::new());
        let input = json!({ "a": "x", "b": null, "c": 1 });
        assert_eq!(ctx.required_str(&input, "a").unwrap(), "x");
        assert_eq!(ctx.required(&input, "b").unwrap_err().code(), "E501");
        assert!(ctx.required_str(&input, "c").is_err());
        assert!(ctx.unsupported_task("TASK_X").to_string().contains("TASK_X"));
    }
}
