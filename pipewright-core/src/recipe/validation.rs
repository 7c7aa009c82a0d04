//! Recipe validation.
//!
//! Structural validation rejects a recipe outright. Reference validation is
//! softer: it is reported by the validate endpoint, turns the pipeline state
//! into `STATE_ERROR`, and blocks triggers.

use super::definition::Recipe;
use super::graph::DependencyGraph;
use super::reference::{Reference, ReferenceParser};
use crate::error::{PipewrightError, Result};
use serde_json::Value;
use std::collections::HashSet;

/// Roots that cannot be used as component ids.
pub const RESERVED_ROOTS: [&str; 3] = ["variable", "connection", "secret"];

/// Catalog queries needed for structural validation.
pub trait ComponentCatalog {
    /// Whether a component type exists.
    fn has_component(&self, component_type: &str) -> bool;

    /// Whether the component type supports `task`.
    fn has_task(&self, component_type: &str, task: &str) -> bool;
}

/// Connection queries needed for reference validation.
pub trait ConnectionLookup {
    /// Whether a connection with this id exists in the pipeline's namespace.
    fn connection_exists(&self, id: &str) -> bool;
}

impl ConnectionLookup for HashSet<String> {
    fn connection_exists(&self, id: &str) -> bool {
        self.contains(id)
    }
}

/// One reference problem and where it was found.
#[derive(Debug)]
pub struct ValidationIssue {
    /// Location in the recipe, e.g. `component.json-0` or `output.answer`.
    pub location: String,
    /// The problem.
    pub error: PipewrightError,
}

/// Outcome of reference validation.
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Problems found, in recipe order.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Whether no problems were found.
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Convert to a result carrying the first problem.
    pub fn into_result(self) -> Result<()> {
        match self.issues.into_iter().next() {
            Some(issue) => Err(issue.error),
            None => Ok(()),
        }
    }

    fn push(&mut self, location: impl Into<String>, error: PipewrightError) {
        self.issues.push(ValidationIssue {
            location: location.into(),
            error,
        });
    }
}

/// Validate recipe structure against the component catalog.
pub fn validate_structure(recipe: &Recipe, catalog: &dyn ComponentCatalog) -> Result<()> {
    let invalid = |cause: String| PipewrightError::InvalidRecipe { cause };

    if recipe.version != super::RECIPE_VERSION {
        return Err(invalid(format!(
            "unsupported recipe version '{}', expected '{}'",
            recipe.version,
            super::RECIPE_VERSION
        )));
    }

    for name in recipe.variable.keys() {
        if !ReferenceParser::is_valid_identifier(name) {
            return Err(invalid(format!("invalid variable name '{}'", name)));
        }
    }

    for (id, component) in &recipe.component {
        if !ReferenceParser::is_valid_identifier(id) {
            return Err(invalid(format!("invalid component id '{}'", id)));
        }
        if RESERVED_ROOTS.contains(&id.as_str()) {
            return Err(invalid(format!("component id '{}' is reserved", id)));
        }
        if component.component_type.is_empty() {
            return Err(invalid(format!("component '{}' has no type", id)));
        }
        if !catalog.has_component(&component.component_type) {
            return Err(invalid(format!(
                "component '{}' has unknown type '{}'",
                id, component.component_type
            )));
        }
        if component.task.is_empty() {
            return Err(invalid(format!("component '{}' has no task", id)));
        }
        if !catalog.has_task(&component.component_type, &component.task) {
            return Err(invalid(format!(
                "component '{}' of type '{}' has no task '{}'",
                id, component.component_type, component.task
            )));
        }
        if !component.input.is_object() {
            return Err(invalid(format!("input of component '{}' must be an object", id)));
        }
    }

    for (key, output) in &recipe.output {
        if !output.value.contains("${") {
            return Err(invalid(format!(
                "output '{}' must reference a variable or component",
                key
            )));
        }
    }

    Ok(())
}

/// Validate every reference in the recipe.
pub fn validate_references(recipe: &Recipe, connections: &dyn ConnectionLookup) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (id, component) in &recipe.component {
        let location = format!("component.{}", id);
        let mut templates: Vec<&Value> = vec![&component.input];
        if let Some(setup) = &component.setup {
            templates.push(setup);
        }

        let mut references = Vec::new();
        for template in templates {
            match ReferenceParser::collect(template) {
                Ok(found) => references.extend(found),
                Err(e) => report.push(&location, e),
            }
        }
        if let Some(condition) = &component.condition {
            match ReferenceParser::parse_all(condition) {
                Ok(found) => references.extend(found),
                Err(e) => report.push(&location, e),
            }
        }

        for reference in references {
            if let Err(e) = check_reference(recipe, connections, id, &reference) {
                report.push(&location, e);
            }
        }
    }

    for (key, output) in &recipe.output {
        let location = format!("output.{}", key);
        match ReferenceParser::parse_all(&output.value) {
            Ok(references) => {
                for reference in references {
                    if let Err(e) = check_reference(recipe, connections, &location, &reference) {
                        report.push(&location, e);
                    }
                }
            }
            Err(e) => report.push(&location, e),
        }
    }

    if report.is_valid() {
        if let Err(e) = DependencyGraph::from_recipe(recipe).and_then(|g| g.topological_sort()) {
            report.push("component", e);
        }
    }

    report
}

fn check_reference(
    recipe: &Recipe,
    connections: &dyn ConnectionLookup,
    holder: &str,
    reference: &Reference,
) -> Result<()> {
    let unresolved = |cause: String| PipewrightError::UnresolvedReference {
        reference: reference.raw.clone(),
        component_id: holder.to_string(),
        cause,
    };

    match reference.root.as_str() {
        "variable" => {
            let name = reference
                .first_field()
                .ok_or_else(|| unresolved("variable name is missing".to_string()))?;
            if !recipe.variable.contains_key(name) {
                return Err(unresolved(format!("variable '{}' is not declared", name)));
            }
        }
        "connection" => {
            let id = reference
                .first_field()
                .ok_or_else(|| unresolved("connection id is missing".to_string()))?;
            if !connections.connection_exists(id) {
                return Err(unresolved(format!("connection '{}' does not exist", id)));
            }
        }
        "secret" => {
            return Err(unresolved("secret references are not supported".to_string()));
        }
        component_id => {
            if !recipe.component.contains_key(component_id) {
                return Err(unresolved(format!(
                    "no component or variable named '{}'",
                    component_id
                )));
            }
            match reference.first_field() {
                Some("output") | Some("input") => {}
                _ => {
                    return Err(unresolved(format!(
                        "component references must go through '{}.output' or '{}.input'",
                        component_id, component_id
                    )))
                }
            }
        }
    }

    Ok(())
}
