//! Recipe model, reference expressions and validation.

mod definition;
mod graph;
mod reference;
mod validation;

pub use definition::{
    ComponentConfig, OutputField, Recipe, Variable, VariableFormat, RECIPE_VERSION,
};
pub use graph::DependencyGraph;
pub use reference::{Reference, ReferenceParser, Segment};
pub use validation::{
    validate_references, validate_structure, ComponentCatalog, ConnectionLookup, ValidationIssue,
    ValidationReport, RESERVED_ROOTS,
};
