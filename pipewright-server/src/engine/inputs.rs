//! Trigger input checking against a recipe's declared variables.

use pipewright_core::recipe::Recipe;
use pipewright_core::{PipewrightError, Result};
use serde_json::{Map, Value};

/// Check trigger inputs and fill variable defaults.
///
/// Every input must be an object whose keys are declared variables and whose
/// values match the declared format. An empty batch runs once with `{}`.
pub fn prepare_inputs(recipe: &Recipe, inputs: &[Value]) -> Result<Vec<Value>> {
    if inputs.is_empty() {
        return Ok(vec![with_defaults(recipe, Map::new())]);
    }

    inputs
        .iter()
        .enumerate()
        .map(|(index, input)| {
            let Value::Object(map) = input else {
                return Err(PipewrightError::InvalidInput {
                    cause: format!("inputs[{}] must be an object", index),
                });
            };

            for (key, value) in map {
                let variable = recipe.variable.get(key).ok_or_else(|| {
                    PipewrightError::InvalidInput {
                        cause: format!("inputs[{}]: '{}' is not a declared variable", index, key),
                    }
                })?;
                if !value.is_null() && !variable.format.accepts(value) {
                    return Err(PipewrightError::InvalidInput {
                        cause: format!(
                            "inputs[{}]: variable '{}' expects format '{}'",
                            index, key, variable.format
                        ),
                    });
                }
            }

            Ok(with_defaults(recipe, map.clone()))
        })
        .collect()
}

fn with_defaults(recipe: &Recipe, mut input: Map<String, Value>) -> Value {
    for (name, variable) in &recipe.variable {
        if let Some(default) = &variable.default {
            input.entry(name.clone()).or_insert_with(|| default.clone());
        }
    }
    Value::Object(input)
}
