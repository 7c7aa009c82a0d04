//! Field-mask partial updates.

use crate::error::{PipewrightError, Result};
use crate::naming::to_camel_case;
use serde_json::{Map, Value};

/// A set of camelCase field paths (`description`, `recipe.component`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMask {
    paths: Vec<String>,
}

/// Which top-level fields of a resource an update may touch.
#[derive(Debug, Clone, Copy)]
pub struct MaskPolicy {
    /// Fields that may be changed.
    pub mutable: &'static [&'static str],
    /// Fields that may only be restated with their current value.
    pub immutable: &'static [&'static str],
}

impl FieldMask {
    /// Parse a comma-separated mask; segments may be camelCase or snake_case.
    pub fn parse(mask: &str) -> Result<Self> {
        let mut paths = Vec::new();
        for raw in mask.split(',') {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            if raw.split('.').any(str::is_empty) {
                return Err(PipewrightError::InvalidFieldMask {
                    path: raw.to_string(),
                    cause: "empty path segment".to_string(),
                });
            }
            let path = raw
                .split('.')
                .map(to_camel_case)
                .collect::<Vec<_>>()
                .join(".");
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        Ok(Self { paths })
    }

    /// Mask covering the top-level fields present in a request body.
    pub fn from_body(body: &Value) -> Self {
        let paths = body
            .as_object()
            .map(|obj| obj.keys().map(|k| to_camel_case(k)).collect())
            .unwrap_or_default();
        Self { paths }
    }

    /// Explicit mask when given and non-empty, otherwise the body's fields.
    pub fn resolve(mask: Option<&str>, body: &Value) -> Result<Self> {
        match mask.map(str::trim) {
            Some(m) if !m.is_empty() => Self::parse(m),
            _ => Ok(Self::from_body(body)),
        }
    }

    /// The paths in this mask.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Whether the mask selects nothing.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Whether the mask touches `field` or something below it.
    pub fn touches(&self, field: &str) -> bool {
        self.paths
            .iter()
            .any(|p| p == field || p.starts_with(&format!("{}.", field)))
    }
}

/// Apply `patch` to `current` under `mask`.
///
/// Immutable fields restated with their current value are accepted as a
/// no-op; any other value is rejected naming the field. Paths outside the
/// policy are rejected. A masked path absent from the patch is cleared.
pub fn apply_mask(
    current: &Value,
    patch: &Value,
    mask: &FieldMask,
    policy: &MaskPolicy,
) -> Result<Value> {
    let patch = camel_keys(patch);
    let mut updated = current.clone();

    for path in mask.paths() {
        let segments: Vec<&str> = path.split('.').collect();
        let top = segments[0];
        let new_value = lookup(&patch, &segments);

        if policy.immutable.contains(&top) {
            let old_value = lookup(current, &segments);
            match new_value {
                Some(v) if Some(v) != old_value => {
                    return Err(PipewrightError::ImmutableField {
                        field: path.clone(),
                    });
                }
                _ => continue,
            }
        }

        if !policy.mutable.contains(&top) {
            return Err(PipewrightError::InvalidFieldMask {
                path: path.clone(),
                cause: "field does not exist or cannot be updated".to_string(),
            });
        }

        set_path(&mut updated, &segments, new_value.cloned())?;
    }

    Ok(updated)
}

fn camel_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (to_camel_case(k), v.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn lookup<'v>(value: &'v Value, segments: &[&str]) -> Option<&'v Value> {
    segments
        .iter()
        .try_fold(value, |current, segment| current.get(*segment))
}

fn set_path(target: &mut Value, segments: &[&str], value: Option<Value>) -> Result<()> {
    let (last, parents) = match segments.split_last() {
        Some(split) => split,
        None => return Ok(()),
    };

    let mut current = target;
    for segment in parents {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Object(map) => map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new())),
            _ => {
                return Err(PipewrightError::InvalidFieldMask {
                    path: segments.join("."),
                    cause: format!("'{}' is not an object", segment),
                })
            }
        };
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Value::Object(map) = current {
        match value {
            Some(v) => {
                map.insert(last.to_string(), v);
            }
            None => {
                map.remove(*last);
            }
        }
    }
    Ok(())
}
