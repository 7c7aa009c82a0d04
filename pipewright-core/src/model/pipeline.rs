//! Pipelines.

use super::advance_time;
use crate::error::{PipewrightError, Result};
use crate::filter::{FilterValue, Filterable};
use crate::mask::{apply_mask, FieldMask, MaskPolicy};
use crate::recipe::Recipe;
use crate::types::{Namespace, ResourceId, Uid, View};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use serde_json::Value;

/// Update policy for pipelines.
pub const PIPELINE_MASK: MaskPolicy = MaskPolicy {
    mutable: &["description", "recipe", "rawRecipe", "tags"],
    immutable: &[
        "id",
        "uid",
        "name",
        "ownerName",
        "state",
        "createTime",
        "updateTime",
    ],
};

/// Whether a pipeline's recipe references resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineState {
    /// Every reference resolves.
    #[serde(rename = "STATE_ACTIVE")]
    Active,
    /// At least one reference does not resolve.
    #[serde(rename = "STATE_ERROR")]
    Error,
}

/// A pipeline owned by a namespace.
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Permalink uid.
    pub uid: Uid,
    /// User-facing id, unique within the namespace.
    pub id: ResourceId,
    /// Owner.
    pub namespace: Namespace,
    /// Free-form description.
    pub description: String,
    /// Parsed recipe.
    pub recipe: Recipe,
    /// YAML source of the recipe, when it was supplied that way.
    pub raw_recipe: Option<String>,
    /// Tags.
    pub tags: Vec<String>,
    /// Creation time.
    pub create_time: DateTime<Utc>,
    /// Last update time.
    pub update_time: DateTime<Utc>,
}

// Body of a create request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePipelineBody {
    id: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    recipe: Option<Value>,
    #[serde(default)]
    raw_recipe: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

impl Pipeline {
    /// Build a new pipeline from a create request body.
    pub fn from_create_body(namespace: Namespace, body: &Value) -> Result<Self> {
        if !body.is_object() {
            return Err(PipewrightError::MissingField {
                field: "pipeline".to_string(),
            });
        }
        let body: CreatePipelineBody =
            serde_json::from_value(body.clone()).map_err(|e| PipewrightError::InvalidArgument {
                field: "pipeline".to_string(),
                cause: e.to_string(),
            })?;

        let id = body.id.ok_or_else(|| PipewrightError::MissingField {
            field: "id".to_string(),
        })?;
        let id = ResourceId::parse_kind("pipeline", &id)?;
        let (recipe, raw_recipe) = parse_recipe(body.recipe, body.raw_recipe)?;

        let now = Utc::now();
        Ok(Self {
            uid: Uid::new(),
            id,
            namespace,
            description: body.description.unwrap_or_default(),
            recipe,
            raw_recipe,
            tags: body.tags,
            create_time: now,
            update_time: now,
        })
    }

    /// Full resource name, e.g. `users/admin/pipelines/my-pipe`.
    pub fn name(&self) -> String {
        format!("{}/pipelines/{}", self.namespace, self.id)
    }

    /// Sort key of the newest-first listing order.
    pub fn list_key(&self) -> (Reverse<DateTime<Utc>>, String) {
        (Reverse(self.create_time), self.name())
    }

    /// Apply a PATCH body under `mask`, advancing `update_time`.
    ///
    /// Returns whether the recipe changed.
    pub fn apply_update(&mut self, patch: &Value, mask: &FieldMask) -> Result<bool> {
        let current = serde_json::to_value(self.to_resource(View::Full, PipelineState::Active))?;
        let updated = apply_mask(&current, patch, mask, &PIPELINE_MASK)?;

        let recipe_touched = mask.touches("recipe") || mask.touches("rawRecipe");
        if recipe_touched {
            let raw = if mask.touches("rawRecipe") {
                updated
                    .get("rawRecipe")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            } else {
                None
            };
            let recipe = if raw.is_some() {
                None
            } else {
                updated.get("recipe").cloned()
            };
            let (recipe, raw_recipe) = parse_recipe(recipe, raw)?;
            self.recipe = recipe;
            self.raw_recipe = raw_recipe;
        }

        if mask.touches("description") {
            self.description = updated
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
        }
        if mask.touches("tags") {
            self.tags = match updated.get("tags") {
                Some(tags) => serde_json::from_value(tags.clone()).map_err(|e| {
                    PipewrightError::InvalidArgument {
                        field: "tags".to_string(),
                        cause: e.to_string(),
                    }
                })?,
                None => Vec::new(),
            };
        }

        self.update_time = advance_time(self.update_time);
        Ok(recipe_touched)
    }

    /// Move the pipeline to a new id, keeping its uid and creation time.
    pub fn renamed(&self, new_id: ResourceId) -> Self {
        let mut renamed = self.clone();
        renamed.id = new_id;
        renamed.update_time = advance_time(self.update_time);
        renamed
    }

    /// Render for `view`.
    pub fn to_resource(&self, view: View, state: PipelineState) -> PipelineResource {
        let detailed = view.is_detailed();
        PipelineResource {
            name: self.name(),
            uid: self.uid.to_string(),
            id: self.id.to_string(),
            description: self.description.clone(),
            recipe: detailed.then(|| self.recipe.to_json()),
            raw_recipe: if detailed {
                self.raw_recipe.clone().or_else(|| self.recipe.to_yaml().ok())
            } else {
                None
            },
            tags: self.tags.clone(),
            owner_name: self.namespace.name(),
            state,
            create_time: self.create_time,
            update_time: self.update_time,
        }
    }
}

fn parse_recipe(recipe: Option<Value>, raw: Option<String>) -> Result<(Recipe, Option<String>)> {
    match (raw, recipe) {
        (Some(raw), _) if !raw.trim().is_empty() => Ok((Recipe::from_yaml(&raw)?, Some(raw))),
        (_, Some(value)) if !value.is_null() => Ok((Recipe::from_json(value)?, None)),
        _ => Ok((Recipe::default(), None)),
    }
}

impl Filterable for Pipeline {
    fn filter_fields() -> &'static [&'static str] {
        &["id", "uid", "description", "create_time", "update_time", "owner_name", "tag"]
    }

    fn filter_value(&self, field: &str) -> Option<FilterValue> {
        match field {
            "id" => Some(self.id.as_str().into()),
            "uid" => Some(self.uid.to_string().into()),
            "description" => Some(self.description.as_str().into()),
            "create_time" => Some(self.create_time.into()),
            "update_time" => Some(self.update_time.into()),
            "owner_name" => Some(self.namespace.name().into()),
            "tag" => Some(self.tags.join(",").into()),
            _ => None,
        }
    }

    fn title_text(&self) -> String {
        self.id.to_string()
    }

    fn search_text(&self) -> String {
        format!("{} {}", self.id, self.description)
    }
}

/// Wire representation of a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResource {
    /// Full resource name.
    pub name: String,
    /// Permalink uid.
    pub uid: String,
    /// User-facing id.
    pub id: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Recipe (FULL and RECIPE views).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<Value>,
    /// Recipe YAML (FULL and RECIPE views).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_recipe: Option<String>,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Owner namespace name.
    pub owner_name: String,
    /// Reference validation state.
    pub state: PipelineState,
    /// Creation time.
    pub create_time: DateTime<Utc>,
    /// Last update time.
    pub update_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ns() -> Namespace {
        Namespace::parse("users/admin").unwrap()
    }

    fn recipe() -> Value {
        json!({
            "version": "v1beta",
            "variable": { "jota": { "format": "json" } },
            "component": {
                "json-0": {
                    "type": "json",
                    "task": "TASK_JQ",
                    "input": { "json-value": "${variable.jota}", "jq-filter": ".foo" }
                }
            },
            "output": { "answer": { "value": "${json-0.output.results}" } }
        })
    }

    #[test]
    fn create_from_body() {
        let p = Pipeline::from_create_body(
            ns(),
            &json!({ "id": "my-pipe", "description": "d", "recipe": recipe() }),
        )
        .unwrap();
        assert_eq!(p.name(), "users/admin/pipelines/my-pipe");
        assert_eq!(p.create_time, p.update_time);
        assert!(p.recipe.component.contains_key("json-0"));
    }

    #[test]
    fn create_validation() {
        let err = Pipeline::from_create_body(ns(), &Value::Null).unwrap_err();
        assert_eq!(err.code(), "E102");
        let err = Pipeline::from_create_body(ns(), &json!({ "description": "no id" })).unwrap_err();
        assert_eq!(err.code(), "E102");
        let err = Pipeline::from_create_body(ns(), &json!({ "id": "Bad_Id" })).unwrap_err();
        assert_eq!(err.code(), "E101");
        let err =
            Pipeline::from_create_body(ns(), &json!({ "id": "ok", "recipe": "nope" })).unwrap_err();
        assert_eq!(err.code(), "E105");
    }

    #[test]
    fn create_from_raw_recipe() {
        let raw = "version: v1beta\ncomponent:\n  enc:\n    type: base64\n    task: TASK_ENCODE\n";
        let p = Pipeline::from_create_body(ns(), &json!({ "id": "raw", "rawRecipe": raw })).unwrap();
        assert_eq!(p.recipe.component["enc"].task, "TASK_ENCODE");
        assert_eq!(p.raw_recipe.as_deref(), Some(raw));
    }

    #[test]
    fn view_gating() {
        let p = Pipeline::from_create_body(ns(), &json!({ "id": "v", "recipe": recipe() })).unwrap();
        let basic = p.to_resource(View::Basic, PipelineState::Active);
        assert!(basic.recipe.is_none());
        assert!(basic.raw_recipe.is_none());
        let full = p.to_resource(View::Full, PipelineState::Active);
        assert!(full.recipe.is_some());
        assert!(full.raw_recipe.is_some());

        let json = serde_json::to_value(&basic).unwrap();
        assert!(json.get("recipe").is_none());
        assert_eq!(json["ownerName"], "users/admin");
        assert_eq!(json["state"], "STATE_ACTIVE");
    }

    #[test]
    fn update_advances_time_and_keeps_identity() {
        let mut p = Pipeline::from_create_body(ns(), &json!({ "id": "u" })).unwrap();
        let before = p.update_time;
        let uid = p.uid;

        let body = json!({ "description": "new", "id": "u" });
        let changed = p.apply_update(&body, &FieldMask::from_body(&body)).unwrap();
        assert!(!changed);
        assert_eq!(p.description, "new");
        assert!(p.update_time > before);
        assert_eq!(p.uid, uid);
        assert!(p.create_time <= p.update_time);
    }

    #[test]
    fn update_rejects_immutable_change() {
        let mut p = Pipeline::from_create_body(ns(), &json!({ "id": "u" })).unwrap();
        let body = json!({ "id": "other" });
        let err = p.apply_update(&body, &FieldMask::from_body(&body)).unwrap_err();
        assert_eq!(err.code(), "E106");

        let body = json!({ "uid": p.uid.to_string() });
        assert!(p.apply_update(&body, &FieldMask::from_body(&body)).is_ok());
    }

    #[test]
    fn update_recipe() {
        let mut p = Pipeline::from_create_body(ns(), &json!({ "id": "u" })).unwrap();
        let body = json!({ "recipe": recipe() });
        let changed = p
            .apply_update(&body, &FieldMask::parse("recipe").unwrap())
            .unwrap();
        assert!(changed);
        assert!(p.recipe.variable.contains_key("jota"));
    }

    #[test]
    fn rename_keeps_uid() {
        let p = Pipeline::from_create_body(ns(), &json!({ "id": "old" })).unwrap();
        let r = p.renamed(ResourceId::parse("new").unwrap());
        assert_eq!(r.uid, p.uid);
        assert_eq!(r.create_time, p.create_time);
        assert_eq!(r.name(), "users/admin/pipelines/new");
        assert!(r.update_time > p.update_time);
    }
}
