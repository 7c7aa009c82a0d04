//! Connections: stored setup for an integration, referenced by recipes.

use super::advance_time;
use crate::error::{PipewrightError, Result};
use crate::filter::{FilterValue, Filterable};
use crate::mask::{apply_mask, FieldMask, MaskPolicy};
use crate::types::{Namespace, ResourceId, Uid, View};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use serde_json::{Map, Value};

/// Placeholder for secret setup values.
pub const REDACTED: &str = "*****";

/// Update policy for connections.
pub const CONNECTION_MASK: MaskPolicy = MaskPolicy {
    mutable: &["description", "setup", "scopes", "method"],
    immutable: &[
        "id",
        "uid",
        "name",
        "namespaceId",
        "integrationId",
        "integrationTitle",
        "view",
        "createTime",
        "updateTime",
    ],
};

/// How a connection authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionMethod {
    /// Setup is a dictionary of values.
    #[default]
    #[serde(rename = "METHOD_DICTIONARY")]
    Dictionary,
    /// Setup holds OAuth credentials.
    #[serde(rename = "METHOD_OAUTH")]
    OAuth,
}

impl ConnectionMethod {
    /// Canonical string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dictionary => "METHOD_DICTIONARY",
            Self::OAuth => "METHOD_OAUTH",
        }
    }
}

/// A connection owned by a namespace.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Permalink uid.
    pub uid: Uid,
    /// User-facing id, unique within the namespace.
    pub id: ResourceId,
    /// Owner.
    pub namespace: Namespace,
    /// Integration this connection configures.
    pub integration_id: String,
    /// Integration title, for display.
    pub integration_title: String,
    /// Authentication method.
    pub method: ConnectionMethod,
    /// Description.
    pub description: String,
    /// Setup values.
    pub setup: Map<String, Value>,
    /// OAuth scopes.
    pub scopes: Vec<String>,
    /// Creation time.
    pub create_time: DateTime<Utc>,
    /// Last update time.
    pub update_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateConnectionBody {
    id: Option<String>,
    integration_id: Option<String>,
    #[serde(default)]
    method: Option<ConnectionMethod>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    setup: Option<Map<String, Value>>,
    #[serde(default)]
    scopes: Vec<String>,
}

impl Connection {
    /// Build a new connection from a create request body.
    ///
    /// `integration_title` resolves the integration id; it fails with
    /// not-found for unknown integrations.
    pub fn from_create_body(
        namespace: Namespace,
        body: &Value,
        integration_title: impl Fn(&str) -> Result<String>,
    ) -> Result<Self> {
        if !body.is_object() {
            return Err(PipewrightError::MissingField {
                field: "connection".to_string(),
            });
        }
        let body: CreateConnectionBody =
            serde_json::from_value(body.clone()).map_err(|e| PipewrightError::InvalidArgument {
                field: "connection".to_string(),
                cause: e.to_string(),
            })?;

        let id = body.id.ok_or_else(|| PipewrightError::MissingField {
            field: "id".to_string(),
        })?;
        let id = ResourceId::parse_kind("connection", &id)?;
        let integration_id = body
            .integration_id
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PipewrightError::MissingField {
                field: "integrationId".to_string(),
            })?;
        let integration_title = integration_title(&integration_id)?;

        let now = Utc::now();
        Ok(Self {
            uid: Uid::new(),
            id,
            namespace,
            integration_id,
            integration_title,
            method: body.method.unwrap_or_default(),
            description: body.description.unwrap_or_default(),
            setup: body.setup.unwrap_or_default(),
            scopes: body.scopes,
            create_time: now,
            update_time: now,
        })
    }

    /// Full resource name, e.g. `namespaces/admin/connections/my-conn`.
    pub fn name(&self) -> String {
        format!("namespaces/{}/connections/{}", self.namespace.id, self.id)
    }

    /// Sort key of the newest-first listing order.
    pub fn list_key(&self) -> (Reverse<DateTime<Utc>>, String) {
        (Reverse(self.create_time), self.name())
    }

    /// Apply a PATCH body under `mask`, advancing `update_time`.
    ///
    /// Secret setup values sent back as the redaction placeholder keep
    /// their stored value.
    pub fn apply_update(&mut self, patch: &Value, mask: &FieldMask) -> Result<()> {
        let current = serde_json::to_value(self.unredacted_resource())?;
        let updated = apply_mask(&current, patch, mask, &CONNECTION_MASK)?;

        if mask.touches("setup") {
            let mut setup = match updated.get("setup") {
                Some(Value::Object(map)) => map.clone(),
                Some(Value::Null) | None => Map::new(),
                Some(_) => {
                    return Err(PipewrightError::InvalidArgument {
                        field: "setup".to_string(),
                        cause: "setup must be an object".to_string(),
                    })
                }
            };
            for (key, value) in setup.iter_mut() {
                if value.as_str() == Some(REDACTED) {
                    if let Some(stored) = self.setup.get(key) {
                        *value = stored.clone();
                    }
                }
            }
            self.setup = setup;
        }
        if mask.touches("description") {
            self.description = updated
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
        }
        if mask.touches("scopes") {
            self.scopes = match updated.get("scopes") {
                Some(Value::Null) | None => Vec::new(),
                Some(scopes) => serde_json::from_value(scopes.clone()).map_err(|e| {
                    PipewrightError::InvalidArgument {
                        field: "scopes".to_string(),
                        cause: e.to_string(),
                    }
                })?,
            };
        }
        if mask.touches("method") {
            self.method = match updated.get("method") {
                Some(m) => serde_json::from_value(m.clone()).map_err(|e| {
                    PipewrightError::InvalidArgument {
                        field: "method".to_string(),
                        cause: e.to_string(),
                    }
                })?,
                None => ConnectionMethod::default(),
            };
        }

        self.update_time = advance_time(self.update_time);
        Ok(())
    }

    /// Render for `view`; FULL shows setup with `secret_fields` redacted.
    pub fn to_resource(&self, view: View, secret_fields: &[String]) -> ConnectionResource {
        let setup = view.is_detailed().then(|| {
            let redacted: Map<String, Value> = self
                .setup
                .iter()
                .map(|(key, value)| {
                    if secret_fields.contains(key) && !value.is_null() {
                        (key.clone(), Value::String(REDACTED.to_string()))
                    } else {
                        (key.clone(), value.clone())
                    }
                })
                .collect();
            Value::Object(redacted)
        });
        self.resource(view, setup)
    }

    fn unredacted_resource(&self) -> ConnectionResource {
        self.resource(View::Full, Some(Value::Object(self.setup.clone())))
    }

    fn resource(&self, view: View, setup: Option<Value>) -> ConnectionResource {
        ConnectionResource {
            name: self.name(),
            uid: self.uid.to_string(),
            id: self.id.to_string(),
            namespace_id: self.namespace.id.to_string(),
            integration_id: self.integration_id.clone(),
            integration_title: self.integration_title.clone(),
            method: self.method,
            description: self.description.clone(),
            setup,
            scopes: self.scopes.clone(),
            view,
            create_time: self.create_time,
            update_time: self.update_time,
        }
    }
}

impl Filterable for Connection {
    fn filter_fields() -> &'static [&'static str] {
        &["id", "uid", "integration_id", "method", "create_time", "update_time"]
    }

    fn filter_value(&self, field: &str) -> Option<FilterValue> {
        match field {
            "id" => Some(self.id.as_str().into()),
            "uid" => Some(self.uid.to_string().into()),
            "integration_id" => Some(self.integration_id.as_str().into()),
            "method" => Some(self.method.as_str().into()),
            "create_time" => Some(self.create_time.into()),
            "update_time" => Some(self.update_time.into()),
            _ => None,
        }
    }

    fn title_text(&self) -> String {
        self.id.to_string()
    }

    fn search_text(&self) -> String {
        format!("{} {} {}", self.id, self.integration_id, self.integration_title)
    }
}

/// Wire representation of a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionResource {
    /// Full resource name.
    pub name: String,
    /// Permalink uid.
    pub uid: String,
    /// User-facing id.
    pub id: String,
    /// Owner namespace id.
    pub namespace_id: String,
    /// Integration id.
    pub integration_id: String,
    /// Integration title.
    #[serde(default)]
    pub integration_title: String,
    /// Authentication method.
    pub method: ConnectionMethod,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Setup values (FULL view only, secrets redacted).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup: Option<Value>,
    /// OAuth scopes.
    #[serde(default)]
    pub scopes: Vec<String>,
    /// View this representation was rendered with.
    pub view: View,
    /// Creation time.
    pub create_time: DateTime<Utc>,
    /// Last update time.
    pub update_time: DateTime<Utc>,
}
