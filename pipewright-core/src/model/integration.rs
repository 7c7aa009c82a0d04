//! Integrations: third-party services a connection can be made to.

use crate::filter::{FilterValue, Filterable};
use crate::types::{Uid, View};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// OAuth endpoints of an integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthConfig {
    /// Authorization URL.
    pub auth_url: String,
    /// Token URL.
    pub access_url: String,
    /// Scopes requested by default.
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// An integration in the catalog.
#[derive(Debug, Clone)]
pub struct Integration {
    /// Permalink uid.
    pub uid: Uid,
    /// Id (same as the component definition id).
    pub id: String,
    /// Display title.
    pub title: String,
    /// Vendor name.
    pub vendor: String,
    /// Description.
    pub description: String,
    /// Icon path.
    pub icon: String,
    /// JSON schema of a connection's setup.
    pub setup_schema: Value,
    /// OAuth configuration, when OAuth is supported.
    pub oauth_config: Option<OAuthConfig>,
    /// Documentation link.
    pub help_link: Option<String>,
}

impl Integration {
    /// Setup fields marked `"secret": true` in the schema.
    pub fn secret_fields(&self) -> Vec<String> {
        self.setup_schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| {
                props
                    .iter()
                    .filter(|(_, prop)| prop.get("secret").and_then(Value::as_bool) == Some(true))
                    .map(|(name, _)| name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Render for `view`; BASIC omits the schemas.
    pub fn to_resource(&self, view: View) -> IntegrationResource {
        let detailed = view.is_detailed();
        IntegrationResource {
            uid: self.uid.to_string(),
            id: self.id.clone(),
            title: self.title.clone(),
            vendor: self.vendor.clone(),
            description: self.description.clone(),
            icon: self.icon.clone(),
            help_link: self.help_link.clone(),
            setup_schema: detailed.then(|| self.setup_schema.clone()),
            o_auth_config: if detailed {
                self.oauth_config.clone()
            } else {
                None
            },
            view,
        }
    }
}

impl Filterable for Integration {
    fn filter_fields() -> &'static [&'static str] {
        &["id", "title", "vendor"]
    }

    fn filter_value(&self, field: &str) -> Option<FilterValue> {
        match field {
            "id" => Some(self.id.as_str().into()),
            "title" => Some(self.title.as_str().into()),
            "vendor" => Some(self.vendor.as_str().into()),
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

/// Wire representation of an integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationResource {
    /// Permalink uid.
    pub uid: String,
    /// Id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Vendor name.
    #[serde(default)]
    pub vendor: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Icon path.
    #[serde(default)]
    pub icon: String,
    /// Documentation link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_link: Option<String>,
    /// Setup schema (FULL view only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_schema: Option<Value>,
    /// OAuth configuration (FULL view only).
    #[serde(default, rename = "oAuthConfig", skip_serializing_if = "Option::is_none")]
    pub o_auth_config: Option<OAuthConfig>,
    /// View this representation was rendered with.
    pub view: View,
}
