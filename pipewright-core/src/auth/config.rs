//! Authentication configuration types.

use super::AuthScope;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// API prefix stripped before matching exempt paths.
const API_PREFIX: &str = "/v1beta";

/// Configuration for API authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Whether authentication is enabled.
    pub enabled: bool,
    /// API key configuration.
    pub api_key: Option<ApiKeyConfig>,
    /// Paths exempt from authentication (e.g., ["/health"]).
    pub exempt_paths: Vec<String>,
    /// Organizations and their members.
    pub organizations: Vec<OrganizationConfig>,
}

impl AuthConfig {
    /// Create a new authentication configuration with defaults.
    pub fn new() -> Self {
        Self {
            enabled: false,
            api_key: None,
            exempt_paths: vec!["/health".to_string(), "/ready".to_string()],
            organizations: Vec::new(),
        }
    }

    /// Enable authentication.
    pub fn enabled(mut self) -> Self {
        self.enabled = true;
        self
    }

    /// Set API key configuration.
    pub fn with_api_key(mut self, config: ApiKeyConfig) -> Self {
        self.api_key = Some(config);
        self
    }

    /// Add an exempt path.
    pub fn with_exempt_path(mut self, path: impl Into<String>) -> Self {
        self.exempt_paths.push(path.into());
        self
    }

    /// Register an organization.
    pub fn with_organization(mut self, org: OrganizationConfig) -> Self {
        self.organizations.push(org);
        self
    }

    /// Check if a path is exempt from authentication.
    pub fn is_path_exempt(&self, path: &str) -> bool {
        let path = path
            .strip_prefix(API_PREFIX)
            .unwrap_or(path)
            .trim_end_matches('/');

        self.exempt_paths.iter().any(|exempt| {
            let exempt = exempt.trim_end_matches('/');
            path == exempt || path.starts_with(&format!("{}/", exempt))
        })
    }

    /// Whether `id` names a registered organization.
    pub fn is_organization(&self, id: &str) -> bool {
        self.organizations.iter().any(|org| org.id == id)
    }

    /// Organizations `identity` is a member of.
    pub fn organizations_of(&self, identity: &str) -> Vec<String> {
        self.organizations
            .iter()
            .filter(|org| org.members.iter().any(|m| m == identity))
            .map(|org| org.id.clone())
            .collect()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// An organization and its member identities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationConfig {
    /// Organization id.
    pub id: String,
    /// Member identities.
    #[serde(default)]
    pub members: Vec<String>,
}

impl OrganizationConfig {
    /// Create an organization with no members.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            members: Vec::new(),
        }
    }

    /// Add a member.
    pub fn with_member(mut self, identity: impl Into<String>) -> Self {
        self.members.push(identity.into());
        self
    }
}

/// Configuration for API key authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyConfig {
    /// Header name for the API key.
    #[serde(default = "default_header_name")]
    pub header_name: String,
    /// Hashed API keys mapped to their scopes.
    #[serde(default)]
    pub keys: Vec<ApiKeyEntry>,
}

fn default_header_name() -> String {
    "X-API-Key".to_string()
}

impl ApiKeyConfig {
    /// Create a new API key configuration with default header.
    pub fn new() -> Self {
        Self {
            header_name: default_header_name(),
            keys: Vec::new(),
        }
    }

    /// Set the header name.
    pub fn with_header(mut self, name: impl Into<String>) -> Self {
        self.header_name = name.into();
        self
    }

    /// Add an API key entry.
    pub fn with_key(mut self, entry: ApiKeyEntry) -> Self {
        self.keys.push(entry);
        self
    }
}

impl Default for ApiKeyConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// An API key entry with associated scopes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyEntry {
    /// Identity associated with this key; owns the `users/{identity}` namespace.
    pub identity: String,
    /// SHA-256 hash of the API key (hex encoded).
    pub key_hash: String,
    /// Scopes granted to this key.
    #[serde(default)]
    pub scopes: HashSet<AuthScope>,
    /// Optional expiration time (Unix timestamp in seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl ApiKeyEntry {
    /// Create a new API key entry.
    pub fn new(identity: impl Into<String>, key_hash: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            key_hash: key_hash.into(),
            scopes: HashSet::new(),
            expires_at: None,
        }
    }

    /// Add a scope to this entry.
    pub fn with_scope(mut self, scope: AuthScope) -> Self {
        self.scopes.insert(scope);
        self
    }

    /// Grant all scopes (admin).
    pub fn with_all_scopes(mut self) -> Self {
        self.scopes = AuthScope::all();
        self
    }

    /// Check if this key has expired.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => chrono::Utc::now().timestamp() >= expires_at as i64,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_config_defaults() {
        let config = AuthConfig::default();
        assert!(!config.enabled);
        assert!(config.api_key.is_none());
        assert!(config.is_path_exempt("/v1beta/health/pipeline"));
        assert!(config.is_path_exempt("/v1beta/ready/pipeline"));
    }

    #[test]
    fn path_exemption() {
        let config = AuthConfig::new().with_exempt_path("/status");

        assert!(config.is_path_exempt("/health"));
        assert!(config.is_path_exempt("/v1beta/status"));
        assert!(!config.is_path_exempt("/v1beta/users/admin/pipelines"));
        assert!(!config.is_path_exempt("/v1beta/healthy"));
    }

    #[test]
    fn organization_membership() {
        let config = AuthConfig::new()
            .with_organization(OrganizationConfig::new("acme").with_member("alice"))
            .with_organization(OrganizationConfig::new("globex").with_member("bob"));

        assert!(config.is_organization("acme"));
        assert!(!config.is_organization("alice"));
        assert_eq!(config.organizations_of("alice"), vec!["acme".to_string()]);
        assert!(config.organizations_of("carol").is_empty());
    }

    #[test]
    fn deserialize_from_yaml() {
        let yaml = r#"
enabled: true
api_key:
  keys:
    - identity: admin
      key_hash: abc123
      scopes: ["admin"]
organizations:
  - id: acme
    members: [admin]
"#;
        let config: AuthConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.enabled);
        let api_key = config.api_key.as_ref().unwrap();
        assert_eq!(api_key.header_name, "X-API-Key");
        assert!(api_key.keys[0].scopes.contains(&AuthScope::Admin));
        assert!(config.exempt_paths.contains(&"/health".to_string()));
    }

    #[test]
    fn entry_expiry() {
        let entry = ApiKeyEntry::new("a", "h");
        assert!(!entry.is_expired());
        let mut expired = ApiKeyEntry::new("a", "h");
        expired.expires_at = Some(0);
        assert!(expired.is_expired());
    }
}
