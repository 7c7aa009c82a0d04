//! Authentication context and scope definitions.

use crate::error::{PipewrightError, Result};
use crate::types::{Namespace, NamespaceKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Authorization scopes for API access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthScope {
    /// Read pipelines, runs and the catalog.
    #[serde(rename = "pipeline:read", alias = "pipeline_read")]
    PipelineRead,
    /// Create, modify, rename or delete pipelines.
    #[serde(rename = "pipeline:write", alias = "pipeline_write")]
    PipelineWrite,
    /// Trigger pipelines.
    #[serde(rename = "pipeline:trigger", alias = "pipeline_trigger")]
    PipelineTrigger,
    /// Read connections.
    #[serde(rename = "connection:read", alias = "connection_read")]
    ConnectionRead,
    /// Create, modify or delete connections.
    #[serde(rename = "connection:write", alias = "connection_write")]
    ConnectionWrite,
    /// Administrative access.
    #[serde(rename = "admin")]
    Admin,
}

impl AuthScope {
    /// Get all available scopes.
    pub fn all() -> HashSet<Self> {
        [
            Self::PipelineRead,
            Self::PipelineWrite,
            Self::PipelineTrigger,
            Self::ConnectionRead,
            Self::ConnectionWrite,
            Self::Admin,
        ]
        .into_iter()
        .collect()
    }

    /// Get read-only scopes.
    pub fn read_only() -> HashSet<Self> {
        [Self::PipelineRead, Self::ConnectionRead].into_iter().collect()
    }

    /// Every scope except `admin`.
    pub fn member() -> HashSet<Self> {
        let mut scopes = Self::all();
        scopes.remove(&Self::Admin);
        scopes
    }

    /// Parse scope from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pipeline:read" | "pipeline_read" => Some(Self::PipelineRead),
            "pipeline:write" | "pipeline_write" => Some(Self::PipelineWrite),
            "pipeline:trigger" | "pipeline_trigger" => Some(Self::PipelineTrigger),
            "connection:read" | "connection_read" => Some(Self::ConnectionRead),
            "connection:write" | "connection_write" => Some(Self::ConnectionWrite),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PipelineRead => "pipeline:read",
            Self::PipelineWrite => "pipeline:write",
            Self::PipelineTrigger => "pipeline:trigger",
            Self::ConnectionRead => "connection:read",
            Self::ConnectionWrite => "connection:write",
            Self::Admin => "admin",
        }
    }
}

/// Authentication context for a validated request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Identity of the authenticated client; also its user namespace id.
    pub identity: String,
    /// Scopes granted to this client.
    pub scopes: HashSet<AuthScope>,
    /// Organizations the identity is a member of.
    pub organizations: HashSet<String>,
}

impl AuthContext {
    /// Create a new authentication context.
    pub fn new(identity: impl Into<String>, scopes: HashSet<AuthScope>) -> Self {
        Self {
            identity: identity.into(),
            scopes,
            organizations: HashSet::new(),
        }
    }

    /// Create an anonymous context (for exempt paths).
    pub fn anonymous() -> Self {
        Self::new("anonymous", HashSet::new())
    }

    /// Attach organization memberships.
    pub fn with_organizations(mut self, orgs: impl IntoIterator<Item = String>) -> Self {
        self.organizations.extend(orgs);
        self
    }

    /// Check if this context has a specific scope.
    pub fn has_scope(&self, scope: AuthScope) -> bool {
        self.scopes.contains(&AuthScope::Admin) || self.scopes.contains(&scope)
    }

    /// Require a scope, returning an error if not present.
    pub fn require_scope(&self, scope: AuthScope) -> Result<()> {
        if self.has_scope(scope) {
            Ok(())
        } else {
            Err(PipewrightError::AuthorizationDenied {
                identity: self.identity.clone(),
                cause: format!("missing scope '{}'", scope.as_str()),
            })
        }
    }

    /// Whether the identity may act within `namespace`.
    pub fn can_access(&self, namespace: &Namespace) -> bool {
        if self.scopes.contains(&AuthScope::Admin) {
            return true;
        }
        match namespace.kind {
            NamespaceKind::User => namespace.id.as_str() == self.identity,
            NamespaceKind::Organization => self.organizations.contains(namespace.id.as_str()),
        }
    }

    /// Require access to `namespace`.
    pub fn require_access(&self, namespace: &Namespace) -> Result<()> {
        if self.can_access(namespace) {
            Ok(())
        } else {
            Err(PipewrightError::AuthorizationDenied {
                identity: self.identity.clone(),
                cause: format!("no access to namespace '{}'", namespace),
            })
        }
    }
}
