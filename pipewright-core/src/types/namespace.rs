//! Resource namespaces.

use super::ResourceId;
use crate::error::{PipewrightError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of namespace owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamespaceKind {
    /// An individual user.
    User,
    /// An organization.
    Organization,
}

impl NamespaceKind {
    /// Collection segment used in resource names.
    pub fn collection(&self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Organization => "organizations",
        }
    }
}

/// Owner of a resource, rendered as `users/{id}` or `organizations/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    /// Owner kind.
    pub kind: NamespaceKind,
    /// Owner id.
    pub id: ResourceId,
}

impl Namespace {
    /// Create a user namespace.
    pub fn user(id: ResourceId) -> Self {
        Self {
            kind: NamespaceKind::User,
            id,
        }
    }

    /// Create an organization namespace.
    pub fn organization(id: ResourceId) -> Self {
        Self {
            kind: NamespaceKind::Organization,
            id,
        }
    }

    /// Parse `users/{id}`, `organizations/{id}` or `namespaces/{id}`.
    ///
    /// `namespaces/{id}` yields a user namespace; callers that know the
    /// registered organizations fix the kind with [`Namespace::with_kind`].
    pub fn parse(path: &str) -> Result<Self> {
        let path = path.trim_matches('/');
        let (collection, id) = path.split_once('/').ok_or_else(|| invalid(path))?;
        if id.is_empty() || id.contains('/') {
            return Err(invalid(path));
        }

        let kind = match collection {
            "users" | "namespaces" => NamespaceKind::User,
            "organizations" => NamespaceKind::Organization,
            _ => return Err(invalid(path)),
        };

        Ok(Self {
            kind,
            id: ResourceId::parse_kind("namespace", id)?,
        })
    }

    /// Parse a namespace from its collection and id segments.
    pub fn from_segments(collection: &str, id: &str) -> Result<Self> {
        Self::parse(&format!("{}/{}", collection, id))
    }

    /// Replace the namespace kind.
    pub fn with_kind(mut self, kind: NamespaceKind) -> Self {
        self.kind = kind;
        self
    }

    /// Render as a resource name prefix.
    pub fn name(&self) -> String {
        format!("{}/{}", self.kind.collection(), self.id)
    }
}

fn invalid(path: &str) -> PipewrightError {
    PipewrightError::InvalidArgument {
        field: "namespace".to_string(),
        cause: format!(
            "'{}' is not of the form users/{{id}}, organizations/{{id}} or namespaces/{{id}}",
            path
        ),
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind.collection(), self.id)
    }
}

impl Serialize for Namespace {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Namespace {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
