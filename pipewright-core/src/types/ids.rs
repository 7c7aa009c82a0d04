//! Strongly-typed identifiers for Pipewright resources.

use crate::error::{PipewrightError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Maximum length of a resource id.
pub const MAX_ID_LENGTH: usize = 63;

/// User-facing resource id.
///
/// Follows RFC-1034 label rules: a lowercase ASCII letter first, then
/// lowercase letters, digits or `-`, never ending with `-`, at most
/// [`MAX_ID_LENGTH`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Parse a generic resource id.
    pub fn parse(id: &str) -> Result<Self> {
        Self::parse_kind("resource", id)
    }

    /// Parse an id for the given resource kind; the kind appears in errors.
    pub fn parse_kind(kind: &'static str, id: &str) -> Result<Self> {
        let invalid = |cause: &str| PipewrightError::InvalidId {
            kind,
            id: id.to_string(),
            cause: cause.to_string(),
        };

        if id.is_empty() {
            return Err(invalid("id must not be empty"));
        }
        if !id.is_ascii() {
            return Err(invalid("id must contain only ASCII characters"));
        }
        if id.len() > MAX_ID_LENGTH {
            return Err(invalid(&format!(
                "id must be at most {} characters",
                MAX_ID_LENGTH
            )));
        }

        let first = id.as_bytes()[0];
        if !first.is_ascii_lowercase() {
            return Err(invalid("id must start with a lowercase letter"));
        }
        if id.ends_with('-') {
            return Err(invalid("id must not end with '-'"));
        }
        if let Some(c) = id
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(invalid(&format!(
                "id may contain only lowercase letters, digits and '-', found '{}'",
                c
            )));
        }

        Ok(Self(id.to_string()))
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Server-generated resource uid (UUIDv4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(Uuid);

impl Uid {
    /// Generate a new random uid.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a uid from its hyphenated string form.
    pub fn parse(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| PipewrightError::InvalidArgument {
                field: "uid".to_string(),
                cause: e.to_string(),
            })
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for Uid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_ids() {
        for id in ["a", "pipeline-1", "abc123", "x-y-z"] {
            assert!(ResourceId::parse(id).is_ok(), "{id} should be valid");
        }
        let max = format!("a{}", "b".repeat(MAX_ID_LENGTH - 1));
        assert!(ResourceId::parse(&max).is_ok());
    }

    #[test]
    fn rejects_invalid_ids() {
        let too_long = "a".repeat(MAX_ID_LENGTH + 1);
        for id in [
            "",
            "1abc",
            "-abc",
            "abc-",
            "Abc",
            "a_b",
            "a.b",
            "パイプライン",
            "caf\u{e9}",
            too_long.as_str(),
        ] {
            let err = ResourceId::parse_kind("pipeline", id).unwrap_err();
            assert_eq!(err.code(), "E101", "{id} should be rejected");
        }
    }

    #[test]
    fn error_names_violated_rule() {
        let err = ResourceId::parse("abc-").unwrap_err();
        assert!(err.to_string().contains("must not end with '-'"));

        let err = ResourceId::parse("héllo").unwrap_err();
        assert!(err.to_string().contains("ASCII"));
    }

    #[test]
    fn deserialize_validates() {
        let ok: ResourceId = serde_json::from_str("\"my-pipe\"").unwrap();
        assert_eq!(ok.as_str(), "my-pipe");
        assert!(serde_json::from_str::<ResourceId>("\"My Pipe\"").is_err());
    }

    #[test]
    fn uid_roundtrip() {
        let uid = Uid::new();
        let parsed = Uid::parse(&uid.to_string()).unwrap();
        assert_eq!(uid, parsed);
        assert!(Uid::parse("not-a-uuid").is_err());
    }
}
