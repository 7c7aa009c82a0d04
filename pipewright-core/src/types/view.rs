//! Views and run statuses.

use crate::error::{PipewrightError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Level of detail in a resource representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum View {
    /// Summary fields only.
    #[default]
    #[serde(rename = "VIEW_BASIC")]
    Basic,
    /// Every field, including recipes and setup.
    #[serde(rename = "VIEW_FULL")]
    Full,
    /// Full definition without run-time metadata.
    #[serde(rename = "VIEW_RECIPE")]
    Recipe,
}

impl View {
    /// Parse an optional `view` query parameter.
    ///
    /// Accepts `VIEW_BASIC`, `BASIC`, `basic` and so on; `VIEW_UNSPECIFIED`
    /// and a missing value mean [`View::Basic`].
    pub fn parse(value: Option<&str>) -> Result<Self> {
        let Some(raw) = value else {
            return Ok(Self::Basic);
        };
        let normalized = raw.trim().to_ascii_uppercase();
        let normalized = normalized.strip_prefix("VIEW_").unwrap_or(&normalized);
        match normalized {
            "" | "UNSPECIFIED" | "BASIC" => Ok(Self::Basic),
            "FULL" => Ok(Self::Full),
            "RECIPE" => Ok(Self::Recipe),
            _ => Err(PipewrightError::InvalidArgument {
                field: "view".to_string(),
                cause: format!("unknown view '{}'", raw),
            }),
        }
    }

    /// Whether the view exposes definition detail (recipe, setup, spec).
    pub fn is_detailed(&self) -> bool {
        matches!(self, Self::Full | Self::Recipe)
    }

    /// Canonical string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "VIEW_BASIC",
            Self::Full => "VIEW_FULL",
            Self::Recipe => "VIEW_RECIPE",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a pipeline run or component run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunStatus {
    /// Still executing.
    #[serde(rename = "RUN_STATUS_PROCESSING")]
    Processing,
    /// Finished without error.
    #[serde(rename = "RUN_STATUS_COMPLETED")]
    Completed,
    /// Finished with an error.
    #[serde(rename = "RUN_STATUS_FAILED")]
    Failed,
}

impl RunStatus {
    /// Canonical string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "RUN_STATUS_PROCESSING",
            Self::Completed => "RUN_STATUS_COMPLETED",
            Self::Failed => "RUN_STATUS_FAILED",
        }
    }

    /// Whether the run has finished.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Processing)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_parsing() {
        assert_eq!(View::parse(None).unwrap(), View::Basic);
        assert_eq!(View::parse(Some("VIEW_FULL")).unwrap(), View::Full);
        assert_eq!(View::parse(Some("full")).unwrap(), View::Full);
        assert_eq!(View::parse(Some("VIEW_RECIPE")).unwrap(), View::Recipe);
        assert_eq!(View::parse(Some("VIEW_UNSPECIFIED")).unwrap(), View::Basic);
        assert!(View::parse(Some("VIEW_EVERYTHING")).is_err());
    }

    #[test]
    fn view_detail() {
        assert!(!View::Basic.is_detailed());
        assert!(View::Full.is_detailed());
        assert!(View::Recipe.is_detailed());
    }

    #[test]
    fn run_status_serialization() {
        let json = serde_json::to_string(&RunStatus::Completed).unwrap();
        assert_eq!(json, "\"RUN_STATUS_COMPLETED\"");
        let parsed: RunStatus = serde_json::from_str("\"RUN_STATUS_FAILED\"").unwrap();
        assert_eq!(parsed, RunStatus::Failed);
        assert!(!RunStatus::Processing.is_terminal());
    }
}
