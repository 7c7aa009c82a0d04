//! Service configuration.
//!
//! Loaded from YAML, then overridden by environment variables:
//!
//! - `PIPEWRIGHT_HOST`, `PIPEWRIGHT_PORT`: listen address
//! - `PIPEWRIGHT_AUTH_ENABLED`: `true`/`1` to require API keys
//! - `PIPEWRIGHT_RUN_HISTORY`: run history capacity
//! - `PIPEWRIGHT_OPERATION_HISTORY`: async operation capacity
//!
//! ```yaml
//! server:
//!   host: 0.0.0.0
//!   port: 8080
//! auth:
//!   enabled: true
//!   api_key:
//!     keys:
//!       - identity: admin
//!         key_hash: "<sha256 hex>"
//!         scopes: [admin]
//! listing:
//!   default_size: 10
//!   max_size: 100
//! runs:
//!   history_capacity: 1000
//! trigger:
//!   timeout_ms: 300000
//!   operation_capacity: 1000
//! ```

use crate::api::ServerConfig;
use pipewright_core::auth::AuthConfig;
use pipewright_core::pagination::PageLimits;
use pipewright_core::{PipewrightError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default number of runs kept in history.
pub const DEFAULT_RUN_HISTORY: usize = 1000;

/// Default trigger timeout.
pub const DEFAULT_TRIGGER_TIMEOUT_MS: u64 = 300_000;

/// Default number of async trigger operations kept.
pub const DEFAULT_OPERATION_CAPACITY: usize = 1000;

/// Listen address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Run history settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSection {
    /// Maximum number of pipeline runs kept.
    pub history_capacity: usize,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_RUN_HISTORY,
        }
    }
}

/// Trigger settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerSection {
    /// Upper bound on one trigger's execution, in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of async trigger operations kept.
    pub operation_capacity: usize,
}

impl Default for TriggerSection {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TRIGGER_TIMEOUT_MS,
            operation_capacity: DEFAULT_OPERATION_CAPACITY,
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listen address.
    pub server: ServerSection,
    /// Authentication.
    pub auth: AuthConfig,
    /// List page size limits.
    pub listing: PageLimits,
    /// Run history.
    pub runs: RunSection,
    /// Triggering.
    pub trigger: TriggerSection,
}

impl ServiceConfig {
    /// Parse configuration from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| PipewrightError::YamlParse {
            path: None,
            cause: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| PipewrightError::Io {
            path: path.to_path_buf(),
            cause: e.to_string(),
        })?;
        Self::from_yaml(&yaml).map_err(|e| match e {
            PipewrightError::YamlParse { cause, .. } => PipewrightError::YamlParse {
                path: Some(path.to_path_buf()),
                cause,
            },
            other => other,
        })
    }

    /// Apply `PIPEWRIGHT_*` environment overrides.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup`, which maps variable names to values.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(host) = lookup("PIPEWRIGHT_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PIPEWRIGHT_PORT") {
            self.server.port = parse_value("PIPEWRIGHT_PORT", &port)?;
        }
        if let Some(enabled) = lookup("PIPEWRIGHT_AUTH_ENABLED") {
            self.auth.enabled = parse_bool("PIPEWRIGHT_AUTH_ENABLED", &enabled)?;
        }
        if let Some(capacity) = lookup("PIPEWRIGHT_RUN_HISTORY") {
            self.runs.history_capacity = parse_value("PIPEWRIGHT_RUN_HISTORY", &capacity)?;
        }
        if let Some(capacity) = lookup("PIPEWRIGHT_OPERATION_HISTORY") {
            self.trigger.operation_capacity =
                parse_value("PIPEWRIGHT_OPERATION_HISTORY", &capacity)?;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.listing.default_size == 0 || self.listing.max_size == 0 {
            return Err(PipewrightError::ConfigValue {
                field: "listing".to_string(),
                cause: "page sizes must be positive".to_string(),
            });
        }
        if self.listing.default_size > self.listing.max_size {
            return Err(PipewrightError::ConfigValue {
                field: "listing.default_size".to_string(),
                cause: "must not exceed listing.max_size".to_string(),
            });
        }
        if self.runs.history_capacity == 0 {
            return Err(PipewrightError::ConfigValue {
                field: "runs.history_capacity".to_string(),
                cause: "must be positive".to_string(),
            });
        }
        if self.trigger.operation_capacity == 0 {
            return Err(PipewrightError::ConfigValue {
                field: "trigger.operation_capacity".to_string(),
                cause: "must be positive".to_string(),
            });
        }
        if self.auth.enabled && self.auth.api_key.is_none() {
            tracing::warn!("Authentication enabled without API keys; every request will be rejected");
        }
        Ok(())
    }

    /// Listen address for the API server.
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig::new(self.server.host.clone(), self.server.port)
    }

    /// Trigger timeout.
    pub fn trigger_timeout(&self) -> Duration {
        Duration::from_millis(self.trigger.timeout_ms)
    }
}

fn parse_value<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| PipewrightError::ConfigValue {
            field: field.to_string(),
            cause: e.to_string(),
        })
}

fn parse_bool(field: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(PipewrightError::ConfigValue {
            field: field.to_string(),
            cause: format!("expected a boolean, got '{}'", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.server.port, 8080);
        assert!(!config.auth.enabled);
        assert_eq!(config.listing.default_size, 10);
        assert_eq!(config.listing.max_size, 100);
        assert_eq!(config.runs.history_capacity, DEFAULT_RUN_HISTORY);
        assert_eq!(config.trigger_timeout(), Duration::from_secs(300));
        assert_eq!(config.trigger.operation_capacity, DEFAULT_OPERATION_CAPACITY);
    }

    #[test]
    fn parse_yaml() {
        let config = ServiceConfig::from_yaml(
            r#"
server:
  port: 9000
auth:
  enabled: true
  api_key:
    keys:
      - identity: alice
        key_hash: abc
        scopes: [admin]
  organizations:
    - id: acme
      members: [alice]
listing:
  max_size: 50
"#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.auth.enabled);
        assert_eq!(config.auth.api_key.unwrap().keys[0].identity, "alice");
        assert!(config.auth.organizations[0].members.contains(&"alice".to_string()));
        assert_eq!(config.listing.max_size, 50);
        assert_eq!(config.listing.default_size, 10);
        assert!(config.auth.exempt_paths.contains(&"/health".to_string()));
    }

    #[test]
    fn invalid_yaml_and_values() {
        let err = ServiceConfig::from_yaml("server: [").unwrap_err();
        assert_eq!(err.code(), "E801");

        let err = ServiceConfig::from_yaml("listing:\n  default_size: 200\n  max_size: 100\n")
            .unwrap_err();
        assert_eq!(err.code(), "E802");
    }

    #[test]
    fn env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PIPEWRIGHT_HOST", "127.0.0.1"),
            ("PIPEWRIGHT_PORT", "7070"),
            ("PIPEWRIGHT_AUTH_ENABLED", "true"),
            ("PIPEWRIGHT_RUN_HISTORY", "5"),
            ("PIPEWRIGHT_OPERATION_HISTORY", "7"),
        ]
        .into_iter()
        .collect();

        let config = ServiceConfig::default()
            .with_overrides(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7070);
        assert!(config.auth.enabled);
        assert_eq!(config.runs.history_capacity, 5);
        assert_eq!(config.trigger.operation_capacity, 7);

        let err = ServiceConfig::default()
            .with_overrides(|name| (name == "PIPEWRIGHT_PORT").then(|| "http".to_string()))
            .unwrap_err();
        assert_eq!(err.code(), "E802");
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "runs:\n  history_capacity: 7").unwrap();
        let config = ServiceConfig::from_file(file.path()).unwrap();
        assert_eq!(config.runs.history_capacity, 7);

        let err = ServiceConfig::from_file(Path::new("/nonexistent/pipewright.yaml")).unwrap_err();
        assert_eq!(err.code(), "E901");
    }
}
