//! Load-test configuration.

use crate::error::{LoadTestError, Result};
use crate::suites::Suite;
use std::time::Duration;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Default namespace the suites create resources in.
pub const DEFAULT_NAMESPACE: &str = "users/admin";

/// What to run and against which server.
#[derive(Debug, Clone)]
pub struct LoadTestConfig {
    /// Server base URL, e.g. `http://localhost:8080`.
    pub base_url: String,
    /// Key of an identity with access to `namespace`.
    pub api_key: Option<String>,
    /// Key of an identity without access to `namespace`; enables the
    /// cross-namespace checks of the `auth` suite.
    pub foreign_api_key: Option<String>,
    /// Namespace resource name (`users/{id}` or `organizations/{id}`).
    pub namespace: String,
    /// Concurrent virtual users.
    pub vus: usize,
    /// Iterations per virtual user.
    pub iterations: usize,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Suites each iteration runs, in order.
    pub suites: Vec<Suite>,
}

impl LoadTestConfig {
    /// One virtual user, one iteration of every suite.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            foreign_api_key: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            vus: 1,
            iterations: 1,
            timeout: DEFAULT_TIMEOUT,
            suites: Suite::all().to_vec(),
        }
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the foreign API key.
    #[must_use]
    pub fn with_foreign_api_key(mut self, key: impl Into<String>) -> Self {
        self.foreign_api_key = Some(key.into());
        self
    }

    /// Set the namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the number of virtual users.
    #[must_use]
    pub fn with_vus(mut self, vus: usize) -> Self {
        self.vus = vus;
        self
    }

    /// Set the iterations per virtual user.
    #[must_use]
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the suites to run.
    #[must_use]
    pub fn with_suites(mut self, suites: Vec<Suite>) -> Self {
        self.suites = suites;
        self
    }

    /// Id part of the namespace, used for `namespaces/{id}/connections`.
    pub fn namespace_id(&self) -> &str {
        self.namespace
            .rsplit_once('/')
            .map(|(_, id)| id)
            .unwrap_or(&self.namespace)
    }

    /// Check the configuration before running.
    pub fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(LoadTestError::InvalidConfig(format!(
                "base URL must start with http:// or https://, got: {}",
                self.base_url
            )));
        }
        if self.vus == 0 {
            return Err(LoadTestError::InvalidConfig("vus must be at least 1".to_string()));
        }
        if self.iterations == 0 {
            return Err(LoadTestError::InvalidConfig(
                "iterations must be at least 1".to_string(),
            ));
        }
        if self.suites.is_empty() {
            return Err(LoadTestError::InvalidConfig("no suites selected".to_string()));
        }
        match self.namespace.split_once('/') {
            Some(("users" | "organizations", id)) if !id.is_empty() && !id.contains('/') => Ok(()),
            _ => Err(LoadTestError::InvalidConfig(format!(
                "namespace must be users/{{id}} or organizations/{{id}}, got: {}",
                self.namespace
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = LoadTestConfig::new("http://localhost:8080");
        assert_eq!(config.timeout, Duration::from_secs(300));
        assert_eq!(config.vus, 1);
        assert_eq!(config.suites.len(), Suite::all().len());
        assert_eq!(config.namespace_id(), "admin");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let config = LoadTestConfig::new("localhost:8080");
        assert!(matches!(config.validate(), Err(LoadTestError::InvalidConfig(_))));

        let config = LoadTestConfig::new("http://localhost").with_vus(0);
        assert!(config.validate().is_err());

        let config = LoadTestConfig::new("http://localhost").with_suites(Vec::new());
        assert!(config.validate().is_err());

        let config = LoadTestConfig::new("http://localhost").with_namespace("teams/x");
        assert!(config.validate().is_err());

        let config = LoadTestConfig::new("http://localhost").with_namespace("organizations/acme");
        assert!(config.validate().is_ok());
        assert_eq!(config.namespace_id(), "acme");
    }
}
