//! Authentication middleware for HTTP requests.

use super::api_key::ApiKeyValidator;
use super::config::AuthConfig;
use super::context::{AuthContext, AuthScope};
use crate::error::{PipewrightError, Result};

/// Identity used for every request when authentication is disabled.
pub const DEFAULT_IDENTITY: &str = "admin";

/// Authentication middleware that validates requests.
pub struct AuthMiddleware;

impl AuthMiddleware {
    /// Authenticate a request based on the provided configuration.
    ///
    /// The key is read from the configured header, falling back to
    /// `Authorization: Bearer <key>`. Exempt paths never fail.
    pub fn authenticate(
        config: &AuthConfig,
        path: &str,
        headers: &impl HeaderAccess,
    ) -> Result<AuthContext> {
        if !config.enabled {
            return Ok(AuthContext::new(DEFAULT_IDENTITY, AuthScope::all()));
        }

        if config.is_path_exempt(path) {
            return Ok(AuthContext::anonymous());
        }

        if let Some(api_key_config) = &config.api_key {
            let validator = ApiKeyValidator::new(api_key_config);

            if let Some(key) = extract_key(validator.header_name(), headers) {
                return match validator.validate(&key) {
                    Some(ctx) => {
                        tracing::debug!(identity = %ctx.identity, "Authenticated via API key");
                        let orgs = config.organizations_of(&ctx.identity);
                        Ok(ctx.with_organizations(orgs))
                    }
                    None => {
                        tracing::warn!(path = %path, "Invalid API key provided");
                        Err(PipewrightError::AuthenticationFailed {
                            cause: "Invalid API key".to_string(),
                        })
                    }
                };
            }
        }

        tracing::warn!(path = %path, "Missing authentication credentials");
        Err(PipewrightError::AuthenticationFailed {
            cause: "Missing authentication credentials".to_string(),
        })
    }

    /// Check if a path requires authentication based on config.
    pub fn requires_auth(config: &AuthConfig, path: &str) -> bool {
        config.enabled && !config.is_path_exempt(path)
    }
}

fn extract_key(header_name: &str, headers: &impl HeaderAccess) -> Option<String> {
    if let Some(key) = headers.get_header(header_name) {
        return Some(key.trim().to_string());
    }
    let auth = headers.get_header("authorization")?;
    let (scheme, token) = auth.trim().split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(token.trim().to_string())
    } else {
        None
    }
}

/// Trait for accessing HTTP headers.
///
/// This allows the middleware to be used with different HTTP libraries.
pub trait HeaderAccess {
    /// Get the value of a header by name (case-insensitive).
    fn get_header(&self, name: &str) -> Option<String>;
}

/// Simple header map implementation for testing.
#[derive(Debug, Default)]
pub struct SimpleHeaders {
    headers: std::collections::HashMap<String, String>,
}

impl SimpleHeaders {
    /// Create a new empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into().to_lowercase(), value.into());
    }

    /// Create with a single header.
    pub fn with(name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut headers = Self::new();
        headers.insert(name, value);
        headers
    }
}

impl HeaderAccess for SimpleHeaders {
    fn get_header(&self, name: &str) -> Option<String> {
        self.headers.get(&name.to_lowercase()).cloned()
    }
}
