//! API key validation utilities.

use super::config::{ApiKeyConfig, ApiKeyEntry};
use super::context::{AuthContext, AuthScope};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// A hashed API key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeyHash(String);

impl ApiKeyHash {
    /// Wrap an existing hex-encoded hash.
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into().to_lowercase())
    }

    /// Hash a plaintext API key.
    pub fn from_plaintext(key: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Get the hex-encoded hash.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validates API keys against configured entries.
pub struct ApiKeyValidator<'a> {
    config: &'a ApiKeyConfig,
}

impl<'a> ApiKeyValidator<'a> {
    /// Create a new validator with the given configuration.
    pub fn new(config: &'a ApiKeyConfig) -> Self {
        Self { config }
    }

    /// Get the expected header name for API keys.
    pub fn header_name(&self) -> &str {
        &self.config.header_name
    }

    /// Validate an API key and return the authentication context.
    ///
    /// Returns `None` if the key is invalid, expired, or not found.
    pub fn validate(&self, key: &str) -> Option<AuthContext> {
        self.validate_hash(&ApiKeyHash::from_plaintext(key))
    }

    /// Validate a pre-hashed API key.
    pub fn validate_hash(&self, hash: &ApiKeyHash) -> Option<AuthContext> {
        let entry = self
            .config
            .keys
            .iter()
            .find(|entry| entry.key_hash.to_lowercase() == hash.as_str())?;

        if entry.is_expired() {
            tracing::warn!(identity = %entry.identity, "API key has expired");
            return None;
        }

        Some(AuthContext::new(entry.identity.clone(), entry.scopes.clone()))
    }
}

/// Builder for creating API key entries for testing or configuration.
pub struct ApiKeyBuilder {
    identity: String,
    scopes: HashSet<AuthScope>,
    expires_at: Option<u64>,
}

impl ApiKeyBuilder {
    /// Create a new builder with the given identity.
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            scopes: HashSet::new(),
            expires_at: None,
        }
    }

    /// Add a scope.
    pub fn with_scope(mut self, scope: AuthScope) -> Self {
        self.scopes.insert(scope);
        self
    }

    /// Add read-only scopes.
    pub fn read_only(mut self) -> Self {
        self.scopes.extend(AuthScope::read_only());
        self
    }

    /// Add every non-admin scope.
    pub fn member(mut self) -> Self {
        self.scopes.extend(AuthScope::member());
        self
    }

    /// Add all scopes (admin).
    pub fn admin(mut self) -> Self {
        self.scopes.extend(AuthScope::all());
        self
    }

    /// Set expiration time as Unix timestamp (seconds since epoch).
    pub fn expires_at(mut self, timestamp: u64) -> Self {
        self.expires_at = Some(timestamp);
        self
    }

    /// Set expiration relative to now (in seconds).
    pub fn expires_in(mut self, seconds: u64) -> Self {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        self.expires_at = Some(now + seconds);
        self
    }

    /// Build the API key entry with a plaintext key.
    pub fn build_with_key(self, plaintext_key: &str) -> ApiKeyEntry {
        let hash = ApiKeyHash::from_plaintext(plaintext_key);
        self.build_with_hash(hash.0)
    }

    /// Build the API key entry with a pre-computed hash.
    pub fn build_with_hash(self, hash: impl Into<String>) -> ApiKeyEntry {
        ApiKeyEntry {
            identity: self.identity,
            key_hash: hash.into().to_lowercase(),
            scopes: self.scopes,
            expires_at: self.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ApiKeyConfig {
        let entry = ApiKeyBuilder::new("test-client")
            .with_scope(AuthScope::PipelineRead)
            .with_scope(AuthScope::ConnectionRead)
            .build_with_key("test-api-key-12345");

        ApiKeyConfig::new().with_key(entry)
    }

    #[test]
    fn hash_consistency() {
        let hash1 = ApiKeyHash::from_plaintext("test-key");
        let hash2 = ApiKeyHash::from_plaintext("test-key");
        assert_eq!(hash1, hash2);
        assert_ne!(hash1, ApiKeyHash::from_plaintext("other-key"));
        assert_eq!(hash1.as_str().len(), 64);
    }

    #[test]
    fn known_digest() {
        let hash = ApiKeyHash::from_plaintext("abc");
        assert_eq!(
            hash.as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(ApiKeyHash::new(hash.as_str().to_uppercase()), hash);
    }

    #[test]
    fn validate_valid_key() {
        let config = test_config();
        let validator = ApiKeyValidator::new(&config);

        let ctx = validator.validate("test-api-key-12345").unwrap();
        assert_eq!(ctx.identity, "test-client");
        assert!(ctx.has_scope(AuthScope::PipelineRead));
        assert!(!ctx.has_scope(AuthScope::PipelineWrite));
    }

    #[test]
    fn validate_invalid_key() {
        let config = test_config();
        let validator = ApiKeyValidator::new(&config);
        assert!(validator.validate("invalid-key").is_none());
    }

    #[test]
    fn validate_expired_key_fails() {
        let expired_entry = ApiKeyBuilder::new("expired-client")
            .with_scope(AuthScope::PipelineRead)
            .expires_at(0)
            .build_with_key("expired-key");

        let config = ApiKeyConfig::new().with_key(expired_entry);
        let validator = ApiKeyValidator::new(&config);
        assert!(validator.validate("expired-key").is_none());
    }

    #[test]
    fn validate_future_expiry_succeeds() {
        let entry = ApiKeyBuilder::new("temp-client")
            .member()
            .expires_in(3600)
            .build_with_key("temp-key");
        assert!(!entry.is_expired());

        let config = ApiKeyConfig::new().with_key(entry);
        let ctx = ApiKeyValidator::new(&config).validate("temp-key").unwrap();
        assert!(ctx.has_scope(AuthScope::PipelineTrigger));
        assert!(!ctx.has_scope(AuthScope::Admin));
    }
}
