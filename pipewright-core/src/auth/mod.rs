//! Authentication and authorization module.
//!
//! Provides API key-based authentication with scope-based authorization and
//! namespace ownership checks.

mod api_key;
mod config;
mod context;
mod middleware;

pub use api_key::{ApiKeyBuilder, ApiKeyHash, ApiKeyValidator};
pub use config::{ApiKeyConfig, ApiKeyEntry, AuthConfig, OrganizationConfig};
pub use context::{AuthContext, AuthScope};
pub use middleware::{AuthMiddleware, DEFAULT_IDENTITY, HeaderAccess, SimpleHeaders};
