//! Shared helpers for API integration tests.

#![allow(dead_code)]

use pipewright_core::auth::{
    ApiKeyBuilder, ApiKeyConfig, AuthConfig, AuthScope, OrganizationConfig,
};
use pipewright_server::api::{ApiServer, AppState, ServerConfig, ServerHandle};
use pipewright_server::config::ServiceConfig;
use reqwest::{Method, RequestBuilder, Response};
use serde_json::{json, Value};

pub const ADMIN_KEY: &str = "admin-key";
pub const ALICE_KEY: &str = "alice-key";
pub const READER_KEY: &str = "reader-key";

/// A server running on an ephemeral port.
pub struct TestServer {
    handle: ServerHandle,
    http: reqwest::Client,
    api_key: Option<String>,
}

impl TestServer {
    /// Start a server without authentication.
    pub async fn start() -> Self {
        Self::with_config(ServiceConfig::default()).await
    }

    /// Start a server with the given configuration.
    pub async fn with_config(config: ServiceConfig) -> Self {
        let server = ApiServer::new(ServerConfig::new("127.0.0.1", 0), AppState::new(&config));
        let handle = server.spawn().await.expect("server should start");
        Self {
            handle,
            http: reqwest::Client::new(),
            api_key: None,
        }
    }

    /// Send every request with `X-API-Key: key`.
    pub fn as_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/v1beta{}", self.handle.base_url(), path)
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match &self.api_key {
            Some(key) => builder.header("X-API-Key", key),
            None => builder,
        }
    }

    pub async fn get(&self, path: &str) -> Response {
        self.request(Method::GET, path).send().await.expect("request")
    }

    pub async fn delete(&self, path: &str) -> Response {
        self.request(Method::DELETE, path).send().await.expect("request")
    }

    pub async fn post(&self, path: &str, body: Value) -> Response {
        self.request(Method::POST, path)
            .json(&body)
            .send()
            .await
            .expect("request")
    }

    pub async fn patch(&self, path: &str, body: Value) -> Response {
        self.request(Method::PATCH, path)
            .json(&body)
            .send()
            .await
            .expect("request")
    }

    pub async fn shutdown(self) {
        let _ = self.handle.shutdown().await;
    }
}

/// Configuration with authentication on: an admin, a member `alice` of
/// organization `acme`, and a read-only `reader`.
pub fn auth_config() -> ServiceConfig {
    let keys = ApiKeyConfig::new()
        .with_key(ApiKeyBuilder::new("admin").admin().build_with_key(ADMIN_KEY))
        .with_key(ApiKeyBuilder::new("alice").member().build_with_key(ALICE_KEY))
        .with_key(
            ApiKeyBuilder::new("reader")
                .with_scope(AuthScope::PipelineRead)
                .build_with_key(READER_KEY),
        );
    let mut config = ServiceConfig::default();
    config.auth = AuthConfig::new()
        .enabled()
        .with_api_key(keys)
        .with_organization(OrganizationConfig::new("acme").with_member("alice"));
    config
}

/// Read a JSON body.
pub async fn json_body(response: Response) -> Value {
    response.json().await.expect("JSON body")
}

/// Detailed error code (`E…`) of an error body.
pub fn error_code(body: &Value) -> &str {
    body["details"][0]["code"].as_str().unwrap_or_default()
}

/// A pipeline that extracts `.foo` from its `jota` input.
pub fn jq_pipeline(id: &str) -> Value {
    json!({
        "id": id,
        "description": "extracts foo",
        "recipe": {
            "version": "v1beta",
            "variable": { "jota": { "format": "json" } },
            "component": {
                "json-0": {
                    "type": "json",
                    "task": "TASK_JQ",
                    "input": { "json-value": "${variable.jota}", "jq-filter": ".foo" }
                }
            },
            "output": { "answer": { "value": "${json-0.output.results[0]}" } }
        }
    })
}

/// A pipeline calling `url` with setup from connection `connection`.
pub fn http_pipeline(id: &str, connection: &str, url: &str) -> Value {
    json!({
        "id": id,
        "recipe": {
            "component": {
                "call": {
                    "type": "http",
                    "task": "TASK_GET",
                    "setup": format!("${{connection.{}}}", connection),
                    "input": { "endpoint-url": url }
                }
            },
            "output": {
                "status": { "value": "${call.output.status-code}" },
                "body": { "value": "${call.output.body}" }
            }
        }
    })
}

/// An http connection authenticating with a bearer token.
pub fn bearer_connection(id: &str, token: &str) -> Value {
    json!({
        "id": id,
        "integrationId": "http",
        "method": "METHOD_DICTIONARY",
        "setup": { "authentication": { "auth-type": "BEARER_TOKEN", "token": token } }
    })
}
