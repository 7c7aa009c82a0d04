//! HTTP component: call an external endpoint.
//!
//! Authentication comes from the component setup, usually a connection:
//!
//! ```yaml
//! setup: ${connection.my-api}
//! # connection setup:
//! #   authentication:
//! #     auth-type: BEARER_TOKEN
//! #     token: "..."
//! ```
//!
//! Non-2xx responses are returned as output; only transport failures fail
//! the component.

use crate::catalog::{definition, ComponentMetadata};
use crate::engine::component::{Component, ComponentContext, ComponentFuture};
use pipewright_core::model::{ComponentDefinition, ComponentType, TaskInfo};
use pipewright_core::Result;
use reqwest::{Method, RequestBuilder};
use serde_json::{json, Map, Value};

/// Generic HTTP client component.
pub struct HttpComponent;

fn method_for(task: &str) -> Option<Method> {
    match task {
        "TASK_GET" => Some(Method::GET),
        "TASK_POST" => Some(Method::POST),
        "TASK_PUT" => Some(Method::PUT),
        "TASK_PATCH" => Some(Method::PATCH),
        "TASK_DELETE" => Some(Method::DELETE),
        _ => None,
    }
}

fn setup_str<'v>(ctx: &ComponentContext, auth: &'v Value, field: &str) -> Result<&'v str> {
    auth.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ctx.fail(format!("authentication is missing '{}'", field)))
}

fn authenticate(ctx: &ComponentContext, request: RequestBuilder) -> Result<RequestBuilder> {
    let Some(auth) = ctx.setup.as_ref().and_then(|s| s.get("authentication")) else {
        return Ok(request);
    };

    let auth_type = auth
        .get("auth-type")
        .and_then(Value::as_str)
        .unwrap_or("NO_AUTH");
    match auth_type {
        "NO_AUTH" => Ok(request),
        "BEARER_TOKEN" => Ok(request.bearer_auth(setup_str(ctx, auth, "token")?)),
        "BASIC_AUTH" => {
            let username = setup_str(ctx, auth, "username")?;
            let password = auth.get("password").and_then(Value::as_str);
            Ok(request.basic_auth(username, password))
        }
        "API_KEY" => {
            let key = setup_str(ctx, auth, "key")?;
            let value = setup_str(ctx, auth, "value")?;
            match auth.get("auth-location").and_then(Value::as_str) {
                Some("query") => Ok(request.query(&[(key, value)])),
                _ => Ok(request.header(key, value)),
            }
        }
        other => Err(ctx.fail(format!("unsupported auth-type '{}'", other))),
    }
}

impl HttpComponent {
    async fn call(ctx: &ComponentContext, method: Method, input: &Value) -> Result<Value> {
        let url = ctx.required_str(input, "endpoint-url")?;
        let mut request = ctx.http.request(method.clone(), url);

        if let Some(headers) = input.get("header").and_then(Value::as_object) {
            for (name, value) in headers {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                request = request.header(name.as_str(), value);
            }
        }
        match input.get("body") {
            None | Some(Value::Null) => {}
            Some(Value::String(text)) => request = request.body(text.clone()),
            Some(body) => request = request.json(body),
        }
        request = authenticate(ctx, request)?;

        tracing::debug!(component_id = %ctx.component_id, %method, url, "Calling HTTP endpoint");
        let response = request
            .send()
            .await
            .map_err(|e| ctx.fail(format!("request to {} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        let mut header = Map::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                header
                    .entry(name.as_str().to_string())
                    .or_insert_with(|| Value::String(value.to_string()));
            }
        }
        let text = response
            .text()
            .await
            .map_err(|e| ctx.fail(format!("failed to read response body: {}", e)))?;
        let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));

        Ok(json!({ "status-code": status, "header": header, "body": body }))
    }
}

impl Component for HttpComponent {
    fn id(&self) -> &'static str {
        "http"
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a ComponentContext,
        task: &'a str,
        input: Value,
    ) -> ComponentFuture<'a> {
        Box::pin(async move {
            let method = method_for(task).ok_or_else(|| ctx.unsupported_task(task))?;
            Self::call(ctx, method, &input).await
        })
    }
}

impl ComponentMetadata for HttpComponent {
    fn definition() -> ComponentDefinition {
        let input = json!({
            "type": "object",
            "required": ["endpoint-url"],
            "properties": {
                "endpoint-url": { "type": "string" },
                "header": { "type": "object" },
                "body": { "title": "Body" }
            }
        });
        let output = json!({
            "type": "object",
            "properties": {
                "status-code": { "type": "integer" },
                "header": { "type": "object" },
                "body": { "title": "Body" }
            }
        });
        let task = json!({ "input": input, "output": output });

        definition(
            "http",
            "HTTP",
            ComponentType::Application,
            "Send requests to HTTP endpoints",
            vec![
                TaskInfo::new("TASK_GET", "GET", "Send a GET request"),
                TaskInfo::new("TASK_POST", "POST", "Send a POST request"),
                TaskInfo::new("TASK_PUT", "PUT", "Send a PUT request"),
                TaskInfo::new("TASK_PATCH", "PATCH", "Send a PATCH request"),
                TaskInfo::new("TASK_DELETE", "DELETE", "Send a DELETE request"),
            ],
            json!({
                "setup": {
                    "type": "object",
                    "properties": {
                        "authentication": {
                            "type": "object",
                            "secret": true,
                            "properties": {
                                "auth-type": {
                                    "type": "string",
                                    "enum": ["NO_AUTH", "BEARER_TOKEN", "BASIC_AUTH", "API_KEY"]
                                },
                                "token": { "type": "string" },
                                "username": { "type": "string" },
                                "password": { "type": "string" },
                                "key": { "type": "string" },
                                "value": { "type": "string" },
                                "auth-location": { "type": "string", "enum": ["header", "query"] }
                            }
                        }
                    }
                },
                "tasks": {
                    "TASK_GET": task.clone(),
                    "TASK_POST": task.clone(),
                    "TASK_PUT": task.clone(),
                    "TASK_PATCH": task.clone(),
                    "TASK_DELETE": task
                }
            }),
        )
    }
}
