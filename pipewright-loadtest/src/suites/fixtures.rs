//! Request bodies shared by suites.

use serde_json::{json, Value};

/// A pipeline extracting `.foo` from its `jota` input into `answer`.
pub fn jq_pipeline(id: &str) -> Value {
    json!({
        "id": id,
        "description": "load test pipeline",
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

/// A pipeline whose http component takes its setup from `connection`.
pub fn http_pipeline(id: &str, connection: &str) -> Value {
    json!({
        "id": id,
        "recipe": {
            "component": {
                "call": {
                    "type": "http",
                    "task": "TASK_GET",
                    "setup": format!("${{connection.{}}}", connection),
                    "input": { "endpoint-url": "http://127.0.0.1:9/" }
                }
            },
            "output": { "status": { "value": "${call.output.status-code}" } }
        }
    })
}

/// An http connection authenticating with a bearer token.
pub fn bearer_connection(id: &str) -> Value {
    json!({
        "id": id,
        "integrationId": "http",
        "method": "METHOD_DICTIONARY",
        "description": "load test connection",
        "setup": { "authentication": { "auth-type": "BEARER_TOKEN", "token": "load-test-token" } }
    })
}

/// Inputs for the jq pipeline.
pub fn jq_inputs(foo: Value) -> Value {
    json!({ "inputs": [{ "jota": { "foo": foo } }] })
}
