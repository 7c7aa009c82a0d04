//! API key authentication and namespace authorization.

mod common;

use common::{auth_config, error_code, jq_pipeline, json_body, TestServer, ADMIN_KEY, ALICE_KEY, READER_KEY};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn health_needs_no_credentials() {
    let server = TestServer::with_config(auth_config()).await;

    let response = server.get("/health/pipeline").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "SERVING_STATUS_SERVING");

    server.shutdown().await;
}

#[tokio::test]
async fn unknown_keys_are_rejected_before_lookup() {
    let server = TestServer::with_config(auth_config()).await.as_key(ADMIN_KEY);
    server.post("/users/admin/pipelines", jq_pipeline("exists")).await;
    let server = server.as_key("wrong-key");

    for path in ["/users/admin/pipelines/exists", "/users/admin/pipelines/missing"] {
        let response = server.get(path).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response
                .headers()
                .get("www-authenticate")
                .and_then(|v| v.to_str().ok()),
            Some("ApiKey")
        );
        let body = json_body(response).await;
        assert_eq!(body["code"], 16);
        assert_eq!(error_code(&body), "E401");
    }

    server.shutdown().await;
}

#[tokio::test]
async fn bearer_token_is_accepted() {
    let server = TestServer::with_config(auth_config()).await;

    let response = server
        .request(reqwest::Method::GET, "/users/alice/pipelines")
        .bearer_auth(ALICE_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = server.get("/users/alice/pipelines").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    server.shutdown().await;
}

#[tokio::test]
async fn members_reach_only_their_namespaces() {
    let server = TestServer::with_config(auth_config()).await.as_key(ALICE_KEY);

    let response = server.post("/users/alice/pipelines", jq_pipeline("mine")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = server
        .post("/organizations/acme/pipelines", jq_pipeline("shared"))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = server.get("/users/bob/pipelines").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["code"], 7);
    assert_eq!(error_code(&body), "E402");

    let response = server.get("/admin/pipelines").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let server = server.as_key(ADMIN_KEY);
    let body = json_body(server.get("/admin/pipelines").await).await;
    assert_eq!(body["totalSize"], 2);

    server.shutdown().await;
}

#[tokio::test]
async fn scopes_limit_operations() {
    let server = TestServer::with_config(auth_config()).await.as_key(READER_KEY);

    let response = server.get("/users/reader/pipelines").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = server.post("/users/reader/pipelines", jq_pipeline("nope")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = server
        .post("/users/reader/pipelines/nope/trigger", json!({ "inputs": [] }))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    server.shutdown().await;
}

#[tokio::test]
async fn operations_are_scoped_to_the_pipeline_namespace() {
    let server = TestServer::with_config(auth_config()).await.as_key(ADMIN_KEY);
    server.post("/users/admin/pipelines", jq_pipeline("secret")).await;

    let response = server
        .post(
            "/users/admin/pipelines/secret:triggerAsync",
            json!({ "inputs": [{ "jota": { "foo": "top-secret" } }] }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let name = json_body(response).await["operation"]["name"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    let path = format!("/{}", name);

    let mut operation = json!(null);
    for _ in 0..100 {
        operation = json_body(server.get(&path).await).await["operation"].clone();
        if operation["done"] == true {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(operation["response"]["outputs"][0]["answer"], "top-secret");

    let server = server.as_key(ALICE_KEY);
    let response = server.get("/users/admin/pipelines/secret").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = server.get(&path).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(error_code(&body), "E402");
    assert!(body.get("operation").is_none());

    server.shutdown().await;
}
