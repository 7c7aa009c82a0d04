//! Pipeline CRUD over HTTP.

mod common;

use common::{error_code, jq_pipeline, json_body, TestServer};
use reqwest::StatusCode;
use serde_json::json;
use std::collections::HashSet;

#[tokio::test]
async fn create_get_and_delete() {
    let server = TestServer::start().await;

    let response = server.post("/users/admin/pipelines", jq_pipeline("extract")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    let pipeline = &body["pipeline"];
    assert_eq!(pipeline["id"], "extract");
    assert_eq!(pipeline["name"], "users/admin/pipelines/extract");
    assert_eq!(pipeline["ownerName"], "users/admin");
    assert_eq!(pipeline["state"], "STATE_ACTIVE");
    assert!(pipeline["uid"].as_str().is_some_and(|uid| !uid.is_empty()));

    let basic = json_body(server.get("/users/admin/pipelines/extract").await).await;
    assert!(basic["pipeline"].get("recipe").is_none());
    assert_eq!(basic["pipeline"]["description"], "extracts foo");

    let full = json_body(server.get("/users/admin/pipelines/extract?view=VIEW_FULL").await).await;
    assert_eq!(full["pipeline"]["recipe"]["version"], "v1beta");

    let response = server.delete("/users/admin/pipelines/extract").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = server.get("/users/admin/pipelines/extract").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["code"], 5);
    assert_eq!(error_code(&body), "E201");

    server.shutdown().await;
}

#[tokio::test]
async fn create_rejects_bad_requests() {
    let server = TestServer::start().await;

    let response = server.post("/users/admin/pipelines", json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&json_body(response).await), "E102");

    let response = server
        .post("/users/admin/pipelines", json!({ "id": "Not Valid" }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&json_body(response).await), "E101");

    let response = server
        .request(reqwest::Method::POST, "/users/admin/pipelines")
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&json_body(response).await), "E110");

    server.post("/users/admin/pipelines", jq_pipeline("dup")).await;
    let response = server.post("/users/admin/pipelines", jq_pipeline("dup")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(body["code"], 6);
    assert_eq!(error_code(&body), "E301");

    server.shutdown().await;
}

#[tokio::test]
async fn update_and_rename() {
    let server = TestServer::start().await;
    let created = json_body(server.post("/users/admin/pipelines", jq_pipeline("before")).await).await;
    let uid = created["pipeline"]["uid"].clone();

    let response = server
        .patch(
            "/users/admin/pipelines/before",
            json!({ "description": "changed", "tags": ["a"] }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["pipeline"]["description"], "changed");
    assert_eq!(body["pipeline"]["tags"], json!(["a"]));

    let response = server
        .patch("/users/admin/pipelines/before", json!({ "uid": "other" }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&json_body(response).await), "E106");

    let response = server
        .post(
            "/users/admin/pipelines/before/rename",
            json!({ "newPipelineId": "after" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["pipeline"]["id"], "after");
    assert_eq!(body["pipeline"]["uid"], uid);

    let response = server.get("/users/admin/pipelines/before").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let uid = uid.as_str().unwrap_or_default().to_string();
    let body = json_body(server.get(&format!("/pipelines/{}/lookUp", uid)).await).await;
    assert_eq!(body["pipeline"]["id"], "after");

    let response = server.get("/pipelines/not-a-uid/lookUp").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    server.shutdown().await;
}

#[tokio::test]
async fn list_paginates_and_filters() {
    let server = TestServer::start().await;
    for i in 0..5 {
        server
            .post("/users/admin/pipelines", jq_pipeline(&format!("p-{}", i)))
            .await;
    }

    let mut seen = HashSet::new();
    let mut token = String::new();
    loop {
        let path = format!("/users/admin/pipelines?pageSize=2&pageToken={}", token);
        let body = json_body(server.get(&path).await).await;
        assert_eq!(body["totalSize"], 5);
        let items = body["pipelines"].as_array().cloned().unwrap_or_default();
        assert!(items.len() <= 2);
        for item in items {
            assert!(seen.insert(item["id"].as_str().unwrap_or_default().to_string()));
        }
        token = body["nextPageToken"].as_str().unwrap_or_default().to_string();
        if token.is_empty() {
            break;
        }
    }
    assert_eq!(seen.len(), 5);

    let body = json_body(server.get("/users/admin/pipelines?filter=q_title%3D%22p-3%22").await).await;
    assert_eq!(body["totalSize"], 1);
    assert_eq!(body["pipelines"][0]["id"], "p-3");

    let response = server.get("/users/admin/pipelines?pageToken=garbage").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&json_body(response).await), "E109");

    let body = json_body(server.get("/admin/pipelines").await).await;
    assert_eq!(body["totalSize"], 5);

    server.shutdown().await;
}

#[tokio::test]
async fn page_tokens_survive_creates_between_pages() {
    let server = TestServer::start().await;
    for i in 0..4 {
        server
            .post("/users/admin/pipelines", jq_pipeline(&format!("p-{}", i)))
            .await;
    }

    let first = json_body(server.get("/users/admin/pipelines?pageSize=2").await).await;
    let token = first["nextPageToken"].as_str().unwrap_or_default().to_string();
    assert!(!token.is_empty());

    server.post("/users/admin/pipelines", jq_pipeline("late")).await;

    let path = format!("/users/admin/pipelines?pageSize=2&pageToken={}", token);
    let second = json_body(server.get(&path).await).await;
    assert_eq!(second["totalSize"], 5);
    assert_eq!(second["nextPageToken"], "");

    let ids: Vec<String> = [&first, &second]
        .iter()
        .flat_map(|body| body["pipelines"].as_array().cloned().unwrap_or_default())
        .map(|p| p["id"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(ids, vec!["p-3", "p-2", "p-1", "p-0"]);

    server.shutdown().await;
}

#[tokio::test]
async fn validate_reports_unresolved_references() {
    let server = TestServer::start().await;
    server
        .post(
            "/users/admin/pipelines",
            common::http_pipeline("dangling", "missing", "http://localhost/"),
        )
        .await;

    let body = json_body(server.get("/users/admin/pipelines/dangling").await).await;
    assert_eq!(body["pipeline"]["state"], "STATE_ERROR");

    let response = server
        .post("/users/admin/pipelines/dangling/validate", json!({}))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(!body["errors"].as_array().map(Vec::is_empty).unwrap_or(true));

    server.post("/users/admin/pipelines", jq_pipeline("fine")).await;
    let body = json_body(server.post("/users/admin/pipelines/fine:validate", json!({})).await).await;
    assert_eq!(body["success"], true);

    server.shutdown().await;
}

#[tokio::test]
async fn unknown_routes_and_methods() {
    let server = TestServer::start().await;

    let response = server.get("/nothing/here").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = server.delete("/users/admin/pipelines").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let allow = response
        .headers()
        .get("allow")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(allow.contains("GET"));
    assert!(allow.contains("POST"));

    let response = server.post("/users/admin/pipelines/p/runs", json!({})).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let response = server.get("/users/admin/pipelines?view=SIDEWAYS").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    server.shutdown().await;
}
