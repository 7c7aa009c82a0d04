//! Component definitions, operator definitions and integrations.

mod common;

use common::{error_code, json_body, TestServer};
use reqwest::StatusCode;

#[tokio::test]
async fn component_definitions_use_page_numbers() {
    let server = TestServer::start().await;

    let body = json_body(server.get("/component-definitions?pageSize=3").await).await;
    assert_eq!(body["totalSize"], 7);
    assert_eq!(body["pageSize"], 3);
    assert_eq!(body["page"], 0);
    assert_eq!(body["componentDefinitions"].as_array().map(Vec::len), Some(3));
    assert_eq!(body["componentDefinitions"][0]["id"], "json");
    assert!(body["componentDefinitions"][0].get("spec").is_none());

    let body = json_body(server.get("/component-definitions?pageSize=3&page=2").await).await;
    assert_eq!(body["componentDefinitions"].as_array().map(Vec::len), Some(1));

    let body = json_body(server.get("/component-definitions?pageSize=3&page=9").await).await;
    assert_eq!(body["componentDefinitions"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["totalSize"], 7);

    let response = server.get("/component-definitions?page=-1").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    server.shutdown().await;
}

#[tokio::test]
async fn definitions_filter_and_detail() {
    let server = TestServer::start().await;

    let body = json_body(
        server
            .get("/component-definitions?filter=component_type%3D%22COMPONENT_TYPE_OPERATOR%22")
            .await,
    )
    .await;
    assert_eq!(body["totalSize"], 3);

    let response = server.get("/component-definitions?filter=colour%3D%22red%22").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&json_body(response).await), "E108");

    let body = json_body(server.get("/component-definitions/http?view=VIEW_FULL").await).await;
    assert_eq!(body["componentDefinition"]["name"], "component-definitions/http");
    assert!(body["componentDefinition"]["spec"]["setup"].is_object());

    let response = server.get("/component-definitions/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_code(&json_body(response).await), "E203");

    server.shutdown().await;
}

#[tokio::test]
async fn operator_definitions_cover_operators_only() {
    let server = TestServer::start().await;

    let body = json_body(server.get("/operator-definitions").await).await;
    assert_eq!(body["totalSize"], 3);
    assert_eq!(body["nextPageToken"], "");
    assert_eq!(body["operatorDefinitions"][0]["type"], "COMPONENT_TYPE_OPERATOR");

    let body = json_body(server.get("/operator-definitions/json").await).await;
    assert_eq!(body["operatorDefinition"]["name"], "operator-definitions/json");

    let response = server.get("/operator-definitions/http").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    server.shutdown().await;
}

#[tokio::test]
async fn integrations_list_and_get() {
    let server = TestServer::start().await;

    let body = json_body(server.get("/integrations?pageSize=2").await).await;
    assert_eq!(body["totalSize"], 4);
    assert_eq!(body["integrations"].as_array().map(Vec::len), Some(2));
    assert!(!body["nextPageToken"].as_str().unwrap_or_default().is_empty());

    let body = json_body(server.get("/integrations/slack?view=VIEW_FULL").await).await;
    assert_eq!(body["integration"]["id"], "slack");
    assert!(body["integration"]["setupSchema"].is_object());

    let response = server.get("/integrations/json").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_code(&json_body(response).await), "E204");

    server.shutdown().await;
}
