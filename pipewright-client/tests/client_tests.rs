//! Integration tests for pipewright-client.
//!
//! These tests verify the client API surface without requiring a running server.

use pipewright_client::{Client, ClientError, ListOptions, View};
use std::time::Duration;

#[test]
fn test_client_construction() {
    assert!(Client::new("http://localhost:8080").is_ok());
    assert!(Client::new("https://api.example.com").is_ok());
}

#[test]
fn test_client_invalid_url() {
    let result = Client::new("localhost:8080");

    match result {
        Err(ClientError::InvalidUrl(msg)) => {
            assert!(msg.contains("http://"));
        }
        _ => panic!("Expected InvalidUrl error"),
    }
}

#[test]
fn test_client_builder_pattern() {
    let client = Client::new("http://localhost:8080")
        .unwrap()
        .with_api_key("my-secret-key")
        .with_timeout(Duration::from_secs(60));

    assert!(client.is_ok());
}

#[test]
fn test_base_url_is_kept() {
    let client = Client::new("http://localhost:8080/").unwrap();
    assert_eq!(client.base_url(), "http://localhost:8080/");
}

#[test]
fn test_error_display() {
    let error = ClientError::InvalidUrl("test error".to_string());
    let display = format!("{}", error);
    assert!(display.contains("Invalid URL"));
    assert!(display.contains("test error"));
}

#[test]
fn test_api_error_display_and_status() {
    let error = ClientError::Api {
        status: 404,
        message: "Not found".to_string(),
    };

    let display = format!("{}", error);
    assert!(display.contains("404"));
    assert!(display.contains("Not found"));
    assert_eq!(error.status(), Some(404));
    assert_eq!(ClientError::InvalidResponse("x".to_string()).status(), None);
}

#[test]
fn test_list_options_builder() {
    let options = ListOptions::new().page_size(10).page(2).view(View::Full);
    assert_eq!(options.page_size, Some(10));
    assert_eq!(options.page, Some(2));
    assert_eq!(options.view, Some(View::Full));
    assert!(options.page_token.is_none());
}
