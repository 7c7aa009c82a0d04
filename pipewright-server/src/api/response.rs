//! JSON response builders for the API.

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{self, HeaderValue};
use hyper::{Response, StatusCode};
use pipewright_core::pagination::{Page, PageLimits, PageRequest};
use serde::Serialize;

fn build(status: StatusCode, body: Bytes) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    response
}

/// Build a JSON response with status code.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let (status, json) = match serde_json::to_string(body) {
        Ok(json) => (status, json),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({
                "code": 13,
                "message": format!("Serialization error: {}", e),
                "details": [{ "code": "E804", "status": 500 }]
            })
            .to_string(),
        ),
    };

    let mut response = build(status, Bytes::from(json));
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

/// Build a 200 OK JSON response.
pub fn ok<T: Serialize>(body: &T) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, body)
}

/// Build a 201 Created JSON response.
pub fn created<T: Serialize>(body: &T) -> Response<Full<Bytes>> {
    json_response(StatusCode::CREATED, body)
}

/// Build a 200 list response for a token-paginated page, with the items under `key`.
pub fn token_page<T: Serialize>(key: &str, page: &Page<T>) -> Response<Full<Bytes>> {
    let mut body = serde_json::Map::new();
    body.insert(key.to_string(), serde_json::json!(page.items));
    body.insert("nextPageToken".to_string(), page.next_page_token.clone().into());
    body.insert("totalSize".to_string(), page.total_size.into());
    ok(&body)
}

/// Build a 200 list response for a page-number page, with the items under `key`.
pub fn numbered_page<T: Serialize>(
    key: &str,
    page: &Page<T>,
    request: &PageRequest,
    limits: &PageLimits,
) -> Response<Full<Bytes>> {
    let mut body = serde_json::Map::new();
    body.insert(key.to_string(), serde_json::json!(page.items));
    body.insert("totalSize".to_string(), page.total_size.into());
    body.insert("pageSize".to_string(), request.normalize(limits).into());
    body.insert("page".to_string(), request.page.unwrap_or(0).into());
    ok(&body)
}

/// Build a 204 No Content response.
pub fn no_content() -> Response<Full<Bytes>> {
    build(StatusCode::NO_CONTENT, Bytes::new())
}

/// Build a 404 response for an unknown route.
pub fn not_found(path: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "code": 5,
        "message": format!("No route for '{}'", path),
        "details": [{ "code": "E000", "status": 404 }]
    });
    json_response(StatusCode::NOT_FOUND, &body)
}

/// Build a 405 Method Not Allowed response.
pub fn method_not_allowed(allowed: &[&str]) -> Response<Full<Bytes>> {
    let allow = allowed.join(", ");
    let body = serde_json::json!({
        "code": 12,
        "message": format!("Method not allowed. Allowed: {}", allow),
        "details": [{ "code": "E000", "status": 405 }]
    });

    let mut response = json_response(StatusCode::METHOD_NOT_ALLOWED, &body);
    if let Ok(value) = HeaderValue::from_str(&allow) {
        response.headers_mut().insert(header::ALLOW, value);
    }
    response
}
