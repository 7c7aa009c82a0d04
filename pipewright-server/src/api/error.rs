//! API error type and `PipewrightError` → HTTP status mapping.

use super::response;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use pipewright_core::{PipewrightError, StatusKind};

/// API error with HTTP status, gRPC status and error code.
#[derive(Debug)]
pub struct ApiError {
    /// Error code (e.g., "E201").
    pub code: &'static str,
    /// End-user message, without the code prefix.
    pub message: String,
    /// HTTP status code.
    pub status: StatusCode,
    /// gRPC status number carried in the body.
    pub grpc_code: u16,
}

impl ApiError {
    /// Create an error of `kind`.
    pub fn new(code: &'static str, message: impl Into<String>, kind: StatusKind) -> Self {
        Self {
            code,
            message: message.into(),
            status: StatusCode::from_u16(kind.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            grpc_code: kind.grpc_code(),
        }
    }

    /// Create a 400 Bad Request error.
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(code, message, StatusKind::InvalidArgument)
    }

    /// Create a 404 Not Found error.
    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(code, message, StatusKind::NotFound)
    }

    /// Create a 500 Internal Server Error.
    pub fn internal(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(code, message, StatusKind::Internal)
    }

    /// Convert to HTTP response.
    pub fn into_response(self) -> Response<Full<Bytes>> {
        let body = serde_json::json!({
            "code": self.grpc_code,
            "message": self.message,
            "details": [{ "code": self.code, "status": self.status.as_u16() }]
        });
        let mut response = response::json_response(self.status, &body);
        if self.status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert("WWW-Authenticate", hyper::header::HeaderValue::from_static("ApiKey"));
        }
        response
    }
}

impl From<PipewrightError> for ApiError {
    fn from(err: PipewrightError) -> Self {
        Self::new(err.code(), err.user_message(), err.status_kind())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
