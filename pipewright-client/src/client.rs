//! Core Pipewright client implementation.

use crate::error::{ClientError, Result};
use crate::types::RawResponse;
use reqwest::{Client as HttpClient, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A client for interacting with the Pipewright API.
///
/// # Example
///
/// ```no_run
/// use pipewright_client::Client;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::new("http://localhost:8080")?
///     .with_api_key("my-secret-key")
///     .with_timeout(Duration::from_secs(30))?;
///
/// let health = client.health().await?;
/// println!("{}", health.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    /// Base URL for the Pipewright server.
    base_url: String,
    /// HTTP client.
    http: HttpClient,
    /// Optional API key for authentication.
    api_key: Option<String>,
}

impl Client {
    /// Create a new Pipewright client.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be created.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {}",
                base_url
            )));
        }

        let http = HttpClient::builder().timeout(DEFAULT_TIMEOUT).build()?;

        Ok(Self {
            base_url,
            http,
            api_key: None,
        })
    }

    /// Set an API key for authentication.
    ///
    /// The API key will be sent in the `Authorization` header as `Bearer <key>`.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set a custom timeout for all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be rebuilt.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = HttpClient::builder().timeout(timeout).build()?;
        Ok(self)
    }

    /// Base URL the client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from a path below `/v1beta`.
    fn url(&self, path: &str) -> String {
        let path = path.strip_prefix('/').unwrap_or(path);
        format!("{}/v1beta/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Add authentication headers to a request.
    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        if let Some(ref key) = self.api_key {
            builder.header("Authorization", format!("Bearer {}", key))
        } else {
            builder
        }
    }

    fn request(&self, method: Method, path: &str, query: &[(&str, String)]) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        let builder = if query.is_empty() {
            builder
        } else {
            builder.query(query)
        };
        self.with_auth(builder)
    }

    /// Execute a GET request.
    pub(crate) async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response> {
        self.request(Method::GET, path, query)
            .send()
            .await
            .map_err(ClientError::Http)
    }

    /// Execute a POST request with a JSON body.
    pub(crate) async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Response> {
        self.request(Method::POST, path, &[])
            .json(body)
            .send()
            .await
            .map_err(ClientError::Http)
    }

    /// Execute a PATCH request with a JSON body.
    pub(crate) async fn patch<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
        query: &[(&str, String)],
    ) -> Result<Response> {
        self.request(Method::PATCH, path, query)
            .json(body)
            .send()
            .await
            .map_err(ClientError::Http)
    }

    /// Execute a DELETE request.
    pub(crate) async fn delete(&self, path: &str) -> Result<Response> {
        self.request(Method::DELETE, path, &[])
            .send()
            .await
            .map_err(ClientError::Http)
    }

    /// Send any request and return its status and JSON body without
    /// treating error statuses as failures.
    ///
    /// `path` is relative to `/v1beta` and may carry a query string.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use pipewright_client::Client;
    /// # use pipewright_client::Method;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let client = Client::new("http://localhost:8080")?;
    /// let raw = client.raw(Method::GET, "users/admin/pipelines/missing", None).await?;
    /// assert_eq!(raw.status, 404);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn raw(&self, method: Method, path: &str, body: Option<&Value>) -> Result<RawResponse> {
        let mut builder = self.with_auth(self.http.request(method, self.url(path)));
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Ok(RawResponse { status, body })
    }

    /// Handle a response and deserialize JSON.
    pub(crate) async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            let text = response.text().await?;
            serde_json::from_str(&text).map_err(ClientError::Deserialize)
        } else {
            Err(api_error(status, response).await)
        }
    }

    /// Handle a response and take one field out of its JSON object.
    pub(crate) async fn handle_field<T: DeserializeOwned>(
        &self,
        response: Response,
        field: &str,
    ) -> Result<T> {
        let mut body: Value = self.handle_response(response).await?;
        let value = body
            .get_mut(field)
            .map(Value::take)
            .ok_or_else(|| ClientError::InvalidResponse(format!("missing '{}' in response", field)))?;
        serde_json::from_value(value).map_err(ClientError::Deserialize)
    }

    /// Handle a response that returns no body (204 No Content).
    pub(crate) async fn handle_empty_response(&self, response: Response) -> Result<()> {
        let status = response.status();

        if status.is_success() || status == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            Err(api_error(status, response).await)
        }
    }
}

/// Build an API error from an error response, preferring its `message`.
async fn api_error(status: StatusCode, response: Response) -> ClientError {
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    let message = match serde_json::from_str::<Value>(&body) {
        Ok(json) => json["message"]
            .as_str()
            .or_else(|| json["error"].as_str())
            .unwrap_or(&body)
            .to_string(),
        Err(_) => body,
    };

    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Percent-encode one path segment.
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_new() {
        let client = Client::new("http://localhost:8080").unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
        assert!(client.api_key.is_none());
    }

    #[test]
    fn test_client_with_api_key() {
        let client = Client::new("http://localhost:8080")
            .unwrap()
            .with_api_key("test-key");
        assert_eq!(client.api_key, Some("test-key".to_string()));
    }

    #[test]
    fn test_client_invalid_url() {
        assert!(Client::new("not-a-url").is_err());
    }

    #[test]
    fn test_url_building() {
        let client = Client::new("http://localhost:8080/").unwrap();
        assert_eq!(
            client.url("users/admin/pipelines"),
            "http://localhost:8080/v1beta/users/admin/pipelines"
        );
        assert_eq!(
            client.url("/integrations"),
            "http://localhost:8080/v1beta/integrations"
        );
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("plain-id"), "plain-id");
        assert_eq!(segment("a b"), "a%20b");
    }
}
