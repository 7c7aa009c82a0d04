//! Request body and query-string parsing.

use super::error::ApiError;
use crate::controller::ListQuery;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::Request;
use pipewright_core::pagination::PageRequest;
use pipewright_core::{PipewrightError, View};
use serde_json::Value;
use std::collections::HashMap;

/// Maximum accepted request body size.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Read the request body as JSON. An empty body reads as `null`.
///
/// Reading stops once the body exceeds `MAX_BODY_BYTES`.
pub async fn read_body_json<B>(req: Request<B>) -> Result<Value, ApiError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let bytes = Limited::new(req.into_body(), MAX_BODY_BYTES)
        .collect()
        .await
        .map_err(|e| {
            if e.is::<LengthLimitError>() {
                let message = format!("Request body exceeds {} bytes", MAX_BODY_BYTES);
                ApiError::bad_request("E110", message)
            } else {
                ApiError::bad_request("E110", format!("Failed to read body: {}", e))
            }
        })?
        .to_bytes();

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::bad_request("E110", format!("Invalid JSON body: {}", e)))
}

/// Decoded query parameters.
#[derive(Debug, Default)]
pub struct Query {
    params: HashMap<String, String>,
}

impl Query {
    /// Decode a raw query string.
    pub fn parse(raw: Option<&str>) -> Self {
        let params = raw
            .unwrap_or_default()
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode(key), decode(value))
            })
            .collect();
        Self { params }
    }

    /// First of `names` that is present.
    pub fn get(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .find_map(|name| self.params.get(*name))
            .map(String::as_str)
    }

    fn integer(&self, names: &[&str]) -> Result<Option<i64>, PipewrightError> {
        match self.get(names) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse::<i64>()
                .map(Some)
                .map_err(|_| PipewrightError::InvalidArgument {
                    field: names[0].to_string(),
                    cause: format!("'{}' is not an integer", raw),
                }),
        }
    }

    /// `view` parameter.
    pub fn view(&self) -> Result<View, PipewrightError> {
        View::parse(self.get(&["view"]))
    }

    /// `updateMask` parameter.
    pub fn update_mask(&self) -> Option<&str> {
        self.get(&["updateMask", "update_mask"])
            .filter(|mask| !mask.is_empty())
    }

    /// Pagination, view and filter parameters of a list request.
    pub fn list_query(&self) -> Result<ListQuery, PipewrightError> {
        Ok(ListQuery {
            page: PageRequest {
                page_size: self.integer(&["pageSize", "page_size"])?,
                page_token: self
                    .get(&["pageToken", "page_token"])
                    .map(str::to_string),
                page: self.integer(&["page"])?,
            },
            view: self.view()?,
            filter: self
                .get(&["filter"])
                .filter(|f| !f.trim().is_empty())
                .map(str::to_string),
        })
    }
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::Full;

    fn request(body: impl Into<Bytes>) -> Request<Full<Bytes>> {
        Request::new(Full::new(body.into()))
    }

    #[tokio::test]
    async fn reads_json_bodies() {
        let value = read_body_json(request(r#"{"id":"p"}"#)).await.unwrap();
        assert_eq!(value["id"], "p");

        assert_eq!(read_body_json(request("  \n")).await.unwrap(), Value::Null);

        let err = read_body_json(request("{nope")).await.unwrap_err();
        assert_eq!(err.code, "E110");
    }

    #[tokio::test]
    async fn oversized_bodies_are_rejected() {
        let body = vec![b' '; MAX_BODY_BYTES + 1];
        let err = read_body_json(request(body)).await.unwrap_err();
        assert_eq!(err.code, "E110");
        assert_eq!(err.status, hyper::StatusCode::BAD_REQUEST);
        assert!(err.message.contains("exceeds"));
    }

    #[test]
    fn parses_list_parameters() {
        let query = Query::parse(Some(
            "pageSize=5&page_token=abc&view=VIEW_FULL&filter=q_title%3D%22hello%20world%22",
        ));
        let list = query.list_query().unwrap();
        assert_eq!(list.page.page_size, Some(5));
        assert_eq!(list.page.page_token.as_deref(), Some("abc"));
        assert_eq!(list.view, View::Full);
        assert_eq!(list.filter.as_deref(), Some("q_title=\"hello world\""));
    }

    #[test]
    fn empty_query_uses_defaults() {
        let list = Query::parse(None).list_query().unwrap();
        assert_eq!(list.page, PageRequest::default());
        assert_eq!(list.view, View::Basic);
        assert!(list.filter.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Query::parse(Some("pageSize=ten")).list_query().is_err());
        assert!(Query::parse(Some("view=VIEW_NOPE")).view().is_err());
    }

    #[test]
    fn plus_decodes_to_space() {
        let query = Query::parse(Some("filter=q+%3D+1&updateMask=description"));
        assert_eq!(query.get(&["filter"]), Some("q = 1"));
        assert_eq!(query.update_mask(), Some("description"));
    }
}
