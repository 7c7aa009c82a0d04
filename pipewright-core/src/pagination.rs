//! List pagination.
//!
//! Two modes are supported: opaque page tokens and 0-based page numbers.
//!
//! Every listing has a sort key. A page token is the URL-safe base64 of the
//! JSON-encoded key of the last item served, and the next page starts at the
//! first item whose key is strictly greater. Records created or deleted
//! between requests therefore never shift the remaining pages.

use crate::error::{PipewrightError, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Maximum number of items per page.
pub const MAX_PAGE_SIZE: usize = 100;

/// Page size limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLimits {
    /// Size used when none (or a non-positive one) is requested.
    pub default_size: usize,
    /// Upper bound on the requested size.
    pub max_size: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
        }
    }
}

/// Pagination parameters of a list request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Requested page size.
    pub page_size: Option<i64>,
    /// Opaque continuation token.
    pub page_token: Option<String>,
    /// 0-based page number.
    pub page: Option<i64>,
}

impl PageRequest {
    /// Request with only a page size.
    pub fn with_size(page_size: i64) -> Self {
        Self {
            page_size: Some(page_size),
            ..Self::default()
        }
    }

    /// Effective page size under `limits`.
    pub fn normalize(&self, limits: &PageLimits) -> usize {
        match self.page_size {
            Some(size) if size > 0 => (size as usize).min(limits.max_size),
            _ => limits.default_size,
        }
    }

    /// Sort key carried by the page token, `None` when absent.
    pub fn cursor<K: DeserializeOwned>(&self) -> Result<Option<K>> {
        match self.page_token.as_deref() {
            None | Some("") => Ok(None),
            Some(token) => decode_token(token).map(Some),
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Token of the next page; empty when this is the last page.
    pub next_page_token: String,
    /// Number of items across all pages.
    pub total_size: usize,
}

impl<T> Page<T> {
    /// Transform the items, keeping pagination metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_page_token: self.next_page_token,
            total_size: self.total_size,
        }
    }
}

/// Encode a sort key as a page token.
pub fn encode_token<K: Serialize>(key: &K) -> Result<String> {
    Ok(URL_SAFE_NO_PAD.encode(serde_json::to_vec(key)?))
}

/// Decode a page token into a sort key.
pub fn decode_token<K: DeserializeOwned>(token: &str) -> Result<K> {
    let invalid = || PipewrightError::InvalidPageToken {
        token: token.to_string(),
    };
    let bytes = URL_SAFE_NO_PAD.decode(token).map_err(|_| invalid())?;
    serde_json::from_slice(&bytes).map_err(|_| invalid())
}

/// Paginate `items` with page tokens, ordered by `key`.
///
/// Keys must be unique within the listing.
pub fn paginate_by_token<T, K, F>(
    mut items: Vec<T>,
    request: &PageRequest,
    limits: &PageLimits,
    key: F,
) -> Result<Page<T>>
where
    K: Ord + Serialize + DeserializeOwned,
    F: Fn(&T) -> K,
{
    let size = request.normalize(limits);
    let cursor: Option<K> = request.cursor()?;
    let total_size = items.len();
    items.sort_by_cached_key(|item| key(item));

    let start = match &cursor {
        Some(cursor) => items.partition_point(|item| key(item) <= *cursor),
        None => 0,
    };
    let page_items: Vec<T> = items.into_iter().skip(start).take(size).collect();
    let next_page_token = match page_items.last() {
        Some(last) if start + page_items.len() < total_size => encode_token(&key(last))?,
        _ => String::new(),
    };

    Ok(Page {
        items: page_items,
        next_page_token,
        total_size,
    })
}

/// Paginate `items` with a 0-based page number.
///
/// A page past the end is empty but still reports `total_size`. Numbered
/// pages carry no token.
pub fn paginate_by_number<T>(items: Vec<T>, request: &PageRequest, limits: &PageLimits) -> Result<Page<T>> {
    let size = request.normalize(limits);
    let page = match request.page {
        None => 0,
        Some(p) if p >= 0 => p as usize,
        Some(p) => {
            return Err(PipewrightError::InvalidArgument {
                field: "page".to_string(),
                cause: format!("page must not be negative, got {}", p),
            })
        }
    };
    let total_size = items.len();
    let items: Vec<T> = items
        .into_iter()
        .skip(page.saturating_mul(size))
        .take(size)
        .collect();

    Ok(Page {
        items,
        next_page_token: String::new(),
        total_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    fn id(n: &usize) -> usize {
        *n
    }

    #[test]
    fn size_normalization() {
        let limits = PageLimits::default();
        assert_eq!(PageRequest::default().normalize(&limits), 10);
        assert_eq!(PageRequest::with_size(0).normalize(&limits), 10);
        assert_eq!(PageRequest::with_size(-5).normalize(&limits), 10);
        assert_eq!(PageRequest::with_size(25).normalize(&limits), 25);
        assert_eq!(PageRequest::with_size(1000).normalize(&limits), 100);
    }

    #[test]
    fn token_traversal_is_exhaustive_and_disjoint() {
        let limits = PageLimits::default();
        let mut request = PageRequest::with_size(7);
        let mut seen = Vec::new();

        loop {
            let page = paginate_by_token(numbers(30), &request, &limits, id).unwrap();
            assert_eq!(page.total_size, 30);
            seen.extend(page.items);
            if page.next_page_token.is_empty() {
                break;
            }
            request.page_token = Some(page.next_page_token);
        }

        assert_eq!(seen, numbers(30));
    }

    #[test]
    fn last_page_has_empty_token() {
        let limits = PageLimits::default();
        let page = paginate_by_token(numbers(10), &PageRequest::with_size(10), &limits, id).unwrap();
        assert_eq!(page.items.len(), 10);
        assert!(page.next_page_token.is_empty());

        let page = paginate_by_token(Vec::<usize>::new(), &PageRequest::default(), &limits, id).unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_empty());
    }

    #[test]
    fn malformed_token_rejected() {
        let limits = PageLimits::default();
        let request = PageRequest {
            page_token: Some("!!not-base64!!".to_string()),
            ..PageRequest::default()
        };
        let err = paginate_by_token(numbers(3), &request, &limits, id).unwrap_err();
        assert_eq!(err.code(), "E109");

        let request = PageRequest {
            page_token: Some(URL_SAFE_NO_PAD.encode("\"hello\"")),
            ..PageRequest::default()
        };
        assert!(paginate_by_token(numbers(3), &request, &limits, id).is_err());
    }

    #[test]
    fn token_resumes_after_last_key_when_records_change() {
        let limits = PageLimits::default();
        // Newest first: larger timestamps sort earlier.
        let key = |item: &(i64, &str)| (std::cmp::Reverse(item.0), item.1.to_string());
        let mut items = vec![(5, "e"), (4, "d"), (3, "c"), (2, "b"), (1, "a")];

        let first = paginate_by_token(items.clone(), &PageRequest::with_size(2), &limits, key).unwrap();
        assert_eq!(first.items, vec![(5, "e"), (4, "d")]);

        items.insert(0, (6, "f"));
        items.retain(|item| item.1 != "c");

        let request = PageRequest {
            page_size: Some(2),
            page_token: Some(first.next_page_token),
            ..PageRequest::default()
        };
        let second = paginate_by_token(items.clone(), &request, &limits, key).unwrap();
        assert_eq!(second.items, vec![(2, "b"), (1, "a")]);
        assert_eq!(second.total_size, 5);
        assert!(second.next_page_token.is_empty());
    }

    #[test]
    fn page_numbers() {
        let limits = PageLimits::default();
        let request = PageRequest {
            page: Some(1),
            page_size: Some(4),
            ..PageRequest::default()
        };
        let page = paginate_by_number(numbers(10), &request, &limits).unwrap();
        assert_eq!(page.items, vec![4, 5, 6, 7]);
        assert_eq!(page.total_size, 10);

        let request = PageRequest {
            page: Some(50),
            ..PageRequest::default()
        };
        let page = paginate_by_number(numbers(10), &request, &limits).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_size, 10);
        assert!(page.next_page_token.is_empty());

        let request = PageRequest {
            page: Some(-1),
            ..PageRequest::default()
        };
        assert!(paginate_by_number(numbers(10), &request, &limits).is_err());
    }

    #[test]
    fn page_map_keeps_metadata() {
        let page = Page {
            items: vec![1, 2],
            next_page_token: "t".to_string(),
            total_size: 5,
        };
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.items, vec![10, 20]);
        assert_eq!(mapped.total_size, 5);
    }
}
