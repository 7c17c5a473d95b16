//! Cursor-following fetch over the paginated data API.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::debug;

use super::types::{ApiResource, Page};
use crate::{Result, TubefeedError};

/// One list call against an API resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Resource path, e.g. `videos`.
    pub resource: String,
    /// Query parameters other than the page token.
    pub params: Vec<(String, String)>,
    /// Continuation token of the page to fetch, `None` for the first page.
    pub page_token: Option<String>,
}

impl PageRequest {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            params: Vec::new(),
            page_token: None,
        }
    }

    /// Add a query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn with_page_token(mut self, token: impl Into<String>) -> Self {
        self.page_token = Some(token.into());
        self
    }

    /// Look up a query parameter.
    pub fn param_value(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Executes single page requests.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the raw JSON body of one page.
    async fn fetch_page(&self, request: &PageRequest) -> Result<serde_json::Value>;
}

/// Validate a raw page against the schema of `T`.
pub fn parse_page<T: ApiResource>(resource: &str, raw: serde_json::Value) -> Result<Page<T>> {
    let page: Page<T> = serde_json::from_value(raw)
        .map_err(|e| TubefeedError::Validation(format!("{resource} page: {e}")))?;

    if !T::LIST_KINDS.contains(&page.kind.as_str()) {
        return Err(TubefeedError::Validation(format!(
            "{resource} page: unexpected kind `{}`, expected one of {:?}",
            page.kind,
            T::LIST_KINDS
        )));
    }
    Ok(page)
}

/// Fetch every page of `request` and collect the items.
///
/// Items are deduplicated by [`ApiResource::key`] in first-seen order. Any
/// failure, including a page that does not validate, fails the whole call
/// and no items are returned.
pub async fn fetch_all<T: ApiResource>(
    source: &dyn PageSource,
    request: PageRequest,
) -> Result<Vec<T>> {
    let mut request = request;
    let mut items: Vec<T> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut pages = 0usize;

    loop {
        let raw = source.fetch_page(&request).await?;
        let page = parse_page::<T>(&request.resource, raw)?;
        pages += 1;

        for item in page.items {
            if seen.insert(item.key().to_string()) {
                items.push(item);
            }
        }

        match page.next_page_token.filter(|token| !token.is_empty()) {
            Some(token) => {
                if request.page_token.as_deref() == Some(token.as_str()) {
                    return Err(TubefeedError::Validation(format!(
                        "{} page: continuation token `{}` did not advance",
                        request.resource, token
                    )));
                }
                request.page_token = Some(token);
            }
            None => break,
        }
    }

    debug!(
        "Fetched {} {} item(s) over {} page(s)",
        items.len(),
        request.resource,
        pages
    );
    Ok(items)
}
