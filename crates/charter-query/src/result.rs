//! The paged result envelope and its navigation links.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::QueryError;

/// One page of query results plus the bookkeeping needed to link to its
/// neighbours. Pages are built once by the executor and never change;
/// the mutating methods exist only to refuse.
#[derive(Debug, Clone)]
pub struct QueryResult<T> {
    items: Vec<T>,
    skip: usize,
    total_count: usize,
    url: String,
    debug_info: BTreeMap<String, String>,
}

impl<T> QueryResult<T> {
    /// Builds a result page. The window must fit inside the reported
    /// total: `skip + items.len() <= total_count`.
    pub fn new(
        items: Vec<T>,
        skip: usize,
        total_count: usize,
        url: impl Into<String>,
    ) -> Result<QueryResult<T>, QueryError> {
        if skip + items.len() > total_count {
            return Err(QueryError::InvalidWindow {
                skip,
                count: items.len(),
                total_count,
            });
        }
        Ok(QueryResult {
            items,
            skip,
            total_count,
            url: url.into(),
            debug_info: BTreeMap::new(),
        })
    }

    pub fn with_debug_info(mut self, debug_info: BTreeMap<String, String>) -> QueryResult<T> {
        self.debug_info = debug_info;
        self
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Rows skipped before this page started.
    pub fn skip(&self) -> usize {
        self.skip
    }

    /// Matching rows across all pages, not just this one.
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// The URL this page was served from. Neighbour links are derived
    /// from it by rewriting `$skip` alone.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn debug_info(&self) -> &BTreeMap<String, String> {
        &self.debug_info
    }

    /// Always refuses. Pages are immutable once built.
    pub fn push(&mut self, _item: T) -> Result<(), QueryError> {
        Err(QueryError::ReadOnlyResult)
    }

    /// Always refuses. Pages are immutable once built.
    pub fn remove(&mut self, _index: usize) -> Result<T, QueryError> {
        Err(QueryError::ReadOnlyResult)
    }

    /// URL of the page `offset` pages away, or `None` past either edge.
    /// The returned URL differs from this page's URL only in `$skip`.
    pub fn try_get_page(&self, offset: i64) -> Option<String> {
        let shift = self.items.len() as i64 * offset;
        let new_skip = (self.skip as i64 + shift).max(0) as usize;
        if new_skip == self.skip || new_skip >= self.total_count {
            return None;
        }
        Some(rewrite_skip(&self.url, new_skip))
    }

    pub fn previous(&self) -> Option<String> {
        self.try_get_page(-1)
    }

    pub fn next(&self) -> Option<String> {
        self.try_get_page(1)
    }

    /// The wire shape of this page.
    pub fn envelope(&self) -> ResultEnvelope<'_, T> {
        ResultEnvelope {
            total_count: self.total_count,
            skip: self.skip,
            items: &self.items,
            previous: self.previous(),
            next: self.next(),
        }
    }

    /// Consumes the page, leaving only the items.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// Serialization shape of one page: counts, items, then links when the
/// neighbouring pages exist.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEnvelope<'a, T> {
    pub total_count: usize,
    pub skip: usize,
    pub items: &'a [T],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Rewrites the `$skip` parameter of a URL, appending one when absent.
/// Every other byte of the URL is preserved.
fn rewrite_skip(url: &str, new_skip: usize) -> String {
    let (base, query) = match url.split_once('?') {
        Some((base, query)) => (base, query),
        None => return format!("{url}?$skip={new_skip}"),
    };
    if query.is_empty() {
        return format!("{base}?$skip={new_skip}");
    }
    let mut parts = Vec::new();
    let mut replaced = false;
    for part in query.split('&') {
        let key = part.split_once('=').map(|(key, _)| key).unwrap_or(part);
        if key == "$skip" && !replaced {
            parts.push(format!("$skip={new_skip}"));
            replaced = true;
        } else {
            parts.push(part.to_string());
        }
    }
    if !replaced {
        parts.push(format!("$skip={new_skip}"));
    }
    format!("{base}?{}", parts.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_replaces_skip_in_place() {
        assert_eq!(
            rewrite_skip("/dogs?$skip=10&$top=5", 15),
            "/dogs?$skip=15&$top=5"
        );
        assert_eq!(
            rewrite_skip("/dogs?$top=5&$skip=10", 0),
            "/dogs?$top=5&$skip=0"
        );
    }

    #[test]
    fn test_rewrite_appends_when_absent() {
        assert_eq!(rewrite_skip("/dogs", 5), "/dogs?$skip=5");
        assert_eq!(rewrite_skip("/dogs?", 5), "/dogs?$skip=5");
        assert_eq!(rewrite_skip("/dogs?$top=5", 5), "/dogs?$top=5&$skip=5");
    }

    #[test]
    fn test_rewrite_leaves_foreign_parameters_untouched() {
        let url = "/dogs?format=json&name=a%20b&$skip=2&flag";
        assert_eq!(
            rewrite_skip(url, 9),
            "/dogs?format=json&name=a%20b&$skip=9&flag"
        );
    }

    #[test]
    fn test_window_must_fit_total() {
        let err = QueryResult::new(vec![1, 2, 3], 8, 10, "/xs").unwrap_err();
        assert!(matches!(err, QueryError::InvalidWindow { .. }));
        assert!(QueryResult::new(vec![1, 2], 8, 10, "/xs").is_ok());
    }
}
