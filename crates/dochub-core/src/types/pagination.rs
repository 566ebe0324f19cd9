//! Offset/limit pagination for list operations.

use serde::{Deserialize, Serialize};

/// Default page size.
const DEFAULT_LIMIT: u64 = 25;
/// Maximum page size.
const MAX_LIMIT: u64 = 200;

/// Offset/limit window over an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Number of items to skip.
    #[serde(default)]
    pub offset: u64,
    /// Maximum number of items to return.
    #[serde(default = "default_limit")]
    pub limit: u64,
}

impl PageRequest {
    /// Create a page request, clamping the limit into `1..=200`.
    pub fn new(offset: u64, limit: u64) -> Self {
        Self {
            offset,
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    /// The window as `usize` bounds suitable for slicing an in-memory list.
    pub fn bounds(&self, len: usize) -> (usize, usize) {
        let start = usize::try_from(self.offset).unwrap_or(usize::MAX).min(len);
        let end = start
            .saturating_add(usize::try_from(self.limit).unwrap_or(usize::MAX))
            .min(len);
        (start, end)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One page of results plus the total under the same predicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items in this window.
    pub items: Vec<T>,
    /// Offset the window started at.
    pub offset: u64,
    /// Limit that was applied.
    pub limit: u64,
    /// Total number of matching items across all windows.
    pub total: u64,
}

impl<T> PageResponse<T> {
    /// Create a new paginated response.
    pub fn new(items: Vec<T>, page: &PageRequest, total: u64) -> Self {
        Self {
            items,
            offset: page.offset,
            limit: page.limit,
            total,
        }
    }

    /// Whether more items exist after this window.
    pub fn has_more(&self) -> bool {
        self.offset + (self.items.len() as u64) < self.total
    }

    /// Map the items while keeping the window metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            items: self.items.into_iter().map(f).collect(),
            offset: self.offset,
            limit: self.limit,
            total: self.total,
        }
    }
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(PageRequest::new(0, 0).limit, 1);
        assert_eq!(PageRequest::new(0, 10_000).limit, MAX_LIMIT);
    }

    #[test]
    fn test_bounds_stay_inside_len() {
        let page = PageRequest::new(8, 5);
        assert_eq!(page.bounds(10), (8, 10));
        assert_eq!(page.bounds(3), (3, 3));
    }

    #[test]
    fn test_has_more() {
        let page = PageRequest::new(0, 2);
        let resp = PageResponse::new(vec![1, 2], &page, 3);
        assert!(resp.has_more());
        let resp = PageResponse::new(vec![3], &PageRequest::new(2, 2), 3);
        assert!(!resp.has_more());
    }
}
