//! Page window for university listings

use serde::{Deserialize, Serialize};

/// Largest page a caller may request
pub const MAX_PER_PAGE: u32 = 100;

pub const DEFAULT_PER_PAGE: u32 = 20;

/// Requested page window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Page number (1-indexed)
    pub page: u32,
    /// Items per page (1..=100)
    pub per_page: u32,
}

impl Pagination {
    /// Build a window, clamping page to >= 1 and per_page to 1..=100.
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// SQL OFFSET for this window.
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.per_page)
    }

    /// SQL LIMIT for this window.
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, DEFAULT_PER_PAGE)
    }
}

/// One page of results plus the total row count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Paginated<T> {
    /// Number of pages needed for `total` rows (0 when there are none).
    pub fn pages(&self) -> i64 {
        let per_page = i64::from(self.per_page.max(1));
        (self.total + per_page - 1) / per_page
    }

    pub fn has_next(&self) -> bool {
        i64::from(self.page) < self.pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(total: i64, page: u32, per_page: u32) -> Paginated<()> {
        Paginated {
            items: vec![],
            total,
            page,
            per_page,
        }
    }

    #[test]
    fn window_offsets() {
        assert_eq!(Pagination::new(1, 20).offset(), 0);
        assert_eq!(Pagination::new(3, 25).offset(), 50);
        assert_eq!(Pagination::new(2, 10).limit(), 10);
    }

    #[test]
    fn window_clamps() {
        assert_eq!(Pagination::new(0, 10).page, 1);
        assert_eq!(Pagination::new(1, 0).per_page, 1);
        assert_eq!(Pagination::new(1, 500).per_page, MAX_PER_PAGE);
        assert_eq!(Pagination::default().per_page, DEFAULT_PER_PAGE);
    }

    #[test]
    fn deserialized_zero_page_starts_at_zero() {
        let window: Pagination = serde_json::from_str(r#"{"page": 0, "per_page": 10}"#).unwrap();
        assert_eq!(window.offset(), 0);
        assert_eq!(window.limit(), 10);
    }

    #[test]
    fn page_counts() {
        assert_eq!(page(0, 1, 20).pages(), 0);
        assert_eq!(page(20, 1, 20).pages(), 1);
        assert_eq!(page(21, 1, 20).pages(), 2);
    }

    #[test]
    fn navigation() {
        assert!(page(30, 1, 10).has_next());
        assert!(!page(30, 1, 10).has_prev());
        assert!(!page(30, 3, 10).has_next());
        assert!(page(30, 3, 10).has_prev());
        assert!(!page(0, 1, 10).has_next());
    }
}
