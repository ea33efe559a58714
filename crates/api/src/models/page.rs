//! Pagination envelope.

use serde::{Deserialize, Serialize};

/// One page of a listing, in the envelope shape API consumers expect.
///
/// `Deserialize` matters: cached listing pages are stored serialized and
/// read back through this type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    /// 1-based page number.
    pub current_page: i64,
    /// Fixed page size.
    pub per_page: i64,
    /// Total rows across all pages.
    pub total: i64,
    /// Number of the last page (at least 1, even when empty).
    pub last_page: i64,
    /// The rows of this page.
    pub data: Vec<T>,
}

impl<T> Page<T> {
    /// Assemble a page from a row slice and the overall count.
    #[must_use]
    pub fn new(current_page: i64, per_page: i64, total: i64, data: Vec<T>) -> Self {
        let last_page = if total == 0 {
            1
        } else {
            (total + per_page - 1) / per_page
        };
        Self {
            current_page,
            per_page,
            total,
            last_page,
            data,
        }
    }

    /// The `OFFSET` for a 1-based page number.
    #[must_use]
    pub const fn offset(current_page: i64, per_page: i64) -> i64 {
        (current_page - 1) * per_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_page_rounds_up() {
        let page: Page<i32> = Page::new(1, 100, 250, vec![]);
        assert_eq!(page.last_page, 3);
    }

    #[test]
    fn test_last_page_exact_fit() {
        let page: Page<i32> = Page::new(1, 100, 200, vec![]);
        assert_eq!(page.last_page, 2);
    }

    #[test]
    fn test_empty_listing_has_one_page() {
        let page: Page<i32> = Page::new(1, 100, 0, vec![]);
        assert_eq!(page.last_page, 1);
    }

    #[test]
    fn test_offset() {
        assert_eq!(Page::<i32>::offset(1, 100), 0);
        assert_eq!(Page::<i32>::offset(3, 100), 200);
    }
}
