use serde::Deserialize;
use utoipa::IntoParams;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;
/// Keeps `offset()` within a signed 64-bit SQL `OFFSET`
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_PAGE_SIZE;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// 1-based page number (default: 1)
    pub page: Option<u64>,
    /// Items per page (default: 20, max: 100)
    pub page_size: Option<u64>,
}

/// Normalized page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
}

impl From<&PageQuery> for Pagination {
    fn from(query: &PageQuery) -> Self {
        Self {
            page: query.page.unwrap_or(1).clamp(1, MAX_PAGE),
            page_size: query
                .page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }
}

impl Pagination {
    #[must_use]
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    #[must_use]
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page: Option<u64>, page_size: Option<u64>) -> Pagination {
        Pagination::from(&PageQuery { page, page_size })
    }

    #[test]
    fn defaults_and_clamping() {
        assert_eq!(page(None, None), Pagination { page: 1, page_size: 20 });
        assert_eq!(page(Some(0), Some(0)), Pagination { page: 1, page_size: 1 });
        assert_eq!(page(Some(3), Some(500)).page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn huge_page_keeps_offset_in_sql_range() {
        let p = page(Some(u64::MAX), Some(MAX_PAGE_SIZE));
        assert_eq!(p.page, MAX_PAGE);
        assert!(i64::try_from(p.offset()).is_ok());

        let small = page(Some(u64::MAX), Some(1));
        assert!(i64::try_from(small.offset()).is_ok());
    }

    #[test]
    fn offset_and_total_pages() {
        let p = page(Some(3), Some(10));
        assert_eq!(p.offset(), 20);
        assert_eq!(p.total_pages(0), 0);
        assert_eq!(p.total_pages(10), 1);
        assert_eq!(p.total_pages(21), 3);
    }
}
