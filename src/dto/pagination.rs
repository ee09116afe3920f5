use serde::{Deserialize, Serialize};

pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
}

impl PageQuery {
    /// `(page, limit)` with page at least 1 and limit in `1..=MAX_PAGE_SIZE`.
    pub fn resolve(&self, default_limit: u64) -> (u64, u64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE);
        (page, limit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub pages: u64,
    pub limit: u64,
}

impl Pagination {
    pub fn new(total: u64, page: u64, limit: u64) -> Self {
        Pagination { total, page, pages: total.div_ceil(limit.max(1)), limit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_round_up() {
        assert_eq!(Pagination::new(21, 1, 10).pages, 3);
        assert_eq!(Pagination::new(0, 1, 10).pages, 0);
    }

    #[test]
    fn test_limits_are_clamped() {
        let q = PageQuery { page: Some(0), limit: Some(1000), search: None };
        assert_eq!(q.resolve(20), (1, MAX_PAGE_SIZE));
        assert_eq!(PageQuery::default().resolve(20), (1, 20));
    }

    #[test]
    fn test_max_page_from_query_string() {
        let q: PageQuery = serde_json::from_str(r#"{"page":18446744073709551615,"limit":20}"#).unwrap();
        let (page, limit) = q.resolve(20);
        assert_eq!((page, limit), (u64::MAX, 20));
        let (skip, _) = crate::repository::mongo::page_window(page, limit);
        assert_eq!(skip, i64::MAX as u64);
    }
}
