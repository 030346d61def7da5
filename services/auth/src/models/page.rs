//! Pagination shared by every listing endpoint

use serde::{Deserialize, Serialize};

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Upper bound on the number of items per page
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagination metadata returned next to a page of results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: i64,
}

impl PageMeta {
    pub fn new(total: i64, page: u32, limit: u32) -> Self {
        let limit = limit.max(1);
        let total_pages = (total + i64::from(limit) - 1) / i64::from(limit);
        Self {
            total,
            page,
            limit,
            total_pages,
        }
    }
}

/// Normalize optional page/limit query values into a 1-based page and a
/// bounded page size
pub fn normalize(page: Option<u32>, limit: Option<u32>) -> (u32, u32) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    (page, limit)
}

/// Row offset for a normalized page
pub fn offset(page: u32, limit: u32) -> i64 {
    i64::from(page.saturating_sub(1)) * i64::from(limit)
}
