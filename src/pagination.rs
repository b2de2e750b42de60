use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

/// Pagination
///
/// Page-number pagination as the list screens send it (`?page=2&per_page=20`).
/// Missing or out-of-range values are clamped rather than rejected.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Rows per page, at most 100.
    pub per_page: Option<u32>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: Some(1),
            per_page: Some(DEFAULT_PER_PAGE),
        }
    }
}

impl Pagination {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() as i64 - 1) * self.per_page() as i64
    }

    pub fn limit(&self) -> i64 {
        self.per_page() as i64
    }

    /// Inclusive row range, the shape the hosted query builder's `range(from, to)` expects.
    pub fn range(&self) -> (i64, i64) {
        let from = self.offset();
        (from, from + self.limit() - 1)
    }

    pub fn meta(&self, total: i64) -> PageMeta {
        let per_page = self.per_page() as i64;
        let total = total.max(0);
        PageMeta {
            page: self.page(),
            per_page: self.per_page(),
            total,
            total_pages: ((total + per_page - 1) / per_page) as u32,
        }
    }
}

/// PageMeta
///
/// Pagination block attached to every paginated response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PageMeta {
    pub page: u32,
    pub per_page: u32,
    #[ts(type = "number")]
    pub total: i64,
    pub total_pages: u32,
}
