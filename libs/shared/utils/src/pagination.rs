use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

/// Raw `?page=&limit=` query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    /// `None` when neither parameter was given; otherwise page >= 1 and
    /// 1 <= limit <= MAX_LIMIT.
    pub fn from_query(query: &PageQuery) -> Option<Self> {
        if query.page.is_none() && query.limit.is_none() {
            return None;
        }

        Some(Self {
            page: query.page.unwrap_or(1).max(1),
            limit: query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        })
    }

    pub fn skip(&self) -> usize {
        ((self.page - 1) as usize) * self.limit as usize
    }

    pub fn take(&self) -> usize {
        self.limit as usize
    }

    pub fn info(&self, total: u64) -> PageInfo {
        let limit = u64::from(self.limit);
        // An empty result still reports one page.
        let total_pages = total.div_ceil(limit).max(1);
        PageInfo {
            page: self.page,
            limit: self.limit,
            total,
            total_pages,
            has_next: u64::from(self.page) < total_pages,
            has_prev: self.page > 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}
