//! Page/limit arithmetic shared by list views

/// A 1-based page window over a list endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    page: u32,
    limit: u32,
}

impl Paging {
    /// Build from a raw `page` query value; missing or zero means page 1
    pub fn from_query(page: Option<u32>, limit: u32) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.max(1),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Upstream offset of the first item on this page
    pub fn offset(&self) -> u32 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Previous page number, 0 when there is none
    pub fn prev(&self) -> u32 {
        self.page - 1
    }

    pub fn next(&self) -> u32 {
        self.page.saturating_add(1)
    }

    /// Number of pages needed to show `total` items
    pub fn total_pages(&self, total: u32) -> u32 {
        total.div_ceil(self.limit)
    }
}
