//! Offset pagination.

use frame_shared::{ErrorCode, ErrorEnvelope};
use serde::Serialize;

/// Largest accepted page size.
pub const MAX_PAGE_SIZE: u32 = 1_000;

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    page: u32,
    page_size: u32,
}

impl Page {
    /// Validate a page request.
    pub const fn new(page: u32, page_size: u32) -> Result<Self, PageError> {
        if page == 0 {
            return Err(PageError::PageZero);
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(PageError::PageSize { page_size });
        }
        Ok(Self { page, page_size })
    }

    /// Page number, starting at 1.
    #[must_use]
    pub const fn page(self) -> u32 {
        self.page
    }

    /// Rows per page; this is the query `LIMIT`.
    #[must_use]
    pub const fn page_size(self) -> u32 {
        self.page_size
    }

    /// Rows to skip: `(page - 1) * page_size`.
    #[must_use]
    pub const fn offset(self) -> u64 {
        (self.page as u64 - 1) * (self.page_size as u64)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
        }
    }
}

/// Pagination validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    /// Pages are 1-based.
    #[error("page must be at least 1")]
    PageZero,
    /// Page size outside `1..=MAX_PAGE_SIZE`.
    #[error("page_size must be within [1, {MAX_PAGE_SIZE}] (got {page_size})")]
    PageSize {
        /// Rejected size.
        page_size: u32,
    },
}

impl From<PageError> for ErrorEnvelope {
    fn from(error: PageError) -> Self {
        Self::expected(ErrorCode::new("domain", "invalid_page"), error.to_string())
    }
}
