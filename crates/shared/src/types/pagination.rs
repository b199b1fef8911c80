//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of items per page.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    50
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PageRequest {
    /// Maximum page size accepted from clients.
    pub const MAX_PER_PAGE: u32 = 200;

    /// Calculates the offset for database queries.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit())
    }

    /// Returns the clamped limit for database queries.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.per_page.clamp(1, Self::MAX_PER_PAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let page = PageRequest::default();
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 50);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_offset_uses_clamped_limit() {
        let page = PageRequest {
            page: 3,
            per_page: 1000,
        };
        assert_eq!(page.limit(), PageRequest::MAX_PER_PAGE);
        assert_eq!(page.offset(), 2 * u64::from(PageRequest::MAX_PER_PAGE));
    }

    #[test]
    fn test_zero_page_saturates() {
        let page = PageRequest {
            page: 0,
            per_page: 10,
        };
        assert_eq!(page.offset(), 0);
    }
}
