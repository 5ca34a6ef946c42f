//! Pagination envelope shared by all list endpoints

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Maximum page size accepted from clients.
pub const MAX_PAGE_SIZE: u64 = 100;

const DEFAULT_PAGE_SIZE: u64 = 20;

/// Query parameters accepted by paginated list endpoints. Pages are 1-based.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PageQuery {
    /// Normalized (zero-based page index, page size) for the store layer.
    pub fn normalize(&self) -> (u64, u64) {
        let page = self.page.unwrap_or(1).max(1) - 1;
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        (page, limit)
    }
}

/// Response envelope for paginated list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
}

impl<T> Paginated<T> {
    /// Assemble an envelope from a zero-based page index and the totals
    /// reported by the store.
    pub fn new(items: Vec<T>, page_index: u64, total_pages: u64, total_items: u64) -> Self {
        Self {
            items,
            current_page: page_index + 1,
            total_pages,
            total_items,
        }
    }
}
