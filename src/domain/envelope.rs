//! Response envelopes shared by every endpoint.
//!
//! Single entities arrive wrapped in [`ApiResponse`], lists in
//! [`PaginatedResponse`]. `success` is the authoritative signal: callers
//! branch on it rather than on the HTTP status alone.

use crate::utils::error::{MarketError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data,
            message: None,
            success: true,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// 取出資料。失敗的封裝不會交出 `data`
    pub fn into_result(self) -> Result<T> {
        if self.success {
            Ok(self.data)
        } else {
            Err(MarketError::EnvelopeFailure {
                message: self.message,
            })
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub items_per_page: u64,
}

impl Pagination {
    /// 由項目總數推算 `total_pages`，空結果為 0 頁
    pub fn compute(total_items: u64, items_per_page: u64, current_page: u64) -> Self {
        let total_pages = if items_per_page == 0 {
            0
        } else {
            total_items.div_ceil(items_per_page)
        };
        Self {
            current_page,
            total_pages,
            total_items,
            items_per_page,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.items_per_page == 0 {
            return Err(MarketError::validation(
                "pagination.itemsPerPage",
                "must be at least 1",
            ));
        }
        if self.current_page == 0 {
            return Err(MarketError::validation(
                "pagination.currentPage",
                "pages are numbered from 1",
            ));
        }

        // itemsPerPage * (totalPages - 1) < totalItems <= itemsPerPage * totalPages
        let expected_pages = self.total_items.div_ceil(self.items_per_page);
        if self.total_pages != expected_pages {
            return Err(MarketError::validation(
                "pagination.totalPages",
                format!(
                    "{} items at {} per page span {} pages, got {}",
                    self.total_items, self.items_per_page, expected_pages, self.total_pages
                ),
            ));
        }

        if self.total_items > 0 && self.current_page > self.total_pages {
            return Err(MarketError::validation(
                "pagination.currentPage",
                format!(
                    "page {} is outside [1, {}]",
                    self.current_page, self.total_pages
                ),
            ));
        }
        Ok(())
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn next_page(&self) -> Option<u64> {
        self.has_next().then(|| self.current_page + 1)
    }

    /// 目前頁面第一筆的索引 (從 0 起算)
    pub fn offset(&self) -> u64 {
        self.current_page
            .saturating_sub(1)
            .saturating_mul(self.items_per_page)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> PaginatedResponse<T> {
    /// 從完整結果中切出第 `page` 頁 (從 1 起算)，超出範圍的頁面沒有項目
    pub fn from_slice(items: Vec<T>, page: u64, items_per_page: u64) -> Self {
        let pagination = Pagination::compute(items.len() as u64, items_per_page, page.max(1));
        let skip = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(items_per_page).unwrap_or(usize::MAX);
        let data = items.into_iter().skip(skip).take(take).collect();
        Self { data, pagination }
    }

    pub fn validate(&self) -> Result<()> {
        self.pagination.validate()?;
        if self.data.len() as u64 > self.pagination.items_per_page {
            return Err(MarketError::validation(
                "data",
                format!(
                    "page holds {} items but itemsPerPage is {}",
                    self.data.len(),
                    self.pagination.items_per_page
                ),
            ));
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> PaginatedResponse<U> {
        PaginatedResponse {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}
