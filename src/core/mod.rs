pub mod category_tree;
pub mod conformance;
pub mod contract;
pub mod favorites;
pub mod listing_update;
pub mod store;

#[cfg(test)]
pub(crate) mod fixtures;

pub use crate::domain::envelope::{ApiResponse, PaginatedResponse, Pagination};
pub use crate::domain::ports::{
    AuthApi, CategoryApi, ConfigProvider, FavoriteApi, ListingApi, MessageApi,
};
pub use crate::utils::error::Result;
