pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::HttpMarketplaceClient;
pub use config::ClientConfig;
pub use core::category_tree::CategoryTree;
pub use core::favorites::FavoriteSet;
pub use core::store::EntityStore;
pub use domain::envelope::{ApiResponse, PaginatedResponse, Pagination};
pub use domain::model::{
    Category, Favorite, Id, Listing, ListingImage, ListingStatus, Message, Role, User,
};
pub use domain::patch::Patch;
pub use domain::requests::{
    AuthResponse, CreateFavoriteRequest, CreateListingRequest, CreateMessageRequest,
    ListingQuery, LoginRequest, RegisterRequest, UpdateListingRequest,
};
pub use utils::error::{MarketError, Result};
