use crate::domain::envelope::PaginatedResponse;
use crate::domain::model::{Category, Favorite, Id, Listing, Message, User};
use crate::domain::requests::{
    AuthResponse, CreateListingRequest, CreateMessageRequest, ListingQuery, LoginRequest,
    RegisterRequest, UpdateListingRequest,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn items_per_page(&self) -> u64;
    fn user_agent(&self) -> &str;
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse>;
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse>;
    async fn current_user(&self) -> Result<User>;
    /// 清除持有的 bearer token (僅限本地)
    async fn logout(&self);
}

#[async_trait]
pub trait ListingApi: Send + Sync {
    async fn list_listings(&self, query: &ListingQuery) -> Result<PaginatedResponse<Listing>>;
    async fn get_listing(&self, id: Id) -> Result<Listing>;
    async fn create_listing(&self, request: &CreateListingRequest) -> Result<Listing>;
    async fn update_listing(&self, id: Id, request: &UpdateListingRequest) -> Result<Listing>;
    async fn delete_listing(&self, id: Id) -> Result<()>;
}

#[async_trait]
pub trait CategoryApi: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>>;
}

#[async_trait]
pub trait MessageApi: Send + Sync {
    async fn inbox(&self, page: u64, limit: u64) -> Result<PaginatedResponse<Message>>;
    async fn conversation(&self, with_user: Id) -> Result<Vec<Message>>;
    async fn send_message(&self, request: &CreateMessageRequest) -> Result<Message>;
    async fn mark_read(&self, message_id: Id) -> Result<Message>;
}

#[async_trait]
pub trait FavoriteApi: Send + Sync {
    async fn list_favorites(&self) -> Result<Vec<Favorite>>;
    async fn add_favorite(&self, listing_id: Id) -> Result<Favorite>;
    async fn remove_favorite(&self, listing_id: Id) -> Result<()>;
}
