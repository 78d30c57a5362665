use crate::core::contract::{decode_page, decode_response};
use crate::domain::envelope::PaginatedResponse;
use crate::domain::model::{Category, Favorite, Id, Listing, Message, User};
use crate::domain::ports::{
    AuthApi, CategoryApi, ConfigProvider, FavoriteApi, ListingApi, MessageApi,
};
use crate::domain::requests::{
    AuthResponse, CreateFavoriteRequest, CreateListingRequest, CreateMessageRequest,
    ListingQuery, LoginRequest, RegisterRequest, UpdateListingRequest,
};
use crate::utils::error::{MarketError, Result};
use crate::utils::validation::Validate;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Required,
    IfPresent,
}

/// reqwest-backed client for the marketplace API.
///
/// Holds the bearer token returned by login/registration in memory and
/// attaches it to later requests.
pub struct HttpMarketplaceClient<C: ConfigProvider> {
    config: C,
    client: Client,
    token: RwLock<Option<String>>,
}

impl<C: ConfigProvider> HttpMarketplaceClient<C> {
    pub fn new(config: C) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent().to_string())
            .build()?;
        Ok(Self {
            config,
            client,
            token: RwLock::new(None),
        })
    }

    pub fn with_token(self, token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
            ..self
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn set_token(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.api_base_url().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn authorize(&self, builder: RequestBuilder, auth: Auth) -> Result<RequestBuilder> {
        match (self.token.read().await.as_deref(), auth) {
            (Some(token), _) => Ok(builder.bearer_auth(token)),
            (None, Auth::IfPresent) => Ok(builder),
            (None, Auth::Required) => Err(MarketError::NotAuthenticated),
        }
    }

    /// 送出請求，回傳 2xx 回應的內容
    async fn execute(&self, shape: &str, builder: RequestBuilder, auth: Auth) -> Result<Vec<u8>> {
        let builder = self.authorize(builder, auth).await?;
        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        tracing::debug!("{} response: HTTP {} ({} bytes)", shape, status, body.len());

        if status.is_success() {
            return Ok(body);
        }

        // 錯誤狀態碼仍可能帶有失敗封裝
        if let Ok(value) = serde_json::from_slice::<Value>(&body) {
            if value.get("success") == Some(&Value::Bool(false)) {
                let message = value
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                tracing::warn!(
                    "{} request rejected with HTTP {}: {}",
                    shape,
                    status,
                    message.as_deref().unwrap_or("no message")
                );
                return Err(MarketError::EnvelopeFailure { message });
            }
        }

        Err(MarketError::UnexpectedStatus {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }

    async fn remember(&self, auth: &AuthResponse) {
        self.set_token(auth.token.clone()).await;
        tracing::info!("Authenticated as {}", auth.user.username);
    }
}

#[async_trait]
impl<C: ConfigProvider> AuthApi for HttpMarketplaceClient<C> {
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        request.validate()?;
        let builder = self.client.post(self.url("auth/register")).json(request);
        let body = self.execute("AuthResponse", builder, Auth::IfPresent).await?;
        let auth: AuthResponse = decode_response("AuthResponse", &body)?;
        self.remember(&auth).await;
        Ok(auth)
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        request.validate()?;
        let builder = self.client.post(self.url("auth/login")).json(request);
        let body = self.execute("AuthResponse", builder, Auth::IfPresent).await?;
        let auth: AuthResponse = decode_response("AuthResponse", &body)?;
        self.remember(&auth).await;
        Ok(auth)
    }

    async fn current_user(&self) -> Result<User> {
        let builder = self.client.get(self.url("auth/me"));
        let body = self.execute("User", builder, Auth::Required).await?;
        decode_response("User", &body)
    }

    async fn logout(&self) {
        *self.token.write().await = None;
        tracing::debug!("Bearer token cleared");
    }
}

#[async_trait]
impl<C: ConfigProvider> ListingApi for HttpMarketplaceClient<C> {
    async fn list_listings(&self, query: &ListingQuery) -> Result<PaginatedResponse<Listing>> {
        query.validate()?;
        let builder = self
            .client
            .get(self.url("listings"))
            .query(&query.to_query_pairs());
        let body = self.execute("Listing", builder, Auth::IfPresent).await?;
        decode_page("Listing", &body)
    }

    async fn get_listing(&self, id: Id) -> Result<Listing> {
        let builder = self.client.get(self.url(&format!("listings/{}", id)));
        let body = self.execute("Listing", builder, Auth::IfPresent).await?;
        decode_response("Listing", &body)
    }

    async fn create_listing(&self, request: &CreateListingRequest) -> Result<Listing> {
        request.validate()?;
        let builder = self.client.post(self.url("listings")).json(request);
        let body = self.execute("Listing", builder, Auth::Required).await?;
        let listing: Listing = decode_response("Listing", &body)?;
        tracing::info!("Created listing {} ({})", listing.id, listing.title);
        Ok(listing)
    }

    async fn update_listing(&self, id: Id, request: &UpdateListingRequest) -> Result<Listing> {
        request.validate()?;
        tracing::debug!("Updating listing {} fields {:?}", id, request.present_fields());
        let builder = self
            .client
            .patch(self.url(&format!("listings/{}", id)))
            .json(request);
        let body = self.execute("Listing", builder, Auth::Required).await?;
        decode_response("Listing", &body)
    }

    async fn delete_listing(&self, id: Id) -> Result<()> {
        let builder = self.client.delete(self.url(&format!("listings/{}", id)));
        let body = self.execute("Listing", builder, Auth::Required).await?;
        decode_response::<Value>("Listing", &body)?;
        Ok(())
    }
}

#[async_trait]
impl<C: ConfigProvider> CategoryApi for HttpMarketplaceClient<C> {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let builder = self.client.get(self.url("categories"));
        let body = self.execute("Category", builder, Auth::IfPresent).await?;
        decode_response("Category", &body)
    }
}

#[async_trait]
impl<C: ConfigProvider> MessageApi for HttpMarketplaceClient<C> {
    async fn inbox(&self, page: u64, limit: u64) -> Result<PaginatedResponse<Message>> {
        let builder = self
            .client
            .get(self.url("messages"))
            .query(&[("page", page), ("limit", limit)]);
        let body = self.execute("Message", builder, Auth::Required).await?;
        decode_page("Message", &body)
    }

    async fn conversation(&self, with_user: Id) -> Result<Vec<Message>> {
        let builder = self
            .client
            .get(self.url(&format!("messages/conversation/{}", with_user)));
        let body = self.execute("Message", builder, Auth::Required).await?;
        decode_response("Message", &body)
    }

    async fn send_message(&self, request: &CreateMessageRequest) -> Result<Message> {
        request.validate()?;
        let builder = self.client.post(self.url("messages")).json(request);
        let body = self.execute("Message", builder, Auth::Required).await?;
        decode_response("Message", &body)
    }

    async fn mark_read(&self, message_id: Id) -> Result<Message> {
        let builder = self
            .client
            .patch(self.url(&format!("messages/{}/read", message_id)));
        let body = self.execute("Message", builder, Auth::Required).await?;
        decode_response("Message", &body)
    }
}

#[async_trait]
impl<C: ConfigProvider> FavoriteApi for HttpMarketplaceClient<C> {
    async fn list_favorites(&self) -> Result<Vec<Favorite>> {
        let builder = self.client.get(self.url("favorites"));
        let body = self.execute("Favorite", builder, Auth::Required).await?;
        decode_response("Favorite", &body)
    }

    async fn add_favorite(&self, listing_id: Id) -> Result<Favorite> {
        let request = CreateFavoriteRequest { listing_id };
        request.validate()?;
        let builder = self.client.post(self.url("favorites")).json(&request);
        let body = self.execute("Favorite", builder, Auth::Required).await?;
        decode_response("Favorite", &body)
    }

    async fn remove_favorite(&self, listing_id: Id) -> Result<()> {
        let builder = self
            .client
            .delete(self.url(&format!("favorites/{}", listing_id)));
        let body = self.execute("Favorite", builder, Auth::Required).await?;
        decode_response::<Value>("Favorite", &body)?;
        Ok(())
    }
}
