use crate::domain::model::{Id, ListingStatus, User};
use crate::domain::patch::Patch;
use crate::utils::error::{MarketError, Result};
use crate::utils::validation::{validate_id, validate_non_empty_string, validate_price, Validate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl Validate for LoginRequest {
    // 格式規則由伺服器負責，這裡只檢查是否有值
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("email", &self.email)?;
        validate_non_empty_string("password", &self.password)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl RegisterRequest {
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            password: password.into(),
            first_name: None,
            last_name: None,
            phone: None,
        }
    }
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("email", &self.email)?;
        validate_non_empty_string("username", &self.username)?;
        validate_non_empty_string("password", &self.password)
    }
}

/// 登入/註冊的結果。`token` 是不透明的 bearer 憑證
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

impl Validate for AuthResponse {
    fn validate(&self) -> Result<()> {
        self.user.validate()?;
        validate_non_empty_string("token", &self.token)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    pub title: String,
    pub description: String,
    pub price: f64,
    /// 省略時由伺服器套用預設幣別
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub location: String,
    pub category_id: Id,
}

impl Validate for CreateListingRequest {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("title", &self.title)?;
        validate_non_empty_string("description", &self.description)?;
        validate_price("price", self.price)?;
        if let Some(currency) = &self.currency {
            validate_non_empty_string("currency", currency)?;
        }
        validate_non_empty_string("location", &self.location)?;
        validate_id("categoryId", self.category_id)
    }
}

/// 刊登的部分更新，只送出非 `Absent` 的欄位
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListingRequest {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub title: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub description: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub price: Patch<f64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub currency: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub location: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub category_id: Patch<Id>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub status: Patch<ListingStatus>,
}

impl UpdateListingRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Patch::Set(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Patch::Set(description.into());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Patch::Set(price);
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Patch::Set(currency.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Patch::Set(location.into());
        self
    }

    pub fn with_category(mut self, category_id: Id) -> Self {
        self.category_id = Patch::Set(category_id);
        self
    }

    pub fn with_status(mut self, status: ListingStatus) -> Self {
        self.status = Patch::Set(status);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.present_fields().is_empty()
    }

    /// 此請求帶有的欄位 (傳輸名稱)
    pub fn present_fields(&self) -> Vec<&'static str> {
        let flags = [
            ("title", self.title.is_present()),
            ("description", self.description.is_present()),
            ("price", self.price.is_present()),
            ("currency", self.currency.is_present()),
            ("location", self.location.is_present()),
            ("categoryId", self.category_id.is_present()),
            ("status", self.status.is_present()),
        ];
        flags
            .into_iter()
            .filter_map(|(name, present)| present.then_some(name))
            .collect()
    }
}

fn reject_null<T>(field: &str, patch: &Patch<T>) -> Result<()> {
    if matches!(patch, Patch::Null) {
        return Err(MarketError::validation(
            field,
            "listing fields cannot be cleared; omit the field to leave it unchanged",
        ));
    }
    Ok(())
}

impl Validate for UpdateListingRequest {
    fn validate(&self) -> Result<()> {
        reject_null("title", &self.title)?;
        reject_null("description", &self.description)?;
        reject_null("price", &self.price)?;
        reject_null("currency", &self.currency)?;
        reject_null("location", &self.location)?;
        reject_null("categoryId", &self.category_id)?;
        reject_null("status", &self.status)?;

        if let Some(title) = self.title.as_set() {
            validate_non_empty_string("title", title)?;
        }
        if let Some(description) = self.description.as_set() {
            validate_non_empty_string("description", description)?;
        }
        if let Some(price) = self.price.as_set() {
            validate_price("price", *price)?;
        }
        if let Some(currency) = self.currency.as_set() {
            validate_non_empty_string("currency", currency)?;
        }
        if let Some(location) = self.location.as_set() {
            validate_non_empty_string("location", location)?;
        }
        if let Some(category_id) = self.category_id.as_set() {
            validate_id("categoryId", *category_id)?;
        }
        Ok(())
    }
}

/// 刊登列表的篩選條件，以查詢參數送出
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    pub page: u64,
    pub limit: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ListingStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Id>,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            category_id: None,
            search: None,
            status: None,
            min_price: None,
            max_price: None,
            location: None,
            user_id: None,
        }
    }
}

impl ListingQuery {
    pub fn page(page: u64, limit: u64) -> Self {
        Self {
            page,
            limit,
            ..Self::default()
        }
    }

    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];
        if let Some(category_id) = self.category_id {
            pairs.push(("categoryId", category_id.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        if let Some(min_price) = self.min_price {
            pairs.push(("minPrice", min_price.to_string()));
        }
        if let Some(max_price) = self.max_price {
            pairs.push(("maxPrice", max_price.to_string()));
        }
        if let Some(location) = &self.location {
            pairs.push(("location", location.clone()));
        }
        if let Some(user_id) = self.user_id {
            pairs.push(("userId", user_id.to_string()));
        }
        pairs
    }
}

impl Validate for ListingQuery {
    fn validate(&self) -> Result<()> {
        if self.page == 0 {
            return Err(MarketError::validation("page", "pages are numbered from 1"));
        }
        if self.limit == 0 {
            return Err(MarketError::validation("limit", "must be at least 1"));
        }
        if let Some(min_price) = self.min_price {
            validate_price("minPrice", min_price)?;
        }
        if let Some(max_price) = self.max_price {
            validate_price("maxPrice", max_price)?;
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(MarketError::validation(
                    "minPrice",
                    format!("minimum price {} exceeds maximum price {}", min, max),
                ));
            }
        }
        if let Some(category_id) = self.category_id {
            validate_id("categoryId", category_id)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    pub receiver_id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<Id>,
    pub content: String,
}

impl Validate for CreateMessageRequest {
    fn validate(&self) -> Result<()> {
        validate_id("receiverId", self.receiver_id)?;
        if let Some(listing_id) = self.listing_id {
            validate_id("listingId", listing_id)?;
        }
        validate_non_empty_string("content", &self.content)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateFavoriteRequest {
    pub listing_id: Id,
}

impl Validate for CreateFavoriteRequest {
    fn validate(&self) -> Result<()> {
        validate_id("listingId", self.listing_id)
    }
}
