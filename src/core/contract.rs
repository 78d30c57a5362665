//! Boundary decoding of response bodies.
//!
//! Every payload is checked against its declared shape before it reaches a
//! caller. A `success=false` envelope becomes [`MarketError::EnvelopeFailure`];
//! anything that does not fit the shape becomes
//! [`MarketError::MalformedResponse`]. Nothing is coerced.

use crate::domain::envelope::{ApiResponse, PaginatedResponse};
use crate::domain::model::{Category, Favorite, Listing, Message, User};
use crate::domain::requests::AuthResponse;
use crate::utils::error::{MarketError, Result};
use crate::utils::validation::Validate;
use serde::de::DeserializeOwned;
use serde_json::Value;

fn parse_json(shape: &str, body: &[u8]) -> Result<Value> {
    serde_json::from_slice(body)
        .map_err(|e| MarketError::malformed(shape, format!("body is not valid JSON: {}", e)))
}

fn conform<T: Validate>(shape: &str, value: &T) -> Result<()> {
    value
        .validate()
        .map_err(|e| MarketError::malformed(shape, e.to_string()))
}

/// 讀取 `success` 旗標，不是封裝時回傳 `Ok(None)`
fn envelope_flag(shape: &str, value: &Value) -> Result<Option<bool>> {
    let object = value
        .as_object()
        .ok_or_else(|| MarketError::malformed(shape, "expected a JSON object"))?;
    match object.get("success") {
        None => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(*flag)),
        Some(other) => Err(MarketError::malformed(
            shape,
            format!("'success' must be a boolean, got {}", other),
        )),
    }
}

fn envelope_failure(shape: &str, value: &Value) -> MarketError {
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string);
    tracing::warn!(
        "{} request failed: {}",
        shape,
        message.as_deref().unwrap_or("no message")
    );
    MarketError::EnvelopeFailure { message }
}

/// 解析 `ApiResponse<T>` 並回傳驗證過的資料
pub fn decode_response<T>(shape: &str, body: &[u8]) -> Result<T>
where
    T: DeserializeOwned + Validate,
{
    let value = parse_json(shape, body)?;
    decode_response_value(shape, value)
}

pub fn decode_response_value<T>(shape: &str, value: Value) -> Result<T>
where
    T: DeserializeOwned + Validate,
{
    match envelope_flag(shape, &value)? {
        None => {
            return Err(MarketError::malformed(
                shape,
                "missing 'success' field of the response envelope",
            ))
        }
        Some(false) => return Err(envelope_failure(shape, &value)),
        Some(true) => {}
    }

    let envelope: ApiResponse<T> = serde_json::from_value(value)
        .map_err(|e| MarketError::malformed(shape, e.to_string()))?;
    conform(shape, &envelope.data)?;
    tracing::debug!("Decoded {} response", shape);
    envelope.into_result()
}

/// Decodes a `PaginatedResponse<T>` body. A page inside an `ApiResponse` is
/// accepted as well, either nested under `data` or flat beside `success`.
pub fn decode_page<T>(shape: &str, body: &[u8]) -> Result<PaginatedResponse<T>>
where
    T: DeserializeOwned + Validate,
{
    let value = parse_json(shape, body)?;
    decode_page_value(shape, value)
}

pub fn decode_page_value<T>(shape: &str, value: Value) -> Result<PaginatedResponse<T>>
where
    T: DeserializeOwned + Validate,
{
    let flag = envelope_flag(shape, &value)?;
    let page_value = match (flag, value) {
        (Some(false), value) => return Err(envelope_failure(shape, &value)),
        // 扁平形式：`success` 與 `data`、`pagination` 同層
        (Some(true), value) if value.get("pagination").is_some() => value,
        (Some(true), Value::Object(mut object)) => object
            .remove("data")
            .ok_or_else(|| MarketError::malformed(shape, "envelope has no 'data' field"))?,
        (_, value) => value,
    };

    let page: PaginatedResponse<T> = serde_json::from_value(page_value)
        .map_err(|e| MarketError::malformed(shape, e.to_string()))?;
    page.validate()
        .map_err(|e| MarketError::malformed(shape, e.to_string()))?;
    conform(shape, &page.data)?;
    tracing::debug!(
        "Decoded {} page {}/{} ({} items)",
        shape,
        page.pagination.current_page,
        page.pagination.total_pages,
        page.data.len()
    );
    Ok(page)
}

/// 可離線檢查 JSON 文件的結構種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    User,
    Category,
    Listing,
    Message,
    Favorite,
    Auth,
    ListingPage,
    MessagePage,
}

impl ShapeKind {
    pub const ALL: [&'static str; 8] = [
        "user",
        "category",
        "listing",
        "message",
        "favorite",
        "auth",
        "listing-page",
        "message-page",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::User => "user",
            ShapeKind::Category => "category",
            ShapeKind::Listing => "listing",
            ShapeKind::Message => "message",
            ShapeKind::Favorite => "favorite",
            ShapeKind::Auth => "auth",
            ShapeKind::ListingPage => "listing-page",
            ShapeKind::MessagePage => "message-page",
        }
    }
}

impl std::str::FromStr for ShapeKind {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(ShapeKind::User),
            "category" => Ok(ShapeKind::Category),
            "listing" => Ok(ShapeKind::Listing),
            "message" => Ok(ShapeKind::Message),
            "favorite" => Ok(ShapeKind::Favorite),
            "auth" => Ok(ShapeKind::Auth),
            "listing-page" => Ok(ShapeKind::ListingPage),
            "message-page" => Ok(ShapeKind::MessagePage),
            other => Err(MarketError::validation(
                "shape",
                format!("unknown shape '{}', expected one of {}", other, Self::ALL.join(", ")),
            )),
        }
    }
}

fn check_entity<T>(shape: &str, value: Value) -> Result<()>
where
    T: DeserializeOwned + Validate,
{
    if envelope_flag(shape, &value)?.is_some() {
        decode_response_value::<T>(shape, value).map(|_| ())
    } else {
        let entity: T =
            serde_json::from_value(value).map_err(|e| MarketError::malformed(shape, e.to_string()))?;
        conform(shape, &entity)
    }
}

/// Checks a JSON document, bare or wrapped in an envelope, against `kind`.
pub fn check_shape(kind: ShapeKind, body: &[u8]) -> Result<()> {
    let shape = kind.name();
    let value = parse_json(shape, body)?;
    match kind {
        ShapeKind::User => check_entity::<User>(shape, value),
        ShapeKind::Category => check_entity::<Category>(shape, value),
        ShapeKind::Listing => check_entity::<Listing>(shape, value),
        ShapeKind::Message => check_entity::<Message>(shape, value),
        ShapeKind::Favorite => check_entity::<Favorite>(shape, value),
        ShapeKind::Auth => check_entity::<AuthResponse>(shape, value),
        ShapeKind::ListingPage => decode_page_value::<Listing>(shape, value).map(|_| ()),
        ShapeKind::MessagePage => decode_page_value::<Message>(shape, value).map(|_| ()),
    }
}
