use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 伺服器指派的識別碼，合規的資料中必為正數
pub type Id = u64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
    /// 未知的角色，合規檢查時會被拒絕
    #[serde(other)]
    Unknown,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Admin => f.write_str("admin"),
            Role::Unknown => f.write_str("unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[default]
    Active,
    Sold,
    Inactive,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => "active",
            ListingStatus::Sold => "sold",
            ListingStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ListingStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "active" => Ok(ListingStatus::Active),
            "sold" => Ok(ListingStatus::Sold),
            "inactive" => Ok(ListingStatus::Inactive),
            other => Err(format!(
                "unknown listing status '{}', expected active, sold or inactive",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Id,
    pub email: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.username.clone(),
        }
    }
}

/// 分類樹的節點。`parent` 與 `children` 為展開資料
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Id,
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Id>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<Category>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Category>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: Id,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub currency: String,
    pub location: String,
    pub user_id: Id,
    pub category_id: Id,
    pub status: ListingStatus,
    pub view_count: u64,
    pub is_promoted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Box<User>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Box<Category>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ListingImage>>,
}

impl Listing {
    /// 依 `order` 排序的圖片，未展開時為空
    pub fn ordered_images(&self) -> Vec<&ListingImage> {
        let mut images: Vec<&ListingImage> = self.images.iter().flatten().collect();
        images.sort_by_key(|image| image.order);
        images
    }

    pub fn is_available(&self) -> bool {
        self.status == ListingStatus::Active
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingImage {
    pub id: Id,
    pub listing_id: Id,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: Id,
    pub user_id: Id,
    pub listing_id: Id,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Box<User>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing: Option<Box<Listing>>,
}

impl Favorite {
    pub fn key(&self) -> (Id, Id) {
        (self.user_id, self.listing_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Id,
    pub sender_id: Id,
    pub receiver_id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<Id>,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<Box<User>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<Box<User>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing: Option<Box<Listing>>,
}

impl Message {
    /// 從 `viewer` 角度看的對話另一方
    pub fn counterpart(&self, viewer: Id) -> Option<Id> {
        if viewer == self.sender_id {
            Some(self.receiver_id)
        } else if viewer == self.receiver_id {
            Some(self.sender_id)
        } else {
            None
        }
    }

    /// 只有收件者可以變更 `isRead`
    pub fn can_mark_read(&self, actor: Id) -> bool {
        actor == self.receiver_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn listing_json() -> serde_json::Value {
        json!({
            "id": 7,
            "title": "Bike",
            "description": "Used bike",
            "price": 50,
            "currency": "USD",
            "location": "Metropolis",
            "userId": 1,
            "categoryId": 3,
            "status": "active",
            "viewCount": 0,
            "isPromoted": false,
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-01T10:00:00Z"
        })
    }

    #[test]
    fn test_listing_uses_camel_case_wire_names() {
        let listing: Listing = serde_json::from_value(listing_json()).unwrap();
        assert_eq!(listing.user_id, 1);
        assert_eq!(listing.category_id, 3);
        assert_eq!(listing.status, ListingStatus::Active);

        let value = serde_json::to_value(&listing).unwrap();
        assert_eq!(value["viewCount"], 0);
        assert_eq!(value["isPromoted"], false);
        assert!(value.get("user").is_none());
        assert!(value.get("images").is_none());
    }

    #[test]
    fn test_listing_round_trip_keeps_required_fields() {
        let listing: Listing = serde_json::from_value(listing_json()).unwrap();
        let text = serde_json::to_string(&listing).unwrap();
        let parsed: Listing = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, listing);
        assert_eq!(parsed.title, "Bike");
        assert!(parsed.price >= 0.0);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let mut value = listing_json();
        value["status"] = json!("archived");
        assert!(serde_json::from_value::<Listing>(value).is_err());
    }

    #[test]
    fn test_negative_view_count_is_rejected() {
        let mut value = listing_json();
        value["viewCount"] = json!(-1);
        assert!(serde_json::from_value::<Listing>(value).is_err());
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let mut value = listing_json();
        value.as_object_mut().unwrap().remove("location");
        assert!(serde_json::from_value::<Listing>(value).is_err());
    }

    #[test]
    fn test_unknown_role_is_parsed_as_unknown() {
        let value = json!({
            "id": 1,
            "email": "a@b.com",
            "username": "alice",
            "isActive": true,
            "isVerified": false,
            "role": "moderator",
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-01T10:00:00Z"
        });
        let user: User = serde_json::from_value(value).unwrap();
        assert_eq!(user.role, Role::Unknown);

        let value = json!({
            "id": 1,
            "email": "a@b.com",
            "username": "alice",
            "isActive": true,
            "isVerified": false,
            "role": 3,
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-01T10:00:00Z"
        });
        assert!(serde_json::from_value::<User>(value).is_err());
    }

    #[test]
    fn test_ordered_images() {
        let mut listing: Listing = serde_json::from_value(listing_json()).unwrap();
        let at = listing.created_at;
        let image = |id: Id, order: i32| ListingImage {
            id,
            listing_id: 7,
            url: format!("https://cdn.example.com/{}.jpg", id),
            alt: None,
            order,
            created_at: at,
            updated_at: at,
        };
        listing.images = Some(vec![image(1, 10), image(2, -3), image(3, 4)]);

        let ids: Vec<Id> = listing.ordered_images().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_message_counterpart() {
        let message: Message = serde_json::from_value(json!({
            "id": 1,
            "senderId": 1,
            "receiverId": 2,
            "content": "Is it still available?",
            "isRead": false,
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(message.counterpart(1), Some(2));
        assert_eq!(message.counterpart(2), Some(1));
        assert_eq!(message.counterpart(3), None);
        assert!(message.can_mark_read(2));
        assert!(!message.can_mark_read(1));
        assert_eq!(message.listing_id, None);
    }
}
