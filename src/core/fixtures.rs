//! Entity builders shared by unit tests.

use crate::domain::model::{
    Category, Favorite, Id, Listing, ListingImage, ListingStatus, Message, Role, User,
};
use chrono::{DateTime, TimeZone, Utc};

pub fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
}

pub fn user(id: Id, username: &str) -> User {
    User {
        id,
        email: format!("{}@example.com", username),
        username: username.to_string(),
        first_name: None,
        last_name: None,
        phone: None,
        avatar: None,
        is_active: true,
        is_verified: false,
        role: Role::User,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub fn category(id: Id, name: &str, parent_id: Option<Id>) -> Category {
    Category {
        id,
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
        description: None,
        icon: None,
        parent_id,
        is_active: true,
        created_at: timestamp(),
        updated_at: timestamp(),
        parent: None,
        children: None,
    }
}

pub fn listing(id: Id, user_id: Id, category_id: Id) -> Listing {
    Listing {
        id,
        title: "Bike".to_string(),
        description: "Used bike".to_string(),
        price: 50.0,
        currency: "USD".to_string(),
        location: "Metropolis".to_string(),
        user_id,
        category_id,
        status: ListingStatus::Active,
        view_count: 0,
        is_promoted: false,
        created_at: timestamp(),
        updated_at: timestamp(),
        user: None,
        category: None,
        images: None,
    }
}

pub fn image(id: Id, listing_id: Id, order: i32) -> ListingImage {
    ListingImage {
        id,
        listing_id,
        url: format!("https://cdn.example.com/listings/{}/{}.jpg", listing_id, id),
        alt: None,
        order,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub fn favorite(id: Id, user_id: Id, listing_id: Id) -> Favorite {
    Favorite {
        id,
        user_id,
        listing_id,
        created_at: timestamp(),
        user: None,
        listing: None,
    }
}

pub fn message(id: Id, sender_id: Id, receiver_id: Id) -> Message {
    Message {
        id,
        sender_id,
        receiver_id,
        listing_id: None,
        content: "Is it still available?".to_string(),
        is_read: false,
        created_at: timestamp(),
        updated_at: timestamp(),
        sender: None,
        receiver: None,
        listing: None,
    }
}
