//! Cache of entities seen in responses, keyed by id.
//!
//! Expansions (`listing.user`, `message.sender`, ...) are copies of foreign
//! entities, not parts of the containing entity. Ingesting a payload moves
//! them in here and leaves a normalized entity that refers to them by id only.

use crate::domain::model::{Category, Favorite, Id, Listing, ListingImage, Message, User};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    users: HashMap<Id, User>,
    categories: HashMap<Id, Category>,
    listings: HashMap<Id, Listing>,
    images: HashMap<Id, Vec<ListingImage>>,
}

/// 保留較新的版本，時間相同時以新進的為準。回傳是否存入新進的版本
fn upsert<T>(
    map: &mut HashMap<Id, T>,
    id: Id,
    incoming: T,
    updated_at: fn(&T) -> DateTime<Utc>,
) -> bool {
    match map.get(&id) {
        Some(existing) if updated_at(existing) > updated_at(&incoming) => false,
        _ => {
            map.insert(id, incoming);
            true
        }
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest_user(&mut self, user: User) {
        upsert(&mut self.users, user.id, user, |u| u.updated_at);
    }

    pub fn ingest_category(&mut self, mut category: Category) -> Category {
        if let Some(parent) = category.parent.take() {
            self.ingest_category(*parent);
        }
        for child in category.children.take().into_iter().flatten() {
            self.ingest_category(child);
        }
        upsert(&mut self.categories, category.id, category.clone(), |c| c.updated_at);
        category
    }

    pub fn ingest_listing(&mut self, mut listing: Listing) -> Listing {
        if let Some(user) = listing.user.take() {
            self.ingest_user(*user);
        }
        if let Some(category) = listing.category.take() {
            self.ingest_category(*category);
        }
        let images = listing.images.take();
        let stored = upsert(&mut self.listings, listing.id, listing.clone(), |l| l.updated_at);
        // 圖片跟隨被保留的刊登版本
        if let (true, Some(mut images)) = (stored, images) {
            images.sort_by_key(|image| image.order);
            self.images.insert(listing.id, images);
        } else if !stored {
            tracing::debug!("Ignoring stale copy of listing {}", listing.id);
        }
        listing
    }

    pub fn ingest_message(&mut self, mut message: Message) -> Message {
        if let Some(sender) = message.sender.take() {
            self.ingest_user(*sender);
        }
        if let Some(receiver) = message.receiver.take() {
            self.ingest_user(*receiver);
        }
        if let Some(listing) = message.listing.take() {
            self.ingest_listing(*listing);
        }
        message
    }

    pub fn ingest_favorite(&mut self, mut favorite: Favorite) -> Favorite {
        if let Some(user) = favorite.user.take() {
            self.ingest_user(*user);
        }
        if let Some(listing) = favorite.listing.take() {
            self.ingest_listing(*listing);
        }
        favorite
    }

    pub fn user(&self, id: Id) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn category(&self, id: Id) -> Option<&Category> {
        self.categories.get(&id)
    }

    pub fn listing(&self, id: Id) -> Option<&Listing> {
        self.listings.get(&id)
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    pub fn listing_owner(&self, listing: &Listing) -> Option<&User> {
        self.user(listing.user_id)
    }

    pub fn listing_category(&self, listing: &Listing) -> Option<&Category> {
        self.category(listing.category_id)
    }

    /// 刊登的圖片，依位置排序；未展開過則為空
    pub fn listing_images(&self, listing_id: Id) -> &[ListingImage] {
        self.images.get(&listing_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn message_sender(&self, message: &Message) -> Option<&User> {
        self.user(message.sender_id)
    }

    pub fn message_receiver(&self, message: &Message) -> Option<&User> {
        self.user(message.receiver_id)
    }

    pub fn message_listing(&self, message: &Message) -> Option<&Listing> {
        message.listing_id.and_then(|id| self.listing(id))
    }

    pub fn favorite_listing(&self, favorite: &Favorite) -> Option<&Listing> {
        self.listing(favorite.listing_id)
    }

    /// Re-attaches cached expansions to a normalized listing, e.g. for display.
    pub fn expand_listing(&self, listing: &Listing) -> Listing {
        let images = self.images.get(&listing.id).cloned();
        Listing {
            user: self.listing_owner(listing).cloned().map(Box::new),
            category: self.listing_category(listing).cloned().map(Box::new),
            images,
            ..listing.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::{category, image, listing, message, timestamp, user};
    use chrono::Duration;

    #[test]
    fn test_ingest_listing_moves_expansions_into_store() {
        let mut store = EntityStore::new();
        let mut bike = listing(7, 1, 3);
        bike.user = Some(Box::new(user(1, "alice")));
        bike.category = Some(Box::new(category(3, "Bikes", None)));
        bike.images = Some(vec![image(2, 7, 5), image(1, 7, 1)]);

        let normalized = store.ingest_listing(bike);

        assert!(normalized.user.is_none());
        assert!(normalized.category.is_none());
        assert!(normalized.images.is_none());
        assert_eq!(store.listing_owner(&normalized).map(|u| u.username.as_str()), Some("alice"));
        assert_eq!(store.listing_category(&normalized).map(|c| c.id), Some(3));

        let orders: Vec<i32> = store.listing_images(7).iter().map(|i| i.order).collect();
        assert_eq!(orders, vec![1, 5]);
    }

    #[test]
    fn test_missing_expansion_does_not_mean_missing_relationship() {
        let mut store = EntityStore::new();
        let bike = store.ingest_listing(listing(7, 1, 3));
        // 擁有者未展開：仍以 id 參照
        assert_eq!(bike.user_id, 1);
        assert!(store.listing_owner(&bike).is_none());

        store.ingest_user(user(1, "alice"));
        assert!(store.listing_owner(&bike).is_some());
    }

    #[test]
    fn test_stale_copy_does_not_overwrite_fresh_one() {
        let mut store = EntityStore::new();
        let mut fresh = user(1, "alice");
        fresh.is_verified = true;
        fresh.updated_at = timestamp() + Duration::days(1);
        store.ingest_user(fresh);

        store.ingest_user(user(1, "alice"));
        assert!(store.user(1).unwrap().is_verified);
    }

    #[test]
    fn test_stale_listing_keeps_fresh_images() {
        let mut store = EntityStore::new();
        let mut fresh = listing(7, 1, 3);
        fresh.updated_at = timestamp() + Duration::days(1);
        fresh.images = Some(vec![image(2, 7, 2), image(1, 7, 1)]);
        store.ingest_listing(fresh);

        let mut stale = listing(7, 1, 3);
        stale.images = Some(vec![image(9, 7, 1)]);
        store.ingest_listing(stale);

        assert_eq!(
            store.listing(7).map(|l| l.updated_at),
            Some(timestamp() + Duration::days(1))
        );
        let ids: Vec<Id> = store.listing_images(7).iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2]);

        let mut newer = listing(7, 1, 3);
        newer.updated_at = timestamp() + Duration::days(2);
        newer.images = Some(vec![image(9, 7, 1)]);
        store.ingest_listing(newer);
        let ids: Vec<Id> = store.listing_images(7).iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![9]);
    }

    #[test]
    fn test_message_expansions() {
        let mut store = EntityStore::new();
        let mut msg = message(1, 1, 2);
        msg.sender = Some(Box::new(user(1, "alice")));
        msg.receiver = Some(Box::new(user(2, "bob")));
        msg.listing_id = Some(7);
        msg.listing = Some(Box::new(listing(7, 2, 3)));

        let msg = store.ingest_message(msg);
        assert_eq!(store.message_sender(&msg).map(|u| u.id), Some(1));
        assert_eq!(store.message_receiver(&msg).map(|u| u.id), Some(2));
        assert_eq!(store.message_listing(&msg).map(|l| l.id), Some(7));
    }

    #[test]
    fn test_category_parent_chain_is_flattened() {
        let mut store = EntityStore::new();
        let mut bikes = category(3, "Bikes", Some(1));
        bikes.parent = Some(Box::new(category(1, "Vehicles", None)));

        let normalized = store.ingest_category(bikes);
        assert!(normalized.parent.is_none());
        assert_eq!(store.category(1).map(|c| c.name.as_str()), Some("Vehicles"));
        assert_eq!(store.categories().count(), 2);
    }

    #[test]
    fn test_expand_listing_reattaches_cache() {
        let mut store = EntityStore::new();
        store.ingest_user(user(1, "alice"));
        store.ingest_category(category(3, "Bikes", None));

        let expanded = store.expand_listing(&listing(7, 1, 3));
        assert_eq!(expanded.user.map(|u| u.id), Some(1));
        assert_eq!(expanded.category.map(|c| c.id), Some(3));
        assert!(expanded.images.is_none());
    }
}
