use crate::domain::model::{Favorite, Id};
use crate::utils::error::{MarketError, Result};
use std::collections::BTreeMap;

/// Locally held favorites, at most one per (user, listing) pair.
#[derive(Debug, Clone, Default)]
pub struct FavoriteSet {
    entries: BTreeMap<(Id, Id), Favorite>,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由伺服器清單建立集合，重複的組合保留最早的紀錄
    pub fn from_favorites(favorites: impl IntoIterator<Item = Favorite>) -> Self {
        let mut set = Self::new();
        for favorite in favorites {
            match set.entries.get(&favorite.key()) {
                Some(existing) if existing.created_at <= favorite.created_at => {
                    tracing::debug!(
                        "Dropping duplicate favorite {} for pair {:?}",
                        favorite.id,
                        favorite.key()
                    );
                }
                _ => {
                    set.entries.insert(favorite.key(), favorite);
                }
            }
        }
        set
    }

    /// 新增收藏。已存在的組合會被拒絕，集合不變
    pub fn insert(&mut self, favorite: Favorite) -> Result<()> {
        let (user_id, listing_id) = favorite.key();
        if self.entries.contains_key(&(user_id, listing_id)) {
            return Err(MarketError::DuplicateFavorite {
                user_id,
                listing_id,
            });
        }
        self.entries.insert((user_id, listing_id), favorite);
        Ok(())
    }

    pub fn contains(&self, user_id: Id, listing_id: Id) -> bool {
        self.entries.contains_key(&(user_id, listing_id))
    }

    pub fn get(&self, user_id: Id, listing_id: Id) -> Option<&Favorite> {
        self.entries.get(&(user_id, listing_id))
    }

    pub fn remove(&mut self, user_id: Id, listing_id: Id) -> Option<Favorite> {
        self.entries.remove(&(user_id, listing_id))
    }

    /// Favorites of one user, ordered by listing id.
    pub fn for_user(&self, user_id: Id) -> Vec<&Favorite> {
        self.entries
            .range((user_id, Id::MIN)..=(user_id, Id::MAX))
            .map(|(_, favorite)| favorite)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Favorite> {
        self.entries.values()
    }
}
