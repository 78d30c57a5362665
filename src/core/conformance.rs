//! Shape conformance rules for every entity.
//!
//! serde already rejects missing required fields, wrong types and unknown
//! listing statuses. The rules here cover what the type system cannot:
//! positive ids, known roles, non-negative prices, and expansions that must
//! agree with their foreign keys.

use crate::domain::model::{Category, Favorite, Id, Listing, ListingImage, Message, Role, User};
use crate::utils::error::{MarketError, Result};
use crate::utils::validation::{validate_id, validate_non_empty_string, validate_price, Validate};
use std::collections::HashSet;

fn expansion_matches(field: &str, foreign_key: Id, expanded_id: Id) -> Result<()> {
    if foreign_key != expanded_id {
        return Err(MarketError::validation(
            field,
            format!(
                "expanded entity has id {} but the foreign key is {}",
                expanded_id, foreign_key
            ),
        ));
    }
    Ok(())
}

impl Validate for User {
    fn validate(&self) -> Result<()> {
        validate_id("user.id", self.id)?;
        validate_non_empty_string("user.email", &self.email)?;
        validate_non_empty_string("user.username", &self.username)?;
        if self.role == Role::Unknown {
            return Err(MarketError::validation(
                "user.role",
                "unrecognized role; expected 'user' or 'admin'",
            ));
        }
        Ok(())
    }
}

impl Validate for Category {
    fn validate(&self) -> Result<()> {
        validate_id("category.id", self.id)?;
        validate_non_empty_string("category.name", &self.name)?;
        validate_non_empty_string("category.slug", &self.slug)?;

        if let Some(parent_id) = self.parent_id {
            validate_id("category.parentId", parent_id)?;
            if parent_id == self.id {
                return Err(MarketError::CategoryCycle { id: self.id });
            }
        }

        if let Some(parent) = &self.parent {
            match self.parent_id {
                Some(parent_id) => expansion_matches("category.parent", parent_id, parent.id)?,
                None => {
                    return Err(MarketError::validation(
                        "category.parent",
                        "parent expanded on a root category",
                    ))
                }
            }
            parent.validate()?;
        }

        for child in self.children.iter().flatten() {
            if child.parent_id != Some(self.id) {
                return Err(MarketError::validation(
                    "category.children",
                    format!("child {} does not point back to {}", child.id, self.id),
                ));
            }
            child.validate()?;
        }
        Ok(())
    }
}

impl Validate for ListingImage {
    fn validate(&self) -> Result<()> {
        validate_id("image.id", self.id)?;
        validate_id("image.listingId", self.listing_id)?;
        validate_non_empty_string("image.url", &self.url)
    }
}

impl Validate for Listing {
    fn validate(&self) -> Result<()> {
        validate_id("listing.id", self.id)?;
        validate_price("listing.price", self.price)?;
        validate_non_empty_string("listing.currency", &self.currency)?;
        validate_id("listing.userId", self.user_id)?;
        validate_id("listing.categoryId", self.category_id)?;

        if let Some(user) = &self.user {
            expansion_matches("listing.user", self.user_id, user.id)?;
            user.validate()?;
        }
        if let Some(category) = &self.category {
            expansion_matches("listing.category", self.category_id, category.id)?;
            category.validate()?;
        }
        if let Some(images) = &self.images {
            let mut seen_orders = HashSet::new();
            for image in images {
                image.validate()?;
                expansion_matches("listing.images", self.id, image.listing_id)?;
                if !seen_orders.insert(image.order) {
                    return Err(MarketError::validation(
                        "listing.images",
                        format!("order {} is used by more than one image", image.order),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Validate for Favorite {
    fn validate(&self) -> Result<()> {
        validate_id("favorite.id", self.id)?;
        validate_id("favorite.userId", self.user_id)?;
        validate_id("favorite.listingId", self.listing_id)?;

        if let Some(user) = &self.user {
            expansion_matches("favorite.user", self.user_id, user.id)?;
            user.validate()?;
        }
        if let Some(listing) = &self.listing {
            expansion_matches("favorite.listing", self.listing_id, listing.id)?;
            listing.validate()?;
        }
        Ok(())
    }
}

impl Validate for Message {
    fn validate(&self) -> Result<()> {
        validate_id("message.id", self.id)?;
        validate_id("message.senderId", self.sender_id)?;
        validate_id("message.receiverId", self.receiver_id)?;
        if self.sender_id == self.receiver_id {
            return Err(MarketError::validation(
                "message.receiverId",
                "sender and receiver must differ",
            ));
        }

        if let Some(sender) = &self.sender {
            expansion_matches("message.sender", self.sender_id, sender.id)?;
            sender.validate()?;
        }
        if let Some(receiver) = &self.receiver {
            expansion_matches("message.receiver", self.receiver_id, receiver.id)?;
            receiver.validate()?;
        }
        match (&self.listing, self.listing_id) {
            (Some(listing), Some(listing_id)) => {
                expansion_matches("message.listing", listing_id, listing.id)?;
                listing.validate()?;
            }
            (Some(_), None) => {
                return Err(MarketError::validation(
                    "message.listing",
                    "listing expanded on a message without listingId",
                ))
            }
            (None, Some(listing_id)) => validate_id("message.listingId", listing_id)?,
            (None, None) => {}
        }
        Ok(())
    }
}
