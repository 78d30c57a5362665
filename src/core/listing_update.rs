use crate::domain::model::Listing;
use crate::domain::patch::Patch;
use crate::domain::requests::UpdateListingRequest;
use crate::utils::error::Result;
use crate::utils::validation::Validate;

fn write<T: Clone>(patch: &Patch<T>, target: &mut T) -> bool {
    match patch {
        Patch::Set(value) => {
            *target = value.clone();
            true
        }
        Patch::Absent | Patch::Null => false,
    }
}

impl UpdateListingRequest {
    /// 將更新套用到本地的刊登資料
    ///
    /// 所有 `Set` 欄位都會寫入 (即使值相同)，`Absent` 欄位不會動到。回傳寫入的欄位名稱
    pub fn apply_to(&self, listing: &mut Listing) -> Result<Vec<&'static str>> {
        self.validate()?;

        let mut written = Vec::new();
        if write(&self.title, &mut listing.title) {
            written.push("title");
        }
        if write(&self.description, &mut listing.description) {
            written.push("description");
        }
        if write(&self.price, &mut listing.price) {
            written.push("price");
        }
        if write(&self.currency, &mut listing.currency) {
            written.push("currency");
        }
        if write(&self.location, &mut listing.location) {
            written.push("location");
        }
        if write(&self.category_id, &mut listing.category_id) {
            written.push("categoryId");
            // 快取的分類展開可能已對不上新的分類
            if listing
                .category
                .as_ref()
                .is_some_and(|category| category.id != listing.category_id)
            {
                listing.category = None;
            }
        }
        if write(&self.status, &mut listing.status) {
            written.push("status");
        }

        tracing::debug!("Applied update to listing {}: {:?}", listing.id, written);
        Ok(written)
    }

    /// Like [`apply_to`](Self::apply_to) but leaves the input untouched.
    pub fn applied_to(&self, listing: &Listing) -> Result<Listing> {
        let mut updated = listing.clone();
        self.apply_to(&mut updated)?;
        Ok(updated)
    }
}
