//! In-memory catalog of products and users.
//!
//! Insertion order is preserved and is the tie-break order used by ranking
//! and dashboard aggregation. All reads hand out clones; callers never hold
//! references into the store's collections.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::{
    PricePoint, Product, ProductId, SocialMetrics, StockStatus, StoreId,
};
use crate::domain::user::{Behavior, User, UserId};
use crate::errors::DomainError;

/// Partial product update. `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<Option<String>>,
    pub description: Option<String>,
    pub prices: Option<BTreeMap<StoreId, Decimal>>,
    pub affiliate_links: Option<BTreeMap<StoreId, String>>,
    pub rating: Option<f64>,
    pub review_count: Option<u64>,
    pub social: Option<SocialMetrics>,
    pub ai_recommendation_score: Option<f64>,
    pub stock: Option<StockStatus>,
    pub tags: Option<Vec<String>>,
}

impl ProductPatch {
    fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(category) = &self.category {
            product.category = category.clone();
        }
        if let Some(subcategory) = &self.subcategory {
            product.subcategory = subcategory.clone();
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(prices) = &self.prices {
            product.prices = prices.clone();
        }
        if let Some(links) = &self.affiliate_links {
            product.affiliate_links = links.clone();
        }
        if let Some(rating) = self.rating {
            product.rating = rating;
        }
        if let Some(review_count) = self.review_count {
            product.review_count = review_count;
        }
        if let Some(social) = &self.social {
            product.social = social.clone();
        }
        if let Some(score) = self.ai_recommendation_score {
            product.ai_recommendation_score = score;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(tags) = &self.tags {
            product.tags = tags.clone();
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub min_trending_score: Option<f64>,
    pub in_stock_only: bool,
}

impl ProductFilter {
    fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category {
            if &product.category != category {
                return false;
            }
        }
        if let Some(threshold) = self.min_trending_score {
            if product.social.trending_score <= threshold {
                return false;
            }
        }
        if self.in_stock_only && product.stock == StockStatus::OutOfStock {
            return false;
        }
        true
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogStore {
    products: Vec<Product>,
    users: Vec<User>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_product(&mut self, product: Product) -> Result<(), DomainError> {
        if self.products.iter().any(|existing| existing.id == product.id) {
            return Err(DomainError::DuplicateProduct(product.id));
        }
        product.validate()?;
        self.products.push(product);
        Ok(())
    }

    /// Applies a patch and re-checks invariants; nothing is mutated when the
    /// patched record would be invalid.
    pub fn update_product(
        &mut self,
        id: &ProductId,
        patch: &ProductPatch,
        now: DateTime<Utc>,
    ) -> Result<Product, DomainError> {
        let slot = self
            .products
            .iter_mut()
            .find(|product| &product.id == id)
            .ok_or_else(|| DomainError::ProductNotFound(id.clone()))?;

        let mut candidate = slot.clone();
        patch.apply(&mut candidate);
        candidate.updated_at = now;
        candidate.validate()?;

        *slot = candidate.clone();
        Ok(candidate)
    }

    /// Idempotent: deleting an unknown id is a no-op.
    pub fn delete_product(&mut self, id: &ProductId) {
        self.products.retain(|product| &product.id != id);
    }

    pub fn get_product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == id)
    }

    pub fn list_products(&self, filter: Option<&ProductFilter>) -> Vec<Product> {
        self.products
            .iter()
            .filter(|product| filter.map_or(true, |filter| filter.matches(product)))
            .cloned()
            .collect()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn contains_product(&self, id: &ProductId) -> bool {
        self.get_product(id).is_some()
    }

    /// Appends a price observation. History stays time-ordered; an entry
    /// dated before the current tail is rejected.
    pub fn record_price_point(
        &mut self,
        id: &ProductId,
        point: PricePoint,
    ) -> Result<(), DomainError> {
        let product = self
            .products
            .iter_mut()
            .find(|product| &product.id == id)
            .ok_or_else(|| DomainError::ProductNotFound(id.clone()))?;

        if let Some(last) = product.price_history.last() {
            if point.date < last.date {
                return Err(DomainError::PriceHistoryOutOfOrder(id.clone()));
            }
        }
        product.price_history.push(point);
        Ok(())
    }

    pub fn upsert_user(&mut self, user: User) {
        match self.users.iter_mut().find(|existing| existing.id == user.id) {
            Some(slot) => *slot = user,
            None => self.users.push(user),
        }
    }

    pub fn get_user(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|user| &user.id == id)
    }

    pub fn list_users(&self) -> Vec<User> {
        self.users.clone()
    }

    /// Appends a behavior event to the user's history. Honors the user's
    /// behavior-tracking toggle: when tracking is off the call is a no-op.
    pub fn track_behavior(
        &mut self,
        id: &UserId,
        behavior: Behavior,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let user = self
            .users
            .iter_mut()
            .find(|user| &user.id == id)
            .ok_or_else(|| DomainError::UserNotFound(id.clone()))?;

        if user.preferences.ai.behavior_tracking {
            user.track(behavior, now);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    use super::{CatalogStore, ProductFilter, ProductPatch};
    use crate::domain::product::{
        PricePoint, Product, ProductId, SocialMetrics, StockStatus, StoreId,
    };
    use crate::domain::user::{
        AiSettings, Behavior, NotificationSettings, PriceRange, User, UserHistory, UserId,
        UserPreferences, UserTier,
    };
    use crate::errors::DomainError;

    fn product(id: &str, category: &str) -> Product {
        let now = Utc::now();
        let store = StoreId("tokopedia".to_owned());
        Product {
            id: ProductId(id.to_owned()),
            name: format!("Product {id}"),
            category: category.to_owned(),
            subcategory: None,
            description: String::new(),
            prices: BTreeMap::from([(store.clone(), Decimal::from(150_000))]),
            affiliate_links: BTreeMap::from([(store, "https://tokopedia.example".to_owned())]),
            rating: 4.0,
            review_count: 10,
            price_history: Vec::new(),
            social: SocialMetrics::default(),
            ai_recommendation_score: 5.0,
            stock: StockStatus::InStock,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn user(id: &str) -> User {
        let now = Utc::now();
        User {
            id: UserId(id.to_owned()),
            name: "Test".to_owned(),
            email: "test@example.com".to_owned(),
            tier: UserTier::Basic,
            preferences: UserPreferences {
                categories: Vec::new(),
                price_range: PriceRange { min: Decimal::ZERO, max: Decimal::from(1_000_000) },
                brands: Vec::new(),
                ai: AiSettings::default(),
                notifications: NotificationSettings::default(),
            },
            history: UserHistory::default(),
            created_at: now,
            last_active: now,
        }
    }

    #[test]
    fn add_rejects_duplicate_ids() {
        let mut store = CatalogStore::new();
        store.add_product(product("p-1", "electronics")).expect("first insert");
        let error = store.add_product(product("p-1", "electronics")).expect_err("duplicate");
        assert!(matches!(error, DomainError::DuplicateProduct(_)));
    }

    #[test]
    fn update_on_unknown_id_signals_not_found_without_mutation() {
        let mut store = CatalogStore::new();
        let error = store
            .update_product(&ProductId("ghost".to_owned()), &ProductPatch::default(), Utc::now())
            .expect_err("unknown id");
        assert!(matches!(error, DomainError::ProductNotFound(_)));
        assert!(store.list_products(None).is_empty());
    }

    #[test]
    fn invalid_patch_leaves_record_untouched() {
        let mut store = CatalogStore::new();
        store.add_product(product("p-1", "electronics")).expect("insert");

        // Replace prices with a store that has no affiliate link.
        let patch = ProductPatch {
            prices: Some(BTreeMap::from([(
                StoreId("shopee".to_owned()),
                Decimal::from(120_000),
            )])),
            ..ProductPatch::default()
        };
        let id = ProductId("p-1".to_owned());
        let error = store.update_product(&id, &patch, Utc::now()).expect_err("invariant");
        assert!(matches!(error, DomainError::MissingAffiliateLink { .. }));

        let unchanged = store.get_product(&id).expect("still present");
        assert!(unchanged.prices.contains_key(&StoreId("tokopedia".to_owned())));
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = CatalogStore::new();
        store.add_product(product("p-1", "electronics")).expect("insert");
        let id = ProductId("p-1".to_owned());
        store.delete_product(&id);
        store.delete_product(&id);
        assert!(store.get_product(&id).is_none());
    }

    #[test]
    fn list_preserves_insertion_order_and_applies_filters() {
        let mut store = CatalogStore::new();
        store.add_product(product("p-1", "electronics")).expect("insert");
        store.add_product(product("p-2", "furniture")).expect("insert");
        store.add_product(product("p-3", "electronics")).expect("insert");

        let all = store.list_products(None);
        let ids: Vec<_> = all.iter().map(|product| product.id.0.as_str()).collect();
        assert_eq!(ids, ["p-1", "p-2", "p-3"]);

        let filter = ProductFilter { category: Some("electronics".to_owned()), ..Default::default() };
        assert_eq!(store.list_products(Some(&filter)).len(), 2);
    }

    #[test]
    fn price_history_rejects_out_of_order_appends() {
        let mut store = CatalogStore::new();
        store.add_product(product("p-1", "electronics")).expect("insert");
        let id = ProductId("p-1".to_owned());
        let now = Utc::now();
        let store_id = StoreId("tokopedia".to_owned());

        store
            .record_price_point(
                &id,
                PricePoint { date: now, price: Decimal::from(140_000), store: store_id.clone() },
            )
            .expect("in-order append");
        let error = store
            .record_price_point(
                &id,
                PricePoint {
                    date: now - Duration::hours(1),
                    price: Decimal::from(130_000),
                    store: store_id,
                },
            )
            .expect_err("out of order");
        assert!(matches!(error, DomainError::PriceHistoryOutOfOrder(_)));
    }

    #[test]
    fn behavior_tracking_respects_user_toggle() {
        let mut store = CatalogStore::new();
        let mut tracked = user("u-1");
        tracked.preferences.ai.behavior_tracking = false;
        store.upsert_user(tracked);

        store
            .track_behavior(
                &UserId("u-1".to_owned()),
                Behavior::Viewed(ProductId("p-1".to_owned())),
                Utc::now(),
            )
            .expect("no-op when tracking disabled");
        let stored = store.get_user(&UserId("u-1".to_owned())).expect("present");
        assert!(stored.history.viewed.is_empty());
    }
}
