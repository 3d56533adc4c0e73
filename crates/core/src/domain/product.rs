use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoreId(pub String);

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

/// One observed price for a product at a storefront. History entries are
/// append-only and must stay time-ordered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: DateTime<Utc>,
    pub price: Decimal,
    pub store: StoreId,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialMetrics {
    pub shares: u64,
    pub likes: u64,
    pub comments: u64,
    pub trending_score: f64,
}

/// Canonical catalog record. Every store listed in `prices` must also carry
/// an affiliate link; `price_history` only grows and stays time-ordered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub description: String,
    pub prices: BTreeMap<StoreId, Decimal>,
    pub affiliate_links: BTreeMap<StoreId, String>,
    pub rating: f64,
    pub review_count: u64,
    pub price_history: Vec<PricePoint>,
    pub social: SocialMetrics,
    pub ai_recommendation_score: f64,
    pub stock: StockStatus,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Lowest listed price across all tracked storefronts, if any.
    pub fn min_price(&self) -> Option<Decimal> {
        self.prices.values().min().copied()
    }

    pub fn is_trending(&self, threshold: f64) -> bool {
        self.social.trending_score > threshold
    }

    /// Checks the prices/affiliate-links pairing invariant.
    pub fn validate(&self) -> Result<(), DomainError> {
        for store in self.prices.keys() {
            if !self.affiliate_links.contains_key(store) {
                return Err(DomainError::MissingAffiliateLink {
                    product: self.id.clone(),
                    store: store.clone(),
                });
            }
        }
        Ok(())
    }

    /// Display-only reduced projection of the canonical record.
    pub fn card(&self, trending_threshold: f64) -> ProductCard {
        ProductCard {
            id: self.id.clone(),
            name: self.name.clone(),
            category: self.category.clone(),
            best_price: self.min_price(),
            rating: self.rating,
            trending: self.is_trending(trending_threshold),
        }
    }
}

/// Legacy display shape kept as a derived view. Nothing in the engine is
/// constructed from this; the rich `Product` record is canonical.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductCard {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub best_price: Option<Decimal>,
    pub rating: f64,
    pub trending: bool,
}
