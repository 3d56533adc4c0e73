//! Cross-storefront deal aggregation.
//!
//! Best-deal selection and the recent-price-drop heuristic are pure; `now`
//! is always a parameter so results are reproducible in tests.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, StoreId};
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DealConfig {
    /// Tie-break order for equal minimum prices. Stores not listed here rank
    /// after listed ones, ordered by store id.
    pub store_priority: Vec<StoreId>,
    pub price_drop_window_hours: i64,
    /// A history price below `best_price * margin_factor` inside the window
    /// counts as a recent drop.
    pub price_drop_margin_factor: Decimal,
}

impl Default for DealConfig {
    fn default() -> Self {
        Self {
            store_priority: ["tokopedia", "shopee", "lazada", "blibli"]
                .into_iter()
                .map(|store| StoreId(store.to_owned()))
                .collect(),
            price_drop_window_hours: 24,
            price_drop_margin_factor: Decimal::new(11, 1),
        }
    }
}

/// The cheapest verified purchase path for a product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BestDeal {
    pub store: StoreId,
    pub price: Decimal,
    pub url: String,
}

#[derive(Clone, Debug, Default)]
pub struct DealAggregator {
    config: DealConfig,
}

impl DealAggregator {
    pub fn new(config: DealConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DealConfig {
        &self.config
    }

    /// Minimum-price entry of `product.prices`, ties resolved by the
    /// configured store priority. Deterministic across repeated calls.
    pub fn best_deal(&self, product: &Product) -> Result<BestDeal, DomainError> {
        let mut best: Option<(&StoreId, Decimal, usize)> = None;
        for (store, price) in &product.prices {
            let rank = self.priority_rank(store);
            let better = match &best {
                None => true,
                Some((_, best_price, best_rank)) => {
                    *price < *best_price || (*price == *best_price && rank < *best_rank)
                }
            };
            if better {
                best = Some((store, *price, rank));
            }
        }

        let (store, price, _) =
            best.ok_or_else(|| DomainError::NoPricingData(product.id.clone()))?;
        let url = product
            .affiliate_links
            .get(store)
            .cloned()
            .ok_or_else(|| DomainError::MissingAffiliateLink {
                product: product.id.clone(),
                store: store.clone(),
            })?;

        Ok(BestDeal { store: store.clone(), price, url })
    }

    /// Recently-got-cheaper heuristic: true when any history entry inside
    /// the window has `price < best_price * margin_factor`. Note the margin:
    /// a price that is not actually below the current best can still flag a
    /// drop. That looseness is intentional and load-bearing for callers.
    pub fn has_recent_price_drop(
        &self,
        product: &Product,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        if product.price_history.is_empty() {
            return Ok(false);
        }

        let best = self.best_deal(product)?;
        let cutoff = now - Duration::hours(self.config.price_drop_window_hours);
        let ceiling = best.price * self.config.price_drop_margin_factor;

        Ok(product
            .price_history
            .iter()
            .any(|point| point.date >= cutoff && point.date <= now && point.price < ceiling))
    }

    fn priority_rank(&self, store: &StoreId) -> usize {
        self.config
            .store_priority
            .iter()
            .position(|candidate| candidate == store)
            .unwrap_or(self.config.store_priority.len())
    }
}
