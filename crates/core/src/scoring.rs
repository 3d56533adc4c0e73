//! Personalized ranking.
//!
//! Scores are `base + additive boosts`; the sort is stable so equal scores
//! keep catalog order. The engine reads catalog state and never mutates it.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::domain::product::Product;
use crate::domain::user::User;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub category_boost: f64,
    pub price_range_boost: f64,
    pub trending_boost: f64,
    pub viewed_boost: f64,
    /// A product is trending when `trending_score` exceeds this.
    pub trending_threshold: f64,
    pub default_limit: usize,
    /// Emit a prediction insight for the top result of each ranking run.
    pub emit_insight: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            category_boost: 1.5,
            price_range_boost: 1.0,
            trending_boost: 0.5,
            viewed_boost: 0.3,
            trending_threshold: 0.7,
            default_limit: 6,
            emit_insight: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedProduct {
    pub product: Product,
    pub final_score: f64,
}

#[derive(Clone, Debug, Default)]
pub struct RecommendationEngine {
    config: ScoringConfig,
}

impl RecommendationEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Ranks `products` for `user` and truncates to `limit`. A zero limit or
    /// an empty catalog yields an empty list. Pure: no catalog mutation, no
    /// side effects on error paths.
    pub fn personalized_recommendations(
        &self,
        user: &User,
        products: &[Product],
        limit: usize,
    ) -> Vec<RankedProduct> {
        if limit == 0 || products.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<RankedProduct> = products
            .iter()
            .map(|product| RankedProduct {
                final_score: self.score(user, product),
                product: product.clone(),
            })
            .collect();

        // Stable sort: equal scores keep catalog order.
        ranked.sort_by(|a, b| {
            b.final_score.partial_cmp(&a.final_score).unwrap_or(Ordering::Equal)
        });
        ranked.truncate(limit);
        ranked
    }

    /// Products currently trending above the configured threshold, in
    /// catalog order.
    pub fn predict_trends(&self, products: &[Product]) -> Vec<Product> {
        products
            .iter()
            .filter(|product| product.is_trending(self.config.trending_threshold))
            .cloned()
            .collect()
    }

    fn score(&self, user: &User, product: &Product) -> f64 {
        let mut score = product.ai_recommendation_score;

        if user.preferences.categories.iter().any(|category| category == &product.category) {
            score += self.config.category_boost;
        }

        // Price boost applies to the cheapest listed price; a product with
        // no pricing data simply earns no boost.
        if let Some(min_price) = product.min_price() {
            if user.preferences.price_range.contains(min_price) {
                score += self.config.price_range_boost;
            }
        }

        if product.is_trending(self.config.trending_threshold) {
            score += self.config.trending_boost;
        }

        if user.has_viewed(&product.id) {
            score += self.config.viewed_boost;
        }

        score
    }
}
