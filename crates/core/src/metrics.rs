//! Dashboard-level aggregation.
//!
//! Pure rollups over catalog and campaign state; identical inputs always
//! produce identical output.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::campaign::{Campaign, CampaignStatus};
use crate::domain::product::{Product, ProductId};

pub const DEFAULT_TOP_PRODUCTS: usize = 5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub total_revenue: Decimal,
    pub total_products: usize,
    pub total_campaigns: usize,
    pub active_campaigns: usize,
    /// Average campaign conversion rate weighted by clicks.
    pub conversion_rate: f64,
    pub average_ai_score: f64,
    /// Top products by baseline recommendation score; equal scores keep
    /// catalog order.
    pub top_performing_products: Vec<ProductId>,
    /// Campaign revenue attributed evenly across each campaign's products,
    /// rolled up by product category.
    pub revenue_by_category: BTreeMap<String, Decimal>,
    pub generated_at: DateTime<Utc>,
}

pub fn dashboard_metrics(
    products: &[Product],
    campaigns: &[Campaign],
    top_n: usize,
    now: DateTime<Utc>,
) -> DashboardMetrics {
    let total_revenue =
        campaigns.iter().map(|campaign| campaign.performance.revenue).sum::<Decimal>();

    let total_clicks: u64 = campaigns.iter().map(|campaign| campaign.performance.clicks).sum();
    let conversion_rate = if total_clicks == 0 {
        0.0
    } else {
        campaigns
            .iter()
            .map(|campaign| {
                campaign.performance.conversion_rate * campaign.performance.clicks as f64
            })
            .sum::<f64>()
            / total_clicks as f64
    };

    let average_ai_score = if products.is_empty() {
        0.0
    } else {
        products.iter().map(|product| product.ai_recommendation_score).sum::<f64>()
            / products.len() as f64
    };

    DashboardMetrics {
        total_revenue,
        total_products: products.len(),
        total_campaigns: campaigns.len(),
        active_campaigns: campaigns
            .iter()
            .filter(|campaign| campaign.status == CampaignStatus::Active)
            .count(),
        conversion_rate,
        average_ai_score,
        top_performing_products: top_products(products, top_n),
        revenue_by_category: revenue_by_category(products, campaigns),
        generated_at: now,
    }
}

fn top_products(products: &[Product], top_n: usize) -> Vec<ProductId> {
    let mut ranked: Vec<(usize, &Product)> = products.iter().enumerate().collect();
    // Stable on the catalog index for equal scores.
    ranked.sort_by(|(_, a), (_, b)| {
        b.ai_recommendation_score
            .partial_cmp(&a.ai_recommendation_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.into_iter().take(top_n).map(|(_, product)| product.id.clone()).collect()
}

fn revenue_by_category(products: &[Product], campaigns: &[Campaign]) -> BTreeMap<String, Decimal> {
    let mut by_category: BTreeMap<String, Decimal> = BTreeMap::new();
    for campaign in campaigns {
        if campaign.products.is_empty() || campaign.performance.revenue == Decimal::ZERO {
            continue;
        }
        let share = campaign.performance.revenue / Decimal::from(campaign.products.len() as u64);
        for product_id in &campaign.products {
            // Products no longer in the catalog contribute nothing.
            let Some(product) = products.iter().find(|product| &product.id == product_id) else {
                continue;
            };
            *by_category.entry(product.category.clone()).or_insert(Decimal::ZERO) += share;
        }
    }
    by_category
}
