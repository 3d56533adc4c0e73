//! Engine facade.
//!
//! One `Engine` owns the shared state container (catalog + campaigns +
//! insight feed) behind a single mutex: every mutation runs under the lock,
//! so campaign transitions and cap arithmetic serialize, and insight appends
//! never interleave. Reads clone out of the guarded state instead of handing
//! references to callers.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::campaigns::{CampaignManager, CampaignSpec};
use crate::catalog::{CatalogStore, ProductFilter, ProductPatch};
use crate::config::EngineConfig;
use crate::deals::{BestDeal, DealAggregator};
use crate::domain::campaign::{Campaign, CampaignId, CampaignStatus, CampaignType};
use crate::domain::insight::{Insight, InsightType};
use crate::domain::product::{PricePoint, Product, ProductId};
use crate::domain::user::{Behavior, User, UserId};
use crate::errors::DomainError;
use crate::insights::InsightFeed;
use crate::metrics::{dashboard_metrics, DashboardMetrics, DEFAULT_TOP_PRODUCTS};
use crate::scoring::{RankedProduct, RecommendationEngine};
use crate::signals::SignalProvider;

/// The single shared mutable structure. Only the operations on [`Engine`]
/// mutate it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineState {
    pub catalog: CatalogStore,
    pub campaigns: Vec<Campaign>,
    pub insights: InsightFeed,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignFilter {
    pub status: Option<CampaignStatus>,
    #[serde(rename = "type")]
    pub campaign_type: Option<CampaignType>,
}

impl CampaignFilter {
    fn matches(&self, campaign: &Campaign) -> bool {
        self.status.map_or(true, |status| campaign.status == status)
            && self.campaign_type.map_or(true, |kind| campaign.campaign_type == kind)
    }
}

pub struct Engine {
    recommender: RecommendationEngine,
    deals: DealAggregator,
    manager: CampaignManager,
    state: Mutex<EngineState>,
}

impl Engine {
    pub fn new(config: EngineConfig, provider: Box<dyn SignalProvider>) -> Self {
        let state = EngineState {
            insights: InsightFeed::with_capacity(config.insights.capacity),
            ..EngineState::default()
        };
        Self::with_state(config, provider, state)
    }

    /// Builds an engine around previously loaded state (the loaded feed
    /// keeps its own capacity).
    pub fn with_state(
        config: EngineConfig,
        provider: Box<dyn SignalProvider>,
        state: EngineState,
    ) -> Self {
        Self {
            recommender: RecommendationEngine::new(config.scoring),
            deals: DealAggregator::new(config.deals),
            manager: CampaignManager::new(config.campaigns, provider),
            state: Mutex::new(state),
        }
    }

    // --- command API ---

    /// Ranks the catalog for a user. Emits one prediction insight for the
    /// top result when the scoring policy and the user's AI settings allow.
    pub fn personalized_recommendations(
        &self,
        user_id: &UserId,
        limit: Option<usize>,
    ) -> Result<Vec<RankedProduct>, DomainError> {
        let mut state = self.state();
        let user = state
            .catalog
            .get_user(user_id)
            .cloned()
            .ok_or_else(|| DomainError::UserNotFound(user_id.clone()))?;

        let limit = limit.unwrap_or(self.recommender.config().default_limit);
        let ranked =
            self.recommender.personalized_recommendations(&user, state.catalog.products(), limit);

        if self.recommender.config().emit_insight
            && user.preferences.ai.personalized_recommendations
        {
            if let Some(top) = ranked.first() {
                state.insights.generate(
                    InsightType::Prediction,
                    json!({
                        "subject": user_id.0,
                        "product": top.product.id.0,
                        // Score scale is 0-10; stored as a percentage magnitude.
                        "magnitude": top.final_score * 10.0,
                    }),
                    Utc::now(),
                );
            }
        }

        Ok(ranked)
    }

    /// Products trending above the configured threshold; records a trend
    /// insight when any are found.
    pub fn predict_trends(&self) -> Vec<Product> {
        let mut state = self.state();
        let trending = self.recommender.predict_trends(state.catalog.products());
        if !trending.is_empty() {
            let ids: Vec<&str> = trending.iter().map(|product| product.id.0.as_str()).collect();
            let peak = trending
                .iter()
                .map(|product| product.social.trending_score)
                .fold(0.0_f64, f64::max);
            state.insights.generate(
                InsightType::Trend,
                json!({ "subject": "catalog", "products": ids, "magnitude": peak }),
                Utc::now(),
            );
        }
        trending
    }

    pub fn best_deal(&self, product_id: &ProductId) -> Result<BestDeal, DomainError> {
        let state = self.state();
        let product = state
            .catalog
            .get_product(product_id)
            .ok_or_else(|| DomainError::ProductNotFound(product_id.clone()))?;
        self.deals.best_deal(product)
    }

    pub fn has_recent_price_drop(&self, product_id: &ProductId) -> Result<bool, DomainError> {
        let state = self.state();
        let product = state
            .catalog
            .get_product(product_id)
            .ok_or_else(|| DomainError::ProductNotFound(product_id.clone()))?;
        self.deals.has_recent_price_drop(product, Utc::now())
    }

    pub fn launch_smart_campaign(&self, spec: CampaignSpec) -> Result<Campaign, DomainError> {
        let mut state = self.state();
        let campaign = self.manager.launch(&state.catalog, spec, Utc::now())?;
        state.campaigns.push(campaign.clone());
        Ok(campaign)
    }

    pub fn create_draft_campaign(&self, spec: CampaignSpec) -> Result<Campaign, DomainError> {
        let mut state = self.state();
        let campaign = self.manager.create_draft(&state.catalog, spec, Utc::now())?;
        state.campaigns.push(campaign.clone());
        Ok(campaign)
    }

    /// Applies one optimization pass and records the matching insight, all
    /// under the same lock so the whole transition is atomic.
    pub fn optimize_campaign(&self, id: &CampaignId) -> Result<Campaign, DomainError> {
        let mut state = self.state();
        let index = find_campaign(&state.campaigns, id)?;
        self.manager.optimize(&mut state.campaigns[index], Utc::now())?;

        let campaign = state.campaigns[index].clone();
        state.insights.generate(
            InsightType::Optimization,
            json!({
                "subject": campaign.id.0,
                "roi": campaign.performance.roi,
                "conversion_rate": campaign.performance.conversion_rate,
                "round": campaign.optimization_rounds,
            }),
            Utc::now(),
        );
        Ok(campaign)
    }

    pub fn activate_campaign(&self, id: &CampaignId) -> Result<Campaign, DomainError> {
        self.transition(id, |manager, campaign, now| manager.activate(campaign, now))
    }

    pub fn pause_campaign(&self, id: &CampaignId) -> Result<Campaign, DomainError> {
        self.transition(id, |manager, campaign, now| manager.pause(campaign, now))
    }

    pub fn resume_campaign(&self, id: &CampaignId) -> Result<Campaign, DomainError> {
        self.transition(id, |manager, campaign, now| manager.resume(campaign, now))
    }

    pub fn complete_campaign(&self, id: &CampaignId) -> Result<Campaign, DomainError> {
        self.transition(id, |manager, campaign, now| manager.complete(campaign, now))
    }

    pub fn generate_insight(&self, insight_type: InsightType, data: Value) -> Insight {
        self.state().insights.generate(insight_type, data, Utc::now())
    }

    pub fn dashboard_metrics(&self) -> DashboardMetrics {
        let state = self.state();
        dashboard_metrics(
            state.catalog.products(),
            &state.campaigns,
            DEFAULT_TOP_PRODUCTS,
            Utc::now(),
        )
    }

    // --- catalog mutations ---

    pub fn add_product(&self, product: Product) -> Result<(), DomainError> {
        self.state().catalog.add_product(product)
    }

    pub fn update_product(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, DomainError> {
        self.state().catalog.update_product(id, patch, Utc::now())
    }

    pub fn delete_product(&self, id: &ProductId) {
        self.state().catalog.delete_product(id);
    }

    pub fn record_price_point(
        &self,
        id: &ProductId,
        point: PricePoint,
    ) -> Result<(), DomainError> {
        self.state().catalog.record_price_point(id, point)
    }

    pub fn upsert_user(&self, user: User) {
        self.state().catalog.upsert_user(user);
    }

    pub fn track_behavior(&self, id: &UserId, behavior: Behavior) -> Result<(), DomainError> {
        self.state().catalog.track_behavior(id, behavior, Utc::now())
    }

    // --- query API (snapshot semantics) ---

    pub fn list_products(&self, filter: Option<&ProductFilter>) -> Vec<Product> {
        self.state().catalog.list_products(filter)
    }

    pub fn get_product(&self, id: &ProductId) -> Option<Product> {
        self.state().catalog.get_product(id).cloned()
    }

    pub fn get_user(&self, id: &UserId) -> Option<User> {
        self.state().catalog.get_user(id).cloned()
    }

    pub fn list_users(&self) -> Vec<User> {
        self.state().catalog.list_users()
    }

    pub fn list_campaigns(&self, filter: Option<&CampaignFilter>) -> Vec<Campaign> {
        self.state()
            .campaigns
            .iter()
            .filter(|campaign| filter.map_or(true, |filter| filter.matches(campaign)))
            .cloned()
            .collect()
    }

    pub fn get_campaign(&self, id: &CampaignId) -> Option<Campaign> {
        let state = self.state();
        find_campaign(&state.campaigns, id).ok().map(|index| state.campaigns[index].clone())
    }

    pub fn list_insights(&self, limit: Option<usize>) -> Vec<Insight> {
        self.state().insights.list(limit)
    }

    /// Clone of the full state container, for persistence.
    pub fn export_state(&self) -> EngineState {
        self.state().clone()
    }

    fn transition(
        &self,
        id: &CampaignId,
        apply: impl FnOnce(
            &CampaignManager,
            &mut Campaign,
            chrono::DateTime<Utc>,
        ) -> Result<(), DomainError>,
    ) -> Result<Campaign, DomainError> {
        let mut state = self.state();
        let index = find_campaign(&state.campaigns, id)?;
        apply(&self.manager, &mut state.campaigns[index], Utc::now())?;
        Ok(state.campaigns[index].clone())
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn find_campaign(campaigns: &[Campaign], id: &CampaignId) -> Result<usize, DomainError> {
    campaigns
        .iter()
        .position(|campaign| &campaign.id == id)
        .ok_or_else(|| DomainError::CampaignNotFound(id.clone()))
}
