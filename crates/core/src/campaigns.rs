//! Campaign lifecycle and optimization.
//!
//! All operations validate first and commit last, so a failed call leaves
//! the campaign untouched. Strategy metric bags are refreshed only here,
//! always through the signal provider seam.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::CatalogStore;
use crate::domain::campaign::{
    Campaign, CampaignId, CampaignPerformance, CampaignStatus, CampaignType, StrategyMetrics,
};
use crate::domain::product::ProductId;
use crate::errors::DomainError;
use crate::signals::{SignalContext, SignalProvider};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignConfig {
    pub roi_step: f64,
    pub roi_cap: f64,
    pub conversion_step: f64,
    pub conversion_cap: f64,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self { roi_step: 10.0, roi_cap: 500.0, conversion_step: 1.0, conversion_cap: 100.0 }
    }
}

/// Launch request. Ids are assigned by the manager.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CampaignSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub campaign_type: CampaignType,
    pub target_audience: BTreeSet<String>,
    pub products: BTreeSet<ProductId>,
}

pub struct CampaignManager {
    config: CampaignConfig,
    provider: Box<dyn SignalProvider>,
}

impl CampaignManager {
    pub fn new(config: CampaignConfig, provider: Box<dyn SignalProvider>) -> Self {
        Self { config, provider }
    }

    pub fn config(&self) -> &CampaignConfig {
        &self.config
    }

    /// Validates the spec and creates an active campaign with zeroed
    /// performance and a freshly sampled strategy metrics bag.
    pub fn launch(
        &self,
        catalog: &CatalogStore,
        spec: CampaignSpec,
        now: DateTime<Utc>,
    ) -> Result<Campaign, DomainError> {
        self.build(catalog, spec, CampaignStatus::Active, now)
    }

    /// Same validation as `launch`, but the campaign enters the lifecycle at
    /// `Draft` and must be activated explicitly.
    pub fn create_draft(
        &self,
        catalog: &CatalogStore,
        spec: CampaignSpec,
        now: DateTime<Utc>,
    ) -> Result<Campaign, DomainError> {
        self.build(catalog, spec, CampaignStatus::Draft, now)
    }

    pub fn activate(
        &self,
        campaign: &mut Campaign,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        campaign.transition_to(CampaignStatus::Active, now)
    }

    pub fn pause(&self, campaign: &mut Campaign, now: DateTime<Utc>) -> Result<(), DomainError> {
        campaign.transition_to(CampaignStatus::Paused, now)
    }

    pub fn resume(&self, campaign: &mut Campaign, now: DateTime<Utc>) -> Result<(), DomainError> {
        campaign.transition_to(CampaignStatus::Active, now)
    }

    pub fn complete(
        &self,
        campaign: &mut Campaign,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        campaign.transition_to(CampaignStatus::Completed, now)
    }

    /// One optimization pass: ROI climbs by the configured step up to the
    /// cap, conversion rate likewise, and the strategy metrics are resampled
    /// for the new round. Legal only from `Active` or `Paused`.
    pub fn optimize(
        &self,
        campaign: &mut Campaign,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        match campaign.status {
            CampaignStatus::Active | CampaignStatus::Paused => {}
            status => return Err(DomainError::CampaignNotOptimizable { status }),
        }

        let round = campaign.optimization_rounds.saturating_add(1);
        let performance = CampaignPerformance {
            roi: (campaign.performance.roi + self.config.roi_step).min(self.config.roi_cap),
            conversion_rate: (campaign.performance.conversion_rate + self.config.conversion_step)
                .min(self.config.conversion_cap),
            ..campaign.performance.clone()
        };
        let metrics = self.strategy_metrics(campaign.campaign_type, &campaign.id, round);

        campaign.performance = performance;
        campaign.metrics = metrics;
        campaign.optimization_rounds = round;
        campaign.updated_at = now;
        Ok(())
    }

    fn build(
        &self,
        catalog: &CatalogStore,
        spec: CampaignSpec,
        status: CampaignStatus,
        now: DateTime<Utc>,
    ) -> Result<Campaign, DomainError> {
        if spec.target_audience.is_empty() {
            return Err(DomainError::EmptyTargetAudience);
        }
        if spec.products.is_empty() {
            return Err(DomainError::EmptyProductList);
        }
        for product_id in &spec.products {
            if !catalog.contains_product(product_id) {
                return Err(DomainError::ProductNotFound(product_id.clone()));
            }
        }

        let id = CampaignId(Uuid::new_v4().to_string());
        let metrics = self.strategy_metrics(spec.campaign_type, &id, 0);
        Ok(Campaign {
            id,
            name: spec.name,
            campaign_type: spec.campaign_type,
            status,
            target_audience: spec.target_audience,
            products: spec.products,
            performance: CampaignPerformance::default(),
            metrics,
            optimization_rounds: 0,
            created_at: now,
            updated_at: now,
        })
    }

    fn strategy_metrics(
        &self,
        campaign_type: CampaignType,
        id: &CampaignId,
        round: u32,
    ) -> StrategyMetrics {
        let context = SignalContext::for_subject(id.0.clone()).at_round(round);
        let signal = |metric: &str| {
            self.provider.score(&format!("{}.{metric}", campaign_type.as_str()), &context)
        };

        match campaign_type {
            CampaignType::Quantum => StrategyMetrics::Quantum {
                efficiency: signal("efficiency"),
                coherence: signal("coherence"),
                entanglement_score: signal("entanglement_score"),
                superposition_optimization: signal("superposition_optimization"),
            },
            CampaignType::Emotional => StrategyMetrics::Emotional {
                resonance: signal("resonance"),
                happiness_factor: signal("happiness_factor"),
                satisfaction_index: signal("satisfaction_index"),
                trust_building: signal("trust_building"),
            },
            CampaignType::Behavioral => StrategyMetrics::Behavioral {
                engagement_rate: signal("engagement_rate"),
                segment_affinity: signal("segment_affinity"),
                repeat_interaction: signal("repeat_interaction"),
                pattern_strength: signal("pattern_strength"),
            },
            CampaignType::Predictive => StrategyMetrics::Predictive {
                forecast_accuracy: signal("forecast_accuracy"),
                predicted_lift: signal("predicted_lift"),
                trend_alignment: signal("trend_alignment"),
                model_confidence: signal("model_confidence"),
            },
        }
    }
}
