use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CampaignId(pub String);

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed set of strategy profiles. Each profile carries its own metrics
/// shape, see [`StrategyMetrics`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignType {
    Quantum,
    Emotional,
    Behavioral,
    Predictive,
}

impl CampaignType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quantum => "quantum",
            Self::Emotional => "emotional",
            Self::Behavioral => "behavioral",
            Self::Predictive => "predictive",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Active,
    Paused,
    Completed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CampaignPerformance {
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub revenue: Decimal,
    pub cost: Decimal,
    pub roi: f64,
    pub ctr: f64,
    pub conversion_rate: f64,
}

impl Default for CampaignPerformance {
    fn default() -> Self {
        Self {
            impressions: 0,
            clicks: 0,
            conversions: 0,
            revenue: Decimal::ZERO,
            cost: Decimal::ZERO,
            roi: 0.0,
            ctr: 0.0,
            conversion_rate: 0.0,
        }
    }
}

/// Strategy-specific metrics bag, one variant per profile. Values are
/// read-only snapshots refreshed only by the optimize operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "profile", rename_all = "snake_case")]
pub enum StrategyMetrics {
    Quantum {
        efficiency: f64,
        coherence: f64,
        entanglement_score: f64,
        superposition_optimization: f64,
    },
    Emotional {
        resonance: f64,
        happiness_factor: f64,
        satisfaction_index: f64,
        trust_building: f64,
    },
    Behavioral {
        engagement_rate: f64,
        segment_affinity: f64,
        repeat_interaction: f64,
        pattern_strength: f64,
    },
    Predictive {
        forecast_accuracy: f64,
        predicted_lift: f64,
        trend_alignment: f64,
        model_confidence: f64,
    },
}

impl StrategyMetrics {
    pub fn profile(&self) -> CampaignType {
        match self {
            Self::Quantum { .. } => CampaignType::Quantum,
            Self::Emotional { .. } => CampaignType::Emotional,
            Self::Behavioral { .. } => CampaignType::Behavioral,
            Self::Predictive { .. } => CampaignType::Predictive,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    #[serde(rename = "type")]
    pub campaign_type: CampaignType,
    pub status: CampaignStatus,
    pub target_audience: BTreeSet<String>,
    pub products: BTreeSet<ProductId>,
    pub performance: CampaignPerformance,
    pub metrics: StrategyMetrics,
    pub optimization_rounds: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    /// Lifecycle: Draft -> Active -> {Paused <-> Active} -> Completed.
    /// Completed is terminal.
    pub fn can_transition_to(&self, next: CampaignStatus) -> bool {
        matches!(
            (self.status, next),
            (CampaignStatus::Draft, CampaignStatus::Active)
                | (CampaignStatus::Active, CampaignStatus::Paused)
                | (CampaignStatus::Paused, CampaignStatus::Active)
                | (CampaignStatus::Active, CampaignStatus::Completed)
                | (CampaignStatus::Paused, CampaignStatus::Completed)
        )
    }

    pub fn transition_to(
        &mut self,
        next: CampaignStatus,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if self.can_transition_to(next) {
            self.status = next;
            self.updated_at = now;
            return Ok(());
        }

        Err(DomainError::InvalidCampaignTransition { from: self.status, to: next })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Utc;

    use super::{
        Campaign, CampaignId, CampaignPerformance, CampaignStatus, CampaignType, StrategyMetrics,
    };
    use crate::domain::product::ProductId;
    use crate::errors::DomainError;

    fn campaign(status: CampaignStatus) -> Campaign {
        let now = Utc::now();
        Campaign {
            id: CampaignId("c-1".to_owned()),
            name: "Mid-year flash sale".to_owned(),
            campaign_type: CampaignType::Behavioral,
            status,
            target_audience: BTreeSet::from(["deal_hunters".to_owned()]),
            products: BTreeSet::from([ProductId("p-1".to_owned())]),
            performance: CampaignPerformance::default(),
            metrics: StrategyMetrics::Behavioral {
                engagement_rate: 0.4,
                segment_affinity: 0.6,
                repeat_interaction: 0.2,
                pattern_strength: 0.5,
            },
            optimization_rounds: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn full_lifecycle_path_is_legal() {
        let mut campaign = campaign(CampaignStatus::Draft);
        for next in [
            CampaignStatus::Active,
            CampaignStatus::Paused,
            CampaignStatus::Active,
            CampaignStatus::Completed,
        ] {
            campaign.transition_to(next, Utc::now()).expect("legal transition");
        }
        assert_eq!(campaign.status, CampaignStatus::Completed);
    }

    #[test]
    fn draft_cannot_complete_directly() {
        let mut campaign = campaign(CampaignStatus::Draft);
        let error = campaign
            .transition_to(CampaignStatus::Completed, Utc::now())
            .expect_err("draft -> completed should fail");
        assert!(matches!(error, DomainError::InvalidCampaignTransition { .. }));
    }

    #[test]
    fn completed_is_terminal() {
        let mut campaign = campaign(CampaignStatus::Completed);
        for next in [CampaignStatus::Draft, CampaignStatus::Active, CampaignStatus::Paused] {
            assert!(!campaign.can_transition_to(next));
            assert!(campaign.transition_to(next, Utc::now()).is_err());
        }
    }

    #[test]
    fn strategy_metrics_report_their_profile() {
        let campaign = campaign(CampaignStatus::Draft);
        assert_eq!(campaign.metrics.profile(), CampaignType::Behavioral);
    }
}
