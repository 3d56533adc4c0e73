//! Append-only insight feed.
//!
//! The feed is a bounded ring: append keeps arrival order and drops the
//! oldest records beyond capacity. Records are immutable once appended.
//! Confidence and impact derive deterministically from the data payload.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::insight::{Impact, Insight, InsightId, InsightType};

/// Payload fields probed, in order, for a numeric magnitude.
const MAGNITUDE_KEYS: [&str; 4] = ["magnitude", "score", "delta", "roi"];

const DEFAULT_CONFIDENCE: u8 = 50;
const HIGH_IMPACT_FLOOR: u8 = 75;
const MEDIUM_IMPACT_FLOOR: u8 = 40;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Ring capacity; the oldest records are dropped beyond it.
    pub capacity: usize,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self { capacity: 50 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InsightFeed {
    capacity: usize,
    entries: VecDeque<Insight>,
}

impl Default for InsightFeed {
    fn default() -> Self {
        Self::with_capacity(InsightConfig::default().capacity)
    }
}

impl InsightFeed {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), entries: VecDeque::new() }
    }

    /// Builds an insight from `data` and appends it. The payload is stored
    /// by value; callers pass copies of whatever they observed.
    pub fn generate(
        &mut self,
        insight_type: InsightType,
        data: Value,
        now: DateTime<Utc>,
    ) -> Insight {
        let confidence = derive_confidence(&data);
        let insight = Insight {
            id: InsightId(Uuid::new_v4().to_string()),
            insight_type,
            title: title_for(insight_type),
            description: description_for(insight_type, &data),
            confidence,
            impact: impact_for(confidence),
            actionable: true,
            recommendations: recommendations_for(insight_type),
            data,
            created_at: now,
        };
        self.append(insight.clone());
        insight
    }

    pub fn append(&mut self, insight: Insight) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(insight);
    }

    /// Newest first. `None` returns the whole window.
    pub fn list(&self, limit: Option<usize>) -> Vec<Insight> {
        let take = limit.unwrap_or(self.entries.len());
        self.entries.iter().rev().take(take).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Magnitude-driven confidence: values in `[0, 1]` read as fractions, larger
/// values clamp into `[0, 100]`. Payloads with no magnitude get the
/// documented default of 50.
fn derive_confidence(data: &Value) -> u8 {
    let Some(magnitude) = MAGNITUDE_KEYS
        .iter()
        .find_map(|key| data.get(key).and_then(Value::as_f64))
    else {
        return DEFAULT_CONFIDENCE;
    };

    let magnitude = magnitude.abs();
    let percent = if magnitude <= 1.0 { magnitude * 100.0 } else { magnitude };
    percent.clamp(0.0, 100.0).round() as u8
}

fn impact_for(confidence: u8) -> Impact {
    if confidence >= HIGH_IMPACT_FLOOR {
        Impact::High
    } else if confidence >= MEDIUM_IMPACT_FLOOR {
        Impact::Medium
    } else {
        Impact::Low
    }
}

fn title_for(insight_type: InsightType) -> String {
    match insight_type {
        InsightType::Trend => "Trend signal".to_owned(),
        InsightType::Opportunity => "Opportunity detected".to_owned(),
        InsightType::Optimization => "Optimization applied".to_owned(),
        InsightType::Prediction => "Prediction generated".to_owned(),
    }
}

fn description_for(insight_type: InsightType, data: &Value) -> String {
    let subject = data
        .get("subject")
        .and_then(Value::as_str)
        .unwrap_or("catalog activity");
    format!("Derived {} insight from {subject}", insight_type.as_str())
}

fn recommendations_for(insight_type: InsightType) -> Vec<String> {
    let lines: &[&str] = match insight_type {
        InsightType::Trend => &[
            "Feature trending products on the landing page",
            "Refresh affiliate placements for rising categories",
        ],
        InsightType::Opportunity => &[
            "Compare storefront commissions for the flagged products",
            "Schedule a price-drop notification",
        ],
        InsightType::Optimization => &[
            "Review campaign spend distribution",
            "Keep the optimization cadence until ROI plateaus",
        ],
        InsightType::Prediction => &[
            "Pre-position inventory messaging for predicted demand",
            "Tighten targeting to the highest-scoring segment",
        ],
    };
    lines.iter().map(|line| (*line).to_owned()).collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::InsightFeed;
    use crate::domain::insight::{Impact, InsightType};

    #[test]
    fn payload_without_magnitude_uses_documented_defaults() {
        let mut feed = InsightFeed::default();
        let insight = feed.generate(InsightType::Trend, json!({"subject": "p-1"}), Utc::now());
        assert_eq!(insight.confidence, 50);
        assert_eq!(insight.impact, Impact::Medium);
    }

    #[test]
    fn fractional_magnitude_reads_as_percentage() {
        let mut feed = InsightFeed::default();
        let insight =
            feed.generate(InsightType::Prediction, json!({"score": 0.87}), Utc::now());
        assert_eq!(insight.confidence, 87);
        assert_eq!(insight.impact, Impact::High);
    }

    #[test]
    fn large_magnitudes_clamp_to_one_hundred() {
        let mut feed = InsightFeed::default();
        let insight = feed.generate(InsightType::Optimization, json!({"roi": 480.0}), Utc::now());
        assert_eq!(insight.confidence, 100);
        assert_eq!(insight.impact, Impact::High);
    }

    #[test]
    fn low_magnitude_maps_to_low_impact() {
        let mut feed = InsightFeed::default();
        let insight = feed.generate(InsightType::Trend, json!({"delta": 0.2}), Utc::now());
        assert_eq!(insight.confidence, 20);
        assert_eq!(insight.impact, Impact::Low);
    }

    #[test]
    fn ring_drops_oldest_beyond_capacity() {
        let mut feed = InsightFeed::with_capacity(3);
        for index in 0..5 {
            feed.generate(InsightType::Trend, json!({"index": index}), Utc::now());
        }
        assert_eq!(feed.len(), 3);
        let listed = feed.list(None);
        // Newest first; indices 4, 3, 2 survive.
        let indices: Vec<_> =
            listed.iter().map(|insight| insight.data["index"].as_i64().unwrap()).collect();
        assert_eq!(indices, [4, 3, 2]);
    }

    #[test]
    fn list_limit_truncates_from_the_newest_end() {
        let mut feed = InsightFeed::default();
        for index in 0..4 {
            feed.generate(InsightType::Opportunity, json!({"index": index}), Utc::now());
        }
        let recent = feed.list(Some(2));
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].data["index"], 3);
        assert_eq!(recent[1].data["index"], 2);
    }

    #[test]
    fn appended_records_are_stable_copies() {
        let mut feed = InsightFeed::default();
        let mut payload = json!({"subject": "campaign-1", "roi": 120.0});
        let insight = feed.generate(InsightType::Optimization, payload.clone(), Utc::now());
        // Mutating the caller's payload does not touch the stored record.
        payload["roi"] = serde_json::json!(999.0);
        assert_eq!(feed.list(Some(1))[0], insight);
        assert_eq!(insight.data["roi"], 120.0);
    }
}
