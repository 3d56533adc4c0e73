use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InsightId(pub String);

impl fmt::Display for InsightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    Trend,
    Opportunity,
    Optimization,
    Prediction,
}

impl InsightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trend => "trend",
            Self::Opportunity => "opportunity",
            Self::Optimization => "optimization",
            Self::Prediction => "prediction",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    Low,
    Medium,
    High,
}

/// Immutable log record summarizing a derived observation. The `data`
/// payload holds copies of whatever entities were observed, never live
/// references, so the record stays stable if the source entity changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub id: InsightId,
    #[serde(rename = "type")]
    pub insight_type: InsightType,
    pub title: String,
    pub description: String,
    /// Confidence in percent, 0..=100.
    pub confidence: u8,
    pub impact: Impact,
    pub actionable: bool,
    pub recommendations: Vec<String>,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
