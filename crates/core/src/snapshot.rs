//! Versioned state persistence.
//!
//! The whole state container serializes into one named envelope:
//! `{ name, version, checksum, state }`. Loading verifies the name, routes
//! the version through an explicit migration table, and checks the content
//! checksum before any of the state is exposed. There is no silent
//! tolerance for unknown envelope fields or unknown versions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::engine::EngineState;
use crate::errors::DomainError;

pub const STORE_NAME: &str = "affinity-store";
pub const CURRENT_VERSION: u32 = 1;

type Migration = fn(Value) -> Result<Value, DomainError>;

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotEnvelope {
    name: String,
    version: u32,
    checksum: String,
    state: Value,
}

/// Serializes the state container into the versioned envelope.
pub fn serialize_state(state: &EngineState) -> Result<String, DomainError> {
    let state_value = serde_json::to_value(state)
        .map_err(|error| DomainError::MalformedSnapshot(error.to_string()))?;
    let envelope = SnapshotEnvelope {
        name: STORE_NAME.to_owned(),
        version: CURRENT_VERSION,
        checksum: checksum_of(&state_value)?,
        state: state_value,
    };
    serde_json::to_string_pretty(&envelope)
        .map_err(|error| DomainError::MalformedSnapshot(error.to_string()))
}

/// Loads a snapshot, migrating older supported versions forward. Any
/// verification failure is fatal: no partial state is ever returned.
pub fn deserialize_state(json: &str) -> Result<EngineState, DomainError> {
    let envelope: SnapshotEnvelope = serde_json::from_str(json)
        .map_err(|error| DomainError::MalformedSnapshot(error.to_string()))?;

    if envelope.name != STORE_NAME {
        return Err(DomainError::SnapshotNameMismatch {
            expected: STORE_NAME.to_owned(),
            found: envelope.name,
        });
    }
    if checksum_of(&envelope.state)? != envelope.checksum {
        return Err(DomainError::SnapshotChecksumMismatch);
    }

    let migrate = migrations().get(&envelope.version).copied().ok_or(
        DomainError::UnsupportedSchemaVersion {
            found: envelope.version,
            current: CURRENT_VERSION,
        },
    )?;
    let migrated = migrate(envelope.state)?;

    serde_json::from_value(migrated)
        .map_err(|error| DomainError::MalformedSnapshot(error.to_string()))
}

/// Migration table keyed by on-disk version. Each entry brings that
/// version's state payload to the current shape.
fn migrations() -> BTreeMap<u32, Migration> {
    BTreeMap::from([(1u32, migrate_v1 as Migration)])
}

fn migrate_v1(state: Value) -> Result<Value, DomainError> {
    Ok(state)
}

fn checksum_of(state: &Value) -> Result<String, DomainError> {
    // serde_json maps serialize with sorted keys, so this string is a
    // canonical form of the payload.
    let canonical = serde_json::to_string(state)
        .map_err(|error| DomainError::MalformedSnapshot(error.to_string()))?;
    let digest = Sha256::digest(canonical.as_bytes());
    Ok(digest.iter().map(|byte| format!("{byte:02x}")).collect())
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use chrono::Utc;
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::{deserialize_state, serialize_state, CURRENT_VERSION, STORE_NAME};
    use crate::domain::campaign::{
        Campaign, CampaignId, CampaignPerformance, CampaignStatus, CampaignType, StrategyMetrics,
    };
    use crate::domain::insight::InsightType;
    use crate::domain::product::{Product, ProductId, SocialMetrics, StockStatus, StoreId};
    use crate::engine::EngineState;
    use crate::errors::DomainError;

    fn populated_state() -> EngineState {
        let mut state = EngineState::default();
        let now = Utc::now();
        let store = StoreId("tokopedia".to_owned());
        state
            .catalog
            .add_product(Product {
                id: ProductId("p-1".to_owned()),
                name: "Air Purifier".to_owned(),
                category: "appliances".to_owned(),
                subcategory: Some("air-care".to_owned()),
                description: "HEPA air purifier".to_owned(),
                prices: BTreeMap::from([(store.clone(), Decimal::from(1_250_000))]),
                affiliate_links: BTreeMap::from([(
                    store,
                    "https://tokopedia.example/p-1".to_owned(),
                )]),
                rating: 4.4,
                review_count: 97,
                price_history: Vec::new(),
                social: SocialMetrics::default(),
                ai_recommendation_score: 6.2,
                stock: StockStatus::LowStock,
                tags: vec!["home".to_owned()],
                created_at: now,
                updated_at: now,
            })
            .expect("seed product");
        state.campaigns.push(Campaign {
            id: CampaignId("c-1".to_owned()),
            name: "Clean air week".to_owned(),
            campaign_type: CampaignType::Predictive,
            status: CampaignStatus::Active,
            target_audience: BTreeSet::from(["families".to_owned()]),
            products: BTreeSet::from([ProductId("p-1".to_owned())]),
            performance: CampaignPerformance::default(),
            metrics: StrategyMetrics::Predictive {
                forecast_accuracy: 0.7,
                predicted_lift: 0.2,
                trend_alignment: 0.5,
                model_confidence: 0.8,
            },
            optimization_rounds: 2,
            created_at: now,
            updated_at: now,
        });
        state.insights.generate(InsightType::Opportunity, json!({"score": 0.6}), now);
        state
    }

    #[test]
    fn round_trip_preserves_any_reachable_state() {
        let state = populated_state();
        let blob = serialize_state(&state).expect("serialize");
        let restored = deserialize_state(&blob).expect("deserialize");
        assert_eq!(restored, state);
    }

    #[test]
    fn unsupported_versions_are_rejected_not_truncated() {
        let state = populated_state();
        let blob = serialize_state(&state).expect("serialize");
        let mut envelope: serde_json::Value = serde_json::from_str(&blob).expect("parse");

        for bad_version in [0u32, 2, 7] {
            envelope["version"] = json!(bad_version);
            let error = deserialize_state(&envelope.to_string()).expect_err("bad version");
            assert_eq!(
                error,
                DomainError::UnsupportedSchemaVersion {
                    found: bad_version,
                    current: CURRENT_VERSION
                }
            );
        }
    }

    #[test]
    fn tampered_state_fails_the_checksum() {
        let blob = serialize_state(&populated_state()).expect("serialize");
        let mut envelope: serde_json::Value = serde_json::from_str(&blob).expect("parse");
        envelope["state"]["campaigns"] = json!([]);

        let error = deserialize_state(&envelope.to_string()).expect_err("tampered");
        assert_eq!(error, DomainError::SnapshotChecksumMismatch);
    }

    #[test]
    fn foreign_store_names_are_rejected() {
        let blob = serialize_state(&populated_state()).expect("serialize");
        let mut envelope: serde_json::Value = serde_json::from_str(&blob).expect("parse");
        envelope["name"] = json!("someone-elses-store");

        let error = deserialize_state(&envelope.to_string()).expect_err("foreign name");
        assert!(matches!(error, DomainError::SnapshotNameMismatch { .. }));
    }

    #[test]
    fn unknown_envelope_fields_are_rejected() {
        let blob = serialize_state(&populated_state()).expect("serialize");
        let mut envelope: serde_json::Value = serde_json::from_str(&blob).expect("parse");
        envelope["surprise"] = json!(true);

        let error = deserialize_state(&envelope.to_string()).expect_err("unknown field");
        assert!(matches!(error, DomainError::MalformedSnapshot(_)));
    }

    #[test]
    fn empty_state_round_trips_too() {
        let state = EngineState::default();
        let blob = serialize_state(&state).expect("serialize");
        assert!(blob.contains(STORE_NAME));
        assert_eq!(deserialize_state(&blob).expect("deserialize"), state);
    }
}
