use std::collections::BTreeSet;
use std::path::Path;

use affinity_core::campaigns::CampaignSpec;
use affinity_core::config::AppConfig;
use affinity_core::domain::campaign::{Campaign, CampaignId, CampaignType};
use affinity_core::domain::product::ProductId;
use affinity_core::engine::Engine;
use serde_json::json;

use crate::commands::{load_engine, save_engine, CommandResult};

pub fn parse_campaign_type(value: &str) -> Result<CampaignType, CommandResult> {
    match value.trim().to_ascii_lowercase().as_str() {
        "quantum" => Ok(CampaignType::Quantum),
        "emotional" => Ok(CampaignType::Emotional),
        "behavioral" => Ok(CampaignType::Behavioral),
        "predictive" => Ok(CampaignType::Predictive),
        other => Err(CommandResult::failure(
            "launch",
            "validation",
            format!(
                "unknown campaign type `{other}`; expected quantum, emotional, behavioral or predictive"
            ),
            2,
        )),
    }
}

pub fn launch(
    config: &AppConfig,
    store: &Path,
    name: &str,
    campaign_type: &str,
    audience: &[String],
    products: &[String],
) -> CommandResult {
    let campaign_type = match parse_campaign_type(campaign_type) {
        Ok(campaign_type) => campaign_type,
        Err(result) => return result,
    };
    let engine = match load_engine(config, store, "launch") {
        Ok(engine) => engine,
        Err(result) => return result,
    };

    let spec = CampaignSpec {
        name: name.to_owned(),
        campaign_type,
        target_audience: audience.iter().cloned().collect::<BTreeSet<_>>(),
        products: products.iter().map(|id| ProductId(id.clone())).collect::<BTreeSet<_>>(),
    };

    match engine.launch_smart_campaign(spec) {
        Ok(campaign) => persist_and_report(&engine, store, "launch", campaign),
        Err(error) => CommandResult::from_domain_error("launch", &error),
    }
}

pub fn optimize(config: &AppConfig, store: &Path, id: &str) -> CommandResult {
    lifecycle(config, store, "optimize", id, Engine::optimize_campaign)
}

pub fn pause(config: &AppConfig, store: &Path, id: &str) -> CommandResult {
    lifecycle(config, store, "pause", id, Engine::pause_campaign)
}

pub fn resume(config: &AppConfig, store: &Path, id: &str) -> CommandResult {
    lifecycle(config, store, "resume", id, Engine::resume_campaign)
}

pub fn complete(config: &AppConfig, store: &Path, id: &str) -> CommandResult {
    lifecycle(config, store, "complete", id, Engine::complete_campaign)
}

fn lifecycle(
    config: &AppConfig,
    store: &Path,
    command: &str,
    id: &str,
    apply: fn(&Engine, &CampaignId) -> Result<Campaign, affinity_core::errors::DomainError>,
) -> CommandResult {
    let engine = match load_engine(config, store, command) {
        Ok(engine) => engine,
        Err(result) => return result,
    };

    match apply(&engine, &CampaignId(id.to_owned())) {
        Ok(campaign) => persist_and_report(&engine, store, command, campaign),
        Err(error) => CommandResult::from_domain_error(command, &error),
    }
}

fn persist_and_report(
    engine: &Engine,
    store: &Path,
    command: &str,
    campaign: Campaign,
) -> CommandResult {
    if let Err(result) = save_engine(engine, store, command) {
        return result;
    }
    CommandResult::success(
        command,
        format!("campaign {} is now {:?}", campaign.id, campaign.status),
        Some(json!({
            "campaign": campaign.id.0,
            "status": format!("{:?}", campaign.status).to_lowercase(),
            "type": campaign.campaign_type.as_str(),
            "roi": campaign.performance.roi,
            "conversion_rate": campaign.performance.conversion_rate,
            "optimization_rounds": campaign.optimization_rounds,
        })),
    )
}
