use std::path::Path;

use affinity_core::config::AppConfig;
use serde_json::json;

use crate::commands::{load_engine, CommandResult};

pub fn run(config: &AppConfig, store: &Path) -> CommandResult {
    let engine = match load_engine(config, store, "dashboard") {
        Ok(engine) => engine,
        Err(result) => return result,
    };

    let metrics = engine.dashboard_metrics();
    let data = match serde_json::to_value(&metrics) {
        Ok(data) => data,
        Err(error) => {
            return CommandResult::failure("dashboard", "serialization", error.to_string(), 5)
        }
    };

    CommandResult::success(
        "dashboard",
        format!(
            "{} products, {} campaigns ({} active)",
            metrics.total_products, metrics.total_campaigns, metrics.active_campaigns
        ),
        Some(json!({ "metrics": data })),
    )
}
