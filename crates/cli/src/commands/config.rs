use affinity_core::config::AppConfig;
use serde_json::json;

use crate::commands::CommandResult;

/// Prints the effective configuration after file and environment overlays.
pub fn run(config: &AppConfig) -> CommandResult {
    match serde_json::to_value(config) {
        Ok(data) => CommandResult::success(
            "config",
            "effective configuration",
            Some(json!({ "config": data })),
        ),
        Err(error) => CommandResult::failure("config", "serialization", error.to_string(), 5),
    }
}
