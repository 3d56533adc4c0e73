use std::path::Path;

use affinity_core::config::AppConfig;
use serde_json::json;

use crate::commands::{load_engine, CommandResult};

pub fn run(config: &AppConfig, store: &Path, limit: Option<usize>) -> CommandResult {
    let engine = match load_engine(config, store, "insights") {
        Ok(engine) => engine,
        Err(result) => return result,
    };

    let insights = engine.list_insights(limit);
    let rows: Vec<_> = insights
        .iter()
        .map(|insight| {
            json!({
                "id": insight.id.0,
                "type": insight.insight_type.as_str(),
                "title": insight.title,
                "confidence": insight.confidence,
                "impact": format!("{:?}", insight.impact).to_lowercase(),
                "created_at": insight.created_at,
            })
        })
        .collect();

    CommandResult::success(
        "insights",
        format!("{} insight(s) in the feed", rows.len()),
        Some(json!({ "insights": rows })),
    )
}
