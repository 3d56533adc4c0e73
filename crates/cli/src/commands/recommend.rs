use std::path::Path;

use affinity_core::config::AppConfig;
use affinity_core::domain::user::UserId;
use serde_json::json;

use crate::commands::{load_engine, save_engine, CommandResult};

pub fn run(config: &AppConfig, store: &Path, user: &str, limit: Option<usize>) -> CommandResult {
    let engine = match load_engine(config, store, "recommend") {
        Ok(engine) => engine,
        Err(result) => return result,
    };

    let ranked = match engine.personalized_recommendations(&UserId(user.to_owned()), limit) {
        Ok(ranked) => ranked,
        Err(error) => return CommandResult::from_domain_error("recommend", &error),
    };

    // Ranking appends a prediction insight, so the store is written back.
    if let Err(result) = save_engine(&engine, store, "recommend") {
        return result;
    }

    let rows: Vec<_> = ranked
        .iter()
        .map(|entry| {
            json!({
                "product": entry.product.id.0,
                "name": entry.product.name,
                "category": entry.product.category,
                "final_score": entry.final_score,
                "best_price": entry.product.min_price(),
            })
        })
        .collect();

    CommandResult::success(
        "recommend",
        format!("{} recommendation(s) for {user}", rows.len()),
        Some(json!({ "user": user, "recommendations": rows })),
    )
}
