use std::path::Path;

use affinity_core::config::AppConfig;
use affinity_core::domain::product::ProductId;
use serde_json::json;

use crate::commands::{load_engine, CommandResult};

pub fn best_deal(config: &AppConfig, store: &Path, product: &str) -> CommandResult {
    let engine = match load_engine(config, store, "best-deal") {
        Ok(engine) => engine,
        Err(result) => return result,
    };

    match engine.best_deal(&ProductId(product.to_owned())) {
        Ok(deal) => CommandResult::success(
            "best-deal",
            format!("best price for {product} is {} at {}", deal.price, deal.store),
            Some(json!({
                "product": product,
                "store": deal.store.0,
                "price": deal.price,
                "url": deal.url,
            })),
        ),
        Err(error) => CommandResult::from_domain_error("best-deal", &error),
    }
}

pub fn price_drop(config: &AppConfig, store: &Path, product: &str) -> CommandResult {
    let engine = match load_engine(config, store, "price-drop") {
        Ok(engine) => engine,
        Err(result) => return result,
    };

    match engine.has_recent_price_drop(&ProductId(product.to_owned())) {
        Ok(flagged) => CommandResult::success(
            "price-drop",
            if flagged {
                format!("{product} recently got cheaper")
            } else {
                format!("no recent price movement for {product}")
            },
            Some(json!({ "product": product, "recent_drop": flagged })),
        ),
        Err(error) => CommandResult::from_domain_error("price-drop", &error),
    }
}
