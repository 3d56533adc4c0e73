use std::path::PathBuf;

use affinity_cli::commands::{campaign, dashboard, deals, insights, recommend, seed};
use affinity_core::config::AppConfig;
use serde_json::Value;
use tempfile::TempDir;

fn store_in(dir: &TempDir) -> PathBuf {
    dir.path().join("affinity-store.json")
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

#[test]
fn seed_writes_a_loadable_store() {
    let dir = TempDir::new().expect("temp dir");
    let store = store_in(&dir);
    let config = AppConfig::default();

    let result = seed::run(&config, &store);
    assert_eq!(result.exit_code, 0, "expected successful seed");

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "seed");
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["data"]["user"], "user-demo");
    assert!(store.exists());
}

#[test]
fn seed_reseeds_the_same_catalog() {
    let dir = TempDir::new().expect("temp dir");
    let store = store_in(&dir);
    let config = AppConfig::default();

    let first = parse_payload(&seed::run(&config, &store).output);
    let second = parse_payload(&seed::run(&config, &store).output);
    assert_eq!(first["data"]["products"], second["data"]["products"]);
}

#[test]
fn recommend_returns_ranked_products_for_the_demo_user() {
    let dir = TempDir::new().expect("temp dir");
    let store = store_in(&dir);
    let config = AppConfig::default();
    seed::run(&config, &store);

    let result = recommend::run(&config, &store, "user-demo", Some(3));
    assert_eq!(result.exit_code, 0, "expected recommendations");

    let payload = parse_payload(&result.output);
    let rows = payload["data"]["recommendations"].as_array().expect("rows");
    assert_eq!(rows.len(), 3);
    // Demo user prefers electronics within budget; the trending earbuds win.
    assert_eq!(rows[0]["product"], "prod-earbuds-anc");

    let scores: Vec<f64> =
        rows.iter().map(|row| row["final_score"].as_f64().expect("score")).collect();
    assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));
}

#[test]
fn recommend_records_a_prediction_insight_in_the_store() {
    let dir = TempDir::new().expect("temp dir");
    let store = store_in(&dir);
    let config = AppConfig::default();
    seed::run(&config, &store);
    recommend::run(&config, &store, "user-demo", Some(1));

    let payload = parse_payload(&insights::run(&config, &store, None).output);
    let feed = payload["data"]["insights"].as_array().expect("feed");
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["type"], "prediction");
}

#[test]
fn recommend_unknown_user_maps_to_not_found() {
    let dir = TempDir::new().expect("temp dir");
    let store = store_in(&dir);
    let config = AppConfig::default();
    seed::run(&config, &store);

    let result = recommend::run(&config, &store, "nobody", None);
    assert_eq!(result.exit_code, 3);
    let payload = parse_payload(&result.output);
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["error_kind"], "not_found");
}

#[test]
fn best_deal_reports_the_cheapest_storefront() {
    let dir = TempDir::new().expect("temp dir");
    let store = store_in(&dir);
    let config = AppConfig::default();
    seed::run(&config, &store);

    let result = deals::best_deal(&config, &store, "prod-earbuds-anc");
    assert_eq!(result.exit_code, 0);
    let payload = parse_payload(&result.output);
    assert_eq!(payload["data"]["store"], "shopee");
    assert!(payload["data"]["url"].as_str().expect("url").contains("shopee"));
}

#[test]
fn price_drop_flags_the_seeded_history() {
    let dir = TempDir::new().expect("temp dir");
    let store = store_in(&dir);
    let config = AppConfig::default();
    seed::run(&config, &store);

    let payload = parse_payload(&deals::price_drop(&config, &store, "prod-earbuds-anc").output);
    assert_eq!(payload["data"]["recent_drop"], true);
}

#[test]
fn campaign_lifecycle_flows_through_the_store_file() {
    let dir = TempDir::new().expect("temp dir");
    let store = store_in(&dir);
    let config = AppConfig::default();
    seed::run(&config, &store);

    let launch = parse_payload(
        &campaign::launch(
            &config,
            &store,
            "Weekend flash",
            "behavioral",
            &["deal_hunters".to_owned()],
            &["prod-earbuds-anc".to_owned(), "prod-air-fryer".to_owned()],
        )
        .output,
    );
    assert_eq!(launch["status"], "ok");
    assert_eq!(launch["data"]["status"], "active");
    let id = launch["data"]["campaign"].as_str().expect("campaign id").to_owned();

    let optimized = parse_payload(&campaign::optimize(&config, &store, &id).output);
    assert_eq!(optimized["data"]["roi"], 10.0);
    assert_eq!(optimized["data"]["optimization_rounds"], 1);

    let paused = parse_payload(&campaign::pause(&config, &store, &id).output);
    assert_eq!(paused["data"]["status"], "paused");
    let resumed = parse_payload(&campaign::resume(&config, &store, &id).output);
    assert_eq!(resumed["data"]["status"], "active");
    let completed = parse_payload(&campaign::complete(&config, &store, &id).output);
    assert_eq!(completed["data"]["status"], "completed");

    // Terminal: optimizing a completed campaign is a state error.
    let result = campaign::optimize(&config, &store, &id);
    assert_eq!(result.exit_code, 4);
    let payload = parse_payload(&result.output);
    assert_eq!(payload["error_kind"], "state");
}

#[test]
fn launch_with_unknown_product_fails_closed() {
    let dir = TempDir::new().expect("temp dir");
    let store = store_in(&dir);
    let config = AppConfig::default();
    seed::run(&config, &store);

    let result = campaign::launch(
        &config,
        &store,
        "Ghost push",
        "quantum",
        &["everyone".to_owned()],
        &["no-such-product".to_owned()],
    );
    assert_eq!(result.exit_code, 3);

    // Nothing was persisted.
    let payload = parse_payload(&dashboard::run(&config, &store).output);
    assert_eq!(payload["data"]["metrics"]["total_campaigns"], 0);
}

#[test]
fn launch_rejects_unknown_campaign_types() {
    let dir = TempDir::new().expect("temp dir");
    let store = store_in(&dir);
    let config = AppConfig::default();
    seed::run(&config, &store);

    let result = campaign::launch(
        &config,
        &store,
        "Bad type",
        "psychic",
        &["everyone".to_owned()],
        &["prod-earbuds-anc".to_owned()],
    );
    assert_eq!(result.exit_code, 2);
    assert_eq!(parse_payload(&result.output)["error_kind"], "validation");
}

#[test]
fn dashboard_aggregates_the_seeded_catalog() {
    let dir = TempDir::new().expect("temp dir");
    let store = store_in(&dir);
    let config = AppConfig::default();
    seed::run(&config, &store);

    let payload = parse_payload(&dashboard::run(&config, &store).output);
    let metrics = &payload["data"]["metrics"];
    assert_eq!(metrics["total_products"], 5);
    assert_eq!(metrics["total_campaigns"], 0);
    // Top products lead with the highest baseline score.
    assert_eq!(metrics["top_performing_products"][0], "prod-earbuds-anc");
}

#[test]
fn commands_fail_cleanly_without_a_store_file() {
    let dir = TempDir::new().expect("temp dir");
    let store = store_in(&dir);
    let config = AppConfig::default();

    let result = dashboard::run(&config, &store);
    assert_eq!(result.exit_code, 5);
    let payload = parse_payload(&result.output);
    assert_eq!(payload["error_kind"], "store_missing");
}
