//! Deterministic demo fixtures.
//!
//! Seeds a small Indonesian-marketplace catalog and one demo user, then
//! writes the snapshot file. Running it again rebuilds the same dataset.

use std::collections::BTreeMap;
use std::path::Path;

use affinity_core::config::AppConfig;
use affinity_core::domain::product::{
    PricePoint, Product, ProductId, SocialMetrics, StockStatus, StoreId,
};
use affinity_core::domain::user::{
    AiSettings, NotificationSettings, PriceRange, User, UserHistory, UserId, UserPreferences,
    UserTier,
};
use affinity_core::engine::Engine;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde_json::json;

use crate::commands::{save_engine, CommandResult};

pub const DEMO_USER_ID: &str = "user-demo";

struct ProductSeed {
    id: &'static str,
    name: &'static str,
    category: &'static str,
    subcategory: &'static str,
    rating: f64,
    review_count: u64,
    trending_score: f64,
    ai_score: f64,
    stock: StockStatus,
    prices: &'static [(&'static str, i64)],
}

const PRODUCT_SEEDS: &[ProductSeed] = &[
    ProductSeed {
        id: "prod-earbuds-anc",
        name: "Nimbus ANC Earbuds",
        category: "electronics",
        subcategory: "audio",
        rating: 4.7,
        review_count: 1843,
        trending_score: 0.91,
        ai_score: 8.2,
        stock: StockStatus::InStock,
        prices: &[("tokopedia", 1_299_000), ("shopee", 1_249_000), ("lazada", 1_310_000)],
    },
    ProductSeed {
        id: "prod-mech-keyboard",
        name: "Klack 87 Mechanical Keyboard",
        category: "electronics",
        subcategory: "peripherals",
        rating: 4.5,
        review_count: 655,
        trending_score: 0.64,
        ai_score: 7.1,
        stock: StockStatus::InStock,
        prices: &[("tokopedia", 890_000), ("shopee", 890_000), ("blibli", 925_000)],
    },
    ProductSeed {
        id: "prod-air-fryer",
        name: "CrispPro Air Fryer 5L",
        category: "appliances",
        subcategory: "kitchen",
        rating: 4.8,
        review_count: 3210,
        trending_score: 0.83,
        ai_score: 7.9,
        stock: StockStatus::LowStock,
        prices: &[("shopee", 749_000), ("lazada", 735_000), ("blibli", 760_000)],
    },
    ProductSeed {
        id: "prod-standing-desk",
        name: "Elevar Standing Desk",
        category: "furniture",
        subcategory: "office",
        rating: 4.3,
        review_count: 287,
        trending_score: 0.38,
        ai_score: 6.0,
        stock: StockStatus::InStock,
        prices: &[("tokopedia", 3_450_000), ("blibli", 3_390_000)],
    },
    ProductSeed {
        id: "prod-robot-vacuum",
        name: "Orbit S Robot Vacuum",
        category: "appliances",
        subcategory: "cleaning",
        rating: 4.4,
        review_count: 941,
        trending_score: 0.77,
        ai_score: 7.4,
        stock: StockStatus::OutOfStock,
        prices: &[("tokopedia", 2_899_000), ("shopee", 2_950_000), ("lazada", 2_875_000)],
    },
];

// 2026-01-01T00:00:00Z; fixture records carry a fixed creation date so
// repeated seeds produce the same catalog.
fn seed_timestamp() -> DateTime<Utc> {
    DateTime::from_timestamp(1_767_225_600, 0).unwrap_or_else(Utc::now)
}

fn build_product(seed: &ProductSeed, now: DateTime<Utc>) -> Product {
    let created_at = seed_timestamp();
    let prices: BTreeMap<StoreId, Decimal> = seed
        .prices
        .iter()
        .map(|(store, amount)| (StoreId((*store).to_owned()), Decimal::from(*amount)))
        .collect();
    let affiliate_links = seed
        .prices
        .iter()
        .map(|(store, _)| {
            (StoreId((*store).to_owned()), format!("https://{store}.example/aff/{}", seed.id))
        })
        .collect();

    // One fresh history entry per product keeps the price-drop demo alive:
    // slightly below the current cheapest listing, two hours old.
    let cheapest = prices.values().min().copied().unwrap_or(Decimal::ZERO);
    let history_store =
        seed.prices.first().map(|(store, _)| StoreId((*store).to_owned()));
    let price_history = history_store
        .map(|store| {
            vec![PricePoint {
                date: now - Duration::hours(2),
                price: cheapest - Decimal::from(15_000),
                store,
            }]
        })
        .unwrap_or_default();

    Product {
        id: ProductId(seed.id.to_owned()),
        name: seed.name.to_owned(),
        category: seed.category.to_owned(),
        subcategory: Some(seed.subcategory.to_owned()),
        description: format!("{} ({}/{})", seed.name, seed.category, seed.subcategory),
        prices,
        affiliate_links,
        rating: seed.rating,
        review_count: seed.review_count,
        price_history,
        social: SocialMetrics {
            shares: seed.review_count / 3,
            likes: seed.review_count * 2,
            comments: seed.review_count / 5,
            trending_score: seed.trending_score,
        },
        ai_recommendation_score: seed.ai_score,
        stock: seed.stock,
        tags: vec![seed.category.to_owned(), seed.subcategory.to_owned()],
        created_at,
        updated_at: created_at,
    }
}

fn demo_user() -> User {
    let created_at = seed_timestamp();
    User {
        id: UserId(DEMO_USER_ID.to_owned()),
        name: "Demo Shopper".to_owned(),
        email: "demo@affinity.example".to_owned(),
        tier: UserTier::Premium,
        preferences: UserPreferences {
            categories: vec!["electronics".to_owned(), "appliances".to_owned()],
            price_range: PriceRange { min: Decimal::ZERO, max: Decimal::from(5_000_000) },
            brands: vec!["Nimbus".to_owned()],
            ai: AiSettings::default(),
            notifications: NotificationSettings::default(),
        },
        history: UserHistory::default(),
        created_at,
        last_active: created_at,
    }
}

pub fn run(config: &AppConfig, store: &Path) -> CommandResult {
    let engine = Engine::new(config.engine.clone(), config.engine.signals.build_provider());
    let now = Utc::now();

    for seed in PRODUCT_SEEDS {
        if let Err(error) = engine.add_product(build_product(seed, now)) {
            return CommandResult::from_domain_error("seed", &error);
        }
    }
    engine.upsert_user(demo_user());

    if let Err(result) = save_engine(&engine, store, "seed") {
        return result;
    }

    CommandResult::success(
        "seed",
        format!(
            "seeded {} products and 1 demo user into `{}`",
            PRODUCT_SEEDS.len(),
            store.display()
        ),
        Some(json!({
            "products": PRODUCT_SEEDS.iter().map(|seed| seed.id).collect::<Vec<_>>(),
            "user": DEMO_USER_ID,
        })),
    )
}
