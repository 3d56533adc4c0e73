pub mod campaigns;
pub mod catalog;
pub mod config;
pub mod deals;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod insights;
pub mod metrics;
pub mod scoring;
pub mod signals;
pub mod snapshot;

pub use campaigns::{CampaignConfig, CampaignManager, CampaignSpec};
pub use catalog::{CatalogStore, ProductFilter, ProductPatch};
pub use config::{AppConfig, ConfigError, EngineConfig, LoadOptions, LogFormat, SignalConfig};
pub use deals::{BestDeal, DealAggregator, DealConfig};
pub use domain::campaign::{
    Campaign, CampaignId, CampaignPerformance, CampaignStatus, CampaignType, StrategyMetrics,
};
pub use domain::insight::{Impact, Insight, InsightId, InsightType};
pub use domain::product::{
    PricePoint, Product, ProductCard, ProductId, SocialMetrics, StockStatus, StoreId,
};
pub use domain::user::{
    AiSettings, Behavior, NotificationSettings, PriceRange, User, UserHistory, UserId,
    UserPreferences, UserTier,
};
pub use engine::{CampaignFilter, Engine, EngineState};
pub use errors::{DomainError, ErrorKind};
pub use insights::{InsightConfig, InsightFeed};
pub use metrics::{dashboard_metrics, DashboardMetrics};
pub use scoring::{RankedProduct, RecommendationEngine, ScoringConfig};
pub use signals::{
    DeterministicSignalProvider, FixedSignalProvider, SeededSignalProvider, SignalContext,
    SignalProvider,
};
pub use snapshot::{deserialize_state, serialize_state, CURRENT_VERSION, STORE_NAME};
