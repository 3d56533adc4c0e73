use std::env;
use std::fs;
use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::campaigns::CampaignConfig;
use crate::deals::DealConfig;
use crate::insights::InsightConfig;
use crate::scoring::ScoringConfig;
use crate::signals::{DeterministicSignalProvider, SeededSignalProvider, SignalProvider};

pub const DEFAULT_CONFIG_FILE: &str = "affinity.toml";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scoring: ScoringConfig,
    pub deals: DealConfig,
    pub campaigns: CampaignConfig,
    pub insights: InsightConfig,
    pub signals: SignalConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalProviderKind {
    Deterministic,
    Seeded,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub provider: SignalProviderKind,
    pub seed: u64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self { provider: SignalProviderKind::Deterministic, seed: 0 }
    }
}

impl SignalConfig {
    pub fn build_provider(&self) -> Box<dyn SignalProvider> {
        match self.provider {
            SignalProviderKind::Deterministic => Box::new(DeterministicSignalProvider),
            SignalProviderKind::Seeded => Box::new(SeededSignalProvider::new(self.seed)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::InvalidEnvOverride {
                key: "AFFINITY_LOG_FORMAT".to_owned(),
                value: other.to_owned(),
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), format: LogFormat::Compact }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl AppConfig {
    /// Defaults, overlaid by the TOML file (when present), overlaid by
    /// `AFFINITY_*` environment variables, then validated.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let path =
            options.config_path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = if path.exists() {
            let raw = fs::read_to_string(&path)
                .map_err(|source| ConfigError::ReadFile { path: path.clone(), source })?;
            toml::from_str(&raw).map_err(|source| ConfigError::ParseFile { path, source })?
        } else if options.require_file {
            return Err(ConfigError::MissingConfigFile(path));
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(level) = env::var("AFFINITY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = env::var("AFFINITY_LOG_FORMAT") {
            self.logging.format = format.parse()?;
        }
        if let Ok(seed) = env::var("AFFINITY_SIGNAL_SEED") {
            self.engine.signals.seed = seed.parse().map_err(|_| {
                ConfigError::InvalidEnvOverride {
                    key: "AFFINITY_SIGNAL_SEED".to_owned(),
                    value: seed.clone(),
                }
            })?;
            self.engine.signals.provider = SignalProviderKind::Seeded;
        }
        if let Ok(capacity) = env::var("AFFINITY_INSIGHT_CAPACITY") {
            self.engine.insights.capacity = capacity.parse().map_err(|_| {
                ConfigError::InvalidEnvOverride {
                    key: "AFFINITY_INSIGHT_CAPACITY".to_owned(),
                    value: capacity.clone(),
                }
            })?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.insights.capacity == 0 {
            return Err(ConfigError::Validation(
                "insight feed capacity must be at least 1".to_owned(),
            ));
        }
        if self.engine.deals.price_drop_window_hours <= 0 {
            return Err(ConfigError::Validation(
                "price drop window must be a positive number of hours".to_owned(),
            ));
        }
        if self.engine.deals.price_drop_margin_factor < Decimal::ONE {
            return Err(ConfigError::Validation(
                "price drop margin factor must be at least 1.0".to_owned(),
            ));
        }
        if !(0.0..=1.0).contains(&self.engine.scoring.trending_threshold) {
            return Err(ConfigError::Validation(
                "trending threshold must lie in [0.0, 1.0]".to_owned(),
            ));
        }
        Ok(())
    }
}
