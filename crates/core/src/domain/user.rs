use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserTier {
    Basic,
    Premium,
    Enterprise,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl PriceRange {
    pub fn contains(&self, amount: Decimal) -> bool {
        amount >= self.min && amount <= self.max
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiSettings {
    pub personalized_recommendations: bool,
    pub behavior_tracking: bool,
    pub predictive_analytics: bool,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            personalized_recommendations: true,
            behavior_tracking: true,
            predictive_analytics: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub email: bool,
    pub push: bool,
    pub deals: bool,
    pub insights: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self { email: true, push: false, deals: true, insights: true }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub categories: Vec<String>,
    pub price_range: PriceRange,
    pub brands: Vec<String>,
    pub ai: AiSettings,
    pub notifications: NotificationSettings,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserHistory {
    pub viewed: Vec<ProductId>,
    pub clicked: Vec<ProductId>,
    pub purchased: Vec<ProductId>,
    pub searched: Vec<ProductId>,
    pub time_spent: BTreeMap<ProductId, u64>,
}

/// A tracked behavior event appended to the user's history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action", content = "subject")]
pub enum Behavior {
    Viewed(ProductId),
    Clicked(ProductId),
    Purchased(ProductId),
    Searched(ProductId),
    /// Seconds spent on a product page, accumulated per product.
    TimeSpent(ProductId, u64),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub tier: UserTier,
    pub preferences: UserPreferences,
    pub history: UserHistory,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl User {
    pub fn has_viewed(&self, product_id: &ProductId) -> bool {
        self.history.viewed.contains(product_id)
    }

    /// Appends one behavior event and refreshes `last_active`.
    pub fn track(&mut self, behavior: Behavior, now: DateTime<Utc>) {
        match behavior {
            Behavior::Viewed(id) => self.history.viewed.push(id),
            Behavior::Clicked(id) => self.history.clicked.push(id),
            Behavior::Purchased(id) => self.history.purchased.push(id),
            Behavior::Searched(id) => self.history.searched.push(id),
            Behavior::TimeSpent(id, seconds) => {
                *self.history.time_spent.entry(id).or_insert(0) += seconds;
            }
        }
        self.last_active = now;
    }
}
