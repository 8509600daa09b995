use std::fmt;

use serde::{Deserialize, Serialize};

use crate::util::settings::Settings;

use super::pricing::calculate_liquidity_score;

/// Stock Keeping Unit, the natural key of a product.
pub type Sku = String;

/// Lifecycle status of a product.
///
/// `LowStock` and `Overstock` only enter the inventory through CSV imports;
/// the dashboard itself moves products between the other four.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductStatus {
    #[default]
    Active,
    AtRisk,
    Liquidating,
    Donated,
    LowStock,
    Overstock,
}

impl ProductStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::AtRisk => "at-risk",
            Self::Liquidating => "liquidating",
            Self::Donated => "donated",
            Self::LowStock => "low-stock",
            Self::Overstock => "overstock",
        }
    }

    /// Parses a status column from an import file.
    ///
    /// Only `active`, `low-stock`, `overstock` and `at-risk` are accepted;
    /// anything else (including `liquidating`) falls back to `Active`.
    pub fn from_import(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low-stock" => Self::LowStock,
            "overstock" => Self::Overstock,
            "at-risk" => Self::AtRisk,
            _ => Self::Active,
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub sku: Sku,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub cost_basis: f64,
    pub market_price: f64,
    pub stock_level: f64,
    #[serde(default)]
    pub velocity: f64,
    #[serde(default)]
    pub days_on_hand: f64,
    #[serde(default = "default_elasticity")]
    pub elasticity: f64,
    /// 0-100, higher means easier to turn into cash.
    pub liquidity_score: f64,
    #[serde(default)]
    pub status: ProductStatus,
}

fn default_elasticity() -> f64 {
    -1.5
}

impl Product {
    /// Gross margin as a fraction of the market price.
    pub fn margin(&self) -> f64 {
        if self.market_price > 0.0 {
            (self.market_price - self.cost_basis) / self.market_price
        } else {
            0.0
        }
    }

    /// Value of the stock on hand at market price.
    pub fn market_value(&self) -> f64 {
        self.market_price * self.stock_level
    }

    /// Recomputes `liquidity_score` from velocity, days on hand and margin.
    pub fn refresh_liquidity_score(&mut self, settings: &Settings) {
        let score = calculate_liquidity_score(self.velocity, self.days_on_hand, self.margin());
        self.liquidity_score = settings.apply_score_policy(score);
    }
}

/// An automation rule as entered in the workflow form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub trigger: String,
    pub action: String,
    pub active: bool,
    pub executions: u64,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}
