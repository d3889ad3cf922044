//! Incoming record drafts
//!
//! Request bodies as the client sends them. Field names follow the
//! client's camelCase, with snake_case aliases for direct table payloads.
//! Nothing here is trusted until `validate()` passes.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SikuwatError};

/// Account role carried in the platform's user metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    /// Parse a metadata value; anything unrecognised grants nothing.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "user" => Some(Self::User),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketPriceDraft {
    pub commodity: Option<String>,
    pub price: Option<f64>,
    pub unit: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleDraft {
    pub title: Option<String>,
    pub content: Option<String>,
    pub source: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "imageUrl", alias = "image_url")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TipDraft {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
}

impl TipDraft {
    /// Category to store, `general` when left blank
    pub fn category_or_default(&self) -> String {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("general")
            .to_string()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlantingDraft {
    #[serde(rename = "seedType", alias = "seed_type")]
    pub seed_type: Option<String>,
    #[serde(rename = "seedCount", alias = "seed_count")]
    pub seed_count: Option<i64>,
    #[serde(rename = "plantingDate", alias = "planting_date")]
    pub planting_date: Option<String>,
    #[serde(rename = "harvestDate", alias = "harvest_date")]
    pub harvest_date: Option<String>,
    #[serde(rename = "harvestYield", alias = "harvest_yield")]
    pub harvest_yield: Option<f64>,
    #[serde(rename = "salesAmount", alias = "sales_amount")]
    pub sales_amount: Option<f64>,
}

impl PlantingDraft {
    /// Fields present in `self` replace those of `base`; absent ones are
    /// kept. Used for partial updates of a stored record.
    pub fn overlay(self, base: PlantingDraft) -> PlantingDraft {
        PlantingDraft {
            seed_type: self.seed_type.or(base.seed_type),
            seed_count: self.seed_count.or(base.seed_count),
            planting_date: self.planting_date.or(base.planting_date),
            harvest_date: self.harvest_date.or(base.harvest_date),
            harvest_yield: self.harvest_yield.or(base.harvest_yield),
            sales_amount: self.sales_amount.or(base.sales_amount),
        }
    }
}

/// Harvest annotation for an existing planting
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HarvestDraft {
    #[serde(rename = "harvestDate", alias = "harvest_date")]
    pub harvest_date: Option<String>,
    #[serde(rename = "harvestYield", alias = "harvest_yield")]
    pub harvest_yield: Option<f64>,
    /// Selling price per kg; sales amount is derived from it
    #[serde(rename = "pricePerKg", alias = "price_per_kg")]
    pub price_per_kg: Option<f64>,
}

impl HarvestDraft {
    pub fn sales_amount(&self) -> Option<f64> {
        match (self.price_per_kg, self.harvest_yield) {
            (Some(price), Some(kg)) => Some(price * kg),
            _ => None,
        }
    }
}

/// Parse `YYYY-MM-DD` or an RFC 3339 timestamp into a calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
        .map_err(|_| SikuwatError::invalid_date(value))
}

/// Trimmed, non-empty text or None
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
