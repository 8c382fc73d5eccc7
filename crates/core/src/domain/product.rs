use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::ranking::SALES_WINDOW_DAYS;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SellerId(pub String);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for SellerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub const MAX_RATING: f64 = 5.0;

/// Catalog item snapshot at scoring time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Decimal,
    pub rating: f64,
    #[serde(default)]
    pub review_count: u64,
    #[serde(default)]
    pub sales_count: u64,
    #[serde(default)]
    pub sales_last_week: u64,
    /// Signed so oversold inventory from upstream is reported instead of failing to parse.
    pub stock_quantity: i64,
    pub created_at: DateTime<Utc>,
    pub category_id: CategoryId,
    pub seller_id: SellerId,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub is_trending: bool,
    #[serde(default)]
    pub is_seasonal: bool,
}

impl Product {
    /// Rejects records the engine cannot score without silently clamping them.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.id.0.trim().is_empty() {
            return Err(self.invalid("identifier must not be empty"));
        }
        if self.price <= Decimal::ZERO {
            return Err(self.invalid(format!("price must be positive, got {}", self.price)));
        }
        if !self.rating.is_finite() || !(0.0..=MAX_RATING).contains(&self.rating) {
            return Err(self.invalid(format!("rating must be within 0..=5, got {}", self.rating)));
        }
        if self.stock_quantity < 0 {
            return Err(
                self.invalid(format!("stock quantity must not be negative, got {}", self.stock_quantity))
            );
        }
        Ok(())
    }

    pub fn age_in_days(&self, as_of: DateTime<Utc>) -> i64 {
        (as_of - self.created_at).num_days()
    }

    /// Average daily sales over the trailing week.
    pub fn sales_per_day(&self) -> f64 {
        self.sales_last_week as f64 / SALES_WINDOW_DAYS
    }

    pub fn price_value(&self) -> f64 {
        self.price.to_f64().unwrap_or(0.0)
    }

    fn invalid(&self, reason: impl Into<String>) -> DomainError {
        DomainError::InvalidProduct { product_id: self.id.clone(), reason: reason.into() }
    }
}
