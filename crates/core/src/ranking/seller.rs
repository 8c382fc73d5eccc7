//! Seller-performance dimension.
//!
//! True seller metrics live with an external collaborator. Until they are supplied,
//! conversion (sales over views) stands in for them.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::MAX_SCORE;
use crate::domain::product::{Product, SellerId};

/// Conversion rate that saturates the proxy score (10%)
const CONVERSION_SCALE: f64 = 1000.0;

/// Seller-level aggregates reported by the order/fulfilment collaborator. Rates are in `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerAggregate {
    pub return_rate: f64,
    pub on_time_rate: f64,
    pub dispute_rate: f64,
}

/// Capability contract for the seller dimension: product in, score in `0..=100` out.
pub trait SellerSignal: fmt::Debug + Send + Sync {
    fn score(&self, product: &Product) -> f64;
}

/// Scores a product from its seller aggregate when one is known, otherwise from conversion.
pub fn seller_score(product: &Product, aggregate: Option<&SellerAggregate>) -> f64 {
    match aggregate {
        Some(aggregate) => aggregate_score(aggregate),
        None => conversion_score(product),
    }
}

fn conversion_score(product: &Product) -> f64 {
    let conversion_rate = product.sales_count as f64 / product.view_count.max(1) as f64;
    (conversion_rate * CONVERSION_SCALE).min(MAX_SCORE)
}

fn aggregate_score(aggregate: &SellerAggregate) -> f64 {
    let unit = |rate: f64| if rate.is_finite() { rate.clamp(0.0, 1.0) } else { 0.0 };

    let score = unit(aggregate.on_time_rate) * 60.0
        + (1.0 - unit(aggregate.return_rate)) * 25.0
        + (1.0 - unit(aggregate.dispute_rate)) * 15.0;
    score.clamp(0.0, MAX_SCORE)
}

/// Default signal: sales-to-views conversion.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConversionProxy;

impl SellerSignal for ConversionProxy {
    fn score(&self, product: &Product) -> f64 {
        seller_score(product, None)
    }
}

/// Signal backed by per-seller aggregates, falling back to conversion for unknown sellers.
#[derive(Debug, Clone, Default)]
pub struct SellerMetrics {
    aggregates: HashMap<SellerId, SellerAggregate>,
}

impl SellerMetrics {
    pub fn new(aggregates: HashMap<SellerId, SellerAggregate>) -> Self {
        Self { aggregates }
    }

    pub fn insert(&mut self, seller_id: SellerId, aggregate: SellerAggregate) {
        self.aggregates.insert(seller_id, aggregate);
    }

    pub fn get(&self, seller_id: &SellerId) -> Option<&SellerAggregate> {
        self.aggregates.get(seller_id)
    }
}

impl SellerSignal for SellerMetrics {
    fn score(&self, product: &Product) -> f64 {
        seller_score(product, self.get(&product.seller_id))
    }
}
