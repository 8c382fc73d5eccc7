//! Composite scorer

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{debug, warn};

use super::scoring::ScoreCalculator;
use super::seller::{ConversionProxy, SellerSignal};
use super::settings::AISettings;
use super::stats::CatalogStatistics;
use super::types::*;
use crate::domain::product::Product;

/// Scores and orders a batch of products.
///
/// Stateless between calls: the same `(products, settings, as_of)` always produces the
/// same outcome, breakdowns included.
#[derive(Debug, Clone)]
pub struct RankingEngine {
    calculator: ScoreCalculator,
    seller_signal: Arc<dyn SellerSignal>,
}

impl RankingEngine {
    /// Create a ranking engine with the conversion-proxy seller signal
    pub fn new(settings: AISettings) -> Self {
        Self { calculator: ScoreCalculator::with_settings(settings), seller_signal: Arc::new(ConversionProxy) }
    }

    /// Swap in a richer seller-performance collaborator
    pub fn with_seller_signal(mut self, seller_signal: Arc<dyn SellerSignal>) -> Self {
        self.seller_signal = seller_signal;
        self
    }

    /// Same seller signal, different settings
    pub fn with_settings(&self, settings: AISettings) -> Self {
        Self {
            calculator: ScoreCalculator::with_settings(settings),
            seller_signal: Arc::clone(&self.seller_signal),
        }
    }

    pub fn settings(&self) -> &AISettings {
        self.calculator.settings()
    }

    /// Score every valid product and sort descending by AI score.
    ///
    /// Invalid records are reported in `rejected` and excluded from the statistics.
    pub fn score_batch(&self, products: &[Product], as_of: DateTime<Utc>) -> RankingOutcome {
        let (valid, rejected) = partition_valid(products);
        let statistics = CatalogStatistics::from_products(valid.iter().copied());

        // Statistics are complete before any per-product score reads them.
        let mut ranked: Vec<ScoredProduct> =
            valid.par_iter().map(|product| self.score_product(product, &statistics, as_of)).collect();
        ranked.sort_by(compare_ranked);

        debug!(
            event_name = "ranking.batch.scored",
            product_count = ranked.len(),
            rejected_count = rejected.len(),
            mean_price = statistics.mean_price,
            mean_sales_per_day = statistics.mean_sales_per_day,
            "scored product batch"
        );

        RankingOutcome { ranked, rejected, statistics }
    }

    /// Score, sort and keep the top `limit` products
    pub fn rank(&self, products: &[Product], as_of: DateTime<Utc>, limit: usize) -> RankingOutcome {
        self.score_batch(products, as_of).truncate(limit)
    }

    /// Score a single product against precomputed batch statistics
    pub fn score_product(
        &self,
        product: &Product,
        statistics: &CatalogStatistics,
        as_of: DateTime<Utc>,
    ) -> ScoredProduct {
        let calculator = &self.calculator;
        let (new_product_boost, trending_boost, seasonal_boost) = calculator.boost_scores(product, as_of);

        let mut breakdown = ScoreBreakdown {
            rating: calculator.rating_score(product),
            sales_speed: calculator.sales_speed_score(product, statistics),
            price: calculator.price_score(product, statistics),
            stock: calculator.stock_score(product),
            seller: self.seller_signal.score(product).clamp(0.0, super::MAX_SCORE),
            weighted: 0.0,
            new_product_boost,
            trending_boost,
            seasonal_boost,
        };
        breakdown.weighted = calculator.weighted_score(&breakdown);

        ScoredProduct {
            product: product.clone(),
            ai_score: calculator.calculate_total_score(&breakdown),
            reasons: breakdown.reasons(),
            score_breakdown: breakdown,
        }
    }
}

impl Default for RankingEngine {
    fn default() -> Self {
        Self::new(AISettings::DEFAULT)
    }
}

fn partition_valid(products: &[Product]) -> (Vec<&Product>, Vec<RejectedProduct>) {
    let mut valid = Vec::with_capacity(products.len());
    let mut rejected = Vec::new();

    for product in products {
        match RejectedProduct::from_validation(product) {
            None => valid.push(product),
            Some(rejection) => {
                warn!(
                    event_name = "ranking.product.rejected",
                    product_id = %rejection.product_id,
                    reason = %rejection.reason,
                    "product record failed validation"
                );
                rejected.push(rejection);
            }
        }
    }

    (valid, rejected)
}

/// Descending AI score; ties go to the newer product, then keep batch order (stable sort).
fn compare_ranked(a: &ScoredProduct, b: &ScoredProduct) -> Ordering {
    b.ai_score
        .total_cmp(&a.ai_score)
        .then_with(|| b.product.created_at.cmp(&a.product.created_at))
}
