//! Scoring algorithms for product ranking

use chrono::{DateTime, Utc};

use super::settings::AISettings;
use super::stats::CatalogStatistics;
use super::types::ScoreBreakdown;
use super::{MAX_SCORE, NEW_PRODUCT_WINDOW_DAYS};
use crate::domain::product::{Product, MAX_RATING};

/// Review count at which the confidence bonus saturates
const REVIEW_CONFIDENCE_COUNT: f64 = 100.0;
/// Maximum confidence bonus from reviews
const REVIEW_BONUS: f64 = 20.0;
/// Score for a product selling at exactly the catalog mean rate
const AVERAGE_VELOCITY_SCORE: f64 = 50.0;
/// Fixed score for products priced suspiciously far below the mean
const UNDERPRICED_SCORE: f64 = 30.0;
/// Fixed score for products priced far above the mean
const OVERPRICED_SCORE: f64 = 20.0;
/// Price score when the batch has no usable mean
const NEUTRAL_PRICE_SCORE: f64 = 50.0;
/// Stock depth that saturates the logarithmic stock scale
const STOCK_SATURATION: f64 = 1000.0;

/// Score calculator for ranked products
#[derive(Debug, Clone)]
pub struct ScoreCalculator {
    settings: AISettings,
}

impl ScoreCalculator {
    /// Create a new score calculator with default settings
    pub fn new() -> Self {
        Self { settings: AISettings::DEFAULT }
    }

    /// Create with custom settings
    pub fn with_settings(settings: AISettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &AISettings {
        &self.settings
    }

    /// Rating score, gated by the minimum rating.
    ///
    /// `(rating / 5) * 100` plus up to 20 points of review-count confidence, capped at 100.
    pub fn rating_score(&self, product: &Product) -> f64 {
        if product.rating < self.settings.thresholds().min_rating {
            return 0.0;
        }

        let base = (product.rating / MAX_RATING) * MAX_SCORE;
        let confidence = (product.review_count as f64 / REVIEW_CONFIDENCE_COUNT).min(1.0) * REVIEW_BONUS;
        (base + confidence).clamp(0.0, MAX_SCORE)
    }

    /// Sales-speed score relative to the batch mean, gated by the minimum daily sales.
    pub fn sales_speed_score(&self, product: &Product, stats: &CatalogStatistics) -> f64 {
        let sales_per_day = product.sales_per_day();
        if sales_per_day < self.settings.thresholds().min_sales_per_day {
            return 0.0;
        }
        // A zero mean means nothing in the batch sold.
        if stats.mean_sales_per_day <= 0.0 {
            return 0.0;
        }

        ((sales_per_day / stats.mean_sales_per_day) * AVERAGE_VELOCITY_SCORE).clamp(0.0, MAX_SCORE)
    }

    /// Price-competitiveness score.
    ///
    /// Outside the allowed deviation band the score is fixed: extreme underpricing is
    /// penalized rather than rewarded. Inside the band it falls linearly from 100 at
    /// the cheap edge to 0 at the expensive edge, so a product priced at the mean (and
    /// every product in an equal-price batch) scores 50.
    pub fn price_score(&self, product: &Product, stats: &CatalogStatistics) -> f64 {
        if !stats.mean_price.is_finite() || stats.mean_price <= 0.0 {
            return NEUTRAL_PRICE_SCORE;
        }

        let max_deviation = self.settings.thresholds().max_price_deviation_pct;
        let deviation_pct = (product.price_value() - stats.mean_price) * 100.0 / stats.mean_price;

        if deviation_pct < -max_deviation {
            UNDERPRICED_SCORE
        } else if deviation_pct > max_deviation {
            OVERPRICED_SCORE
        } else {
            ((max_deviation - deviation_pct) / (2.0 * max_deviation) * MAX_SCORE).clamp(0.0, MAX_SCORE)
        }
    }

    /// Logarithmic stock score, gated by the minimum stock level.
    pub fn stock_score(&self, product: &Product) -> f64 {
        // Below 2 units the log scale is zero or undefined.
        if product.stock_quantity < self.settings.thresholds().min_stock.max(2) {
            return 0.0;
        }

        let depth = (product.stock_quantity as f64).log10() / STOCK_SATURATION.log10() * MAX_SCORE;
        depth.clamp(0.0, MAX_SCORE)
    }

    /// Additive boosts as `(new_product, trending, seasonal)`; not gated.
    pub fn boost_scores(&self, product: &Product, as_of: DateTime<Utc>) -> (f64, f64, f64) {
        let boosts = self.settings.boosts();

        let new_product = if product.age_in_days(as_of) <= NEW_PRODUCT_WINDOW_DAYS {
            boosts.new_product
        } else {
            0.0
        };
        let trending = if product.is_trending { boosts.trending } else { 0.0 };
        let seasonal = if product.is_seasonal { boosts.seasonal } else { 0.0 };

        (new_product, trending, seasonal)
    }

    /// Weighted mean of the five dimension scores, normalized by the weight sum.
    ///
    /// Each weight is divided by the total before multiplying, so very large weights
    /// never overflow the intermediate sum.
    pub fn weighted_score(&self, breakdown: &ScoreBreakdown) -> f64 {
        let weights = self.settings.weights();
        let total_weight = weights.total();
        let share = |weight: f64| weight / total_weight;

        breakdown.rating * share(weights.rating)
            + breakdown.sales_speed * share(weights.sales_speed)
            + breakdown.price * share(weights.price)
            + breakdown.stock * share(weights.stock)
            + breakdown.seller * share(weights.seller)
    }

    /// Final AI score: weighted mean plus boost, clamped to `0..=100`. A non-finite
    /// composite scores 0 so it can never sort ahead of real scores.
    pub fn calculate_total_score(&self, breakdown: &ScoreBreakdown) -> f64 {
        let total = breakdown.weighted + breakdown.boost();
        if !total.is_finite() {
            return 0.0;
        }
        total.clamp(0.0, MAX_SCORE)
    }
}

impl Default for ScoreCalculator {
    fn default() -> Self {
        Self::new()
    }
}
