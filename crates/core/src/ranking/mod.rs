//! Product ranking engine
//!
//! Orders a catalog snapshot by a composite score built from rating, sales velocity,
//! price competitiveness, stock depth and seller performance, plus additive
//! novelty/trending/seasonal boosts. The engine holds no state between calls and
//! never reads the clock: the reference instant is always passed in.

mod engine;
mod scoring;
mod seller;
mod settings;
mod stats;
mod types;
mod views;

pub use engine::RankingEngine;
pub use scoring::ScoreCalculator;
pub use seller::{seller_score, ConversionProxy, SellerAggregate, SellerMetrics, SellerSignal};
pub use settings::{
    AISettings, AISettingsBuilder, Boosts, DealsPreset, RankingWeights, SettingsPreset, Thresholds,
    TrendingPreset,
};
pub use stats::CatalogStatistics;
pub use types::*;
pub use views::{
    RankingRequest, RankingResponse, RankingService, RankingViews, ViewConfig, ViewKind, ViewLimits,
};

use crate::errors::DomainError;

/// Result type for ranking operations
pub type RankingResult<T> = Result<T, DomainError>;

/// Upper bound of every dimension score and of the final AI score
pub const MAX_SCORE: f64 = 100.0;

/// Default dimension weights; they are normalized by their sum, not required to total 100
pub const DEFAULT_WEIGHTS: RankingWeights =
    RankingWeights { rating: 25.0, sales_speed: 25.0, price: 20.0, stock: 15.0, seller: 15.0 };

/// Default hard gates
pub const DEFAULT_THRESHOLDS: Thresholds = Thresholds {
    min_rating: 3.0,
    min_sales_per_day: 0.1,
    max_price_deviation_pct: 30.0,
    min_stock: 1,
};

/// Default additive boosts, in score points
pub const DEFAULT_BOOSTS: Boosts = Boosts { new_product: 10.0, trending: 15.0, seasonal: 5.0 };

/// Products created within this many days receive the new-product boost
pub const NEW_PRODUCT_WINDOW_DAYS: i64 = 30;

/// Trailing window that `sales_last_week` covers
pub const SALES_WINDOW_DAYS: f64 = 7.0;

/// Default result sizes per view
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 12;
pub const DEFAULT_SIMILAR_LIMIT: usize = 6;
pub const DEFAULT_TRENDING_LIMIT: usize = 8;
pub const DEFAULT_DEALS_LIMIT: usize = 8;

/// Similar products must be priced within this percentage of the reference
pub const DEFAULT_SIMILAR_PRICE_BAND_PCT: f64 = 30.0;
