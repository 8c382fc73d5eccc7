pub mod config;
pub mod domain;
pub mod errors;
pub mod ranking;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::product::{CategoryId, Product, ProductId, SellerId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use ranking::{
    AISettings, AISettingsBuilder, Boosts, CatalogStatistics, RankingEngine, RankingOutcome,
    RankingRequest, RankingResponse, RankingService, RankingViews, RankingWeights, ScoreBreakdown,
    ScoredProduct, SellerSignal, Thresholds, ViewKind,
};
