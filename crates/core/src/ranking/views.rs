//! Named ranking views built on the composite scorer

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::engine::RankingEngine;
use super::settings::{AISettings, DealsPreset, SettingsPreset, TrendingPreset};
use super::types::{RankingOutcome, RejectedProduct, ScoredProduct};
use super::{
    CatalogStatistics, RankingResult, DEFAULT_DEALS_LIMIT, DEFAULT_RECOMMENDATION_LIMIT,
    DEFAULT_SIMILAR_LIMIT, DEFAULT_SIMILAR_PRICE_BAND_PCT, DEFAULT_TRENDING_LIMIT,
};
use crate::domain::product::{Product, ProductId};
use crate::errors::DomainError;

/// Default result size per view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewLimits {
    pub recommendations: usize,
    pub similar: usize,
    pub trending: usize,
    pub deals: usize,
}

impl Default for ViewLimits {
    fn default() -> Self {
        Self {
            recommendations: DEFAULT_RECOMMENDATION_LIMIT,
            similar: DEFAULT_SIMILAR_LIMIT,
            trending: DEFAULT_TRENDING_LIMIT,
            deals: DEFAULT_DEALS_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewConfig {
    pub limits: ViewLimits,
    /// Similar products must be priced within this percentage of the reference
    pub similar_price_band_pct: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self { limits: ViewLimits::default(), similar_price_band_pct: DEFAULT_SIMILAR_PRICE_BAND_PCT }
    }
}

/// Which presentation shape a request asks for
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewKind {
    #[default]
    Recommendations,
    Similar {
        #[serde(rename = "referenceId")]
        reference_id: ProductId,
    },
    Trending,
    Deals,
}

impl ViewKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Recommendations => "recommendations",
            Self::Similar { .. } => "similar",
            Self::Trending => "trending",
            Self::Deals => "deals",
        }
    }
}

/// Thin configuration and subset transforms over one [`RankingEngine`]
#[derive(Debug, Clone, Default)]
pub struct RankingViews {
    engine: RankingEngine,
    config: ViewConfig,
}

impl RankingViews {
    pub fn new(engine: RankingEngine, config: ViewConfig) -> Self {
        Self { engine, config }
    }

    pub fn engine(&self) -> &RankingEngine {
        &self.engine
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Full batch with the base settings, top N (default 12)
    pub fn recommendations(
        &self,
        products: &[Product],
        as_of: DateTime<Utc>,
        limit: Option<usize>,
    ) -> RankingOutcome {
        let limit = resolve_limit(limit, self.config.limits.recommendations);
        self.engine.rank(products, as_of, limit)
    }

    /// Same category, price within the band around the reference, reference excluded.
    ///
    /// Statistics are computed over the filtered subset, not the whole catalog.
    pub fn similar(
        &self,
        products: &[Product],
        reference: &Product,
        as_of: DateTime<Utc>,
        limit: Option<usize>,
    ) -> RankingResult<RankingOutcome> {
        reference.validate()?;

        let band = price_band(reference, self.config.similar_price_band_pct)?;
        let candidates: Vec<Product> = products
            .iter()
            .filter(|product| {
                product.id != reference.id
                    && product.category_id == reference.category_id
                    && within_band(product, reference, band)
            })
            .cloned()
            .collect();

        let limit = resolve_limit(limit, self.config.limits.similar);
        Ok(self.engine.rank(&candidates, as_of, limit))
    }

    /// Sales velocity and the trending flag weighted up via [`TrendingPreset`]
    pub fn trending(
        &self,
        products: &[Product],
        as_of: DateTime<Utc>,
        limit: Option<usize>,
    ) -> RankingOutcome {
        let limit = resolve_limit(limit, self.config.limits.trending);
        self.with_preset(&TrendingPreset).rank(products, as_of, limit)
    }

    /// Price and rating weighted up via [`DealsPreset`]
    pub fn best_deals(
        &self,
        products: &[Product],
        as_of: DateTime<Utc>,
        limit: Option<usize>,
    ) -> RankingOutcome {
        let limit = resolve_limit(limit, self.config.limits.deals);
        self.with_preset(&DealsPreset).rank(products, as_of, limit)
    }

    fn with_preset(&self, preset: &dyn SettingsPreset) -> RankingEngine {
        self.engine.with_settings(preset.apply(self.engine.settings()))
    }
}

fn resolve_limit(requested: Option<usize>, default: usize) -> usize {
    requested.filter(|limit| *limit > 0).unwrap_or(default)
}

fn price_band(reference: &Product, band_pct: f64) -> RankingResult<Decimal> {
    let pct = Decimal::from_f64(band_pct).filter(|pct| !pct.is_sign_negative()).ok_or_else(|| {
        DomainError::InvalidSettings(format!(
            "similar price band must be a finite non-negative percentage, got {band_pct}"
        ))
    })?;
    // Dividing first loses exactness at the band edges, so it is only the overflow fallback.
    let band = reference
        .price
        .checked_mul(pct)
        .map(|scaled| scaled / Decimal::ONE_HUNDRED)
        .or_else(|| (reference.price / Decimal::ONE_HUNDRED).checked_mul(pct))
        .unwrap_or(Decimal::MAX);
    Ok(band)
}

/// Candidates whose price difference is not representable are never similar.
fn within_band(product: &Product, reference: &Product, band: Decimal) -> bool {
    product
        .price
        .checked_sub(reference.price)
        .is_some_and(|difference| difference.abs() <= band)
}

/// Service-shaped request: products, optional settings, view, optional limit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingRequest {
    pub products: Vec<Product>,
    #[serde(default)]
    pub settings: Option<AISettings>,
    #[serde(default)]
    pub view: ViewKind,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingResponse {
    pub view: ViewKind,
    pub scored_products: Vec<ScoredProduct>,
    pub rejected: Vec<RejectedProduct>,
    pub statistics: CatalogStatistics,
}

/// Dispatches [`RankingRequest`]s to the matching view
#[derive(Debug, Clone, Default)]
pub struct RankingService {
    views: RankingViews,
}

impl RankingService {
    pub fn new(views: RankingViews) -> Self {
        Self { views }
    }

    pub fn views(&self) -> &RankingViews {
        &self.views
    }

    pub fn handle(&self, request: RankingRequest, as_of: DateTime<Utc>) -> RankingResult<RankingResponse> {
        let views = match request.settings {
            Some(settings) => {
                RankingViews::new(self.views.engine.with_settings(settings), self.views.config)
            }
            None => self.views.clone(),
        };

        let outcome = match &request.view {
            ViewKind::Recommendations => views.recommendations(&request.products, as_of, request.limit),
            ViewKind::Similar { reference_id } => {
                let reference = request
                    .products
                    .iter()
                    .find(|product| &product.id == reference_id)
                    .ok_or_else(|| DomainError::UnknownReference(reference_id.clone()))?;
                views.similar(&request.products, reference, as_of, request.limit)?
            }
            ViewKind::Trending => views.trending(&request.products, as_of, request.limit),
            ViewKind::Deals => views.best_deals(&request.products, as_of, request.limit),
        };

        info!(
            event_name = "ranking.request.completed",
            view = request.view.name(),
            returned = outcome.ranked.len(),
            rejected = outcome.rejected.len(),
            "ranking request completed"
        );

        Ok(RankingResponse {
            view: request.view,
            scored_products: outcome.ranked,
            rejected: outcome.rejected,
            statistics: outcome.statistics,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::product::{CategoryId, SellerId};

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).single().expect("valid date")
    }

    fn product(id: &str, category: &str, price: i64) -> Product {
        Product {
            id: ProductId(id.to_owned()),
            title: id.to_owned(),
            price: Decimal::from(price),
            rating: 4.2,
            review_count: 30,
            sales_count: 20,
            sales_last_week: 7,
            stock_quantity: 40,
            created_at: as_of() - Duration::days(120),
            category_id: CategoryId(category.to_owned()),
            seller_id: SellerId("seller".to_owned()),
            view_count: 800,
            is_trending: false,
            is_seasonal: false,
        }
    }

    fn ids(outcome: &RankingOutcome) -> Vec<&str> {
        outcome.ranked.iter().map(|scored| scored.product.id.0.as_str()).collect()
    }

    #[test]
    fn recommendations_default_to_twelve() {
        let products: Vec<Product> =
            (0..20).map(|index| product(&format!("p{index}"), "home", 40 + index)).collect();
        let outcome = RankingViews::default().recommendations(&products, as_of(), None);
        assert_eq!(outcome.ranked.len(), DEFAULT_RECOMMENDATION_LIMIT);
    }

    #[test]
    fn zero_limit_falls_back_to_view_default() {
        let products: Vec<Product> =
            (0..20).map(|index| product(&format!("p{index}"), "home", 40 + index)).collect();
        let outcome = RankingViews::default().trending(&products, as_of(), Some(0));
        assert_eq!(outcome.ranked.len(), DEFAULT_TRENDING_LIMIT);
    }

    #[test]
    fn similar_filters_category_price_band_and_reference() {
        let reference = product("ref", "lighting", 100);
        let products = vec![
            reference.clone(),
            product("cheap-edge", "lighting", 70),
            product("pricey-edge", "lighting", 130),
            product("too-cheap", "lighting", 69),
            product("too-pricey", "lighting", 131),
            product("other-category", "kitchen", 100),
        ];

        let outcome = RankingViews::default()
            .similar(&products, &reference, as_of(), None)
            .expect("reference is valid");

        let mut found = ids(&outcome);
        found.sort_unstable();
        assert_eq!(found, vec!["cheap-edge", "pricey-edge"]);
        assert_eq!(outcome.statistics.product_count, 2);
    }

    #[test]
    fn similar_rejects_invalid_reference() {
        let mut reference = product("ref", "lighting", 100);
        reference.rating = 9.0;
        let result = RankingViews::default().similar(&[], &reference, as_of(), None);
        assert!(matches!(result, Err(DomainError::InvalidProduct { .. })));
    }

    #[test]
    fn similar_handles_prices_near_decimal_limits() {
        let huge = Decimal::from_i128_with_scale(10_000_000_000_000_000_000_000_000_000, 0);
        let mut reference = product("ref", "vault", 1);
        reference.price = huge;
        let mut twin = product("twin", "vault", 1);
        twin.price = huge;
        let mut broken = product("broken", "vault", 1);
        broken.price = -Decimal::from_i128_with_scale(70_000_000_000_000_000_000_000_000_000, 0);
        let products = vec![reference.clone(), twin, broken];

        let outcome = RankingViews::default()
            .similar(&products, &reference, as_of(), None)
            .expect("reference is valid");

        assert_eq!(ids(&outcome), vec!["twin"]);
        assert!(outcome.rejected.is_empty());
        assert!((outcome.ranked[0].score_breakdown.price - 50.0).abs() < 1e-9);
    }

    #[test]
    fn trending_view_lifts_trending_products() {
        let mut hot = product("hot", "home", 100);
        hot.is_trending = true;
        let plain = product("plain", "home", 100);
        let products = vec![plain, hot];

        let views = RankingViews::default();
        let outcome = views.trending(&products, as_of(), None);

        assert_eq!(ids(&outcome), vec!["hot", "plain"]);
        let gap = outcome.ranked[0].ai_score - outcome.ranked[1].ai_score;
        assert!((gap - TrendingPreset::TRENDING_BOOST).abs() < 1e-9);
        // base engine settings remain untouched
        assert_eq!(views.engine().settings(), &AISettings::DEFAULT);
    }

    #[test]
    fn best_deals_reweights_price_and_rating() {
        let products = vec![product("a", "home", 80), product("b", "home", 100), product("c", "home", 120)];
        let outcome = RankingViews::default().best_deals(&products, as_of(), None);
        assert_eq!(ids(&outcome), vec!["a", "b", "c"]);
    }

    #[test]
    fn service_resolves_similar_reference_by_id() {
        let products = vec![product("ref", "home", 100), product("near", "home", 110)];
        let request = RankingRequest {
            products,
            view: ViewKind::Similar { reference_id: ProductId("ref".to_owned()) },
            ..RankingRequest::default()
        };

        let response = RankingService::default().handle(request, as_of()).expect("request is valid");
        assert_eq!(response.scored_products.len(), 1);
        assert_eq!(response.scored_products[0].product.id, ProductId("near".to_owned()));
    }

    #[test]
    fn service_reports_unknown_reference() {
        let request = RankingRequest {
            products: vec![product("a", "home", 100)],
            view: ViewKind::Similar { reference_id: ProductId("missing".to_owned()) },
            ..RankingRequest::default()
        };

        let result = RankingService::default().handle(request, as_of());
        assert_eq!(result, Err(DomainError::UnknownReference(ProductId("missing".to_owned()))));
    }

    #[test]
    fn request_deserializes_with_view_tag() {
        let raw = r#"{
            "products": [],
            "view": {"type": "similar", "referenceId": "p-1"},
            "limit": 4
        }"#;
        let request: RankingRequest = serde_json::from_str(raw).expect("request should parse");
        assert_eq!(request.view, ViewKind::Similar { reference_id: ProductId("p-1".to_owned()) });
        assert_eq!(request.limit, Some(4));
        assert!(request.settings.is_none());
    }
}
