//! Validated ranking configuration and the named presets derived from it

use serde::{Deserialize, Serialize};

use super::{DEFAULT_BOOSTS, DEFAULT_THRESHOLDS, DEFAULT_WEIGHTS};
use crate::domain::product::MAX_RATING;
use crate::errors::DomainError;

/// Influence of each dimension on the composite score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RankingWeights {
    pub rating: f64,
    pub sales_speed: f64,
    pub price: f64,
    pub stock: f64,
    pub seller: f64,
}

impl RankingWeights {
    pub fn total(&self) -> f64 {
        self.rating + self.sales_speed + self.price + self.stock + self.seller
    }

    fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("rating", self.rating),
            ("sales_speed", self.sales_speed),
            ("price", self.price),
            ("stock", self.stock),
            ("seller", self.seller),
        ]
    }
}

impl Default for RankingWeights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

/// Hard gates: failing one zeroes that dimension's score, not the whole product
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Thresholds {
    pub min_rating: f64,
    pub min_sales_per_day: f64,
    pub max_price_deviation_pct: f64,
    pub min_stock: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        DEFAULT_THRESHOLDS
    }
}

/// Additive bonuses applied after weighting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Boosts {
    pub new_product: f64,
    pub trending: f64,
    pub seasonal: f64,
}

impl Default for Boosts {
    fn default() -> Self {
        DEFAULT_BOOSTS
    }
}

/// Immutable, validated ranking configuration.
///
/// The only way to obtain one is through [`AISettingsBuilder::build`] (or
/// deserialization, which goes through the builder), so a zero weight sum never
/// reaches the composite scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AISettingsBuilder", rename_all = "camelCase")]
pub struct AISettings {
    weights: RankingWeights,
    thresholds: Thresholds,
    boosts: Boosts,
}

impl AISettings {
    pub const DEFAULT: AISettings =
        AISettings { weights: DEFAULT_WEIGHTS, thresholds: DEFAULT_THRESHOLDS, boosts: DEFAULT_BOOSTS };

    pub fn builder() -> AISettingsBuilder {
        AISettingsBuilder::default()
    }

    pub fn new(
        weights: RankingWeights,
        thresholds: Thresholds,
        boosts: Boosts,
    ) -> Result<Self, DomainError> {
        AISettingsBuilder { weights, thresholds, boosts }.build()
    }

    pub fn weights(&self) -> &RankingWeights {
        &self.weights
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn boosts(&self) -> &Boosts {
        &self.boosts
    }

    /// Re-opens the settings for modification; the result must be built again.
    pub fn to_builder(&self) -> AISettingsBuilder {
        AISettingsBuilder { weights: self.weights, thresholds: self.thresholds, boosts: self.boosts }
    }
}

impl Default for AISettings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AISettingsBuilder {
    weights: RankingWeights,
    thresholds: Thresholds,
    boosts: Boosts,
}

impl AISettingsBuilder {
    pub fn weights(mut self, weights: RankingWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn boosts(mut self, boosts: Boosts) -> Self {
        self.boosts = boosts;
        self
    }

    pub fn rating_weight(mut self, weight: f64) -> Self {
        self.weights.rating = weight;
        self
    }

    pub fn sales_speed_weight(mut self, weight: f64) -> Self {
        self.weights.sales_speed = weight;
        self
    }

    pub fn price_weight(mut self, weight: f64) -> Self {
        self.weights.price = weight;
        self
    }

    pub fn stock_weight(mut self, weight: f64) -> Self {
        self.weights.stock = weight;
        self
    }

    pub fn seller_weight(mut self, weight: f64) -> Self {
        self.weights.seller = weight;
        self
    }

    pub fn min_rating(mut self, value: f64) -> Self {
        self.thresholds.min_rating = value;
        self
    }

    pub fn min_sales_per_day(mut self, value: f64) -> Self {
        self.thresholds.min_sales_per_day = value;
        self
    }

    pub fn max_price_deviation_pct(mut self, value: f64) -> Self {
        self.thresholds.max_price_deviation_pct = value;
        self
    }

    pub fn min_stock(mut self, value: i64) -> Self {
        self.thresholds.min_stock = value;
        self
    }

    pub fn new_product_boost(mut self, value: f64) -> Self {
        self.boosts.new_product = value;
        self
    }

    pub fn trending_boost(mut self, value: f64) -> Self {
        self.boosts.trending = value;
        self
    }

    pub fn seasonal_boost(mut self, value: f64) -> Self {
        self.boosts.seasonal = value;
        self
    }

    pub fn build(self) -> Result<AISettings, DomainError> {
        validate_weights(&self.weights)?;
        validate_thresholds(&self.thresholds)?;
        validate_boosts(&self.boosts)?;
        Ok(AISettings { weights: self.weights, thresholds: self.thresholds, boosts: self.boosts })
    }
}

impl TryFrom<AISettingsBuilder> for AISettings {
    type Error = DomainError;

    fn try_from(builder: AISettingsBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

fn validate_weights(weights: &RankingWeights) -> Result<(), DomainError> {
    for (name, value) in weights.entries() {
        if !value.is_finite() || value < 0.0 {
            return Err(DomainError::InvalidSettings(format!(
                "weights.{name} must be a finite non-negative number, got {value}"
            )));
        }
    }

    let total = weights.total();
    if !total.is_finite() || total <= 0.0 {
        return Err(DomainError::InvalidSettings(format!(
            "weights must sum to a finite positive total, got {total}"
        )));
    }

    Ok(())
}

fn validate_thresholds(thresholds: &Thresholds) -> Result<(), DomainError> {
    if !thresholds.min_rating.is_finite() || !(0.0..=MAX_RATING).contains(&thresholds.min_rating) {
        return Err(DomainError::InvalidSettings(format!(
            "thresholds.min_rating must be within 0..=5, got {}",
            thresholds.min_rating
        )));
    }
    if !thresholds.min_sales_per_day.is_finite() || thresholds.min_sales_per_day < 0.0 {
        return Err(DomainError::InvalidSettings(format!(
            "thresholds.min_sales_per_day must be a finite non-negative number, got {}",
            thresholds.min_sales_per_day
        )));
    }
    if !thresholds.max_price_deviation_pct.is_finite() || thresholds.max_price_deviation_pct <= 0.0 {
        return Err(DomainError::InvalidSettings(format!(
            "thresholds.max_price_deviation_pct must be greater than zero, got {}",
            thresholds.max_price_deviation_pct
        )));
    }
    if thresholds.min_stock < 0 {
        return Err(DomainError::InvalidSettings(format!(
            "thresholds.min_stock must not be negative, got {}",
            thresholds.min_stock
        )));
    }
    Ok(())
}

fn validate_boosts(boosts: &Boosts) -> Result<(), DomainError> {
    let entries =
        [("new_product", boosts.new_product), ("trending", boosts.trending), ("seasonal", boosts.seasonal)];
    for (name, value) in entries {
        if !value.is_finite() || value < 0.0 {
            return Err(DomainError::InvalidSettings(format!(
                "boosts.{name} must be a finite non-negative number, got {value}"
            )));
        }
    }
    let total: f64 = entries.iter().map(|(_, value)| value).sum();
    if !total.is_finite() {
        return Err(DomainError::InvalidSettings(format!(
            "boosts must sum to a finite total, got {total}"
        )));
    }
    Ok(())
}

/// Pure transformation from a base configuration to a view-specific one
pub trait SettingsPreset {
    fn apply(&self, base: &AISettings) -> AISettings;
}

/// Emphasises sales velocity and the trending flag
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendingPreset;

impl TrendingPreset {
    pub const SALES_SPEED_WEIGHT: f64 = 40.0;
    pub const TRENDING_BOOST: f64 = 25.0;
}

impl SettingsPreset for TrendingPreset {
    fn apply(&self, base: &AISettings) -> AISettings {
        // A positive override keeps the weight total positive, so no re-validation is needed.
        let mut settings = *base;
        settings.weights.sales_speed = Self::SALES_SPEED_WEIGHT;
        settings.boosts.trending = Self::TRENDING_BOOST;
        settings
    }
}

/// Emphasises price competitiveness and rating
#[derive(Debug, Clone, Copy, Default)]
pub struct DealsPreset;

impl DealsPreset {
    pub const PRICE_WEIGHT: f64 = 40.0;
    pub const RATING_WEIGHT: f64 = 30.0;
}

impl SettingsPreset for DealsPreset {
    fn apply(&self, base: &AISettings) -> AISettings {
        let mut settings = *base;
        settings.weights.price = Self::PRICE_WEIGHT;
        settings.weights.rating = Self::RATING_WEIGHT;
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        let built = AISettings::builder().build().expect("defaults should validate");
        assert_eq!(built, AISettings::DEFAULT);
        assert_eq!(built.weights().total(), 100.0);
    }

    #[test]
    fn zero_weight_sum_is_rejected_at_build_time() {
        let result = AISettings::builder()
            .weights(RankingWeights { rating: 0.0, sales_speed: 0.0, price: 0.0, stock: 0.0, seller: 0.0 })
            .build();

        assert!(matches!(
            result,
            Err(DomainError::InvalidSettings(ref message)) if message.contains("positive total")
        ));
    }

    #[test]
    fn weights_overflowing_their_total_are_rejected() {
        let result = AISettings::builder()
            .rating_weight(f64::MAX)
            .sales_speed_weight(f64::MAX)
            .build();
        assert!(matches!(
            result,
            Err(DomainError::InvalidSettings(ref message)) if message.contains("finite positive total")
        ));
    }

    #[test]
    fn boosts_overflowing_their_total_are_rejected() {
        let result =
            AISettings::builder().new_product_boost(f64::MAX).trending_boost(f64::MAX).build();
        assert!(matches!(result, Err(DomainError::InvalidSettings(_))));
    }

    #[test]
    fn negative_weight_is_rejected() {
        let result = AISettings::builder().price_weight(-1.0).build();
        assert!(matches!(
            result,
            Err(DomainError::InvalidSettings(ref message)) if message.contains("weights.price")
        ));
    }

    #[test]
    fn non_positive_price_band_is_rejected() {
        let result = AISettings::builder().max_price_deviation_pct(0.0).build();
        assert!(result.is_err());
    }

    #[test]
    fn min_rating_outside_scale_is_rejected() {
        assert!(AISettings::builder().min_rating(5.5).build().is_err());
        assert!(AISettings::builder().min_rating(f64::NAN).build().is_err());
    }

    #[test]
    fn weights_need_not_sum_to_one_hundred() {
        let settings = AISettings::builder()
            .weights(RankingWeights { rating: 1.0, sales_speed: 1.0, price: 1.0, stock: 0.0, seller: 0.0 })
            .build()
            .expect("any positive total is accepted");
        assert_eq!(settings.weights().total(), 3.0);
    }

    #[test]
    fn trending_preset_overrides_velocity_and_trending_boost_only() {
        let base = AISettings::builder().seasonal_boost(7.0).build().expect("valid settings");
        let trending = TrendingPreset.apply(&base);

        assert_eq!(trending.weights().sales_speed, TrendingPreset::SALES_SPEED_WEIGHT);
        assert_eq!(trending.boosts().trending, TrendingPreset::TRENDING_BOOST);
        assert_eq!(trending.boosts().seasonal, 7.0);
        assert_eq!(trending.weights().price, base.weights().price);
        // base is untouched
        assert_eq!(base.weights().sales_speed, DEFAULT_WEIGHTS.sales_speed);
    }

    #[test]
    fn deals_preset_overrides_price_and_rating_weights() {
        let deals = DealsPreset.apply(&AISettings::DEFAULT);
        assert_eq!(deals.weights().price, DealsPreset::PRICE_WEIGHT);
        assert_eq!(deals.weights().rating, DealsPreset::RATING_WEIGHT);
        assert_eq!(deals.boosts(), AISettings::DEFAULT.boosts());
    }

    #[test]
    fn deserialization_goes_through_validation() {
        let partial: AISettings =
            serde_json::from_str(r#"{"weights":{"rating":50},"thresholds":{"minStock":3}}"#)
                .expect("partial settings should fill defaults");
        assert_eq!(partial.weights().rating, 50.0);
        assert_eq!(partial.weights().sales_speed, DEFAULT_WEIGHTS.sales_speed);
        assert_eq!(partial.thresholds().min_stock, 3);

        let zeroed = serde_json::from_str::<AISettings>(
            r#"{"weights":{"rating":0,"salesSpeed":0,"price":0,"stock":0,"seller":0}}"#,
        );
        assert!(zeroed.is_err(), "zero weight sum must not deserialize");
    }
}
