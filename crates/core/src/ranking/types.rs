//! Types produced by the ranking engine

use serde::{Deserialize, Serialize};

use super::CatalogStatistics;
use crate::domain::product::{Product, ProductId};
use crate::errors::DomainError;

/// Per-dimension scores kept for caller-side explainability
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    /// Rating score (0 - 100)
    pub rating: f64,
    /// Sales-speed score (0 - 100)
    pub sales_speed: f64,
    /// Price-competitiveness score (0 - 100)
    pub price: f64,
    /// Stock score (0 - 100)
    pub stock: f64,
    /// Seller-performance score (0 - 100)
    pub seller: f64,
    /// Weighted mean of the five dimensions, before boosting
    pub weighted: f64,
    pub new_product_boost: f64,
    pub trending_boost: f64,
    pub seasonal_boost: f64,
}

impl ScoreBreakdown {
    /// Total additive boost
    pub fn boost(&self) -> f64 {
        self.new_product_boost + self.trending_boost + self.seasonal_boost
    }

    /// Human-readable "why was this ranked here" reasons
    pub fn reasons(&self) -> Vec<String> {
        let mut reasons = Vec::new();

        if self.rating >= 80.0 {
            reasons.push("Highly rated by buyers".to_string());
        }
        if self.sales_speed >= 60.0 {
            reasons.push("Selling faster than the catalog average".to_string());
        }
        if self.price >= 60.0 {
            reasons.push("Competitively priced for its catalog".to_string());
        }
        if self.stock >= 60.0 {
            reasons.push("In stock and ready to ship".to_string());
        }
        if self.seller >= 60.0 {
            reasons.push("Sold by a high-performing seller".to_string());
        }
        if self.new_product_boost > 0.0 {
            reasons.push("New arrival".to_string());
        }
        if self.trending_boost > 0.0 {
            reasons.push("Trending now".to_string());
        }
        if self.seasonal_boost > 0.0 {
            reasons.push("Seasonal pick".to_string());
        }

        if reasons.is_empty() {
            reasons.push("Matches your catalog selection".to_string());
        }

        reasons
    }
}

/// A product with its AI score and breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredProduct {
    #[serde(flatten)]
    pub product: Product,
    /// Composite score (0 - 100), the sort key
    pub ai_score: f64,
    pub score_breakdown: ScoreBreakdown,
    pub reasons: Vec<String>,
}

/// A record that failed validation and was left out of the ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedProduct {
    pub product_id: ProductId,
    pub reason: String,
}

impl RejectedProduct {
    /// `None` when the record is fit to rank.
    pub fn from_validation(product: &Product) -> Option<Self> {
        match product.validate() {
            Ok(()) => None,
            Err(DomainError::InvalidProduct { product_id, reason }) => Some(Self { product_id, reason }),
            Err(other) => Some(Self { product_id: product.id.clone(), reason: other.to_string() }),
        }
    }
}

/// Result of one scoring pass
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingOutcome {
    /// Valid products, descending by AI score
    pub ranked: Vec<ScoredProduct>,
    pub rejected: Vec<RejectedProduct>,
    /// Baselines computed over the valid products
    pub statistics: CatalogStatistics,
}

impl RankingOutcome {
    pub fn truncate(mut self, limit: usize) -> Self {
        self.ranked.truncate(limit);
        self
    }

    pub fn product_ids(&self) -> Vec<&ProductId> {
        self.ranked.iter().map(|scored| &scored.product.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_follow_strong_dimensions_and_boosts() {
        let breakdown = ScoreBreakdown {
            rating: 96.0,
            sales_speed: 20.0,
            price: 75.0,
            stock: 10.0,
            seller: 5.0,
            weighted: 50.0,
            new_product_boost: 0.0,
            trending_boost: 15.0,
            seasonal_boost: 0.0,
        };

        assert_eq!(
            breakdown.reasons(),
            vec![
                "Highly rated by buyers".to_string(),
                "Competitively priced for its catalog".to_string(),
                "Trending now".to_string(),
            ]
        );
        assert_eq!(breakdown.boost(), 15.0);
    }

    #[test]
    fn reasons_always_contain_at_least_one_entry() {
        assert_eq!(ScoreBreakdown::default().reasons(), vec!["Matches your catalog selection"]);
    }

    #[test]
    fn rejection_carries_the_validation_reason() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": "sku-neg",
            "title": "Negative stock",
            "price": 12,
            "rating": 4.0,
            "stockQuantity": -2,
            "createdAt": "2026-01-01T00:00:00Z",
            "categoryId": "c",
            "sellerId": "s"
        }))
        .expect("record should parse");

        let rejected = RejectedProduct::from_validation(&product).expect("negative stock is rejected");
        assert_eq!(rejected.product_id, ProductId("sku-neg".to_owned()));
        assert!(rejected.reason.contains("stock quantity"));

        let fine = Product { stock_quantity: 3, ..product };
        assert_eq!(RejectedProduct::from_validation(&fine), None);
    }
}
