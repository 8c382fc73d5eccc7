use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::Product;

/// Batch-level normalization baselines.
///
/// Always derived from the batch being scored; a category subset gets its own means.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStatistics {
    pub product_count: usize,
    pub mean_price: f64,
    pub mean_sales_per_day: f64,
}

impl CatalogStatistics {
    pub fn from_products<'a, I>(products: I) -> Self
    where
        I: IntoIterator<Item = &'a Product>,
    {
        let mut product_count = 0usize;
        let mut price_total = Some(Decimal::ZERO);
        let mut running_mean = Decimal::ZERO;
        let mut sales_per_day_total = 0.0;

        for product in products {
            product_count += 1;
            price_total = price_total.and_then(|total| total.checked_add(product.price));
            running_mean = step_mean(running_mean, product.price, product_count);
            sales_per_day_total += product.sales_per_day();
        }

        if product_count == 0 {
            return Self::default();
        }

        // Decimal keeps currency sums exact; a sum past Decimal::MAX falls back to the running mean.
        let mean_price = price_total
            .map(|total| total / Decimal::from(product_count))
            .unwrap_or(running_mean)
            .to_f64()
            .unwrap_or_default();

        Self {
            product_count,
            mean_price,
            mean_sales_per_day: sales_per_day_total / product_count as f64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.product_count == 0
    }
}

/// `mean + (price - mean) / count`, which stays within range for any representable prices.
fn step_mean(mean: Decimal, price: Decimal, count: usize) -> Decimal {
    price
        .checked_sub(mean)
        .and_then(|delta| delta.checked_div(Decimal::from(count)))
        .and_then(|step| mean.checked_add(step))
        .unwrap_or(mean)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::CatalogStatistics;
    use crate::domain::product::{CategoryId, Product, ProductId, SellerId};

    fn priced(id: &str, price: i64, sales_last_week: u64) -> Product {
        Product {
            id: ProductId(id.to_owned()),
            title: id.to_owned(),
            price: Decimal::from(price),
            rating: 4.0,
            review_count: 0,
            sales_count: 0,
            sales_last_week,
            stock_quantity: 10,
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).single().expect("valid date"),
            category_id: CategoryId("c".to_owned()),
            seller_id: SellerId("s".to_owned()),
            view_count: 0,
            is_trending: false,
            is_seasonal: false,
        }
    }

    #[test]
    fn empty_batch_yields_zeroed_statistics() {
        let stats = CatalogStatistics::from_products(std::iter::empty::<&Product>());
        assert!(stats.is_empty());
        assert_eq!(stats.mean_price, 0.0);
        assert_eq!(stats.mean_sales_per_day, 0.0);
    }

    #[test]
    fn means_cover_the_whole_batch() {
        let products = [priced("a", 100, 7), priced("b", 100, 14), priced("c", 400, 0)];
        let stats = CatalogStatistics::from_products(&products);

        assert_eq!(stats.product_count, 3);
        assert!((stats.mean_price - 200.0).abs() < 1e-9);
        assert!((stats.mean_sales_per_day - 1.0).abs() < 1e-9);
    }

    #[test]
    fn single_product_batch_uses_its_own_values() {
        let products = [priced("solo", 59, 21)];
        let stats = CatalogStatistics::from_products(&products);

        assert!((stats.mean_price - 59.0).abs() < 1e-9);
        assert!((stats.mean_sales_per_day - 3.0).abs() < 1e-9);
    }

    #[test]
    fn mean_survives_a_price_sum_beyond_decimal_range() {
        let near_max = Decimal::from_i128_with_scale(70_000_000_000_000_000_000_000_000_000, 0);
        let mut first = priced("first", 1, 7);
        first.price = near_max;
        let mut second = priced("second", 1, 7);
        second.price = near_max;

        let stats = CatalogStatistics::from_products([&first, &second]);

        assert!((stats.mean_price / 7e28 - 1.0).abs() < 1e-12, "mean was {}", stats.mean_price);
    }
}
