use std::env;
use std::fs;
use std::path::Path;

use bazaar_core::config::{resolve_config_path, AppConfig};
use toml::Value;

pub fn run(config: &AppConfig, explicit_path: Option<&Path>) -> String {
    let config_file_path = resolve_config_path(explicit_path);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let weights = &config.ranking.weights;
    let thresholds = &config.ranking.thresholds;
    let boosts = &config.ranking.boosts;
    let limits = &config.views.limits;

    let fields: [(&str, String, &[&str]); 19] = [
        ("ranking.weights.rating", weights.rating.to_string(), &["BAZAAR_RANKING_WEIGHT_RATING"]),
        (
            "ranking.weights.sales_speed",
            weights.sales_speed.to_string(),
            &["BAZAAR_RANKING_WEIGHT_SALES_SPEED"],
        ),
        ("ranking.weights.price", weights.price.to_string(), &["BAZAAR_RANKING_WEIGHT_PRICE"]),
        ("ranking.weights.stock", weights.stock.to_string(), &["BAZAAR_RANKING_WEIGHT_STOCK"]),
        ("ranking.weights.seller", weights.seller.to_string(), &["BAZAAR_RANKING_WEIGHT_SELLER"]),
        (
            "ranking.thresholds.min_rating",
            thresholds.min_rating.to_string(),
            &["BAZAAR_RANKING_MIN_RATING"],
        ),
        (
            "ranking.thresholds.min_sales_per_day",
            thresholds.min_sales_per_day.to_string(),
            &["BAZAAR_RANKING_MIN_SALES_PER_DAY"],
        ),
        (
            "ranking.thresholds.max_price_deviation_pct",
            thresholds.max_price_deviation_pct.to_string(),
            &["BAZAAR_RANKING_MAX_PRICE_DEVIATION_PCT"],
        ),
        (
            "ranking.thresholds.min_stock",
            thresholds.min_stock.to_string(),
            &["BAZAAR_RANKING_MIN_STOCK"],
        ),
        (
            "ranking.boosts.new_product",
            boosts.new_product.to_string(),
            &["BAZAAR_RANKING_BOOST_NEW_PRODUCT"],
        ),
        ("ranking.boosts.trending", boosts.trending.to_string(), &["BAZAAR_RANKING_BOOST_TRENDING"]),
        ("ranking.boosts.seasonal", boosts.seasonal.to_string(), &["BAZAAR_RANKING_BOOST_SEASONAL"]),
        (
            "views.recommendations_limit",
            limits.recommendations.to_string(),
            &["BAZAAR_VIEWS_RECOMMENDATIONS_LIMIT"],
        ),
        ("views.similar_limit", limits.similar.to_string(), &["BAZAAR_VIEWS_SIMILAR_LIMIT"]),
        ("views.trending_limit", limits.trending.to_string(), &["BAZAAR_VIEWS_TRENDING_LIMIT"]),
        ("views.deals_limit", limits.deals.to_string(), &["BAZAAR_VIEWS_DEALS_LIMIT"]),
        (
            "views.similar_price_band_pct",
            config.views.similar_price_band_pct.to_string(),
            &["BAZAAR_VIEWS_SIMILAR_PRICE_BAND_PCT"],
        ),
        (
            "logging.level",
            config.logging.level.clone(),
            &["BAZAAR_LOGGING_LEVEL", "BAZAAR_LOG_LEVEL"],
        ),
        (
            "logging.format",
            format!("{:?}", config.logging.format).to_ascii_lowercase(),
            &["BAZAAR_LOGGING_FORMAT", "BAZAAR_LOG_FORMAT"],
        ),
    ];

    let file_label = config_file_path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<none>".to_string());
    let mut lines = vec![
        format!("effective config (source precedence: flag > env > file > default, file: {file_label}):"),
    ];
    for (key, value, env_keys) in fields {
        let source =
            field_source(key, env_keys, config_file_doc.as_ref(), config_file_path.as_deref());
        lines.push(render_line(key, &value, source));
    }

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use super::contains_path;

    #[test]
    fn contains_path_walks_nested_tables() {
        let doc: toml::Value = "[ranking.weights]\nprice = 40\n".parse().expect("valid toml");
        assert!(contains_path(&doc, "ranking.weights.price"));
        assert!(!contains_path(&doc, "ranking.weights.rating"));
        assert!(!contains_path(&doc, "views.deals_limit"));
    }
}
