use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::DomainError;
use crate::ranking::{
    AISettings, Boosts, RankingEngine, RankingService, RankingViews, RankingWeights, Thresholds,
    ViewConfig,
};

pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["bazaar.toml", "config/bazaar.toml"];

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub ranking: RankingConfig,
    pub views: ViewConfig,
    pub logging: LoggingConfig,
}

/// Raw ranking values; validated into [`AISettings`] by [`AppConfig::ranking_settings`].
#[derive(Clone, Debug, PartialEq, Default)]
pub struct RankingConfig {
    pub weights: RankingWeights,
    pub thresholds: Thresholds,
    pub boosts: Boosts,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub similar_price_band_pct: Option<f64>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ranking: RankingConfig::default(),
            views: ViewConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_CANDIDATES[0]));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// Validated engine settings built from the `[ranking]` section
    pub fn ranking_settings(&self) -> Result<AISettings, ConfigError> {
        AISettings::new(self.ranking.weights, self.ranking.thresholds, self.ranking.boosts).map_err(
            |error| match error {
                DomainError::InvalidSettings(detail) => {
                    ConfigError::Validation(format!("ranking.{detail}"))
                }
                other => ConfigError::Validation(other.to_string()),
            },
        )
    }

    /// Ranking service wired with the configured settings and view defaults
    pub fn ranking_service(&self) -> Result<RankingService, ConfigError> {
        let engine = RankingEngine::new(self.ranking_settings()?);
        Ok(RankingService::new(RankingViews::new(engine, self.views)))
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(ranking) = patch.ranking {
            if let Some(weights) = ranking.weights {
                let target = &mut self.ranking.weights;
                if let Some(value) = weights.rating {
                    target.rating = value;
                }
                if let Some(value) = weights.sales_speed {
                    target.sales_speed = value;
                }
                if let Some(value) = weights.price {
                    target.price = value;
                }
                if let Some(value) = weights.stock {
                    target.stock = value;
                }
                if let Some(value) = weights.seller {
                    target.seller = value;
                }
            }

            if let Some(thresholds) = ranking.thresholds {
                let target = &mut self.ranking.thresholds;
                if let Some(value) = thresholds.min_rating {
                    target.min_rating = value;
                }
                if let Some(value) = thresholds.min_sales_per_day {
                    target.min_sales_per_day = value;
                }
                if let Some(value) = thresholds.max_price_deviation_pct {
                    target.max_price_deviation_pct = value;
                }
                if let Some(value) = thresholds.min_stock {
                    target.min_stock = value;
                }
            }

            if let Some(boosts) = ranking.boosts {
                let target = &mut self.ranking.boosts;
                if let Some(value) = boosts.new_product {
                    target.new_product = value;
                }
                if let Some(value) = boosts.trending {
                    target.trending = value;
                }
                if let Some(value) = boosts.seasonal {
                    target.seasonal = value;
                }
            }
        }

        if let Some(views) = patch.views {
            if let Some(value) = views.recommendations_limit {
                self.views.limits.recommendations = value;
            }
            if let Some(value) = views.similar_limit {
                self.views.limits.similar = value;
            }
            if let Some(value) = views.trending_limit {
                self.views.limits.trending = value;
            }
            if let Some(value) = views.deals_limit {
                self.views.limits.deals = value;
            }
            if let Some(value) = views.similar_price_band_pct {
                self.views.similar_price_band_pct = value;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let weights = &mut self.ranking.weights;
        override_from_env("BAZAAR_RANKING_WEIGHT_RATING", &mut weights.rating)?;
        override_from_env("BAZAAR_RANKING_WEIGHT_SALES_SPEED", &mut weights.sales_speed)?;
        override_from_env("BAZAAR_RANKING_WEIGHT_PRICE", &mut weights.price)?;
        override_from_env("BAZAAR_RANKING_WEIGHT_STOCK", &mut weights.stock)?;
        override_from_env("BAZAAR_RANKING_WEIGHT_SELLER", &mut weights.seller)?;

        let thresholds = &mut self.ranking.thresholds;
        override_from_env("BAZAAR_RANKING_MIN_RATING", &mut thresholds.min_rating)?;
        override_from_env("BAZAAR_RANKING_MIN_SALES_PER_DAY", &mut thresholds.min_sales_per_day)?;
        override_from_env(
            "BAZAAR_RANKING_MAX_PRICE_DEVIATION_PCT",
            &mut thresholds.max_price_deviation_pct,
        )?;
        override_from_env("BAZAAR_RANKING_MIN_STOCK", &mut thresholds.min_stock)?;

        let boosts = &mut self.ranking.boosts;
        override_from_env("BAZAAR_RANKING_BOOST_NEW_PRODUCT", &mut boosts.new_product)?;
        override_from_env("BAZAAR_RANKING_BOOST_TRENDING", &mut boosts.trending)?;
        override_from_env("BAZAAR_RANKING_BOOST_SEASONAL", &mut boosts.seasonal)?;

        let limits = &mut self.views.limits;
        override_from_env("BAZAAR_VIEWS_RECOMMENDATIONS_LIMIT", &mut limits.recommendations)?;
        override_from_env("BAZAAR_VIEWS_SIMILAR_LIMIT", &mut limits.similar)?;
        override_from_env("BAZAAR_VIEWS_TRENDING_LIMIT", &mut limits.trending)?;
        override_from_env("BAZAAR_VIEWS_DEALS_LIMIT", &mut limits.deals)?;
        override_from_env(
            "BAZAAR_VIEWS_SIMILAR_PRICE_BAND_PCT",
            &mut self.views.similar_price_band_pct,
        )?;

        let log_level = read_env("BAZAAR_LOGGING_LEVEL").or_else(|| read_env("BAZAAR_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("BAZAAR_LOGGING_FORMAT").or_else(|| read_env("BAZAAR_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(band) = overrides.similar_price_band_pct {
            self.views.similar_price_band_pct = band;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ranking_settings()?;
        validate_views(&self.views)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    CONFIG_FILE_CANDIDATES.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_views(views: &ViewConfig) -> Result<(), ConfigError> {
    let limits = [
        ("views.recommendations_limit", views.limits.recommendations),
        ("views.similar_limit", views.limits.similar),
        ("views.trending_limit", views.limits.trending),
        ("views.deals_limit", views.limits.deals),
    ];
    for (key, value) in limits {
        if value == 0 {
            return Err(ConfigError::Validation(format!("{key} must be greater than zero")));
        }
    }

    let band = views.similar_price_band_pct;
    if !band.is_finite() || !(0.0..=100.0).contains(&band) {
        return Err(ConfigError::Validation(
            "views.similar_price_band_pct must be in range 0..=100".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn override_from_env<T: FromStr>(key: &str, target: &mut T) -> Result<(), ConfigError> {
    if let Some(value) = read_env(key) {
        *target = parse_env(key, &value)?;
    }
    Ok(())
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    ranking: Option<RankingPatch>,
    views: Option<ViewsPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct RankingPatch {
    weights: Option<WeightsPatch>,
    thresholds: Option<ThresholdsPatch>,
    boosts: Option<BoostsPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct WeightsPatch {
    rating: Option<f64>,
    sales_speed: Option<f64>,
    price: Option<f64>,
    stock: Option<f64>,
    seller: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct ThresholdsPatch {
    min_rating: Option<f64>,
    min_sales_per_day: Option<f64>,
    max_price_deviation_pct: Option<f64>,
    min_stock: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct BoostsPatch {
    new_product: Option<f64>,
    trending: Option<f64>,
    seasonal: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct ViewsPatch {
    recommendations_limit: Option<usize>,
    similar_limit: Option<usize>,
    trending_limit: Option<usize>,
    deals_limit: Option<usize>,
    similar_price_band_pct: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
    use crate::ranking::AISettings;

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    fn write_config(dir: &TempDir, body: &str) -> Result<std::path::PathBuf, String> {
        let path = dir.path().join("bazaar.toml");
        fs::write(&path, body).map_err(|err| err.to_string())?;
        Ok(path)
    }

    #[test]
    fn defaults_produce_default_settings() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;
        let settings = config.ranking_settings().map_err(|err| err.to_string())?;

        ensure(settings == AISettings::DEFAULT, "defaults should match the engine defaults")?;
        ensure(config.views.limits.recommendations == 12, "recommendations default to 12")?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_BAZAAR_PRICE_WEIGHT", "42.5");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = write_config(
                &dir,
                r#"
[ranking.weights]
price = ${TEST_BAZAAR_PRICE_WEIGHT}
"#,
            )?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                (config.ranking.weights.price - 42.5).abs() < f64::EPSILON,
                "price weight should be interpolated from the environment",
            )
        })();

        clear_vars(&["TEST_BAZAAR_PRICE_WEIGHT"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("BAZAAR_LOG_LEVEL", "warn");
        env::set_var("BAZAAR_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )
        })();

        clear_vars(&["BAZAAR_LOG_LEVEL", "BAZAAR_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("BAZAAR_RANKING_WEIGHT_STOCK", "5");
        env::set_var("BAZAAR_VIEWS_SIMILAR_PRICE_BAND_PCT", "20");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = write_config(
                &dir,
                r#"
[ranking.weights]
rating = 60
stock = 30

[ranking.thresholds]
min_stock = 3

[views]
similar_price_band_pct = 10
trending_limit = 4

[logging]
level = "warn"
"#,
            )?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    log_level: Some("debug".to_string()),
                    similar_price_band_pct: Some(25.0),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.ranking.weights.rating == 60.0, "file rating weight should apply")?;
            ensure(config.ranking.weights.stock == 5.0, "env stock weight should win over file")?;
            ensure(config.ranking.thresholds.min_stock == 3, "file min_stock should apply")?;
            ensure(config.views.limits.trending == 4, "file trending limit should apply")?;
            ensure(
                config.views.similar_price_band_pct == 25.0,
                "override band should win over env and file",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")
        })();

        clear_vars(&["BAZAAR_RANKING_WEIGHT_STOCK", "BAZAAR_VIEWS_SIMILAR_PRICE_BAND_PCT"]);
        result
    }

    #[test]
    fn zero_weights_fail_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = write_config(
            &dir,
            r#"
[ranking.weights]
rating = 0
sales_speed = 0
price = 0
stock = 0
seller = 0
"#,
        )?;

        let error =
            match AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() }) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
        let has_message = matches!(
            error,
            ConfigError::Validation(ref message) if message.starts_with("ranking.weights")
        );
        ensure(has_message, "validation failure should name ranking.weights")
    }

    #[test]
    fn invalid_env_override_is_reported_with_key() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("BAZAAR_VIEWS_DEALS_LIMIT", "many");

        let result = match AppConfig::load(LoadOptions::default()) {
            Err(ConfigError::InvalidEnvOverride { key, .. }) => {
                ensure(key == "BAZAAR_VIEWS_DEALS_LIMIT", "error should name the env key")
            }
            Err(other) => Err(format!("unexpected error: {other}")),
            Ok(_) => Err("non-numeric limit should be rejected".to_string()),
        };

        clear_vars(&["BAZAAR_VIEWS_DEALS_LIMIT"]);
        result
    }

    #[test]
    fn missing_required_file_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let result = AppConfig::load(LoadOptions {
            config_path: Some(dir.path().join("absent.toml")),
            require_file: true,
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(_))),
            "missing required file should fail",
        )
    }
}
