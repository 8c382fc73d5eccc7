use std::path::PathBuf;

use bazaar_core::config::AppConfig;
use bazaar_core::domain::product::ProductId;
use bazaar_core::errors::ApplicationError;
use bazaar_core::ranking::{RankingResponse, ViewKind};
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use tracing::info;

use crate::commands::{input, CommandResult};

#[derive(Debug, Clone, Args)]
pub struct RankArgs {
    #[arg(long, help = "JSON file holding a ranking request or a bare product array")]
    pub input: PathBuf,
    #[arg(long, value_enum, help = "View to produce; defaults to the one named in the input")]
    pub view: Option<ViewArg>,
    #[arg(long, help = "Reference product id for the similar view")]
    pub reference: Option<String>,
    #[arg(long, help = "Maximum number of products to return (0 uses the view default)")]
    pub limit: Option<usize>,
    #[arg(long, help = "Reference instant as RFC 3339; defaults to now")]
    pub as_of: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ViewArg {
    Recommendations,
    Similar,
    Trending,
    Deals,
}

pub fn run(config: &AppConfig, args: &RankArgs) -> CommandResult {
    match execute(config, args) {
        Ok(response) => {
            let message = format!(
                "{} view returned {} products ({} rejected)",
                response.view.name(),
                response.scored_products.len(),
                response.rejected.len()
            );
            match serde_json::to_value(&response) {
                Ok(data) => CommandResult::success_with_data("rank", message, data),
                Err(error) => CommandResult::failure(
                    "rank",
                    "serialization",
                    format!("could not encode ranking response: {error}"),
                    1,
                ),
            }
        }
        Err(error) => CommandResult::from_error("rank", &error),
    }
}

fn execute(config: &AppConfig, args: &RankArgs) -> Result<RankingResponse, ApplicationError> {
    let service = config
        .ranking_service()
        .map_err(|error| ApplicationError::Configuration(error.to_string()))?;

    let mut request = input::read_request(&args.input)?;
    request.view = resolve_view(args.view, args.reference.as_deref(), request.view)?;
    if args.limit.is_some() {
        request.limit = args.limit;
    }

    let as_of = resolve_as_of(args.as_of.as_deref())?;
    info!(
        event_name = "cli.rank.started",
        input = %args.input.display(),
        view = request.view.name(),
        product_count = request.products.len(),
        as_of = %as_of,
        "ranking input"
    );

    Ok(service.handle(request, as_of)?)
}

fn resolve_view(
    view: Option<ViewArg>,
    reference: Option<&str>,
    requested: ViewKind,
) -> Result<ViewKind, ApplicationError> {
    let similar = |reference: &str| ViewKind::Similar { reference_id: ProductId(reference.to_owned()) };

    match (view, reference) {
        (Some(ViewArg::Similar), Some(reference)) | (None, Some(reference)) => Ok(similar(reference)),
        (Some(ViewArg::Similar), None) => match requested {
            ViewKind::Similar { .. } => Ok(requested),
            _ => Err(ApplicationError::Input(
                "--reference is required for the similar view".to_string(),
            )),
        },
        (Some(ViewArg::Recommendations), _) => Ok(ViewKind::Recommendations),
        (Some(ViewArg::Trending), _) => Ok(ViewKind::Trending),
        (Some(ViewArg::Deals), _) => Ok(ViewKind::Deals),
        (None, None) => Ok(requested),
    }
}

fn resolve_as_of(raw: Option<&str>) -> Result<DateTime<Utc>, ApplicationError> {
    match raw {
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map(|instant| instant.with_timezone(&Utc))
            .map_err(|error| {
                ApplicationError::Input(format!("--as-of `{value}` is not RFC 3339: {error}"))
            }),
        None => Ok(Utc::now()),
    }
}
