use std::path::PathBuf;

use bazaar_core::ranking::RejectedProduct;
use clap::Args;
use serde::Serialize;

use crate::commands::{input, CommandResult};

#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    #[arg(long, help = "JSON file holding a ranking request or a bare product array")]
    pub input: PathBuf,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidationSummary {
    accepted: usize,
    rejected: Vec<RejectedProduct>,
}

/// Exits 3 when any record would be dropped by the engine.
pub fn run(args: &ValidateArgs) -> CommandResult {
    let request = match input::read_request(&args.input) {
        Ok(request) => request,
        Err(error) => return CommandResult::from_error("validate", &error),
    };

    let mut summary = ValidationSummary { accepted: 0, rejected: Vec::new() };
    for product in &request.products {
        match RejectedProduct::from_validation(product) {
            None => summary.accepted += 1,
            Some(rejection) => summary.rejected.push(rejection),
        }
    }

    let message =
        format!("{} records accepted, {} rejected", summary.accepted, summary.rejected.len());
    let data = match serde_json::to_value(&summary) {
        Ok(data) => data,
        Err(error) => {
            return CommandResult::failure(
                "validate",
                "serialization",
                format!("could not encode validation summary: {error}"),
                1,
            )
        }
    };

    if summary.rejected.is_empty() {
        CommandResult::success_with_data("validate", message, data)
    } else {
        CommandResult::failure_with_data("validate", "input", message, data, 3)
    }
}
