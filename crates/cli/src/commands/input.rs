use std::fs;
use std::path::Path;

use bazaar_core::errors::ApplicationError;
use bazaar_core::ranking::RankingRequest;
use serde_json::Value;

/// Reads a ranking request document.
///
/// Accepts either a full request object (`products`, optional `settings`, `view`, `limit`)
/// or a bare JSON array of products, which is treated as a default recommendations request.
pub fn read_request(path: &Path) -> Result<RankingRequest, ApplicationError> {
    let raw = fs::read_to_string(path).map_err(|error| {
        ApplicationError::Input(format!("could not read `{}`: {error}", path.display()))
    })?;

    let document: Value = serde_json::from_str(&raw).map_err(|error| {
        ApplicationError::Input(format!("`{}` is not valid JSON: {error}", path.display()))
    })?;

    if document.is_array() {
        let products = serde_json::from_value(document).map_err(|error| {
            ApplicationError::Input(format!("product array in `{}`: {error}", path.display()))
        })?;
        return Ok(RankingRequest { products, ..RankingRequest::default() });
    }

    serde_json::from_value(document).map_err(|error| {
        ApplicationError::Input(format!("ranking request in `{}`: {error}", path.display()))
    })
}
