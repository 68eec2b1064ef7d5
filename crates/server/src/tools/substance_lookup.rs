//! substance_lookup tool implementation.
//!
//! Resolves raw substance names against PsychonautWiki, then TripSit.

use crate::error::ToolError;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use subscope_client::SubstanceLookup;
use subscope_core::SubstanceRecord;

/// Most names accepted in one call.
pub const MAX_NAMES: usize = 100;

/// Parameters for the substance_lookup tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SubstanceLookupParams {
    /// Substance names as they appear in text (e.g., "Molly", "L.S.D.").
    pub names: Vec<String>,
}

/// Output from the substance_lookup tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SubstanceLookupOutput {
    /// One record per resolved name, keyed by the name as given.
    pub results: BTreeMap<String, SubstanceRecord>,
    /// Names no source knows, in request order.
    pub missing: Vec<String>,
}

/// Check the request and drop blank and repeated names.
fn requested_names(params: SubstanceLookupParams) -> Result<Vec<String>, ToolError> {
    let mut names: Vec<String> = Vec::new();
    for name in params.names {
        let name = name.trim();
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }

    if names.is_empty() {
        return Err(ToolError::InvalidInput("at least one non-blank name is required".into()));
    }
    if names.len() > MAX_NAMES {
        return Err(ToolError::InvalidInput(format!("at most {MAX_NAMES} names per call, got {}", names.len())));
    }

    Ok(names)
}

pub async fn lookup_output(
    lookup: &SubstanceLookup, params: SubstanceLookupParams,
) -> Result<SubstanceLookupOutput, ToolError> {
    let names = requested_names(params)?;
    let mut found = lookup.lookup(&names).await;

    let mut results = BTreeMap::new();
    let mut missing = Vec::new();
    for name in names {
        match found.remove(&name) {
            Some(record) => {
                results.insert(name, record);
            }
            None => missing.push(name),
        }
    }

    tracing::info!(resolved = results.len(), missing = missing.len(), "substance_lookup");
    Ok(SubstanceLookupOutput { results, missing })
}

/// Implementation of the substance_lookup tool.
pub async fn lookup_impl(lookup: &SubstanceLookup, params: SubstanceLookupParams) -> Result<CallToolResult, McpError> {
    let output = lookup_output(lookup, params).await?;
    let json = serde_json::to_string_pretty(&output).map_err(ToolError::from)?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use subscope_client::{ScriptedTransport, TransportResponse};
    use subscope_core::{AppConfig, ManualClock};

    fn lookup() -> SubstanceLookup {
        let transport = Arc::new(ScriptedTransport::new(|_| {
            Ok(TransportResponse::ok(json!({
                "data": { "substances": [{ "name": "LSD", "commonNames": ["Acid"] }] }
            })))
        }));
        let config = AppConfig { enable_tripsit: false, retry_max_attempts: 1, ..AppConfig::default() };
        SubstanceLookup::with_transport(&config, transport, Arc::new(ManualClock::new()))
    }

    #[test]
    fn test_requested_names_trims_and_dedupes() {
        let params = SubstanceLookupParams { names: vec![" Acid ".into(), "Acid".into(), "".into(), "MDMA".into()] };
        assert_eq!(requested_names(params).unwrap(), vec!["Acid", "MDMA"]);
    }

    #[test]
    fn test_requested_names_limit() {
        let params = SubstanceLookupParams { names: (0..=MAX_NAMES).map(|i| format!("name{i}")).collect() };
        assert!(matches!(requested_names(params), Err(ToolError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_lookup_impl_empty_names() {
        let params = SubstanceLookupParams { names: vec!["  ".into()] };
        let result = lookup_impl(&lookup(), params).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_lookup_output_splits_missing() {
        let params = SubstanceLookupParams { names: vec!["Acid".into(), "Unknownium".into()] };
        let output = lookup_output(&lookup(), params).await.unwrap();

        assert_eq!(output.results["Acid"].name, "LSD");
        assert_eq!(output.missing, vec!["Unknownium"]);
    }

    #[tokio::test]
    async fn test_lookup_impl_success() {
        let params = SubstanceLookupParams { names: vec!["LSD".into()] };
        let result = lookup_impl(&lookup(), params).await;
        assert!(result.is_ok());
    }
}
