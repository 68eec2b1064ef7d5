//! substance_vocabulary tool implementation.
//!
//! Lists every lowercase name and alias the enabled sources know, plus the
//! built-in seed names and the configured custom substances.

use crate::error::ToolError;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use subscope_client::SubstanceLookup;

/// Output from the substance_vocabulary tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SubstanceVocabularyOutput {
    /// Sorted, deduplicated names.
    pub names: Vec<String>,
}

pub async fn vocabulary_output(lookup: &SubstanceLookup) -> SubstanceVocabularyOutput {
    SubstanceVocabularyOutput { names: lookup.vocabulary().await.into_iter().collect() }
}

/// Implementation of the substance_vocabulary tool.
pub async fn vocabulary_impl(lookup: &SubstanceLookup) -> Result<CallToolResult, McpError> {
    let output = vocabulary_output(lookup).await;
    let json = serde_json::to_string_pretty(&output).map_err(ToolError::from)?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use subscope_client::{ScriptedTransport, TransportResponse};
    use subscope_core::{AppConfig, ManualClock, builtin_names};

    #[tokio::test]
    async fn test_vocabulary_output() {
        let transport = Arc::new(ScriptedTransport::new(|req| {
            if req.url.contains("getAllDrugs") {
                Ok(TransportResponse::ok(json!({ "data": { "data": { "drugs": {
                    "4-aco-dmt": { "name": "4-AcO-DMT", "aliases": ["Psilacetin"] }
                } } } })))
            } else {
                Ok(TransportResponse::ok(json!({ "data": { "substances": [{ "name": "4-AcO-DMT", "commonNames": null }] } })))
            }
        }));
        let config = AppConfig { custom_substances: vec!["Kava".into()], ..AppConfig::default() };
        let lookup = SubstanceLookup::with_transport(&config, transport, Arc::new(ManualClock::new()));

        let output = vocabulary_output(&lookup).await;
        let extra: Vec<_> = output.names.iter().filter(|name| !builtin_names().contains(*name)).collect();
        assert_eq!(extra, vec!["4-aco-dmt", "kava", "psilacetin"]);
        assert!(output.names.contains(&"molly".to_string()));
    }
}
