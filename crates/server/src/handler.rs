//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use crate::tools::substance_lookup::{SubstanceLookupParams, lookup_impl};
use crate::tools::substance_vocabulary::vocabulary_impl;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use std::sync::Arc;
use subscope_client::SubstanceLookup;

/// The main MCP server handler for subscope.
#[derive(Clone)]
pub struct SubscopeServer {
    lookup: Arc<SubstanceLookup>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl SubscopeServer {
    /// Create a new server handler around a shared lookup.
    pub fn new(lookup: Arc<SubstanceLookup>) -> Self {
        Self { lookup, tool_router: Self::tool_router() }
    }

    /// Look up substances by name.
    ///
    /// Names are matched case- and punctuation-insensitively against canonical names and aliases.
    #[tool(
        description = "Look up drug/substance names. Returns dosage, duration, effects and interaction data per name from PsychonautWiki, falling back to TripSit, plus the names no source knows."
    )]
    async fn substance_lookup(&self, params: Parameters<SubstanceLookupParams>) -> Result<CallToolResult, McpError> {
        lookup_impl(&self.lookup, params.0).await
    }

    /// List known substance names.
    #[tool(description = "List every lowercase substance name and alias known to the enabled sources.")]
    async fn substance_vocabulary(&self) -> Result<CallToolResult, McpError> {
        vocabulary_impl(&self.lookup).await
    }
}

impl ServerHandler for SubscopeServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "subscope".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
