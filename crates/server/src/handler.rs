//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use crate::tools::page_ask::{PageAskParams, ask_impl};
use crate::tools::page_batch_load::{PageBatchLoadParams, batch_load_impl};
use crate::tools::page_load::{PageLoadParams, load_impl};

use pagechat_client::{Extractor, GeminiClient, LanguageModel};
use pagechat_core::{AppConfig, Error};
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

/// The main MCP server handler for pagechat.
#[derive(Clone)]
pub struct PageChatServer {
    config: AppConfig,
    extractor: Arc<Extractor>,
    model: Option<Arc<dyn LanguageModel>>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl PageChatServer {
    /// Create a server handler from explicit parts.
    pub fn new(config: AppConfig, extractor: Arc<Extractor>, model: Option<Arc<dyn LanguageModel>>) -> Self {
        Self { config, extractor, model, tool_router: Self::tool_router() }
    }

    /// Build the production extractor and, when an API key is configured,
    /// the Gemini client.
    pub fn from_config(config: AppConfig) -> Result<Self, Error> {
        let extractor = Arc::new(Extractor::from_config(&config)?);

        let model: Option<Arc<dyn LanguageModel>> = match GeminiClient::from_app_config(&config) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::warn!("page_ask disabled: {e}");
                None
            }
        };

        tracing::info!(
            dynamic_rendering = extractor.dynamic_available(),
            llm = model.is_some(),
            "pagechat server configured"
        );

        Ok(Self::new(config, extractor, model))
    }

    /// Load one web page and return its readable text.
    #[tool(
        description = "Load a web page and extract its readable text. Tries headless rendering first when available, \
                       then falls back to a static fetch. Returns a JSON outcome with status, method and text."
    )]
    async fn page_load(&self, params: Parameters<PageLoadParams>) -> Result<CallToolResult, McpError> {
        load_impl(&self.extractor, params.0).await
    }

    /// Load several pages concurrently.
    #[tool(
        description = "Load multiple web pages with bounded concurrency. Returns one outcome per URL in input order \
                       plus a summary."
    )]
    async fn page_batch_load(&self, params: Parameters<PageBatchLoadParams>) -> Result<CallToolResult, McpError> {
        batch_load_impl(self.extractor.clone(), params.0).await
    }

    /// Ask a question about loaded page text.
    #[tool(
        description = "Answer a question about page text using the conversation history you pass in. Returns the \
                       answer and the updated history."
    )]
    async fn page_ask(&self, params: Parameters<PageAskParams>) -> Result<CallToolResult, McpError> {
        ask_impl(self.model.as_deref(), self.config.max_prompt_chars, params.0).await
    }
}

impl ServerHandler for PageChatServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "pagechat".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Call page_load with a URL to get its text, then page_ask with that text, your history and a question."
                    .into(),
            ),
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
