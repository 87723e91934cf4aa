//! MCP server handler over the tool dispatcher.

use std::sync::Arc;

use notion_mcp_core::Dispatcher;
use rmcp::{
    model::{
        CallToolRequestParam, CallToolResult, JsonObject, ListToolsResult, PaginatedRequestParam,
        ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    RoleServer, ServerHandler,
};
use serde_json::Value;

pub const SERVER_NAME: &str = "notion-mcp-server";

const INSTRUCTIONS: &str = "Tools for reading and editing a Notion workspace: pages, databases, \
content blocks, and search. Tool results are Markdown text.";

#[derive(Clone)]
pub struct NotionMcpServer {
    dispatcher: Arc<Dispatcher>,
}

impl NotionMcpServer {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Run one tool call. Failures come back as error results, never as protocol errors.
    pub async fn call(&self, name: &str, arguments: Option<JsonObject>) -> CallToolResult {
        let arguments = arguments.map(Value::Object);
        self.dispatcher
            .dispatch(name, arguments.as_ref())
            .await
            .into()
    }
}

impl ServerHandler for NotionMcpServer {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.server_info.name = SERVER_NAME.to_string();
        info.server_info.version = env!("CARGO_PKG_VERSION").to_string();
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.instructions = Some(INSTRUCTIONS.to_string());
        info
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::ErrorData> {
        Ok(ListToolsResult::with_all_items(self.dispatcher.list_tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        Ok(self.call(&request.name, request.arguments).await)
    }
}
