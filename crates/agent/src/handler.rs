//! MCP Server Handler Implementation
//!
//! Implements the ServerHandler trait to handle MCP protocol messages and
//! route tool calls to the API-forwarding tool implementations.

use async_trait::async_trait;
use rust_mcp_sdk::schema::{
    schema_utils::CallToolError, CallToolRequestParams, CallToolResult,
    ListToolsResult, PaginatedRequestParams, RpcError,
};
use rust_mcp_sdk::{mcp_server::ServerHandler, McpServer};
use std::sync::Arc;

use crate::tools::{ApiContext, OrdersTools};

/// Handler for the orders MCP server.
pub struct OrdersServerHandler {
    api: ApiContext,
}

impl OrdersServerHandler {
    pub fn new(api: ApiContext) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ServerHandler for OrdersServerHandler {
    async fn handle_list_tools_request(
        &self,
        _request: Option<PaginatedRequestParams>,
        _runtime: Arc<dyn McpServer>,
    ) -> Result<ListToolsResult, RpcError> {
        Ok(ListToolsResult {
            tools: OrdersTools::tools(),
            meta: None,
            next_cursor: None,
        })
    }

    async fn handle_call_tool_request(
        &self,
        params: CallToolRequestParams,
        _runtime: Arc<dyn McpServer>,
    ) -> Result<CallToolResult, CallToolError> {
        log::info!("Calling tool: {}", params.name);

        // Convert request params into the OrdersTools enum
        let tool: OrdersTools = OrdersTools::try_from(params)?;

        // Match the tool variant and forward it to the REST API
        match tool {
            OrdersTools::ListProductsTool(t) => t.call_tool(&self.api).await,
            OrdersTools::GetProductTool(t) => t.call_tool(&self.api).await,
            OrdersTools::ListCustomersTool(t) => t.call_tool(&self.api).await,
            OrdersTools::GetCustomerTool(t) => t.call_tool(&self.api).await,
            OrdersTools::ListOrdersTool(t) => t.call_tool(&self.api).await,
            OrdersTools::GetOrderTool(t) => t.call_tool(&self.api).await,
            OrdersTools::CreateOrderTool(t) => t.call_tool(&self.api).await,
            OrdersTools::UpdateOrderStatusTool(t) => t.call_tool(&self.api).await,
        }
    }
}
