//! MCP tool definitions wrapping the orders REST API.
//!
//! Every tool forwards to the HTTP API and returns the raw JSON body as
//! text. The agent never talks to the store directly; the API remains the
//! single authority for validation, pricing, and numbering.

use rust_mcp_sdk::macros::{mcp_tool, JsonSchema};
use rust_mcp_sdk::schema::{schema_utils::CallToolError, CallToolResult, TextContent};
use rust_mcp_sdk::tool_box;

/// Shared HTTP client plus the base URL of the REST API.
pub struct ApiContext {
    client: reqwest::Client,
    base_url: String,
}

impl ApiContext {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    async fn get(
        &self,
        path: &str,
        query: &[(&str, Option<&str>)],
    ) -> Result<CallToolResult, CallToolError> {
        let query: Vec<(&str, &str)> = query
            .iter()
            .filter_map(|(k, v)| v.map(|v| (*k, v)))
            .collect();
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(&query)
            .send()
            .await
            .map_err(CallToolError::new)?;
        into_result(response).await
    }

    async fn send_json(
        &self,
        method: reqwest::Method,
        path: &str,
        body: serde_json::Value,
    ) -> Result<CallToolResult, CallToolError> {
        let response = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await
            .map_err(CallToolError::new)?;
        into_result(response).await
    }
}

async fn into_result(response: reqwest::Response) -> Result<CallToolResult, CallToolError> {
    let status = response.status();
    let text = response.text().await.map_err(CallToolError::new)?;
    if status.is_success() {
        Ok(CallToolResult::text_content(vec![TextContent::from(text)]))
    } else {
        Err(CallToolError::new(std::io::Error::other(format!(
            "API error {status}: {text}"
        ))))
    }
}

/// List ST semiconductor products
#[mcp_tool(
    name = "list_products",
    description = "List ST semiconductor products. Filter by category, product family, or search term."
)]
#[derive(Debug, ::serde::Deserialize, ::serde::Serialize, JsonSchema)]
pub struct ListProductsTool {
    /// Category filter (substring match)
    #[serde(default)]
    pub category: Option<String>,
    /// Product family filter (substring match)
    #[serde(default)]
    pub family: Option<String>,
    /// Search term over name, part number, and description
    #[serde(default)]
    pub search: Option<String>,
}

impl ListProductsTool {
    pub async fn call_tool(&self, api: &ApiContext) -> Result<CallToolResult, CallToolError> {
        api.get(
            "/api/v1/products",
            &[
                ("category", self.category.as_deref()),
                ("family", self.family.as_deref()),
                ("search", self.search.as_deref()),
            ],
        )
        .await
    }
}

/// Get details of a specific product
#[mcp_tool(
    name = "get_product",
    description = "Get details of a specific product by its ID."
)]
#[derive(Debug, ::serde::Deserialize, ::serde::Serialize, JsonSchema)]
pub struct GetProductTool {
    /// Product ID (UUID)
    pub product_id: String,
}

impl GetProductTool {
    pub async fn call_tool(&self, api: &ApiContext) -> Result<CallToolResult, CallToolError> {
        api.get(&format!("/api/v1/products/{}", self.product_id), &[])
            .await
    }
}

/// List customers
#[mcp_tool(
    name = "list_customers",
    description = "List customers. Filter by search term or country."
)]
#[derive(Debug, ::serde::Deserialize, ::serde::Serialize, JsonSchema)]
pub struct ListCustomersTool {
    /// Search term over company and contact name
    #[serde(default)]
    pub search: Option<String>,
    /// Country filter (substring match)
    #[serde(default)]
    pub country: Option<String>,
}

impl ListCustomersTool {
    pub async fn call_tool(&self, api: &ApiContext) -> Result<CallToolResult, CallToolError> {
        api.get(
            "/api/v1/customers",
            &[
                ("search", self.search.as_deref()),
                ("country", self.country.as_deref()),
            ],
        )
        .await
    }
}

/// Get details of a specific customer
#[mcp_tool(
    name = "get_customer",
    description = "Get details of a specific customer by their ID."
)]
#[derive(Debug, ::serde::Deserialize, ::serde::Serialize, JsonSchema)]
pub struct GetCustomerTool {
    /// Customer ID (UUID)
    pub customer_id: String,
}

impl GetCustomerTool {
    pub async fn call_tool(&self, api: &ApiContext) -> Result<CallToolResult, CallToolError> {
        api.get(&format!("/api/v1/customers/{}", self.customer_id), &[])
            .await
    }
}

/// List orders
#[mcp_tool(
    name = "list_orders",
    description = "List orders. Filter by status (pending/confirmed/processing/shipped/delivered/cancelled) or customer_id."
)]
#[derive(Debug, ::serde::Deserialize, ::serde::Serialize, JsonSchema)]
pub struct ListOrdersTool {
    /// Status filter (lowercase token)
    #[serde(default)]
    pub status: Option<String>,
    /// Customer ID filter (UUID)
    #[serde(default)]
    pub customer_id: Option<String>,
}

impl ListOrdersTool {
    pub async fn call_tool(&self, api: &ApiContext) -> Result<CallToolResult, CallToolError> {
        api.get(
            "/api/v1/orders",
            &[
                ("status", self.status.as_deref()),
                ("customer_id", self.customer_id.as_deref()),
            ],
        )
        .await
    }
}

/// Get details of a specific order
#[mcp_tool(
    name = "get_order",
    description = "Get details of a specific order by its ID, including line items."
)]
#[derive(Debug, ::serde::Deserialize, ::serde::Serialize, JsonSchema)]
pub struct GetOrderTool {
    /// Order ID (UUID)
    pub order_id: String,
}

impl GetOrderTool {
    pub async fn call_tool(&self, api: &ApiContext) -> Result<CallToolResult, CallToolError> {
        api.get(&format!("/api/v1/orders/{}", self.order_id), &[])
            .await
    }
}

/// One requested order line.
#[derive(Debug, ::serde::Deserialize, ::serde::Serialize, JsonSchema)]
pub struct OrderItemArg {
    /// Product ID (UUID)
    pub product_id: String,
    /// Quantity (positive integer)
    pub quantity: u32,
}

/// Create a new order
#[mcp_tool(
    name = "create_order",
    description = "Create a new order. Items is a list of objects with 'product_id' and 'quantity' keys; prices come from the catalog, not from the caller."
)]
#[derive(Debug, ::serde::Deserialize, ::serde::Serialize, JsonSchema)]
pub struct CreateOrderTool {
    /// Customer ID (UUID)
    pub customer_id: String,
    /// Requested lines
    pub items: Vec<OrderItemArg>,
    /// Optional shipping address
    #[serde(default)]
    pub shipping_address: Option<String>,
    /// Optional free-text notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateOrderTool {
    pub async fn call_tool(&self, api: &ApiContext) -> Result<CallToolResult, CallToolError> {
        let mut payload = serde_json::json!({
            "customer_id": self.customer_id,
            "items": self.items,
        });
        if let Some(shipping_address) = &self.shipping_address {
            payload["shipping_address"] = serde_json::json!(shipping_address);
        }
        if let Some(notes) = &self.notes {
            payload["notes"] = serde_json::json!(notes);
        }
        api.send_json(reqwest::Method::POST, "/api/v1/orders", payload)
            .await
    }
}

/// Update an order's status
#[mcp_tool(
    name = "update_order_status",
    description = "Update an order's status. Valid statuses: pending, confirmed, processing, shipped, delivered, cancelled."
)]
#[derive(Debug, ::serde::Deserialize, ::serde::Serialize, JsonSchema)]
pub struct UpdateOrderStatusTool {
    /// Order ID (UUID)
    pub order_id: String,
    /// New status (lowercase token)
    pub status: String,
}

impl UpdateOrderStatusTool {
    pub async fn call_tool(&self, api: &ApiContext) -> Result<CallToolResult, CallToolError> {
        api.send_json(
            reqwest::Method::PUT,
            &format!("/api/v1/orders/{}", self.order_id),
            serde_json::json!({ "status": self.status }),
        )
        .await
    }
}

tool_box!(
    OrdersTools,
    [
        ListProductsTool,
        GetProductTool,
        ListCustomersTool,
        GetCustomerTool,
        ListOrdersTool,
        GetOrderTool,
        CreateOrderTool,
        UpdateOrderStatusTool
    ]
);
