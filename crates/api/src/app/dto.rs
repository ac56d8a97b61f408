use serde::Deserialize;

use storders_catalog::Product;
use storders_directory::Customer;
use storders_orders::{Order, OrderItem, OrderStatus};

// -------------------------
// Request DTOs
// -------------------------
//
// Customer and product payloads bind straight onto the domain input types
// (`NewCustomer`, `CustomerPatch`, ...); only orders need their own DTOs,
// because referenced ids arrive as strings and quantities are validated at
// this boundary before the engine ever sees them.

#[derive(Debug, Deserialize)]
pub struct CreateOrderItemRequest {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: String,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<CreateOrderItemRequest>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateOrderRequest {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn customer_to_json(c: Customer) -> serde_json::Value {
    serde_json::json!({
        "id": c.id.to_string(),
        "company_name": c.company_name,
        "contact_name": c.contact_name,
        "contact_email": c.contact_email,
        "phone": c.phone,
        "address": c.address,
        "city": c.city,
        "country": c.country,
        "created_at": c.created_at.to_rfc3339(),
        "updated_at": c.updated_at.to_rfc3339(),
    })
}

pub fn product_to_json(p: Product) -> serde_json::Value {
    serde_json::json!({
        "id": p.id.to_string(),
        "part_number": p.part_number,
        "name": p.name,
        "description": p.description,
        "category": p.category,
        "family": p.family,
        "unit_price": p.unit_price,
        "currency": p.currency,
        "stock_quantity": p.stock_quantity,
        "lead_time_days": p.lead_time_days,
        "is_active": p.is_active,
        "created_at": p.created_at.to_rfc3339(),
        "updated_at": p.updated_at.to_rfc3339(),
    })
}

pub fn order_item_to_json(item: OrderItem) -> serde_json::Value {
    serde_json::json!({
        "id": item.id.to_string(),
        "product_id": item.product_id.to_string(),
        "quantity": item.quantity,
        "unit_price": item.unit_price,
        "line_total": item.line_total,
    })
}

pub fn order_to_json(o: Order) -> serde_json::Value {
    serde_json::json!({
        "id": o.id.to_string(),
        "order_number": o.order_number,
        "customer_id": o.customer_id.to_string(),
        "status": o.status.as_str(),
        "total_amount": o.total_amount,
        "currency": o.currency,
        "shipping_address": o.shipping_address,
        "notes": o.notes,
        "ordered_at": o.ordered_at.to_rfc3339(),
        "shipped_at": o.shipped_at.map(|t| t.to_rfc3339()),
        "delivered_at": o.delivered_at.map(|t| t.to_rfc3339()),
        "created_at": o.created_at.to_rfc3339(),
        "updated_at": o.updated_at.to_rfc3339(),
        "items": o.items.into_iter().map(order_item_to_json).collect::<Vec<_>>(),
    })
}
