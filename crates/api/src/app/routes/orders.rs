use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use storders_core::{CustomerId, OrderId, ProductId};
use storders_infra::{OrderFilter, Page};
use storders_orders::{NewOrder, NewOrderItem, OrderStatus, OrderUpdate};

use crate::app::{dto, errors, AppState};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route(
            "/:id",
            get(get_order).put(update_order).delete(cancel_order),
        )
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersParams {
    pub status: Option<OrderStatus>,
    pub customer_id: Option<String>,
    #[serde(default)]
    pub skip: u32,
    pub limit: Option<u32>,
}

pub async fn create_order(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<dto::CreateOrderRequest>,
) -> axum::response::Response {
    let customer_id: CustomerId = match body.customer_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid customer id")
        }
    };

    // Boundary validation: the lifecycle engine trusts positive quantities.
    let mut items = Vec::with_capacity(body.items.len());
    for line in body.items {
        let product_id: ProductId = match line.product_id.parse() {
            Ok(v) => v,
            Err(_) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_id",
                    "invalid product id",
                )
            }
        };
        if line.quantity == 0 || line.quantity > i32::MAX as u32 {
            return errors::json_error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "quantity must be a positive integer",
            );
        }
        items.push(NewOrderItem {
            product_id,
            quantity: line.quantity as i32,
        });
    }

    let new = NewOrder {
        customer_id,
        shipping_address: body.shipping_address,
        notes: body.notes,
        items,
    };

    match state.orders.create_order(new).await {
        Ok(order) => (StatusCode::CREATED, Json(dto::order_to_json(order))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_orders(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<ListOrdersParams>,
) -> axum::response::Response {
    let customer_id = match params.customer_id.as_deref() {
        Some(raw) => match raw.parse::<CustomerId>() {
            Ok(v) => Some(v),
            Err(_) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_id",
                    "invalid customer id",
                )
            }
        },
        None => None,
    };

    let filter = OrderFilter {
        status: params.status,
        customer_id,
    };
    let page = Page::new(params.skip, params.limit.unwrap_or(Page::default().limit));

    match state.orders.list_orders(filter, page).await {
        Ok(orders) => Json(
            orders
                .into_iter()
                .map(dto::order_to_json)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id")
        }
    };
    match state.orders.get_order(id).await {
        Ok(Some(order)) => Json(dto::order_to_json(order)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "order not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_order(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateOrderRequest>,
) -> axum::response::Response {
    let id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id")
        }
    };

    let update = OrderUpdate {
        status: body.status,
        shipping_address: body.shipping_address,
        notes: body.notes,
    };

    match state.orders.update_order(id, update).await {
        Ok(Some(order)) => Json(dto::order_to_json(order)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "order not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Cancellation is modeled as a status update; DELETE keeps the original
/// wire surface but removes nothing.
pub async fn cancel_order(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id")
        }
    };
    match state.orders.cancel_order(id).await {
        Ok(Some(order)) => Json(dto::order_to_json(order)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "order not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
