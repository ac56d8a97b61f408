use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use storders_catalog::{NewProduct, ProductPatch};
use storders_core::ProductId;
use storders_infra::{Page, ProductFilter};

use crate::app::{dto, errors, AppState};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[derive(Debug, Deserialize)]
pub struct ListProductsParams {
    pub category: Option<String>,
    pub family: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub skip: u32,
    pub limit: Option<u32>,
}

pub async fn create_product(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<NewProduct>,
) -> axum::response::Response {
    match state.products.create_product(body).await {
        Ok(product) => (StatusCode::CREATED, Json(dto::product_to_json(product))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_products(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<ListProductsParams>,
) -> axum::response::Response {
    let filter = ProductFilter {
        category: params.category,
        family: params.family,
        search: params.search,
    };
    let page = Page::new(params.skip, params.limit.unwrap_or(Page::default().limit));

    match state.products.list_products(filter, page).await {
        Ok(products) => Json(
            products
                .into_iter()
                .map(dto::product_to_json)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id")
        }
    };
    match state.products.get_product(id).await {
        Ok(Some(product)) => Json(dto::product_to_json(product)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ProductPatch>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id")
        }
    };
    match state.products.update_product(id, body).await {
        Ok(Some(product)) => Json(dto::product_to_json(product)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Soft delete: the product drops out of listings but stays resolvable for
/// existing orders and point lookups.
pub async fn delete_product(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id")
        }
    };
    match state.products.deactivate_product(id).await {
        Ok(Some(product)) => Json(dto::product_to_json(product)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
