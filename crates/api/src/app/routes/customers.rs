use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use storders_core::CustomerId;
use storders_directory::{CustomerPatch, NewCustomer};
use storders_infra::{CustomerFilter, Page};

use crate::app::{dto, errors, AppState};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_customer).get(list_customers))
        .route("/:id", get(get_customer).put(update_customer))
}

#[derive(Debug, Deserialize)]
pub struct ListCustomersParams {
    pub search: Option<String>,
    pub country: Option<String>,
    #[serde(default)]
    pub skip: u32,
    pub limit: Option<u32>,
}

pub async fn create_customer(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<NewCustomer>,
) -> axum::response::Response {
    match state.customers.create_customer(body).await {
        Ok(customer) => {
            (StatusCode::CREATED, Json(dto::customer_to_json(customer))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_customers(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<ListCustomersParams>,
) -> axum::response::Response {
    let filter = CustomerFilter {
        search: params.search,
        country: params.country,
    };
    let page = Page::new(params.skip, params.limit.unwrap_or(Page::default().limit));

    match state.customers.list_customers(filter, page).await {
        Ok(customers) => Json(
            customers
                .into_iter()
                .map(dto::customer_to_json)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_customer(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CustomerId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid customer id")
        }
    };
    match state.customers.get_customer(id).await {
        Ok(Some(customer)) => Json(dto::customer_to_json(customer)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "customer not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_customer(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<CustomerPatch>,
) -> axum::response::Response {
    let id: CustomerId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid customer id")
        }
    };
    match state.customers.update_customer(id, body).await {
        Ok(Some(customer)) => Json(dto::customer_to_json(customer)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "customer not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
