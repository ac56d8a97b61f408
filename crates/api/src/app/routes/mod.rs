use axum::{routing::get, Router};

pub mod customers;
pub mod orders;
pub mod products;
pub mod system;

/// Router for the full API surface.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/health/db", get(system::health_db))
        .nest("/api/v1/customers", customers::router())
        .nest("/api/v1/products", products::router())
        .nest("/api/v1/orders", orders::router())
}
