//! HTTP API application wiring (Axum router + service wiring).
//!
//! This folder is structured like:
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};

use storders_infra::{CustomerStore, HealthStore, OrderStore, ProductStore};

pub mod dto;
pub mod errors;
pub mod routes;

/// Dependency-injected persistence handles, one per collaborator service.
///
/// Constructed once at process start; requests share it read-only. All
/// durable state lives behind the store handles, never in the router.
#[derive(Clone)]
pub struct AppState {
    pub customers: Arc<dyn CustomerStore>,
    pub products: Arc<dyn ProductStore>,
    pub orders: Arc<dyn OrderStore>,
    pub health: Arc<dyn HealthStore>,
}

impl AppState {
    /// Wire every service onto one shared store implementation.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: CustomerStore + ProductStore + OrderStore + HealthStore + 'static,
    {
        Self {
            customers: store.clone(),
            products: store.clone(),
            orders: store.clone(),
            health: store,
        }
    }
}

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(state: AppState) -> Router {
    routes::router().layer(Extension(Arc::new(state)))
}
