use std::sync::Arc;

use axum::{extract::Extension, response::IntoResponse, Json};

use crate::app::AppState;

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

pub async fn health_db(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    match state.health.ping().await {
        Ok(()) => Json(serde_json::json!({ "status": "healthy", "database": "connected" })),
        Err(e) => Json(serde_json::json!({ "status": "unhealthy", "database": e.to_string() })),
    }
}
