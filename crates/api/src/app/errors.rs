use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use storders_infra::StoreError;

/// Map store failures onto the wire error shape.
///
/// `ReferenceNotFound` is a client-input problem (the request named a
/// product that does not exist); `Transient` means a retry-exhausted
/// serialization conflict the caller may replay.
pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::ReferenceNotFound { entity, id } => json_error(
            StatusCode::BAD_REQUEST,
            "reference_not_found",
            format!("{entity} {id} not found"),
        ),
        StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        StoreError::Transient(msg) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "transient_conflict", msg)
        }
        StoreError::Invariant(msg) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "invariant_violation",
            msg,
        ),
        StoreError::Database(msg) => {
            tracing::error!(error = %msg, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
