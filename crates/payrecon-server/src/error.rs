//! Server-specific error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::response::ErrorResponse;
use crate::audit::AuditStoreError;

/// Errors surfaced by handlers that have no feature-specific error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Audit store error: {0}")]
    AuditStore(#[from] AuditStoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::AuditStore(ref e) => {
                tracing::error!(error = %e, "Audit store error");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "AUDIT_STORE_ERROR",
                    "Audit trail is unavailable",
                )
            },
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}
