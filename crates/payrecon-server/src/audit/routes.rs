//! Read-only HTTP access to recorded audit events

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use serde_json::json;

use super::models::{AuditEvent, AuditQuery};
use super::store::AuditStore;
use crate::api::response::ApiResponse;
use crate::error::AppError;

pub fn audit_routes() -> Router<Arc<dyn AuditStore>> {
    Router::new()
        .route("/", get(list_audit_events))
        .route("/trace/:trace_id", get(trace_audit_events))
}

#[tracing::instrument(skip(store))]
async fn list_audit_events(
    State(store): State<Arc<dyn AuditStore>>,
    Query(query): Query<AuditQuery>,
) -> Result<ApiResponse<Vec<AuditEvent>>, AppError> {
    let events = store.query_events(&query).await?;
    let meta = json!({
        "count": events.len(),
        "limit": query.effective_limit(),
        "offset": query.effective_offset(),
    });
    Ok(ApiResponse::success_with_meta(events, meta))
}

#[tracing::instrument(skip(store))]
async fn trace_audit_events(
    State(store): State<Arc<dyn AuditStore>>,
    Path(trace_id): Path<String>,
) -> Result<ApiResponse<Vec<AuditEvent>>, AppError> {
    let events = store.events_for_trace(&trace_id).await?;
    let meta = json!({ "count": events.len() });
    Ok(ApiResponse::success_with_meta(events, meta))
}
