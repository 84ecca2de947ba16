//! Database queries for audit events

use serde_json::Value as JsonValue;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

use super::models::{AuditEvent, AuditQuery, NewAuditEvent};

const AUDIT_EVENT_COLUMNS: &str = "id, action, resource_type, trace_id, user_id, outcome, \
     details, old_values, new_values, client_ip, user_agent, metadata, occurred_at";

/// Insert one audit event and return the stored row
pub async fn create_audit_event(
    pool: &PgPool,
    event: NewAuditEvent,
    metadata: Option<JsonValue>,
) -> Result<AuditEvent, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO audit_events (
            action, resource_type, trace_id, user_id, outcome,
            details, old_values, new_values, client_ip, user_agent, metadata
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING {AUDIT_EVENT_COLUMNS}
        "#
    );

    let record = sqlx::query_as::<_, AuditEvent>(&sql)
        .bind(&event.action)
        .bind(&event.resource_type)
        .bind(&event.trace_id)
        .bind(&event.user_id)
        .bind(event.outcome.as_str())
        .bind(&event.details)
        .bind(&event.old_values)
        .bind(&event.new_values)
        .bind(&event.client_ip)
        .bind(&event.user_agent)
        .bind(&metadata)
        .fetch_one(pool)
        .await?;

    debug!(
        audit_id = %record.id,
        action = %record.action,
        trace_id = %record.trace_id,
        outcome = %record.outcome,
        "Created audit event"
    );

    Ok(record)
}

/// Filtered audit events, newest first
pub async fn query_audit_events(
    pool: &PgPool,
    query: &AuditQuery,
) -> Result<Vec<AuditEvent>, sqlx::Error> {
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {AUDIT_EVENT_COLUMNS} FROM audit_events WHERE 1=1"));

    if let Some(action) = &query.action {
        builder.push(" AND action = ").push_bind(action);
    }
    if let Some(resource_type) = &query.resource_type {
        builder.push(" AND resource_type = ").push_bind(resource_type);
    }
    if let Some(user_id) = &query.user_id {
        builder.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(trace_id) = &query.trace_id {
        builder.push(" AND trace_id = ").push_bind(trace_id);
    }
    if let Some(outcome) = query.outcome {
        builder.push(" AND outcome = ").push_bind(outcome.as_str());
    }
    if let Some(start_time) = query.start_time {
        builder.push(" AND occurred_at >= ").push_bind(start_time);
    }
    if let Some(end_time) = query.end_time {
        builder.push(" AND occurred_at <= ").push_bind(end_time);
    }

    builder
        .push(" ORDER BY occurred_at DESC, id DESC LIMIT ")
        .push_bind(query.effective_limit())
        .push(" OFFSET ")
        .push_bind(query.effective_offset());

    let records = builder.build_query_as::<AuditEvent>().fetch_all(pool).await?;

    debug!(count = records.len(), "Queried audit events");

    Ok(records)
}

/// Every event recorded under one trace id, oldest first
pub async fn get_trace_events(pool: &PgPool, trace_id: &str) -> Result<Vec<AuditEvent>, sqlx::Error> {
    let sql = format!(
        "SELECT {AUDIT_EVENT_COLUMNS} FROM audit_events WHERE trace_id = $1 ORDER BY occurred_at ASC, id ASC"
    );

    sqlx::query_as::<_, AuditEvent>(&sql)
        .bind(trace_id)
        .fetch_all(pool)
        .await
}
