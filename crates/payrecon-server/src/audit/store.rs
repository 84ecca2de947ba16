//! Audit store seam
//!
//! [`PgAuditStore`] writes to the `audit_events` table; [`InMemoryAuditStore`]
//! keeps events in a vector for tests and local tooling.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use super::models::{AuditEvent, AuditQuery, NewAuditEvent};
use super::queries;

#[derive(Debug, thiserror::Error)]
pub enum AuditStoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Audit store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence for audit events
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Persist one event, returning it with its assigned id and timestamp
    async fn record_event(
        &self,
        event: NewAuditEvent,
        context: Option<JsonValue>,
    ) -> Result<AuditEvent, AuditStoreError>;

    /// Events matching the query, newest first
    async fn query_events(&self, query: &AuditQuery) -> Result<Vec<AuditEvent>, AuditStoreError>;

    /// All events sharing a trace id, oldest first
    async fn events_for_trace(&self, trace_id: &str) -> Result<Vec<AuditEvent>, AuditStoreError>;
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgAuditStore {
    pool: PgPool,
}

impl PgAuditStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditStore for PgAuditStore {
    async fn record_event(
        &self,
        event: NewAuditEvent,
        context: Option<JsonValue>,
    ) -> Result<AuditEvent, AuditStoreError> {
        Ok(queries::create_audit_event(&self.pool, event, context).await?)
    }

    async fn query_events(&self, query: &AuditQuery) -> Result<Vec<AuditEvent>, AuditStoreError> {
        Ok(queries::query_audit_events(&self.pool, query).await?)
    }

    async fn events_for_trace(&self, trace_id: &str) -> Result<Vec<AuditEvent>, AuditStoreError> {
        Ok(queries::get_trace_events(&self.pool, trace_id).await?)
    }
}

/// Vector-backed store
#[derive(Default)]
pub struct InMemoryAuditStore {
    events: Mutex<Vec<AuditEvent>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every recorded event in insertion order
    pub fn events(&self) -> Vec<AuditEvent> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<AuditEvent>> {
        // A panic while holding the lock cannot leave the vector half-written.
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn record_event(
        &self,
        event: NewAuditEvent,
        context: Option<JsonValue>,
    ) -> Result<AuditEvent, AuditStoreError> {
        let recorded = event.into_recorded(context);
        self.lock().push(recorded.clone());
        Ok(recorded)
    }

    async fn query_events(&self, query: &AuditQuery) -> Result<Vec<AuditEvent>, AuditStoreError> {
        let limit = usize::try_from(query.effective_limit()).unwrap_or(usize::MAX);
        let offset = usize::try_from(query.effective_offset()).unwrap_or(0);

        Ok(self
            .lock()
            .iter()
            .rev()
            .filter(|event| query.matches(event))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn events_for_trace(&self, trace_id: &str) -> Result<Vec<AuditEvent>, AuditStoreError> {
        Ok(self
            .lock()
            .iter()
            .filter(|event| event.trace_id == trace_id)
            .cloned()
            .collect())
    }
}
