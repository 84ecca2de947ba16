//! Call auditing
//!
//! Selected service operations run through [`Auditor::audited`], which
//! records one [`AuditEvent`] per call into an [`AuditStore`]. Each event
//! carries the request's trace id, the acting principal (or `system`), the
//! caller's IP and user agent, a JSON snapshot of the arguments and, on
//! success, a JSON snapshot of the result.
//!
//! Reads are not audited. The recorded trail is exposed read-only under
//! `/api/v1/audit-events`.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use payrecon_server::audit::{AuditedOperation, Auditor, PgAuditStore, RequestContext};
//! use sqlx::PgPool;
//!
//! const REVERSE_PAYMENT: AuditedOperation =
//!     AuditedOperation::new("REVERSE_PAYMENT", "WORKER_PAYMENT");
//!
//! # async fn reverse(id: i64) -> Result<i64, sqlx::Error> { Ok(id) }
//! # async fn example(pool: PgPool, ctx: RequestContext) -> Result<(), sqlx::Error> {
//! let auditor = Auditor::new(Arc::new(PgAuditStore::new(pool)), true);
//! let reversed = auditor
//!     .audited(&ctx, REVERSE_PAYMENT, (42_i64,), |(id,)| reverse(id))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod auditor;
mod context;
mod models;
mod queries;
mod routes;
mod snapshot;
mod store;

#[cfg(test)]
mod auditor_tests;

pub use auditor::Auditor;
pub use context::{RequestContext, RequestContextProvider, USER_ID_HEADER};
pub use models::{
    AuditEvent, AuditOutcome, AuditQuery, AuditedOperation, NewAuditEvent, UnknownOutcome,
    DEFAULT_AUDIT_QUERY_LIMIT, MAX_AUDIT_QUERY_LIMIT, SYSTEM_USER,
};
pub use queries::{create_audit_event, get_trace_events, query_audit_events};
pub use routes::audit_routes;
pub use snapshot::{UNSERIALIZABLE_ARGUMENTS, UNSERIALIZABLE_RESULT};
pub use store::{AuditStore, AuditStoreError, InMemoryAuditStore, PgAuditStore};
