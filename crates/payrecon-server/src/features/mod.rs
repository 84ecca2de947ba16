//! Feature modules implementing the payrecon API
//!
//! Each feature is a vertical slice with its own commands, queries and
//! routes:
//! - `commands/` - Write operations
//! - `queries/` - Read operations
//! - `routes.rs` - HTTP route definitions
//!
//! The audit trail routes live in [`crate::audit`] and are mounted here
//! alongside the features.

pub mod board_receipts;
pub mod shared;

use axum::Router;

use crate::audit::{audit_routes, Auditor};

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    pub db: sqlx::PgPool,
    /// Wraps the write operations that must leave an audit trail
    pub auditor: Auditor,
}

/// Creates the API router with all feature routes mounted:
/// - `/board-receipts` - Board receipt management
/// - `/audit-events` - Recorded audit trail (read-only)
pub fn router(state: FeatureState) -> Router<()> {
    let audit_store = state.auditor.store().clone();

    Router::new()
        .nest("/board-receipts", board_receipts::board_receipts_routes().with_state(state))
        .nest("/audit-events", audit_routes().with_state(audit_store))
}
