//! Payrecon Server Library
//!
//! HTTP back office for payment reconciliation.
//!
//! # Overview
//!
//! - **Call auditing**: selected write operations run through
//!   [`audit::Auditor`], which records one audit event per call with the
//!   request's trace id, principal, client IP, user agent and JSON
//!   snapshots of arguments and result
//! - **Board receipts**: create, list, update, delete and verify receipts
//! - **Audit trail API**: read recorded events back by filter or trace id
//!
//! # Architecture
//!
//! Features are vertical slices under [`features`], each split into
//! commands (writes), queries (reads) and routes. Only commands are
//! audited; the auditor is passed explicitly through [`features::FeatureState`]
//! and reads request facts from [`audit::RequestContext`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use payrecon_server::{api, audit, config::Config, features::FeatureState};
//! use sqlx::postgres::PgPoolOptions;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let db = PgPoolOptions::new().connect(&config.database.url).await?;
//!     let store = Arc::new(audit::PgAuditStore::new(db.clone()));
//!     let state = FeatureState {
//!         db,
//!         auditor: audit::Auditor::new(store, config.audit.enabled),
//!     };
//!     let app = api::create_router(state, &config);
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod api;
pub mod audit;
pub mod config;
pub mod error;
pub mod features;
pub mod middleware;

pub use error::AppError;
