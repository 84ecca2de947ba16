//! Payrecon Common Library
//!
//! Shared utilities for the payrecon workspace members.
//!
//! - **Logging**: tracing subscriber setup driven by environment variables
//! - **Error Handling**: the error type returned by the shared utilities
//!
//! # Example
//!
//! ```no_run
//! use payrecon_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> payrecon_common::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     let _guard = init_logging(&config)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod error;
pub mod logging;

pub use error::{CommonError, Result};
