//! Shared utilities and types for feature modules
//!
//! - **pagination**: page/per_page parameters
//! - **etag**: ETag and `If-None-Match` handling for GET responses
//! - **validation**: input validation helpers
//! - **error_helpers**: database error classification

pub mod error_helpers;
pub mod etag;
pub mod pagination;
pub mod validation;

pub use pagination::PaginationParams;
pub use validation::{validate_text, TextViolation};
