//! Board receipt queries (read operations)

pub mod get;
pub mod list;

pub use get::{GetBoardReceiptError, GetBoardReceiptQuery};
pub use list::{ListBoardReceiptsError, ListBoardReceiptsQuery, ListBoardReceiptsResponse};
