//! Board receipt commands (write operations)

pub mod create;
pub mod delete;
pub mod process;
pub mod update;

pub use create::{CreateBoardReceiptCommand, CreateBoardReceiptError};
pub use delete::{DeleteBoardReceiptError, DeleteBoardReceiptResponse};
pub use process::{ProcessBoardReceiptCommand, ProcessBoardReceiptError, ProcessBoardReceiptResponse};
pub use update::{UpdateBoardReceiptCommand, UpdateBoardReceiptError};
