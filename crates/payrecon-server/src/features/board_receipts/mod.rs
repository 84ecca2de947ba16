//! Board receipts
//!
//! Receipts issued by the welfare board for employer payments. A maker
//! records a receipt as `PENDING`; a checker later processes it against
//! the bank transfer's UTR number, which marks it `VERIFIED`. Updates,
//! deletions and processing run through the auditor.

pub mod commands;
pub mod models;
pub mod queries;
pub mod routes;

pub use models::{
    BoardReceipt, BoardReceiptStatus, FieldError, DELETE_BOARD_RECEIPT, PROCESS_BOARD_RECEIPT,
    UPDATE_BOARD_RECEIPT,
};
pub use routes::board_receipts_routes;
