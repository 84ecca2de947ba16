//! Process board receipt command
//!
//! A checker confirms a pending receipt against the bank transfer: the UTR
//! number and checker are recorded and the receipt becomes `VERIFIED`.
//! The row is locked for the duration so two checkers cannot both verify
//! the same receipt.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::board_receipts::models::{
    check_text, BoardReceipt, BoardReceiptStatus, FieldError, BOARD_RECEIPT_COLUMNS, MAX_REF_LEN,
    MAX_USER_LEN, MAX_UTR_LEN,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessBoardReceiptCommand {
    pub board_ref: String,
    pub utr_number: String,
    pub checker: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessBoardReceiptResponse {
    pub message: String,
    pub board_ref: String,
    pub employer_ref: String,
    pub utr_number: String,
    pub status: BoardReceiptStatus,
    pub amount: BigDecimal,
    pub checker: Option<String>,
    pub processed_date: NaiveDate,
}

impl From<BoardReceipt> for ProcessBoardReceiptResponse {
    fn from(receipt: BoardReceipt) -> Self {
        Self {
            message: "Board receipt processed successfully".to_string(),
            board_ref: receipt.board_ref,
            employer_ref: receipt.employer_ref,
            utr_number: receipt.utr_number,
            status: receipt.status,
            amount: receipt.amount,
            checker: receipt.checker,
            processed_date: receipt.receipt_date,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessBoardReceiptError {
    #[error(transparent)]
    Invalid(#[from] FieldError),
    #[error("Board receipt not found for board_ref '{0}'")]
    NotFound(String),
    #[error("Board receipt '{0}' is already verified")]
    AlreadyVerified(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ProcessBoardReceiptCommand {
    pub fn validate(&self) -> Result<(), FieldError> {
        check_text("board_ref", &self.board_ref, MAX_REF_LEN)?;
        check_text("utr_number", &self.utr_number, MAX_UTR_LEN)?;
        check_text("checker", &self.checker, MAX_USER_LEN)?;
        Ok(())
    }
}

#[tracing::instrument(skip(pool, command), fields(board_ref = %command.board_ref, checker = %command.checker))]
pub async fn handle(
    pool: PgPool,
    command: ProcessBoardReceiptCommand,
) -> Result<ProcessBoardReceiptResponse, ProcessBoardReceiptError> {
    command.validate()?;
    let board_ref = command.board_ref.trim();

    let mut tx = pool.begin().await?;

    let locked = format!("SELECT {BOARD_RECEIPT_COLUMNS} FROM board_receipts WHERE board_ref = $1 FOR UPDATE");
    let current = sqlx::query_as::<_, BoardReceipt>(&locked)
        .bind(board_ref)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ProcessBoardReceiptError::NotFound(board_ref.to_string()))?;

    if current.status == BoardReceiptStatus::Verified {
        return Err(ProcessBoardReceiptError::AlreadyVerified(board_ref.to_string()));
    }

    let sql = format!(
        r#"
        UPDATE board_receipts
        SET utr_number = $2,
            checker = $3,
            status = $4,
            updated_at = NOW()
        WHERE id = $1
        RETURNING {BOARD_RECEIPT_COLUMNS}
        "#
    );

    let receipt = sqlx::query_as::<_, BoardReceipt>(&sql)
        .bind(current.id)
        .bind(command.utr_number.trim())
        .bind(command.checker.trim())
        .bind(BoardReceiptStatus::Verified.as_str())
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(receipt_id = receipt.id, "Board receipt verified");

    Ok(receipt.into())
}
