//! Create board receipt command
//!
//! New receipts always start out `PENDING`; a checker moves them to
//! `VERIFIED` through the process command.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::board_receipts::models::{
    check_amount, check_text, BoardReceipt, BoardReceiptStatus, FieldError, BOARD_RECEIPT_COLUMNS,
    MAX_REF_LEN, MAX_USER_LEN, MAX_UTR_LEN,
};
use crate::features::shared::error_helpers::is_unique_violation;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBoardReceiptCommand {
    pub board_ref: String,
    pub employer_ref: String,
    pub amount: BigDecimal,
    pub utr_number: String,
    pub maker: String,
    pub receipt_date: NaiveDate,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateBoardReceiptError {
    #[error(transparent)]
    Invalid(#[from] FieldError),
    #[error("Board receipt with board_ref '{0}' already exists")]
    DuplicateBoardRef(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl CreateBoardReceiptCommand {
    pub fn validate(&self) -> Result<(), FieldError> {
        check_text("board_ref", &self.board_ref, MAX_REF_LEN)?;
        check_text("employer_ref", &self.employer_ref, MAX_REF_LEN)?;
        check_amount(&self.amount)?;
        check_text("utr_number", &self.utr_number, MAX_UTR_LEN)?;
        check_text("maker", &self.maker, MAX_USER_LEN)?;
        Ok(())
    }
}

#[tracing::instrument(skip(pool, command), fields(board_ref = %command.board_ref))]
pub async fn handle(
    pool: PgPool,
    command: CreateBoardReceiptCommand,
) -> Result<BoardReceipt, CreateBoardReceiptError> {
    command.validate()?;

    let sql = format!(
        r#"
        INSERT INTO board_receipts (
            board_ref, employer_ref, amount, utr_number, status, maker, receipt_date
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {BOARD_RECEIPT_COLUMNS}
        "#
    );

    let receipt = sqlx::query_as::<_, BoardReceipt>(&sql)
        .bind(command.board_ref.trim())
        .bind(command.employer_ref.trim())
        .bind(&command.amount)
        .bind(command.utr_number.trim())
        .bind(BoardReceiptStatus::Pending.as_str())
        .bind(command.maker.trim())
        .bind(command.receipt_date)
        .fetch_one(&pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CreateBoardReceiptError::DuplicateBoardRef(command.board_ref.clone())
            } else {
                CreateBoardReceiptError::Database(e)
            }
        })?;

    tracing::info!(receipt_id = receipt.id, "Board receipt created");

    Ok(receipt)
}
