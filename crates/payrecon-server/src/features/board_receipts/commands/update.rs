//! Update board receipt command
//!
//! Replaces every editable field of an existing receipt.

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
pub struct UpdateBoardReceiptCommand {
    pub board_ref: String,
    pub employer_ref: String,
    pub amount: BigDecimal,
    pub utr_number: String,
    #[serde(default)]
    pub status: BoardReceiptStatus,
    pub maker: String,
    #[serde(default)]
    pub checker: Option<String>,
    pub receipt_date: NaiveDate,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateBoardReceiptError {
    #[error(transparent)]
    Invalid(#[from] FieldError),
    #[error("Board receipt not found for id={0}")]
    NotFound(i64),
    #[error("Board receipt with board_ref '{0}' already exists")]
    DuplicateBoardRef(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl UpdateBoardReceiptCommand {
    pub fn validate(&self) -> Result<(), FieldError> {
        check_text("board_ref", &self.board_ref, MAX_REF_LEN)?;
        check_text("employer_ref", &self.employer_ref, MAX_REF_LEN)?;
        check_amount(&self.amount)?;
        check_text("utr_number", &self.utr_number, MAX_UTR_LEN)?;
        check_text("maker", &self.maker, MAX_USER_LEN)?;
        if let Some(checker) = &self.checker {
            check_text("checker", checker, MAX_USER_LEN)?;
        }
        Ok(())
    }
}

#[tracing::instrument(skip(pool, command))]
pub async fn handle(
    pool: PgPool,
    id: i64,
    command: UpdateBoardReceiptCommand,
) -> Result<BoardReceipt, UpdateBoardReceiptError> {
    command.validate()?;

    let sql = format!(
        r#"
        UPDATE board_receipts
        SET board_ref = $2,
            employer_ref = $3,
            amount = $4,
            utr_number = $5,
            status = $6,
            maker = $7,
            checker = $8,
            receipt_date = $9,
            updated_at = NOW()
        WHERE id = $1
        RETURNING {BOARD_RECEIPT_COLUMNS}
        "#
    );

    let receipt = sqlx::query_as::<_, BoardReceipt>(&sql)
        .bind(id)
        .bind(command.board_ref.trim())
        .bind(command.employer_ref.trim())
        .bind(&command.amount)
        .bind(command.utr_number.trim())
        .bind(command.status.as_str())
        .bind(command.maker.trim())
        .bind(command.checker.as_deref().map(str::trim))
        .bind(command.receipt_date)
        .fetch_optional(&pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                UpdateBoardReceiptError::DuplicateBoardRef(command.board_ref.clone())
            } else {
                UpdateBoardReceiptError::Database(e)
            }
        })?
        .ok_or(UpdateBoardReceiptError::NotFound(id))?;

    tracing::info!(receipt_id = receipt.id, status = %receipt.status, "Board receipt updated");

    Ok(receipt)
}
