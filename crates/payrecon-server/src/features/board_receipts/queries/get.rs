//! Get board receipt query

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::board_receipts::models::{BoardReceipt, BOARD_RECEIPT_COLUMNS};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetBoardReceiptQuery {
    pub id: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum GetBoardReceiptError {
    #[error("Board receipt not found for id={0}")]
    NotFound(i64),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    query: GetBoardReceiptQuery,
) -> Result<BoardReceipt, GetBoardReceiptError> {
    let sql = format!("SELECT {BOARD_RECEIPT_COLUMNS} FROM board_receipts WHERE id = $1");

    sqlx::query_as::<_, BoardReceipt>(&sql)
        .bind(query.id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| {
            tracing::warn!(receipt_id = query.id, "Board receipt not found");
            GetBoardReceiptError::NotFound(query.id)
        })
}
