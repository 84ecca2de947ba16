//! Delete board receipt command

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteBoardReceiptResponse {
    pub id: i64,
    pub deleted: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteBoardReceiptError {
    #[error("Board receipt not found for id={0}")]
    NotFound(i64),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, id: i64) -> Result<DeleteBoardReceiptResponse, DeleteBoardReceiptError> {
    let result = sqlx::query("DELETE FROM board_receipts WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        tracing::warn!(receipt_id = id, "Cannot delete board receipt because it does not exist");
        return Err(DeleteBoardReceiptError::NotFound(id));
    }

    tracing::info!(receipt_id = id, "Board receipt deleted");

    Ok(DeleteBoardReceiptResponse { id, deleted: true })
}
