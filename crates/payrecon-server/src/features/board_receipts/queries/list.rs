//! List board receipts query
//!
//! Receipts are listed inside a mandatory `receipt_date` window, newest
//! first, optionally narrowed to one status.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::api::response::PaginationMeta;
use crate::features::board_receipts::models::{
    BoardReceipt, BoardReceiptStatus, BOARD_RECEIPT_COLUMNS,
};
use crate::features::shared::PaginationParams;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListBoardReceiptsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<BoardReceiptStatus>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListBoardReceiptsResponse {
    pub items: Vec<BoardReceipt>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, thiserror::Error)]
pub enum ListBoardReceiptsError {
    #[error("start_date is required")]
    StartDateRequired,
    #[error("end_date is required")]
    EndDateRequired,
    #[error("start_date {start} is after end_date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ListBoardReceiptsQuery {
    /// Checked `(start, end)` window
    pub fn date_range(&self) -> Result<(NaiveDate, NaiveDate), ListBoardReceiptsError> {
        let start = self.start_date.ok_or(ListBoardReceiptsError::StartDateRequired)?;
        let end = self.end_date.ok_or(ListBoardReceiptsError::EndDateRequired)?;
        if start > end {
            return Err(ListBoardReceiptsError::InvalidRange { start, end });
        }
        Ok((start, end))
    }

    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.per_page)
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    query: ListBoardReceiptsQuery,
) -> Result<ListBoardReceiptsResponse, ListBoardReceiptsError> {
    let (start, end) = query.date_range()?;
    let pagination = query.pagination();
    let status = query.status.map(|s| s.as_str());

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM board_receipts
        WHERE receipt_date BETWEEN $1 AND $2
          AND ($3::TEXT IS NULL OR status = $3)
        "#,
    )
    .bind(start)
    .bind(end)
    .bind(status)
    .fetch_one(&pool)
    .await?;

    let sql = format!(
        r#"
        SELECT {BOARD_RECEIPT_COLUMNS}
        FROM board_receipts
        WHERE receipt_date BETWEEN $1 AND $2
          AND ($3::TEXT IS NULL OR status = $3)
        ORDER BY receipt_date DESC, id DESC
        LIMIT $4 OFFSET $5
        "#
    );

    let items = sqlx::query_as::<_, BoardReceipt>(&sql)
        .bind(start)
        .bind(end)
        .bind(status)
        .bind(pagination.per_page())
        .bind(pagination.offset())
        .fetch_all(&pool)
        .await?;

    tracing::debug!(count = items.len(), total, "Listed board receipts");

    Ok(ListBoardReceiptsResponse {
        items,
        pagination: PaginationMeta::new(pagination.page(), pagination.per_page(), total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_date_range_is_mandatory() {
        let query = ListBoardReceiptsQuery {
            end_date: Some(date(31)),
            ..Default::default()
        };
        assert!(matches!(query.date_range(), Err(ListBoardReceiptsError::StartDateRequired)));

        let query = ListBoardReceiptsQuery {
            start_date: Some(date(1)),
            ..Default::default()
        };
        assert!(matches!(query.date_range(), Err(ListBoardReceiptsError::EndDateRequired)));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let query = ListBoardReceiptsQuery {
            start_date: Some(date(20)),
            end_date: Some(date(10)),
            ..Default::default()
        };
        assert!(matches!(query.date_range(), Err(ListBoardReceiptsError::InvalidRange { .. })));

        let same_day = ListBoardReceiptsQuery {
            start_date: Some(date(10)),
            end_date: Some(date(10)),
            ..Default::default()
        };
        assert_eq!(same_day.date_range().unwrap(), (date(10), date(10)));
    }

    #[test]
    fn test_pagination_defaults() {
        let params = ListBoardReceiptsQuery::default().pagination();
        assert_eq!(params.page(), 1);
        assert_eq!(params.per_page(), 20);
    }

    #[test]
    fn test_huge_page_does_not_overflow_offset() {
        let query = ListBoardReceiptsQuery {
            page: Some(i64::MAX),
            ..Default::default()
        };
        assert_eq!(query.pagination().offset(), i64::MAX);
    }
}
