//! Board receipt API routes
//!
//! - `POST /api/v1/board-receipts` - Create a receipt
//! - `GET /api/v1/board-receipts` - List receipts in a date window
//! - `GET /api/v1/board-receipts/:id` - Get one receipt
//! - `PUT /api/v1/board-receipts/:id` - Replace a receipt (audited)
//! - `DELETE /api/v1/board-receipts/:id` - Delete a receipt (audited)
//! - `POST /api/v1/board-receipts/process` - Verify a receipt (audited)
//!
//! GET responses carry an `ETag` and honour `If-None-Match`.

use axum::{
    extract::{Path, Query, State},
    http::{header::LOCATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::{
    commands::{
        self, CreateBoardReceiptCommand, CreateBoardReceiptError, DeleteBoardReceiptError,
        ProcessBoardReceiptCommand, ProcessBoardReceiptError, UpdateBoardReceiptCommand,
        UpdateBoardReceiptError,
    },
    models::{DELETE_BOARD_RECEIPT, PROCESS_BOARD_RECEIPT, UPDATE_BOARD_RECEIPT},
    queries::{self, GetBoardReceiptError, GetBoardReceiptQuery, ListBoardReceiptsError, ListBoardReceiptsQuery},
};
use crate::api::response::{ApiResponse, ErrorResponse};
use crate::audit::RequestContext;
use crate::features::shared::etag::cached_response;
use crate::features::FeatureState;

pub fn board_receipts_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", post(create_board_receipt).get(list_board_receipts))
        .route("/process", post(process_board_receipt))
        .route(
            "/:id",
            get(get_board_receipt)
                .put(update_board_receipt)
                .delete(delete_board_receipt),
        )
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// - `201 Created` with a `Location` header
/// - `400 Bad Request` - Validation error
/// - `409 Conflict` - `board_ref` already exists
#[tracing::instrument(skip(state, command), fields(board_ref = %command.board_ref))]
async fn create_board_receipt(
    State(state): State<FeatureState>,
    Json(command): Json<CreateBoardReceiptCommand>,
) -> Result<Response, BoardReceiptApiError> {
    let receipt = commands::create::handle(state.db, command).await?;
    let location = format!("/api/v1/board-receipts/{}", receipt.id);

    Ok((
        StatusCode::CREATED,
        [(LOCATION, location)],
        Json(ApiResponse::success(receipt)),
    )
        .into_response())
}

#[tracing::instrument(skip(state, ctx, command))]
async fn update_board_receipt(
    State(state): State<FeatureState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(command): Json<UpdateBoardReceiptCommand>,
) -> Result<Response, BoardReceiptApiError> {
    let pool = state.db;
    let receipt = state
        .auditor
        .audited(&ctx, UPDATE_BOARD_RECEIPT, (id, command), |(id, command)| {
            commands::update::handle(pool, id, command)
        })
        .await?;

    Ok(ApiResponse::success(receipt).into_response())
}

/// `204 No Content` on success, `404` when the receipt does not exist
#[tracing::instrument(skip(state, ctx))]
async fn delete_board_receipt(
    State(state): State<FeatureState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<StatusCode, BoardReceiptApiError> {
    let pool = state.db;
    state
        .auditor
        .audited(&ctx, DELETE_BOARD_RECEIPT, (id,), |(id,)| {
            commands::delete::handle(pool, id)
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// - `404 Not Found` - unknown `board_ref`
/// - `409 Conflict` - receipt already verified
#[tracing::instrument(skip(state, ctx, command), fields(board_ref = %command.board_ref))]
async fn process_board_receipt(
    State(state): State<FeatureState>,
    ctx: RequestContext,
    Json(command): Json<ProcessBoardReceiptCommand>,
) -> Result<Response, BoardReceiptApiError> {
    let pool = state.db;
    let processed = state
        .auditor
        .audited(&ctx, PROCESS_BOARD_RECEIPT, (command,), |(command,)| {
            commands::process::handle(pool, command)
        })
        .await?;

    Ok(ApiResponse::success(processed).into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

#[tracing::instrument(skip(state, headers))]
async fn get_board_receipt(
    State(state): State<FeatureState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Response, BoardReceiptApiError> {
    let receipt = queries::get::handle(state.db, GetBoardReceiptQuery { id }).await?;
    Ok(cached_response(&headers, receipt)?)
}

#[tracing::instrument(skip(state, headers))]
async fn list_board_receipts(
    State(state): State<FeatureState>,
    Query(query): Query<ListBoardReceiptsQuery>,
    headers: HeaderMap,
) -> Result<Response, BoardReceiptApiError> {
    let page = queries::list::handle(state.db, query).await?;
    Ok(cached_response(&headers, page)?)
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BoardReceiptApiError {
    #[error(transparent)]
    Create(#[from] CreateBoardReceiptError),
    #[error(transparent)]
    Update(#[from] UpdateBoardReceiptError),
    #[error(transparent)]
    Delete(#[from] DeleteBoardReceiptError),
    #[error(transparent)]
    Process(#[from] ProcessBoardReceiptError),
    #[error(transparent)]
    Get(#[from] GetBoardReceiptError),
    #[error(transparent)]
    List(#[from] ListBoardReceiptsError),
    #[error("Failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BoardReceiptApiError {
    fn classify(&self) -> (StatusCode, &'static str) {
        const VALIDATION: (StatusCode, &str) = (StatusCode::BAD_REQUEST, "VALIDATION_ERROR");
        const NOT_FOUND: (StatusCode, &str) = (StatusCode::NOT_FOUND, "NOT_FOUND");
        const CONFLICT: (StatusCode, &str) = (StatusCode::CONFLICT, "CONFLICT");
        const INTERNAL: (StatusCode, &str) = (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR");

        match self {
            Self::Create(CreateBoardReceiptError::Invalid(_))
            | Self::Update(UpdateBoardReceiptError::Invalid(_))
            | Self::Process(ProcessBoardReceiptError::Invalid(_))
            | Self::List(
                ListBoardReceiptsError::StartDateRequired
                | ListBoardReceiptsError::EndDateRequired
                | ListBoardReceiptsError::InvalidRange { .. },
            ) => VALIDATION,

            Self::Update(UpdateBoardReceiptError::NotFound(_))
            | Self::Delete(DeleteBoardReceiptError::NotFound(_))
            | Self::Process(ProcessBoardReceiptError::NotFound(_))
            | Self::Get(GetBoardReceiptError::NotFound(_)) => NOT_FOUND,

            Self::Create(CreateBoardReceiptError::DuplicateBoardRef(_))
            | Self::Update(UpdateBoardReceiptError::DuplicateBoardRef(_))
            | Self::Process(ProcessBoardReceiptError::AlreadyVerified(_)) => CONFLICT,

            Self::Create(CreateBoardReceiptError::Database(_))
            | Self::Update(UpdateBoardReceiptError::Database(_))
            | Self::Delete(DeleteBoardReceiptError::Database(_))
            | Self::Process(ProcessBoardReceiptError::Database(_))
            | Self::Get(GetBoardReceiptError::Database(_))
            | Self::List(ListBoardReceiptsError::Database(_))
            | Self::Serialization(_) => INTERNAL,
        }
    }
}

impl IntoResponse for BoardReceiptApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.classify();

        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Board receipt request failed");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}
