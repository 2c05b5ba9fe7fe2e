use crate::entities::transfer_order::{self, TransferStatus};
use crate::handlers::common::{
    created_response, map_service_error, success_response, validate_input, PaginationParams,
};
use crate::services::transfers::{
    CreateTransferInput, CreateTransferLine, TransferDetails, TransferExecution, TransferPolicy,
};
use crate::{errors::ApiError, AppState};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Creates the router for transfer endpoints
pub fn transfers_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_transfers).post(create_transfer))
        .route("/:id", get(get_transfer))
        .route("/:id/execute", post(execute_transfer))
        .route("/:id/cancel", post(cancel_transfer))
        .route("/:id/status", put(update_transfer_status))
}

/// Create a transfer order and execute it
///
/// With `draft: true` the order is stored without moving stock and the
/// response carries zero outcome counts; execute it later through
/// `POST /transfers/:id/execute`.
#[utoipa::path(
    post,
    path = "/api/v1/transfers",
    request_body = CreateTransferRequest,
    responses(
        (status = 201, description = "Transfer created; per-line outcomes included", body = crate::ApiResponse<TransferExecution>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Location not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Transfers"
)]
pub async fn create_transfer(
    State(state): State<AppState>,
    Json(payload): Json<CreateTransferRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let policy = payload.policy();
    let draft = payload.draft;
    let input = CreateTransferInput {
        from_location_id: payload.from_location_id,
        to_location_id: payload.to_location_id,
        lines: payload.lines,
        notes: payload.notes,
        requested_by: payload.requested_by,
        draft,
    };

    let TransferDetails { order, lines } = state
        .services
        .transfers
        .create(input)
        .await
        .map_err(map_service_error)?;

    if draft {
        return Ok(created_response(TransferExecution {
            order,
            lines,
            completed_lines: 0,
            failed_lines: 0,
        }));
    }

    let execution = state
        .services
        .transfers
        .execute(order.id, policy)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(execution))
}

/// List transfer orders, newest first
#[utoipa::path(
    get,
    path = "/api/v1/transfers",
    params(TransferListParams),
    responses(
        (status = 200, description = "Transfers retrieved", body = crate::ApiResponse<crate::PaginatedResponse<transfer_order::Model>>),
        (status = 400, description = "Invalid query parameters", body = crate::errors::ErrorResponse)
    ),
    tag = "Transfers"
)]
pub async fn list_transfers(
    State(state): State<AppState>,
    Query(params): Query<TransferListParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (page, limit) = params.pagination().resolve(&state.config)?;

    let (orders, total) = state
        .services
        .transfers
        .list(page, limit, params.status)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(crate::PaginatedResponse::new(
        orders, page, limit, total,
    )))
}

/// Get a transfer order with its lines
#[utoipa::path(
    get,
    path = "/api/v1/transfers/{id}",
    params(
        ("id" = Uuid, Path, description = "Transfer ID")
    ),
    responses(
        (status = 200, description = "Transfer retrieved", body = crate::ApiResponse<TransferDetails>),
        (status = 404, description = "Transfer not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Transfers"
)]
pub async fn get_transfer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let details = state
        .services
        .transfers
        .get(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(details))
}

/// Execute a pending transfer order
#[utoipa::path(
    post,
    path = "/api/v1/transfers/{id}/execute",
    params(
        ("id" = Uuid, Path, description = "Transfer ID")
    ),
    request_body = ExecuteTransferRequest,
    responses(
        (status = 200, description = "Transfer executed", body = crate::ApiResponse<TransferExecution>),
        (status = 400, description = "Transfer is not executable", body = crate::errors::ErrorResponse),
        (status = 404, description = "Transfer not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Transfers"
)]
pub async fn execute_transfer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Option<Json<ExecuteTransferRequest>>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let policy = payload.map(|Json(p)| p.policy()).unwrap_or_default();

    let execution = state
        .services
        .transfers
        .execute(id, policy)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(execution))
}

/// Cancel a transfer order
#[utoipa::path(
    post,
    path = "/api/v1/transfers/{id}/cancel",
    params(
        ("id" = Uuid, Path, description = "Transfer ID")
    ),
    responses(
        (status = 200, description = "Transfer cancelled", body = crate::ApiResponse<transfer_order::Model>),
        (status = 400, description = "Transfer is already terminal", body = crate::errors::ErrorResponse),
        (status = 404, description = "Transfer not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Transfers"
)]
pub async fn cancel_transfer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let cancelled = state
        .services
        .transfers
        .cancel(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(cancelled))
}

/// Move a transfer order along its lifecycle
#[utoipa::path(
    put,
    path = "/api/v1/transfers/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Transfer ID")
    ),
    request_body = UpdateTransferStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = crate::ApiResponse<transfer_order::Model>),
        (status = 400, description = "Illegal transition", body = crate::errors::ErrorResponse),
        (status = 404, description = "Transfer not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Transfers"
)]
pub async fn update_transfer_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTransferStatusRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let updated = state
        .services
        .transfers
        .update_status(id, payload.status)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(updated))
}

// Request DTOs and query parameters

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "from_location_id": "550e8400-e29b-41d4-a716-446655440000",
    "to_location_id": "660e8400-e29b-41d4-a716-446655440111",
    "lines": [
        { "item_code": "FLR-001", "quantity": "12.5" },
        { "item_code": "SUG-002", "quantity": "4" }
    ],
    "notes": "Friday restock",
    "requested_by": "alex"
}))]
pub struct CreateTransferRequest {
    pub from_location_id: Uuid,
    pub to_location_id: Uuid,
    #[validate(length(min = 1, message = "At least one line is required"))]
    pub lines: Vec<CreateTransferLine>,
    pub notes: Option<String>,
    /// Recorded as the requesting actor; defaults to "system"
    pub requested_by: Option<String>,
    /// Store the order without executing it
    #[serde(default)]
    pub draft: bool,
    /// Roll back every line if any line fails
    #[serde(default)]
    pub all_or_nothing: bool,
}

impl CreateTransferRequest {
    fn policy(&self) -> TransferPolicy {
        if self.all_or_nothing {
            TransferPolicy::AllOrNothing
        } else {
            TransferPolicy::PartialCommit
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ExecuteTransferRequest {
    /// Roll back every line if any line fails
    #[serde(default)]
    pub all_or_nothing: bool,
}

impl ExecuteTransferRequest {
    fn policy(&self) -> TransferPolicy {
        if self.all_or_nothing {
            TransferPolicy::AllOrNothing
        } else {
            TransferPolicy::PartialCommit
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTransferStatusRequest {
    pub status: TransferStatus,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TransferListParams {
    /// Filter by lifecycle status
    pub status: Option<TransferStatus>,
    #[serde(default = "first_page")]
    pub page: u64,
    pub limit: Option<u64>,
}

fn first_page() -> u64 {
    1
}

impl TransferListParams {
    fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            limit: self.limit,
        }
    }
}
