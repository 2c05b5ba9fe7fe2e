use crate::entities::item::{self, CatalogStatus, ItemKind, StockStatus};
use crate::handlers::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    PaginationParams,
};
use crate::services::{
    catalog::{ItemFilter, NewItem, UpdateItem},
    reconciliation::ReconciliationReport,
    sync::{ImportRow, SyncSummary},
};
use crate::{errors::ApiError, AppState};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Actor recorded on rows touched through the CRUD endpoints
const MANUAL_ACTOR: &str = "manual";

/// Creates the router for item endpoints
pub fn items_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/low-stock", get(low_stock_items))
        .route("/categories", get(list_categories))
        .route("/import", post(import_items))
        .route("/sync", post(sync_items))
        .route("/sync/preview", get(preview_sync))
        .route("/:id", get(get_item).put(update_item).delete(delete_item))
        .route("/:id/restore", post(restore_item))
        .route("/:id/adjust-stock", post(adjust_item_stock))
}

/// List items with optional filtering and pagination
#[utoipa::path(
    get,
    path = "/api/v1/items",
    params(ItemListParams),
    responses(
        (status = 200, description = "Items retrieved", body = crate::ApiResponse<crate::PaginatedResponse<item::Model>>),
        (status = 400, description = "Invalid query parameters", body = crate::errors::ErrorResponse)
    ),
    tag = "Items"
)]
pub async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<ItemListParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (page, limit) = params.pagination().resolve(&state.config)?;

    let filter = ItemFilter {
        location_id: params.location_id,
        search: params.search,
        category: params.category,
        catalog_status: params.status,
        stock_status: params.stock_status,
        kind: params.kind,
        // Archived rows stay hidden unless explicitly requested
        is_active: if params.include_archived {
            None
        } else {
            Some(true)
        },
    };

    let (items, total) = state
        .services
        .catalog
        .query(filter, page, limit)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(crate::PaginatedResponse::new(
        items, page, limit, total,
    )))
}

/// Create an item
#[utoipa::path(
    post,
    path = "/api/v1/items",
    request_body = NewItem,
    responses(
        (status = 201, description = "Item created", body = crate::ApiResponse<item::Model>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 409, description = "Code already exists at this location", body = crate::errors::ErrorResponse)
    ),
    tag = "Items"
)]
pub async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<NewItem>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let created = state
        .services
        .catalog
        .insert(payload, MANUAL_ACTOR)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(created))
}

/// Items at or below their reorder point
#[utoipa::path(
    get,
    path = "/api/v1/items/low-stock",
    params(LocationScopeParams),
    responses(
        (status = 200, description = "Low stock items retrieved", body = crate::ApiResponse<Vec<item::Model>>)
    ),
    tag = "Items"
)]
pub async fn low_stock_items(
    State(state): State<AppState>,
    Query(params): Query<LocationScopeParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let items = state
        .services
        .catalog
        .low_stock(params.location_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(items))
}

/// Distinct category names in use
#[utoipa::path(
    get,
    path = "/api/v1/items/categories",
    params(LocationScopeParams),
    responses(
        (status = 200, description = "Categories retrieved", body = crate::ApiResponse<Vec<String>>)
    ),
    tag = "Items"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(params): Query<LocationScopeParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let categories = state
        .services
        .catalog
        .distinct_categories(params.location_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(categories))
}

/// Get an item by ID
#[utoipa::path(
    get,
    path = "/api/v1/items/{id}",
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item retrieved", body = crate::ApiResponse<item::Model>),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Items"
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let found = state
        .services
        .catalog
        .find_by_id(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(found))
}

/// Update an item
#[utoipa::path(
    put,
    path = "/api/v1/items/{id}",
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    request_body = UpdateItem,
    responses(
        (status = 200, description = "Item updated", body = crate::ApiResponse<item::Model>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Items"
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateItem>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let updated = state
        .services
        .catalog
        .update(id, payload, MANUAL_ACTOR)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(updated))
}

/// Archive an item (soft delete)
#[utoipa::path(
    delete,
    path = "/api/v1/items/{id}",
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 204, description = "Item archived"),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Items"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .catalog
        .soft_delete(id, MANUAL_ACTOR)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

/// Bring an archived item back
#[utoipa::path(
    post,
    path = "/api/v1/items/{id}/restore",
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item restored", body = crate::ApiResponse<item::Model>),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Items"
)]
pub async fn restore_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let restored = state
        .services
        .catalog
        .restore(id, MANUAL_ACTOR)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(restored))
}

/// Adjust stock by a signed delta
#[utoipa::path(
    post,
    path = "/api/v1/items/{id}/adjust-stock",
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    request_body = AdjustStockRequest,
    responses(
        (status = 200, description = "Stock adjusted", body = crate::ApiResponse<item::Model>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse)
    ),
    tag = "Items"
)]
pub async fn adjust_item_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdjustStockRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    if payload.delta == Decimal::ZERO {
        return Err(ApiError::ValidationError(
            "delta must be non-zero".to_string(),
        ));
    }

    let adjusted = state
        .services
        .catalog
        .adjust_stock(id, payload.delta, MANUAL_ACTOR)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(adjusted))
}

/// Validate-and-upsert a batch of already-parsed import rows
#[utoipa::path(
    post,
    path = "/api/v1/items/import",
    request_body = ImportRequest,
    responses(
        (status = 200, description = "Import finished", body = crate::ApiResponse<SyncSummary>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Location not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Items"
)]
pub async fn import_items(
    State(state): State<AppState>,
    Json(payload): Json<ImportRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let summary = state
        .services
        .sync
        .import_rows(payload.location_id, payload.rows)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(summary))
}

/// Pull the external catalog and upsert it into a location
#[utoipa::path(
    post,
    path = "/api/v1/items/sync",
    request_body = SyncRequest,
    responses(
        (status = 200, description = "Sync finished", body = crate::ApiResponse<SyncSummary>),
        (status = 400, description = "No provider configured", body = crate::errors::ErrorResponse),
        (status = 404, description = "Location not found", body = crate::errors::ErrorResponse),
        (status = 502, description = "Provider unreachable", body = crate::errors::ErrorResponse)
    ),
    tag = "Items"
)]
pub async fn sync_items(
    State(state): State<AppState>,
    Json(payload): Json<SyncRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let summary = state
        .services
        .sync
        .sync(payload.location_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(summary))
}

/// Dry-run reconciliation between the provider and a location
#[utoipa::path(
    get,
    path = "/api/v1/items/sync/preview",
    params(SyncPreviewParams),
    responses(
        (status = 200, description = "Reconciliation report", body = crate::ApiResponse<ReconciliationReport>),
        (status = 400, description = "No provider configured", body = crate::errors::ErrorResponse),
        (status = 404, description = "Location not found", body = crate::errors::ErrorResponse),
        (status = 502, description = "Provider unreachable", body = crate::errors::ErrorResponse)
    ),
    tag = "Items"
)]
pub async fn preview_sync(
    State(state): State<AppState>,
    Query(params): Query<SyncPreviewParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let report = state
        .services
        .sync
        .preview(params.location_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(report))
}

// Request DTOs and query parameters

#[derive(Debug, Deserialize, IntoParams)]
pub struct ItemListParams {
    /// Restrict to one location
    pub location_id: Option<Uuid>,
    /// Case-insensitive substring over name, code and description
    pub search: Option<String>,
    pub category: Option<String>,
    /// Catalog lifecycle filter (active, inactive, discontinued)
    pub status: Option<CatalogStatus>,
    /// Stock level filter (in_stock, low_stock, out_of_stock, overstock)
    pub stock_status: Option<StockStatus>,
    pub kind: Option<ItemKind>,
    /// Include archived rows as well
    #[serde(default)]
    pub include_archived: bool,
    #[serde(default = "first_page")]
    pub page: u64,
    pub limit: Option<u64>,
}

fn first_page() -> u64 {
    1
}

impl ItemListParams {
    fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LocationScopeParams {
    /// Restrict to one location
    pub location_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SyncPreviewParams {
    /// Location to reconcile against
    pub location_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({ "delta": "-2.5" }))]
pub struct AdjustStockRequest {
    /// Signed stock change; negative removes stock
    pub delta: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SyncRequest {
    /// Location to sync the external catalog into
    pub location_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "location_id": "550e8400-e29b-41d4-a716-446655440000",
    "rows": [
        {
            "code": "FLR-001",
            "name": "Bread Flour",
            "category": "Baking",
            "unit": "kg",
            "unit_price": "1.80",
            "current_stock": "40"
        }
    ]
}))]
pub struct ImportRequest {
    pub location_id: Uuid,
    #[validate(length(min = 1, message = "At least one row is required"))]
    pub rows: Vec<ImportRow>,
}
