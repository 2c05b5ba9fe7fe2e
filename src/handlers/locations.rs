use crate::entities::location::{self, LocationKind};
use crate::handlers::common::{
    created_response, map_service_error, success_response, validate_input,
};
use crate::{errors::ApiError, services::locations::CreateLocationInput, AppState};
use axum::{
    extract::{Json, Path, State},
    routing::{delete, get},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for location endpoints
pub fn locations_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_locations).post(create_location))
        .route("/:id", get(get_location))
        .route("/:id/items", delete(purge_location_items))
}

/// Register a new location
#[utoipa::path(
    post,
    path = "/api/v1/locations",
    request_body = CreateLocationRequest,
    responses(
        (status = 201, description = "Location created", body = crate::ApiResponse<location::Model>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 409, description = "Location code already exists", body = crate::errors::ErrorResponse)
    ),
    tag = "Locations"
)]
pub async fn create_location(
    State(state): State<AppState>,
    Json(payload): Json<CreateLocationRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = CreateLocationInput {
        code: payload.code,
        name: payload.name,
        kind: payload.kind,
    };

    let created = state
        .services
        .locations
        .create(input)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(created))
}

/// List all locations
#[utoipa::path(
    get,
    path = "/api/v1/locations",
    responses(
        (status = 200, description = "Locations retrieved", body = crate::ApiResponse<Vec<location::Model>>)
    ),
    tag = "Locations"
)]
pub async fn list_locations(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let locations = state
        .services
        .locations
        .list()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(locations))
}

/// Get a location by ID
#[utoipa::path(
    get,
    path = "/api/v1/locations/{id}",
    params(
        ("id" = Uuid, Path, description = "Location ID")
    ),
    responses(
        (status = 200, description = "Location retrieved", body = crate::ApiResponse<location::Model>),
        (status = 404, description = "Location not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Locations"
)]
pub async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let found = state
        .services
        .locations
        .get(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(found))
}

/// Hard-delete every item record at a location
#[utoipa::path(
    delete,
    path = "/api/v1/locations/{id}/items",
    params(
        ("id" = Uuid, Path, description = "Location ID")
    ),
    responses(
        (status = 200, description = "Items purged", body = crate::ApiResponse<PurgeResponse>),
        (status = 404, description = "Location not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Locations"
)]
pub async fn purge_location_items(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .locations
        .get(id)
        .await
        .map_err(map_service_error)?;

    let purged = state
        .services
        .catalog
        .purge_location(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PurgeResponse { purged }))
}

// Request/Response DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "code": "CK-01",
    "name": "Central Kitchen",
    "kind": "central_kitchen"
}))]
pub struct CreateLocationRequest {
    /// Unique short code for the location
    #[validate(length(min = 1, max = 50))]
    #[schema(example = "CK-01")]
    pub code: String,
    /// Display name
    #[validate(length(min = 1, max = 200))]
    #[schema(example = "Central Kitchen")]
    pub name: String,
    /// Central kitchen or outlet
    pub kind: LocationKind,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurgeResponse {
    /// Number of item records deleted
    pub purged: u64,
}
