use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Larder API",
        version = "0.3.0",
        description = r#"
# Larder Inventory API

Multi-outlet food-service inventory: a per-location item catalog, bulk
import, reconciliation against an external catalog provider, and stock
transfers between locations.

## Status axes

Every item carries two independent statuses:

- `catalog_status`: lifecycle (`active`, `inactive`, `discontinued`), set by operators or the provider feed
- `stock_status`: derived from stock levels (`in_stock`, `low_stock`, `out_of_stock`, `overstock`), recomputed on every write

## Error Handling

Failures return a consistent error body with appropriate HTTP status codes:

```json
{
  "error": "Conflict",
  "message": "Item with code FLR-001 already exists at this location",
  "request_id": "req-abc123",
  "timestamp": "2025-06-09T10:30:00Z"
}
```

## Pagination

List endpoints accept `page` (1-based, default 1) and `limit`
(default and maximum are configurable per deployment).
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Items", description = "Item catalog, import and sync endpoints"),
        (name = "Transfers", description = "Stock transfer endpoints"),
        (name = "Locations", description = "Location registry endpoints")
    ),
    paths(
        // Items
        crate::handlers::items::list_items,
        crate::handlers::items::create_item,
        crate::handlers::items::low_stock_items,
        crate::handlers::items::list_categories,
        crate::handlers::items::get_item,
        crate::handlers::items::update_item,
        crate::handlers::items::delete_item,
        crate::handlers::items::restore_item,
        crate::handlers::items::adjust_item_stock,
        crate::handlers::items::import_items,
        crate::handlers::items::sync_items,
        crate::handlers::items::preview_sync,

        // Transfers
        crate::handlers::transfers::create_transfer,
        crate::handlers::transfers::list_transfers,
        crate::handlers::transfers::get_transfer,
        crate::handlers::transfers::execute_transfer,
        crate::handlers::transfers::cancel_transfer,
        crate::handlers::transfers::update_transfer_status,

        // Locations
        crate::handlers::locations::create_location,
        crate::handlers::locations::list_locations,
        crate::handlers::locations::get_location,
        crate::handlers::locations::purge_location_items,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,
            crate::errors::ErrorResponse,

            // Entities
            crate::entities::item::Model,
            crate::entities::item::CatalogStatus,
            crate::entities::item::StockStatus,
            crate::entities::item::ItemKind,
            crate::entities::item::UnitOfMeasure,
            crate::entities::location::Model,
            crate::entities::location::LocationKind,
            crate::entities::transfer_order::Model,
            crate::entities::transfer_order::TransferStatus,
            crate::entities::transfer_line::Model,
            crate::entities::transfer_line::TransferLineStatus,

            // Item types
            crate::services::catalog::NewItem,
            crate::services::catalog::UpdateItem,
            crate::services::sync::ImportRow,
            crate::services::sync::SyncSummary,
            crate::services::reconciliation::ReconciliationReport,
            crate::services::reconciliation::DuplicateCluster,
            crate::services::reconciliation::DuplicateKeyKind,
            crate::handlers::items::AdjustStockRequest,
            crate::handlers::items::SyncRequest,
            crate::handlers::items::ImportRequest,

            // Transfer types
            crate::services::transfers::CreateTransferLine,
            crate::services::transfers::TransferDetails,
            crate::services::transfers::TransferExecution,
            crate::services::transfers::TransferPolicy,
            crate::handlers::transfers::CreateTransferRequest,
            crate::handlers::transfers::ExecuteTransferRequest,
            crate::handlers::transfers::UpdateTransferStatusRequest,

            // Location types
            crate::handlers::locations::CreateLocationRequest,
            crate::handlers::locations::PurgeResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
