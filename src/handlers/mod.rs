pub mod common;
pub mod items;
pub mod locations;
pub mod transfers;

use crate::db::DbPool;
use crate::entities::item::UnitOfMeasure;
use crate::events::EventSender;
use crate::services::{
    catalog::CatalogService, importer::ExternalCatalogClient, locations::LocationService,
    sync::CatalogSyncService, transfers::TransferService,
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub catalog: CatalogService,
    pub locations: LocationService,
    pub transfers: TransferService,
    pub sync: CatalogSyncService,
}

impl AppServices {
    /// Wires the service graph. `catalog_client` is None when no external
    /// provider is configured; sync endpoints then return 400 while
    /// everything else keeps working.
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: EventSender,
        catalog_client: Option<ExternalCatalogClient>,
        import_unit: UnitOfMeasure,
    ) -> Self {
        let catalog = CatalogService::new(db_pool.clone(), event_sender.clone());
        let locations = LocationService::new(db_pool.clone());
        let transfers =
            TransferService::new(db_pool, locations.clone(), event_sender.clone());
        let sync = CatalogSyncService::new(
            catalog.clone(),
            locations.clone(),
            catalog_client,
            event_sender,
            import_unit,
        );

        Self {
            catalog,
            locations,
            transfers,
            sync,
        }
    }
}
