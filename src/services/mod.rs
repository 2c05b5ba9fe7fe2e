// Item repository and location registry
pub mod catalog;
pub mod locations;

// External catalog synchronization
pub mod importer;
pub mod reconciliation;
pub mod sync;

// Stock movement between locations
pub mod transfers;

pub use catalog::CatalogService;
pub use importer::ExternalCatalogClient;
pub use locations::LocationService;
pub use sync::CatalogSyncService;
pub use transfers::TransferService;
