use crate::{
    entities::item::{CatalogStatus, ItemKind, UnitOfMeasure},
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        catalog::{CatalogService, UpsertItem},
        importer::{map_external_item, ExternalCatalogClient},
        locations::LocationService,
        reconciliation::{reconcile, resolve_match, ReconciliationReport},
    },
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Actor strings recorded on rows written by these paths
const SYNC_ACTOR: &str = "sync-job";
const IMPORT_ACTOR: &str = "excel-import";

/// At most this many row-level errors are echoed back; the rest are in
/// the logs
const MAX_ERROR_SAMPLES: usize = 10;

/// Counts returned by sync and bulk import. One bad row never fails the
/// batch; it lands in `skipped` with a sample in `errors`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SyncSummary {
    pub created: u64,
    pub updated: u64,
    pub skipped: u64,
    /// Rows whose unit string was unrecognized and fell back to the
    /// configured default
    pub unit_defaulted: u64,
    /// First few row-level errors, capped at ten
    pub errors: Vec<String>,
}

impl SyncSummary {
    fn push_error(&mut self, sample: String) {
        if self.errors.len() < MAX_ERROR_SAMPLES {
            self.errors.push(sample);
        }
    }
}

/// One pre-parsed spreadsheet row for bulk import. The client parses the
/// workbook; this side validates and upserts.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ImportRow {
    #[validate(length(min = 1, max = 50))]
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    /// Raw unit string as it appeared in the sheet; normalized through
    /// the synonym table
    pub unit: Option<String>,
    pub kind: Option<ItemKind>,
    #[validate(custom = "crate::services::catalog::validate_non_negative_opt")]
    pub unit_price: Option<Decimal>,
    #[validate(custom = "crate::services::catalog::validate_non_negative_opt")]
    pub cost_price: Option<Decimal>,
    #[validate(custom = "crate::services::catalog::validate_non_negative_opt")]
    pub current_stock: Option<Decimal>,
    #[validate(custom = "crate::services::catalog::validate_non_negative_opt")]
    pub minimum_stock: Option<Decimal>,
    #[validate(custom = "crate::services::catalog::validate_non_negative_opt")]
    pub maximum_stock: Option<Decimal>,
    #[validate(custom = "crate::services::catalog::validate_non_negative_opt")]
    pub reorder_point: Option<Decimal>,
}

/// Pulls the external catalog and applies it to one location's items.
/// Fetch and reconcile are read-only; `sync` is the explicit apply step.
#[derive(Clone)]
pub struct CatalogSyncService {
    catalog: CatalogService,
    locations: LocationService,
    /// None when no provider is configured; sync and preview then refuse
    /// while bulk import keeps working
    client: Option<ExternalCatalogClient>,
    event_sender: EventSender,
    default_unit: UnitOfMeasure,
}

impl CatalogSyncService {
    pub fn new(
        catalog: CatalogService,
        locations: LocationService,
        client: Option<ExternalCatalogClient>,
        event_sender: EventSender,
        default_unit: UnitOfMeasure,
    ) -> Self {
        Self {
            catalog,
            locations,
            client,
            event_sender,
            default_unit,
        }
    }

    pub fn has_provider(&self) -> bool {
        self.client.is_some()
    }

    fn client(&self) -> Result<&ExternalCatalogClient, ServiceError> {
        self.client.as_ref().ok_or_else(|| {
            ServiceError::InvalidOperation(
                "No external catalog provider is configured".to_string(),
            )
        })
    }

    /// Fetches the provider feed and reports how it lines up with the
    /// location's items, without writing anything.
    #[instrument(skip(self))]
    pub async fn preview(&self, location_id: Uuid) -> Result<ReconciliationReport, ServiceError> {
        let client = self.client()?;
        self.locations.get(location_id).await?;

        let outcome = client.fetch_all().await?;
        let local = self.catalog.location_items(location_id).await?;
        Ok(reconcile(&outcome.items, &local))
    }

    /// Fetch, reconcile, apply. Matched provider rows merge into their
    /// local row (resolved by stored external id first, so a changed
    /// provider SKU cannot fork a second row); unmatched rows insert.
    /// Local-only rows are reported by `preview` and never touched here.
    #[instrument(skip(self))]
    pub async fn sync(&self, location_id: Uuid) -> Result<SyncSummary, ServiceError> {
        let client = self.client()?;
        self.locations.get(location_id).await?;

        let outcome = client.fetch_all().await?;
        let local = self.catalog.location_items(location_id).await?;

        let report = reconcile(&outcome.items, &local);
        info!(
            location_id = %location_id,
            provider_rows = outcome.items.len(),
            matched = report.matched.len(),
            external_only = report.external_only.len(),
            local_only = report.local_only.len(),
            "Applying catalog sync"
        );
        if !report.duplicate_clusters.is_empty() {
            warn!(
                location_id = %location_id,
                clusters = report.duplicate_clusters.len(),
                "Duplicate identity clusters present; merging into the first row of each"
            );
        }

        let mut summary = SyncSummary {
            skipped: outcome.skipped,
            ..Default::default()
        };
        let mut failed_rows: u64 = outcome.skipped;

        for ext in &outcome.items {
            let mapped = match map_external_item(ext, self.default_unit) {
                Ok(mapped) => mapped,
                Err(reason) => {
                    summary.skipped += 1;
                    failed_rows += 1;
                    summary.push_error(reason);
                    continue;
                }
            };
            if mapped.unit_defaulted {
                summary.unit_defaulted += 1;
            }

            let target_code = match resolve_match(ext, &local) {
                Some(row) => row.code.clone(),
                None => mapped.code.clone(),
            };

            match self
                .catalog
                .upsert_by_code(location_id, &target_code, mapped.upsert, SYNC_ACTOR)
                .await
            {
                Ok((_, true)) => summary.created += 1,
                Ok((_, false)) => summary.updated += 1,
                Err(err) => {
                    summary.skipped += 1;
                    failed_rows += 1;
                    summary.push_error(format!("row {}: {}", target_code, err));
                }
            }
        }

        self.event_sender
            .send_or_log(Event::CatalogSyncCompleted {
                location_id,
                created: summary.created,
                updated: summary.updated,
                skipped: summary.skipped,
                failed: failed_rows,
            })
            .await;

        info!(
            location_id = %location_id,
            created = summary.created,
            updated = summary.updated,
            skipped = summary.skipped,
            unit_defaulted = summary.unit_defaulted,
            "Catalog sync finished"
        );
        Ok(summary)
    }

    /// Validate-and-upsert for pre-parsed spreadsheet rows. Works without
    /// a configured provider.
    #[instrument(skip(self, rows))]
    pub async fn import_rows(
        &self,
        location_id: Uuid,
        rows: Vec<ImportRow>,
    ) -> Result<SyncSummary, ServiceError> {
        self.locations.get(location_id).await?;

        let mut summary = SyncSummary::default();

        for (index, row) in rows.into_iter().enumerate() {
            if let Err(err) = row.validate() {
                summary.skipped += 1;
                summary.push_error(format!("row {} ({}): {}", index + 1, row.code, err));
                continue;
            }

            let (unit, unit_defaulted) = match row.unit.as_deref().map(str::trim) {
                Some(raw) if !raw.is_empty() => match UnitOfMeasure::parse(raw) {
                    Some(unit) => (unit, false),
                    None => (self.default_unit, true),
                },
                _ => (self.default_unit, false),
            };
            if unit_defaulted {
                summary.unit_defaulted += 1;
            }

            let code = row.code.trim().to_string();
            let upsert = UpsertItem {
                external_id: None,
                name: row.name.trim().to_string(),
                description: row
                    .description
                    .as_deref()
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(str::to_string),
                category: row
                    .category
                    .as_deref()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .unwrap_or("General")
                    .to_string(),
                sub_category: row
                    .sub_category
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
                kind: row.kind,
                unit,
                unit_price: row.unit_price,
                cost_price: row.cost_price,
                current_stock: row.current_stock,
                minimum_stock: row.minimum_stock,
                maximum_stock: row.maximum_stock,
                reorder_point: row.reorder_point,
                catalog_status: CatalogStatus::Active,
            };

            match self
                .catalog
                .upsert_by_code(location_id, &code, upsert, IMPORT_ACTOR)
                .await
            {
                Ok((_, true)) => summary.created += 1,
                Ok((_, false)) => summary.updated += 1,
                Err(err) => {
                    summary.skipped += 1;
                    summary.push_error(format!("row {} ({}): {}", index + 1, code, err));
                }
            }
        }

        self.event_sender
            .send_or_log(Event::ImportCompleted {
                location_id,
                inserted: summary.created,
                updated: summary.updated,
                skipped: summary.skipped,
            })
            .await;

        info!(
            location_id = %location_id,
            created = summary.created,
            updated = summary.updated,
            skipped = summary.skipped,
            "Bulk import finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn import_row_rejects_negative_quantities() {
        let row = ImportRow {
            code: "FLR-001".to_string(),
            name: "Bread Flour".to_string(),
            description: None,
            category: None,
            sub_category: None,
            unit: Some("kg".to_string()),
            kind: None,
            unit_price: Some(dec!(2.50)),
            cost_price: None,
            current_stock: Some(dec!(-1)),
            minimum_stock: None,
            maximum_stock: None,
            reorder_point: None,
        };
        assert!(row.validate().is_err());
    }

    #[test]
    fn import_row_requires_code_and_name() {
        let row = ImportRow {
            code: String::new(),
            name: "Bread Flour".to_string(),
            description: None,
            category: None,
            sub_category: None,
            unit: None,
            kind: None,
            unit_price: None,
            cost_price: None,
            current_stock: None,
            minimum_stock: None,
            maximum_stock: None,
            reorder_point: None,
        };
        assert!(row.validate().is_err());
    }

    #[test]
    fn error_samples_are_capped() {
        let mut summary = SyncSummary::default();
        for i in 0..25 {
            summary.push_error(format!("row {}: bad", i));
        }
        assert_eq!(summary.errors.len(), MAX_ERROR_SAMPLES);
    }
}
