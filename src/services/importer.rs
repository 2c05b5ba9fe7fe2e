use crate::{
    config::AppConfig,
    entities::item::{CatalogStatus, UnitOfMeasure},
    errors::ServiceError,
    services::catalog::UpsertItem,
};
use rand::{distributions::Alphanumeric, Rng};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Hard cap imposed by the provider API
const MAX_PAGE_SIZE: u32 = 200;

/// Connection settings for the external catalog provider. Built from the
/// application config by the caller; the client itself never reads config.
#[derive(Debug, Clone)]
pub struct ExternalCatalogConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub page_size: u32,
    /// Per-request timeout
    pub timeout: Duration,
    pub max_retries: u32,
    /// Base backoff, doubled per attempt
    pub retry_backoff: Duration,
    /// Overall budget for one full catalog walk
    pub fetch_deadline: Duration,
}

impl ExternalCatalogConfig {
    /// None when no provider is configured; sync endpoints then report
    /// the feature as unavailable instead of failing mid-request.
    pub fn from_app_config(config: &AppConfig) -> Option<Self> {
        let base_url = config
            .external_catalog_base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())?
            .to_string();

        Some(Self {
            base_url,
            api_key: config.external_catalog_api_key.clone(),
            page_size: config.external_catalog_page_size,
            timeout: Duration::from_secs(config.external_catalog_timeout_secs),
            max_retries: config.external_catalog_max_retries,
            retry_backoff: Duration::from_millis(config.external_catalog_retry_backoff_ms),
            fetch_deadline: Duration::from_secs(config.external_catalog_fetch_deadline_secs),
        })
    }
}

/// One row as the provider serves it. Every field is optional so a single
/// bad row never poisons a page; required fields are enforced at map time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalItem {
    /// Stable provider identifier, preferred for matching
    pub id: Option<String>,
    pub sku: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub unit: Option<String>,
    pub price: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub stock: Option<Decimal>,
    pub status: Option<String>,
}

impl ExternalItem {
    pub fn provider_id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn provider_sku(&self) -> Option<&str> {
        self.sku.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Display key for reports: provider id when present, else SKU.
    /// Rows with neither have no identity and always import as new.
    pub fn identity_key(&self) -> Option<String> {
        self.provider_id()
            .or_else(|| self.provider_sku())
            .map(str::to_string)
    }
}

#[derive(Deserialize)]
struct PageResponse {
    items: Vec<serde_json::Value>,
}

/// Result of one full catalog walk. `skipped` counts rows that failed to
/// decode; they are logged and dropped, never fatal.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub items: Vec<ExternalItem>,
    pub skipped: u64,
}

enum PageFetchError {
    Retryable(String),
    Fatal(ServiceError),
}

/// Paged reader for the external catalog provider.
#[derive(Clone)]
pub struct ExternalCatalogClient {
    http: reqwest::Client,
    config: ExternalCatalogConfig,
}

impl ExternalCatalogClient {
    pub fn new(config: ExternalCatalogConfig) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ServiceError::ExternalServiceError(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self { http, config })
    }

    /// Walks `{base}/items?page=N&per_page=P` until a short page signals
    /// end-of-data. The page count is unknown in advance, so the walk
    /// carries an overall deadline on top of per-request timeouts.
    #[instrument(skip(self))]
    pub async fn fetch_all(&self) -> Result<FetchOutcome, ServiceError> {
        let per_page = self.config.page_size.clamp(1, MAX_PAGE_SIZE);
        let deadline = tokio::time::Instant::now() + self.config.fetch_deadline;

        let mut items = Vec::new();
        let mut skipped: u64 = 0;
        let mut page: u32 = 1;

        loop {
            let raw_rows = tokio::time::timeout_at(deadline, self.fetch_page(page, per_page))
                .await
                .map_err(|_| {
                    ServiceError::ExternalServiceError(format!(
                        "Catalog fetch exceeded the {}s deadline on page {}",
                        self.config.fetch_deadline.as_secs(),
                        page
                    ))
                })??;

            let fetched = raw_rows.len();
            for raw in raw_rows {
                match serde_json::from_value::<ExternalItem>(raw) {
                    Ok(item) => items.push(item),
                    Err(err) => {
                        skipped += 1;
                        warn!(page, error = %err, "Skipping malformed catalog row");
                    }
                }
            }

            if (fetched as u32) < per_page {
                break;
            }
            page += 1;
        }

        debug!(
            total = items.len(),
            skipped, pages = page,
            "Finished catalog walk"
        );
        Ok(FetchOutcome { items, skipped })
    }

    /// One page with retries. Transport errors and 5xx responses retry
    /// with exponential backoff; 401/403 means the credential is dead and
    /// aborts the whole fetch. An exhausted page fails the fetch too, so
    /// a partial walk is never mistaken for a complete one.
    async fn fetch_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<serde_json::Value>, ServiceError> {
        let url = format!("{}/items", self.config.base_url.trim_end_matches('/'));
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            match self.try_fetch_page(&url, page, per_page).await {
                Ok(rows) => return Ok(rows),
                Err(PageFetchError::Fatal(err)) => return Err(err),
                Err(PageFetchError::Retryable(reason)) => {
                    if attempt > self.config.max_retries {
                        return Err(ServiceError::ExternalServiceError(format!(
                            "Catalog page {} failed after {} attempts: {}",
                            page, attempt, reason
                        )));
                    }
                    let backoff = self
                        .config
                        .retry_backoff
                        .saturating_mul(1u32 << (attempt - 1).min(6));
                    warn!(
                        page,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        %reason,
                        "Retrying catalog page"
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    async fn try_fetch_page(
        &self,
        url: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<serde_json::Value>, PageFetchError> {
        let mut request = self
            .http
            .get(url)
            .query(&[("page", page), ("per_page", per_page)]);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PageFetchError::Retryable(format!("transport error: {}", e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(PageFetchError::Fatal(ServiceError::ExternalServiceError(
                format!("Catalog provider rejected credentials ({})", status),
            )));
        }
        if status.is_server_error() {
            return Err(PageFetchError::Retryable(format!(
                "upstream returned {}",
                status
            )));
        }
        if !status.is_success() {
            return Err(PageFetchError::Fatal(ServiceError::ExternalServiceError(
                format!("Catalog provider returned {} for page {}", status, page),
            )));
        }

        let body: PageResponse = response.json().await.map_err(|e| {
            PageFetchError::Fatal(ServiceError::ExternalServiceError(format!(
                "Catalog page {} returned an unreadable body: {}",
                page, e
            )))
        })?;
        Ok(body.items)
    }
}

/// A provider row normalized into repository shape, plus the flags the
/// caller needs to account for mapping decisions.
#[derive(Debug, Clone)]
pub struct MappedItem {
    /// Trimmed provider SKU, or a synthesized display-only code
    pub code: String,
    /// Synthesized codes are random per run and never used for matching
    pub code_synthesized: bool,
    /// True when the provider's unit string was unrecognized and the
    /// configured default was applied
    pub unit_defaulted: bool,
    pub upsert: UpsertItem,
}

/// Normalizes one provider row. Rows without a usable name are rejected
/// with a reason the caller can surface in its error samples.
pub fn map_external_item(
    raw: &ExternalItem,
    default_unit: UnitOfMeasure,
) -> Result<MappedItem, String> {
    let name = raw
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            format!(
                "row {} has no name",
                raw.identity_key()
                    .unwrap_or_else(|| "<no identity>".to_string())
            )
        })?
        .to_string();

    let category = raw
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or("General")
        .to_string();

    // Unrecognized unit strings fall back to the configured default and
    // are flagged so callers can report the substitution. A row that
    // simply omits the unit takes the default silently.
    let (unit, unit_defaulted) = match raw.unit.as_deref().map(str::trim) {
        Some(raw_unit) if !raw_unit.is_empty() => match UnitOfMeasure::parse(raw_unit) {
            Some(unit) => (unit, false),
            None => (default_unit, true),
        },
        _ => (default_unit, false),
    };

    let (code, code_synthesized) = match raw.provider_sku() {
        Some(sku) => (sku.to_string(), false),
        None => (synthesize_code(&category, &name), true),
    };

    let catalog_status = match raw.status.as_deref().map(str::trim) {
        Some(status) if status.eq_ignore_ascii_case("active") => CatalogStatus::Active,
        _ => CatalogStatus::Inactive,
    };

    let upsert = UpsertItem {
        external_id: raw.provider_id().map(str::to_string),
        name,
        description: raw
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
        category,
        sub_category: raw
            .sub_category
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        // New rows default to raw material; a matched row keeps whatever
        // kind it already has
        kind: None,
        unit,
        unit_price: raw.price.map(|p| p.max(Decimal::ZERO)),
        cost_price: raw.cost.map(|c| c.max(Decimal::ZERO)),
        current_stock: raw.stock.map(|s| s.max(Decimal::ZERO)),
        minimum_stock: None,
        maximum_stock: None,
        reorder_point: None,
        catalog_status,
    };

    Ok(MappedItem {
        code,
        code_synthesized,
        unit_defaulted,
        upsert,
    })
}

/// `CAT-NAM-xxxx`: category prefix, name prefix, random suffix. The
/// suffix makes the code unique but non-deterministic, which is why
/// synthesized codes are display-only.
fn synthesize_code(category: &str, name: &str) -> String {
    fn prefix(source: &str) -> String {
        let p: String = source
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(3)
            .collect::<String>()
            .to_uppercase();
        if p.is_empty() {
            "XXX".to_string()
        } else {
            p
        }
    }

    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(4)
        .map(char::from)
        .collect::<String>()
        .to_uppercase();

    format!("{}-{}-{}", prefix(category), prefix(name), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn provider_row() -> ExternalItem {
        ExternalItem {
            id: Some("ext-1001".to_string()),
            sku: Some("  FLR-001  ".to_string()),
            name: Some("Bread Flour".to_string()),
            description: Some("Strong white flour".to_string()),
            category: Some("Baking".to_string()),
            sub_category: None,
            unit: Some("KGS".to_string()),
            price: Some(dec!(1.80)),
            cost: Some(dec!(1.20)),
            stock: Some(dec!(40)),
            status: Some("active".to_string()),
        }
    }

    #[test]
    fn maps_provider_sku_trimmed() {
        let mapped = map_external_item(&provider_row(), UnitOfMeasure::Piece).unwrap();
        assert_eq!(mapped.code, "FLR-001");
        assert!(!mapped.code_synthesized);
        assert_eq!(mapped.upsert.external_id.as_deref(), Some("ext-1001"));
    }

    #[test]
    fn normalizes_unit_synonyms_without_flagging() {
        let mapped = map_external_item(&provider_row(), UnitOfMeasure::Piece).unwrap();
        assert_eq!(mapped.upsert.unit, UnitOfMeasure::Kg);
        assert!(!mapped.unit_defaulted);
    }

    #[test]
    fn unknown_unit_falls_back_and_is_flagged() {
        let mut row = provider_row();
        row.unit = Some("hogshead".to_string());
        let mapped = map_external_item(&row, UnitOfMeasure::Piece).unwrap();
        assert_eq!(mapped.upsert.unit, UnitOfMeasure::Piece);
        assert!(mapped.unit_defaulted);
    }

    #[test]
    fn missing_unit_defaults_silently() {
        let mut row = provider_row();
        row.unit = None;
        let mapped = map_external_item(&row, UnitOfMeasure::Piece).unwrap();
        assert_eq!(mapped.upsert.unit, UnitOfMeasure::Piece);
        assert!(!mapped.unit_defaulted);
    }

    #[test]
    fn synthesizes_code_when_sku_is_blank() {
        let mut row = provider_row();
        row.sku = Some("   ".to_string());
        let mapped = map_external_item(&row, UnitOfMeasure::Piece).unwrap();

        assert!(mapped.code_synthesized);
        let parts: Vec<&str> = mapped.code.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "BAK");
        assert_eq!(parts[1], "BRE");
        assert_eq!(parts[2].len(), 4);
    }

    #[test]
    fn rejects_rows_without_a_name() {
        let mut row = provider_row();
        row.name = Some("   ".to_string());
        let err = map_external_item(&row, UnitOfMeasure::Piece).unwrap_err();
        assert!(err.contains("no name"));
    }

    #[test]
    fn category_defaults_to_general() {
        let mut row = provider_row();
        row.category = None;
        let mapped = map_external_item(&row, UnitOfMeasure::Piece).unwrap();
        assert_eq!(mapped.upsert.category, "General");
    }

    #[test]
    fn non_active_status_maps_to_inactive() {
        let mut row = provider_row();
        row.status = Some("archived".to_string());
        let mapped = map_external_item(&row, UnitOfMeasure::Piece).unwrap();
        assert_eq!(mapped.upsert.catalog_status, CatalogStatus::Inactive);

        row.status = None;
        let mapped = map_external_item(&row, UnitOfMeasure::Piece).unwrap();
        assert_eq!(mapped.upsert.catalog_status, CatalogStatus::Inactive);
    }

    #[test]
    fn identity_prefers_provider_id_over_sku() {
        let row = provider_row();
        assert_eq!(row.identity_key().as_deref(), Some("ext-1001"));

        let mut no_id = provider_row();
        no_id.id = None;
        assert_eq!(no_id.identity_key().as_deref(), Some("FLR-001"));

        let mut neither = provider_row();
        neither.id = None;
        neither.sku = None;
        assert_eq!(neither.identity_key(), None);
    }

    #[test]
    fn negative_provider_numbers_clamp_to_zero() {
        let mut row = provider_row();
        row.price = Some(dec!(-5));
        row.stock = Some(dec!(-3));
        let mapped = map_external_item(&row, UnitOfMeasure::Piece).unwrap();
        assert_eq!(mapped.upsert.unit_price, Some(Decimal::ZERO));
        assert_eq!(mapped.upsert.current_stock, Some(Decimal::ZERO));
    }
}
