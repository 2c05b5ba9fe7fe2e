use crate::{entities::item, services::importer::ExternalItem};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use utoipa::ToSchema;
use uuid::Uuid;

/// Which identity axis a duplicate cluster was grouped on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKeyKind {
    Code,
    ExternalId,
}

/// Local rows sharing one identity key. More than one member means a
/// prior sync or import went wrong and needs manual repair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DuplicateCluster {
    pub key_kind: DuplicateKeyKind,
    pub key: String,
    pub item_ids: Vec<Uuid>,
}

/// Outcome of comparing a provider feed against local rows. Ephemeral
/// and read-only: applying it is a separate, explicit step. Contents
/// carry no ordering guarantee.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ReconciliationReport {
    /// One entry per provider row that matched, holding the key it
    /// matched on
    pub matched: Vec<String>,
    /// Codes of local rows with no provider counterpart. Candidates for
    /// staleness; never auto-deleted, only reported
    pub local_only: Vec<String>,
    /// Identity keys of provider rows not yet in the repository
    pub external_only: Vec<String>,
    pub duplicate_clusters: Vec<DuplicateCluster>,
}

/// Partitions provider rows and local rows by identity. Matching prefers
/// the stored `external_id` against the provider id, then falls back to
/// `code` against the provider SKU, then `code` against the provider id.
/// Every provider row lands in exactly one of matched/external-only and
/// every local row in exactly one of matched/local-only.
pub fn reconcile(external: &[ExternalItem], local: &[item::Model]) -> ReconciliationReport {
    let mut by_external_id: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut by_code: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, row) in local.iter().enumerate() {
        if let Some(ext_id) = row
            .external_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            by_external_id.entry(ext_id).or_default().push(idx);
        }
        by_code.entry(row.code.as_str()).or_default().push(idx);
    }

    let mut matched_local: HashSet<usize> = HashSet::new();
    let mut matched = Vec::new();
    let mut external_only = Vec::new();

    for ext in external {
        let hit = ext
            .provider_id()
            .and_then(|id| by_external_id.get(id).map(|indices| (id, indices)))
            .or_else(|| {
                ext.provider_sku()
                    .and_then(|sku| by_code.get(sku).map(|indices| (sku, indices)))
            })
            .or_else(|| {
                ext.provider_id()
                    .and_then(|id| by_code.get(id).map(|indices| (id, indices)))
            });

        match hit {
            Some((key, indices)) => {
                matched.push(key.to_string());
                matched_local.extend(indices.iter().copied());
            }
            None => external_only.push(
                ext.identity_key()
                    .unwrap_or_else(|| "<no identity>".to_string()),
            ),
        }
    }

    let local_only = local
        .iter()
        .enumerate()
        .filter(|(idx, _)| !matched_local.contains(idx))
        .map(|(_, row)| row.code.clone())
        .collect();

    ReconciliationReport {
        matched,
        local_only,
        external_only,
        duplicate_clusters: find_duplicate_clusters(local),
    }
}

/// Resolves the single local row a provider row should merge into, with
/// the same preference order as `reconcile`. When duplicate identities
/// exist the first row in slice order wins; `find_duplicate_clusters`
/// surfaces that situation for repair.
pub fn resolve_match<'a>(ext: &ExternalItem, local: &'a [item::Model]) -> Option<&'a item::Model> {
    if let Some(id) = ext.provider_id() {
        if let Some(row) = local
            .iter()
            .find(|row| row.external_id.as_deref().map(str::trim) == Some(id))
        {
            return Some(row);
        }
    }
    if let Some(sku) = ext.provider_sku() {
        if let Some(row) = local.iter().find(|row| row.code == sku) {
            return Some(row);
        }
    }
    if let Some(id) = ext.provider_id() {
        if let Some(row) = local.iter().find(|row| row.code == id) {
            return Some(row);
        }
    }
    None
}

/// Groups the given rows by `external_id` and independently by `code`;
/// any group with more than one member is reported with every member id.
/// Operates on exactly the slice it is given, so callers decide the
/// scope (normally one location's rows, where the code axis is backed by
/// a unique index and clusters indicate index bypass or cross-location
/// slices).
pub fn find_duplicate_clusters(local: &[item::Model]) -> Vec<DuplicateCluster> {
    let mut by_external_id: BTreeMap<&str, Vec<Uuid>> = BTreeMap::new();
    let mut by_code: BTreeMap<&str, Vec<Uuid>> = BTreeMap::new();

    for row in local {
        if let Some(ext_id) = row
            .external_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            by_external_id.entry(ext_id).or_default().push(row.id);
        }
        by_code.entry(row.code.as_str()).or_default().push(row.id);
    }

    let mut clusters = Vec::new();
    for (key, item_ids) in by_external_id {
        if item_ids.len() > 1 {
            clusters.push(DuplicateCluster {
                key_kind: DuplicateKeyKind::ExternalId,
                key: key.to_string(),
                item_ids,
            });
        }
    }
    for (key, item_ids) in by_code {
        if item_ids.len() > 1 {
            clusters.push(DuplicateCluster {
                key_kind: DuplicateKeyKind::Code,
                key: key.to_string(),
                item_ids,
            });
        }
    }
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::item::{CatalogStatus, ItemKind, StockStatus, UnitOfMeasure};
    use chrono::Utc;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn local_item(code: &str, external_id: Option<&str>) -> item::Model {
        item::Model {
            id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            code: code.to_string(),
            external_id: external_id.map(str::to_string),
            name: format!("Item {}", code),
            description: None,
            category: "General".to_string(),
            sub_category: None,
            kind: ItemKind::RawMaterial,
            unit: UnitOfMeasure::Piece,
            unit_price: Decimal::ZERO,
            cost_price: Decimal::ZERO,
            current_stock: Decimal::ZERO,
            minimum_stock: Decimal::ZERO,
            maximum_stock: Decimal::ZERO,
            reorder_point: Decimal::ZERO,
            total_value: Decimal::ZERO,
            catalog_status: CatalogStatus::Active,
            stock_status: StockStatus::OutOfStock,
            is_active: true,
            created_by: "manual".to_string(),
            updated_by: "manual".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn external_row(id: Option<&str>, sku: Option<&str>) -> ExternalItem {
        ExternalItem {
            id: id.map(str::to_string),
            sku: sku.map(str::to_string),
            name: Some("Provider Row".to_string()),
            description: None,
            category: None,
            sub_category: None,
            unit: None,
            price: None,
            cost: None,
            stock: None,
            status: None,
        }
    }

    #[test]
    fn stored_external_id_match_wins_over_code() {
        // The provider SKU points at nothing locally, but the stored
        // external_id matches the provider id.
        let local = vec![local_item("LOCAL-A", Some("ext-9"))];
        let external = vec![external_row(Some("ext-9"), Some("UNRELATED"))];

        let report = reconcile(&external, &local);
        assert_eq!(report.matched, vec!["ext-9".to_string()]);
        assert!(report.local_only.is_empty());
        assert!(report.external_only.is_empty());
    }

    #[test]
    fn code_matches_provider_sku_when_no_external_id_is_stored() {
        let local = vec![local_item("FLR-001", None)];
        let external = vec![external_row(Some("ext-1"), Some("FLR-001"))];

        let report = reconcile(&external, &local);
        assert_eq!(report.matched, vec!["FLR-001".to_string()]);
        assert!(report.local_only.is_empty());
    }

    #[test]
    fn code_matches_provider_id_as_last_resort() {
        let local = vec![local_item("ext-7", None)];
        let external = vec![external_row(Some("ext-7"), None)];

        let report = reconcile(&external, &local);
        assert_eq!(report.matched, vec!["ext-7".to_string()]);
        assert!(report.external_only.is_empty());
    }

    #[test]
    fn partitions_cover_both_sides() {
        let local = vec![
            local_item("A", Some("ext-a")),
            local_item("B", None),
            local_item("STALE", None),
        ];
        let external = vec![
            external_row(Some("ext-a"), Some("A")),
            external_row(None, Some("B")),
            external_row(Some("ext-new"), Some("NEW")),
        ];

        let report = reconcile(&external, &local);
        assert_eq!(report.matched.len(), 2);
        assert_eq!(report.external_only, vec!["ext-new".to_string()]);
        assert_eq!(report.local_only, vec!["STALE".to_string()]);
    }

    #[test]
    fn resolve_match_agrees_with_reconcile() {
        let local = vec![
            local_item("A", Some("ext-a")),
            local_item("B", None),
            local_item("STALE", None),
        ];
        let external = vec![
            external_row(Some("ext-a"), Some("A")),
            external_row(None, Some("B")),
            external_row(Some("ext-new"), Some("NEW")),
        ];

        let report = reconcile(&external, &local);
        for ext in &external {
            let resolved = resolve_match(ext, &local);
            let key = ext.identity_key().unwrap();
            if report.external_only.contains(&key) {
                assert!(resolved.is_none(), "external-only row {} resolved", key);
            } else {
                assert!(resolved.is_some(), "matched row {} did not resolve", key);
            }
        }
    }

    #[test]
    fn unidentified_provider_rows_are_external_only() {
        let report = reconcile(&[external_row(None, None)], &[]);
        assert_eq!(report.external_only, vec!["<no identity>".to_string()]);
    }

    #[test]
    fn duplicate_clusters_group_by_both_axes() {
        let a = local_item("A", Some("ext-dup"));
        let b = local_item("B", Some("ext-dup"));
        let c = local_item("SHARED", None);
        let d = local_item("SHARED", None);
        let local = vec![a.clone(), b.clone(), c.clone(), d.clone()];

        let clusters = find_duplicate_clusters(&local);
        assert_eq!(clusters.len(), 2);

        let ext_cluster = clusters
            .iter()
            .find(|cl| cl.key_kind == DuplicateKeyKind::ExternalId)
            .unwrap();
        assert_eq!(ext_cluster.key, "ext-dup");
        assert_eq!(ext_cluster.item_ids.len(), 2);
        assert!(ext_cluster.item_ids.contains(&a.id));
        assert!(ext_cluster.item_ids.contains(&b.id));

        let code_cluster = clusters
            .iter()
            .find(|cl| cl.key_kind == DuplicateKeyKind::Code)
            .unwrap();
        assert_eq!(code_cluster.key, "SHARED");
        assert_eq!(code_cluster.item_ids.len(), 2);
    }

    #[test]
    fn unique_rows_produce_no_clusters() {
        let local = vec![local_item("A", Some("x")), local_item("B", Some("y"))];
        assert!(find_duplicate_clusters(&local).is_empty());
    }

    proptest! {
        #[test]
        fn every_row_lands_in_exactly_one_bucket(
            ids in prop::collection::vec(prop::option::of("[a-d]{1,2}"), 0..8),
            skus in prop::collection::vec(prop::option::of("[a-d]{1,2}"), 0..8),
            codes in prop::collection::vec("[a-d]{1,2}", 0..6),
        ) {
            let external: Vec<ExternalItem> = ids
                .iter()
                .enumerate()
                .map(|(i, id)| {
                    external_row(id.as_deref(), skus.get(i).cloned().flatten().as_deref())
                })
                .collect();
            let local: Vec<item::Model> =
                codes.iter().map(|code| local_item(code, None)).collect();

            let report = reconcile(&external, &local);

            // external side: matched + external-only covers every row once
            prop_assert_eq!(
                report.matched.len() + report.external_only.len(),
                external.len()
            );
            // local side: local-only never exceeds the input and holds
            // only codes that exist locally
            prop_assert!(report.local_only.len() <= local.len());
            for code in &report.local_only {
                prop_assert!(codes.iter().any(|c| c == code));
            }
        }
    }
}
