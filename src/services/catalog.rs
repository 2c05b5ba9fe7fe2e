use crate::{
    db::DbPool,
    entities::item::{
        self, subcategory_is_valid, CatalogStatus, Entity as Item, ItemKind, StockStatus,
        UnitOfMeasure,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Item repository scoped by location. Every write re-derives the stored
/// `stock_status` and `total_value` so filters never see stale values.
#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl CatalogService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: Uuid) -> Result<item::Model, ServiceError> {
        Item::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn find_by_code(
        &self,
        location_id: Uuid,
        code: &str,
    ) -> Result<item::Model, ServiceError> {
        Item::find()
            .filter(item::Column::LocationId.eq(location_id))
            .filter(item::Column::Code.eq(code))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Item with code {} not found at location {}",
                    code, location_id
                ))
            })
    }

    /// Strict insert. An existing `(location, code)` pair is a conflict,
    /// not a merge.
    #[instrument(skip(self, input))]
    pub async fn insert(&self, input: NewItem, actor: &str) -> Result<item::Model, ServiceError> {
        input.validate()?;
        let code = input.code.trim().to_string();

        if !subcategory_is_valid(input.kind, input.sub_category.as_deref()) {
            return Err(ServiceError::ValidationError(format!(
                "Subcategory {:?} is not valid for finished goods",
                input.sub_category
            )));
        }

        let existing = Item::find()
            .filter(item::Column::LocationId.eq(input.location_id))
            .filter(item::Column::Code.eq(code.as_str()))
            .one(&*self.db_pool)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::DuplicateKey(format!(
                "Item with code {} already exists at location {}",
                code, input.location_id
            )));
        }

        let stock_status =
            StockStatus::from_levels(input.current_stock, input.reorder_point, input.maximum_stock);
        let total_value = input.current_stock * input.unit_price;

        let model = item::ActiveModel {
            location_id: Set(input.location_id),
            code: Set(code),
            external_id: Set(input.external_id.clone()),
            name: Set(input.name.trim().to_string()),
            description: Set(input.description.clone()),
            category: Set(input
                .category
                .clone()
                .unwrap_or_else(|| "General".to_string())),
            sub_category: Set(input.sub_category.clone()),
            kind: Set(input.kind),
            unit: Set(input.unit),
            unit_price: Set(input.unit_price),
            cost_price: Set(input.cost_price),
            current_stock: Set(input.current_stock),
            minimum_stock: Set(input.minimum_stock),
            maximum_stock: Set(input.maximum_stock),
            reorder_point: Set(input.reorder_point),
            total_value: Set(total_value),
            catalog_status: Set(input.catalog_status.unwrap_or(CatalogStatus::Active)),
            stock_status: Set(stock_status),
            is_active: Set(true),
            created_by: Set(actor.to_string()),
            updated_by: Set(actor.to_string()),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        self.event_sender
            .send_or_log(Event::ItemCreated(model.id))
            .await;

        info!(item_id = %model.id, code = %model.code, "Created item");
        Ok(model)
    }

    /// Create-or-merge keyed on `(location, code)`. Matches soft-deleted
    /// rows too so repeated imports never produce duplicates. `code` and
    /// `created_by` are never overwritten on merge; optional input fields
    /// leave the stored value alone.
    #[instrument(skip(self, input))]
    pub async fn upsert_by_code(
        &self,
        location_id: Uuid,
        code: &str,
        input: UpsertItem,
        actor: &str,
    ) -> Result<(item::Model, bool), ServiceError> {
        let existing = Item::find()
            .filter(item::Column::LocationId.eq(location_id))
            .filter(item::Column::Code.eq(code))
            .one(&*self.db_pool)
            .await?;

        match existing {
            None => {
                let kind = input.kind.unwrap_or(ItemKind::RawMaterial);
                if !subcategory_is_valid(kind, input.sub_category.as_deref()) {
                    return Err(ServiceError::ValidationError(format!(
                        "Subcategory {:?} is not valid for finished goods",
                        input.sub_category
                    )));
                }

                let unit_price = input.unit_price.unwrap_or(Decimal::ZERO);
                let current_stock = input.current_stock.unwrap_or(Decimal::ZERO);
                let reorder_point = input.reorder_point.unwrap_or(Decimal::ZERO);
                let maximum_stock = input.maximum_stock.unwrap_or(Decimal::ZERO);

                let model = item::ActiveModel {
                    location_id: Set(location_id),
                    code: Set(code.to_string()),
                    external_id: Set(input.external_id.clone()),
                    name: Set(input.name.clone()),
                    description: Set(input.description.clone()),
                    category: Set(input.category.clone()),
                    sub_category: Set(input.sub_category.clone()),
                    kind: Set(kind),
                    unit: Set(input.unit),
                    unit_price: Set(unit_price),
                    cost_price: Set(input.cost_price.unwrap_or(Decimal::ZERO)),
                    current_stock: Set(current_stock),
                    minimum_stock: Set(input.minimum_stock.unwrap_or(Decimal::ZERO)),
                    maximum_stock: Set(maximum_stock),
                    reorder_point: Set(reorder_point),
                    total_value: Set(current_stock * unit_price),
                    catalog_status: Set(input.catalog_status),
                    stock_status: Set(StockStatus::from_levels(
                        current_stock,
                        reorder_point,
                        maximum_stock,
                    )),
                    is_active: Set(true),
                    created_by: Set(actor.to_string()),
                    updated_by: Set(actor.to_string()),
                    ..Default::default()
                }
                .insert(&*self.db_pool)
                .await?;

                self.event_sender
                    .send_or_log(Event::ItemCreated(model.id))
                    .await;
                Ok((model, true))
            }
            Some(current) => {
                let kind = input.kind.unwrap_or(current.kind);
                let sub_category = input
                    .sub_category
                    .clone()
                    .or_else(|| current.sub_category.clone());
                if !subcategory_is_valid(kind, sub_category.as_deref()) {
                    return Err(ServiceError::ValidationError(format!(
                        "Subcategory {:?} is not valid for finished goods",
                        sub_category
                    )));
                }

                let effective_price = input.unit_price.unwrap_or(current.unit_price);
                let effective_stock = input.current_stock.unwrap_or(current.current_stock);
                let effective_reorder = input.reorder_point.unwrap_or(current.reorder_point);
                let effective_maximum = input.maximum_stock.unwrap_or(current.maximum_stock);

                let mut active: item::ActiveModel = current.into();
                if input.external_id.is_some() {
                    active.external_id = Set(input.external_id.clone());
                }
                active.name = Set(input.name.clone());
                if input.description.is_some() {
                    active.description = Set(input.description.clone());
                }
                active.category = Set(input.category.clone());
                if input.sub_category.is_some() {
                    active.sub_category = Set(input.sub_category.clone());
                }
                active.kind = Set(kind);
                active.unit = Set(input.unit);
                if let Some(unit_price) = input.unit_price {
                    active.unit_price = Set(unit_price);
                }
                if let Some(cost_price) = input.cost_price {
                    active.cost_price = Set(cost_price);
                }
                if let Some(stock) = input.current_stock {
                    active.current_stock = Set(stock);
                }
                if let Some(minimum) = input.minimum_stock {
                    active.minimum_stock = Set(minimum);
                }
                if let Some(maximum) = input.maximum_stock {
                    active.maximum_stock = Set(maximum);
                }
                if let Some(reorder) = input.reorder_point {
                    active.reorder_point = Set(reorder);
                }
                active.catalog_status = Set(input.catalog_status);
                active.stock_status = Set(StockStatus::from_levels(
                    effective_stock,
                    effective_reorder,
                    effective_maximum,
                ));
                active.total_value = Set(effective_stock * effective_price);
                active.updated_by = Set(actor.to_string());

                let model = active.update(&*self.db_pool).await?;

                self.event_sender
                    .send_or_log(Event::ItemUpdated(model.id))
                    .await;
                Ok((model, false))
            }
        }
    }

    /// Partial merge by id. `code` is immutable and absent from the input.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateItem,
        actor: &str,
    ) -> Result<item::Model, ServiceError> {
        input.validate()?;
        let current = self.find_by_id(id).await?;

        let effective_kind = input.kind.unwrap_or(current.kind);
        let effective_sub = input
            .sub_category
            .clone()
            .or_else(|| current.sub_category.clone());
        if !subcategory_is_valid(effective_kind, effective_sub.as_deref()) {
            return Err(ServiceError::ValidationError(format!(
                "Subcategory {:?} is not valid for finished goods",
                effective_sub
            )));
        }

        let effective_stock = input.current_stock.unwrap_or(current.current_stock);
        let effective_price = input.unit_price.unwrap_or(current.unit_price);
        let effective_reorder = input.reorder_point.unwrap_or(current.reorder_point);
        let effective_maximum = input.maximum_stock.unwrap_or(current.maximum_stock);

        let mut active: item::ActiveModel = current.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(external_id) = input.external_id {
            active.external_id = Set(Some(external_id));
        }
        if let Some(category) = input.category {
            active.category = Set(category);
        }
        if let Some(sub_category) = input.sub_category {
            active.sub_category = Set(Some(sub_category));
        }
        if let Some(kind) = input.kind {
            active.kind = Set(kind);
        }
        if let Some(unit) = input.unit {
            active.unit = Set(unit);
        }
        if let Some(unit_price) = input.unit_price {
            active.unit_price = Set(unit_price);
        }
        if let Some(cost_price) = input.cost_price {
            active.cost_price = Set(cost_price);
        }
        if let Some(current_stock) = input.current_stock {
            active.current_stock = Set(current_stock);
        }
        if let Some(minimum_stock) = input.minimum_stock {
            active.minimum_stock = Set(minimum_stock);
        }
        if let Some(maximum_stock) = input.maximum_stock {
            active.maximum_stock = Set(maximum_stock);
        }
        if let Some(reorder_point) = input.reorder_point {
            active.reorder_point = Set(reorder_point);
        }
        if let Some(catalog_status) = input.catalog_status {
            active.catalog_status = Set(catalog_status);
        }
        active.stock_status = Set(StockStatus::from_levels(
            effective_stock,
            effective_reorder,
            effective_maximum,
        ));
        active.total_value = Set(effective_stock * effective_price);
        active.updated_by = Set(actor.to_string());

        let model = active.update(&*self.db_pool).await?;

        self.event_sender
            .send_or_log(Event::ItemUpdated(model.id))
            .await;

        info!(item_id = %model.id, "Updated item");
        Ok(model)
    }

    /// Soft delete: the row stays for reconciliation and history.
    #[instrument(skip(self))]
    pub async fn soft_delete(&self, id: Uuid, actor: &str) -> Result<item::Model, ServiceError> {
        let current = self.find_by_id(id).await?;
        if !current.is_active {
            return Ok(current);
        }

        let mut active: item::ActiveModel = current.into();
        active.is_active = Set(false);
        active.updated_by = Set(actor.to_string());
        let model = active.update(&*self.db_pool).await?;

        self.event_sender
            .send_or_log(Event::ItemArchived(model.id))
            .await;

        info!(item_id = %model.id, "Archived item");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn restore(&self, id: Uuid, actor: &str) -> Result<item::Model, ServiceError> {
        let current = self.find_by_id(id).await?;
        if current.is_active {
            return Ok(current);
        }

        let mut active: item::ActiveModel = current.into();
        active.is_active = Set(true);
        active.updated_by = Set(actor.to_string());
        let model = active.update(&*self.db_pool).await?;

        self.event_sender
            .send_or_log(Event::ItemRestored(model.id))
            .await;

        info!(item_id = %model.id, "Restored item");
        Ok(model)
    }

    /// Hard delete of every item at a location. Soft delete is the normal
    /// path; this exists for the explicit admin clear operation only.
    #[instrument(skip(self))]
    pub async fn purge_location(&self, location_id: Uuid) -> Result<u64, ServiceError> {
        let result = Item::delete_many()
            .filter(item::Column::LocationId.eq(location_id))
            .exec(&*self.db_pool)
            .await?;

        self.event_sender
            .send_or_log(Event::Generic {
                message: format!("items_purged:{}", location_id),
                timestamp: Utc::now(),
                metadata: json!({
                    "location_id": location_id,
                    "deleted": result.rows_affected,
                }),
            })
            .await;

        info!(
            location_id = %location_id,
            deleted = result.rows_affected,
            "Purged items for location"
        );
        Ok(result.rows_affected)
    }

    /// Paginated predicate search. `page` is 1-based.
    #[instrument(skip(self))]
    pub async fn query(
        &self,
        filter: ItemFilter,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<item::Model>, u64), ServiceError> {
        let mut query = Item::find();

        if let Some(location_id) = filter.location_id {
            query = query.filter(item::Column::LocationId.eq(location_id));
        }
        if let Some(category) = &filter.category {
            query = query.filter(item::Column::Category.eq(category.as_str()));
        }
        if let Some(catalog_status) = filter.catalog_status {
            query = query.filter(item::Column::CatalogStatus.eq(catalog_status));
        }
        if let Some(stock_status) = filter.stock_status {
            query = query.filter(item::Column::StockStatus.eq(stock_status));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(item::Column::Kind.eq(kind));
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(item::Column::IsActive.eq(is_active));
        }
        if let Some(search) = &filter.search {
            let term = format!("%{}%", search.trim().to_lowercase());
            // lower() on both sides keeps the match case-insensitive on
            // Postgres too, where LIKE is case-sensitive.
            query = query.filter(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(item::Column::Name))).like(term.clone()))
                    .add(Expr::expr(Func::lower(Expr::col(item::Column::Code))).like(term.clone()))
                    .add(Expr::expr(Func::lower(Expr::col(item::Column::Description))).like(term)),
            );
        }

        let paginator = query
            .order_by_asc(item::Column::Code)
            .paginate(&*self.db_pool, limit.max(1));
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items, total))
    }

    /// Active items at or below their reorder point. The boundary is
    /// inclusive: stock exactly at the reorder point counts.
    #[instrument(skip(self))]
    pub async fn low_stock(
        &self,
        location_id: Option<Uuid>,
    ) -> Result<Vec<item::Model>, ServiceError> {
        let mut query = Item::find()
            .filter(item::Column::IsActive.eq(true))
            .filter(
                Expr::col(item::Column::CurrentStock).lte(Expr::col(item::Column::ReorderPoint)),
            );
        if let Some(location_id) = location_id {
            query = query.filter(item::Column::LocationId.eq(location_id));
        }

        query
            .order_by_asc(item::Column::CurrentStock)
            .all(&*self.db_pool)
            .await
            .map_err(Into::into)
    }

    /// Every row at a location, archived rows included. Sync matches
    /// against soft-deleted rows too, so a re-import merges instead of
    /// creating a twin.
    #[instrument(skip(self))]
    pub async fn location_items(
        &self,
        location_id: Uuid,
    ) -> Result<Vec<item::Model>, ServiceError> {
        Item::find()
            .filter(item::Column::LocationId.eq(location_id))
            .all(&*self.db_pool)
            .await
            .map_err(Into::into)
    }

    #[instrument(skip(self))]
    pub async fn distinct_categories(
        &self,
        location_id: Option<Uuid>,
    ) -> Result<Vec<String>, ServiceError> {
        let mut query = Item::find()
            .select_only()
            .column(item::Column::Category)
            .distinct()
            .order_by_asc(item::Column::Category);
        if let Some(location_id) = location_id {
            query = query.filter(item::Column::LocationId.eq(location_id));
        }

        query
            .into_tuple::<String>()
            .all(&*self.db_pool)
            .await
            .map_err(Into::into)
    }

    /// Applies a signed stock delta. Negative deltas are guarded in the
    /// UPDATE's WHERE clause so concurrent adjustments can never drive
    /// stock below zero.
    #[instrument(skip(self))]
    pub async fn adjust_stock(
        &self,
        id: Uuid,
        delta: Decimal,
        actor: &str,
    ) -> Result<item::Model, ServiceError> {
        let txn = self.db_pool.begin().await?;
        let updated = adjust_stock_on(&txn, id, delta, actor).await?;
        txn.commit().await?;

        let old_stock = updated.current_stock - delta;
        self.event_sender
            .send_or_log(Event::StockAdjusted {
                item_id: updated.id,
                location_id: updated.location_id,
                old_quantity: old_stock,
                new_quantity: updated.current_stock,
                reason: actor.to_string(),
            })
            .await;
        if matches!(
            updated.stock_status,
            StockStatus::LowStock | StockStatus::OutOfStock
        ) {
            self.event_sender
                .send_or_log(Event::LowStock {
                    item_id: updated.id,
                    location_id: updated.location_id,
                    current_stock: updated.current_stock,
                    reorder_point: updated.reorder_point,
                })
                .await;
        }

        Ok(updated)
    }
}

/// Conditional adjustment against a caller-supplied connection, so a
/// transfer can run several of these inside one transaction. The guard
/// lives in the WHERE clause; `rows_affected == 0` is then disambiguated
/// with a follow-up read.
pub(crate) async fn adjust_stock_on<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    delta: Decimal,
    actor: &str,
) -> Result<item::Model, ServiceError> {
    let mut update = Item::update_many()
        .col_expr(
            item::Column::CurrentStock,
            Expr::col(item::Column::CurrentStock).add(delta),
        )
        .filter(item::Column::Id.eq(id));
    if delta < Decimal::ZERO {
        update = update.filter(item::Column::CurrentStock.gte(delta.abs()));
    }

    let result = update.exec(conn).await?;
    if result.rows_affected == 0 {
        return match Item::find_by_id(id).one(conn).await? {
            None => Err(ServiceError::NotFound(format!("Item {} not found", id))),
            Some(item) => Err(ServiceError::InsufficientStock(format!(
                "Item {} has {} on hand, cannot remove {}",
                item.code,
                item.current_stock,
                delta.abs()
            ))),
        };
    }

    let item = Item::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", id)))?;

    let mut active: item::ActiveModel = item.clone().into();
    active.stock_status = Set(StockStatus::from_levels(
        item.current_stock,
        item.reorder_point,
        item.maximum_stock,
    ));
    active.total_value = Set(item.current_stock * item.unit_price);
    active.updated_by = Set(actor.to_string());

    active.update(conn).await.map_err(Into::into)
}

pub(crate) fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("must not be negative"));
    }
    Ok(())
}

/// Input for a strict item insert
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewItem {
    pub location_id: Uuid,
    #[validate(length(min = 1, max = 50))]
    pub code: String,
    pub external_id: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    /// Defaults to "General" when omitted
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub kind: ItemKind,
    pub unit: UnitOfMeasure,
    #[validate(custom = "validate_non_negative")]
    pub unit_price: Decimal,
    #[validate(custom = "validate_non_negative")]
    pub cost_price: Decimal,
    #[validate(custom = "validate_non_negative")]
    pub current_stock: Decimal,
    #[validate(custom = "validate_non_negative")]
    pub minimum_stock: Decimal,
    #[validate(custom = "validate_non_negative")]
    pub maximum_stock: Decimal,
    #[validate(custom = "validate_non_negative")]
    pub reorder_point: Decimal,
    pub catalog_status: Option<CatalogStatus>,
}

/// Payload for create-or-merge. Optional fields leave the stored value
/// untouched when merging into an existing row and fall back to a
/// neutral default when creating.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpsertItem {
    pub external_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub sub_category: Option<String>,
    pub kind: Option<ItemKind>,
    pub unit: UnitOfMeasure,
    pub unit_price: Option<Decimal>,
    pub cost_price: Option<Decimal>,
    pub current_stock: Option<Decimal>,
    pub minimum_stock: Option<Decimal>,
    pub maximum_stock: Option<Decimal>,
    pub reorder_point: Option<Decimal>,
    pub catalog_status: CatalogStatus,
}

/// Partial update by id
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateItem {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub external_id: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub kind: Option<ItemKind>,
    pub unit: Option<UnitOfMeasure>,
    #[validate(custom = "validate_non_negative_opt")]
    pub unit_price: Option<Decimal>,
    #[validate(custom = "validate_non_negative_opt")]
    pub cost_price: Option<Decimal>,
    #[validate(custom = "validate_non_negative_opt")]
    pub current_stock: Option<Decimal>,
    #[validate(custom = "validate_non_negative_opt")]
    pub minimum_stock: Option<Decimal>,
    #[validate(custom = "validate_non_negative_opt")]
    pub maximum_stock: Option<Decimal>,
    #[validate(custom = "validate_non_negative_opt")]
    pub reorder_point: Option<Decimal>,
    pub catalog_status: Option<CatalogStatus>,
}

pub(crate) fn validate_non_negative_opt(value: &Decimal) -> Result<(), ValidationError> {
    validate_non_negative(value)
}

/// Predicate set for the item listing endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ItemFilter {
    pub location_id: Option<Uuid>,
    /// Case-insensitive substring over name, code and description
    pub search: Option<String>,
    pub category: Option<String>,
    pub catalog_status: Option<CatalogStatus>,
    pub stock_status: Option<StockStatus>,
    pub kind: Option<ItemKind>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_new_item() -> NewItem {
        NewItem {
            location_id: Uuid::new_v4(),
            code: "FLR-001".to_string(),
            external_id: None,
            name: "Bread Flour".to_string(),
            description: None,
            category: Some("Baking".to_string()),
            sub_category: None,
            kind: ItemKind::RawMaterial,
            unit: UnitOfMeasure::Kg,
            unit_price: dec!(1.80),
            cost_price: dec!(1.20),
            current_stock: dec!(40),
            minimum_stock: dec!(5),
            maximum_stock: dec!(100),
            reorder_point: dec!(10),
            catalog_status: None,
        }
    }

    #[test]
    fn new_item_accepts_valid_input() {
        assert!(sample_new_item().validate().is_ok());
    }

    #[test]
    fn new_item_rejects_blank_code() {
        let mut input = sample_new_item();
        input.code = String::new();
        assert!(input.validate().is_err());
    }

    #[test]
    fn new_item_rejects_negative_price() {
        let mut input = sample_new_item();
        input.unit_price = dec!(-0.01);
        assert!(input.validate().is_err());
    }

    #[test]
    fn update_item_rejects_negative_stock() {
        let input = UpdateItem {
            current_stock: Some(dec!(-1)),
            ..Default::default()
        };
        assert!(input.validate().is_err());
    }
}
