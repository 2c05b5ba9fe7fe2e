use crate::{
    db::DbPool,
    entities::{
        item::{self, Entity as Item, StockStatus},
        transfer_line::{self, Entity as TransferLine, TransferLineStatus},
        transfer_order::{self, Entity as TransferOrder, TransferStatus},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{catalog::adjust_stock_on, locations::LocationService},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

const TRANSFER_ACTOR: &str = "transfer";

/// Commit behavior when executing a transfer order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransferPolicy {
    /// Each line commits in its own transaction; failed lines are
    /// recorded and the rest still move. The default.
    #[default]
    PartialCommit,
    /// All lines move in one transaction; the first failure rolls every
    /// line back.
    AllOrNothing,
}

/// Moves stock between locations. Source decrements are guarded in the
/// UPDATE's WHERE clause, so a concurrent execution can never drive a
/// source item negative.
#[derive(Clone)]
pub struct TransferService {
    db_pool: Arc<DbPool>,
    locations: LocationService,
    event_sender: EventSender,
}

impl TransferService {
    pub fn new(db_pool: Arc<DbPool>, locations: LocationService, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            locations,
            event_sender,
        }
    }

    /// Creates an order with its lines. Line prices are resolved from
    /// the source location's items at creation time; codes unknown at
    /// the source are priced at zero and will fail at execution.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreateTransferInput) -> Result<TransferDetails, ServiceError> {
        input.validate()?;
        for (index, line) in input.lines.iter().enumerate() {
            line.validate().map_err(|err| {
                ServiceError::ValidationError(format!("line {}: {}", index + 1, err))
            })?;
        }

        if input.from_location_id == input.to_location_id {
            return Err(ServiceError::InvalidOperation(
                "Source and destination locations must differ".to_string(),
            ));
        }
        self.locations.get(input.from_location_id).await?;
        self.locations.get(input.to_location_id).await?;

        // Price each line from the source item when it exists
        let mut priced_lines = Vec::with_capacity(input.lines.len());
        let mut total_amount = Decimal::ZERO;
        for line in &input.lines {
            let code = line.item_code.trim().to_string();
            let unit_price = Item::find()
                .filter(item::Column::LocationId.eq(input.from_location_id))
                .filter(item::Column::Code.eq(code.as_str()))
                .one(&*self.db_pool)
                .await?
                .map(|source| source.unit_price)
                .unwrap_or(Decimal::ZERO);
            total_amount += line.quantity * unit_price;
            priced_lines.push((code, line.quantity, unit_price));
        }

        let status = if input.draft {
            TransferStatus::Draft
        } else {
            TransferStatus::Pending
        };
        let transfer_number = generate_transfer_number();

        let txn = self.db_pool.begin().await?;

        let order = transfer_order::ActiveModel {
            transfer_number: Set(transfer_number),
            from_location_id: Set(input.from_location_id),
            to_location_id: Set(input.to_location_id),
            status: Set(status),
            total_amount: Set(total_amount),
            notes: Set(input.notes.clone()),
            requested_by: Set(input
                .requested_by
                .clone()
                .unwrap_or_else(|| "system".to_string())),
            executed_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut lines = Vec::with_capacity(priced_lines.len());
        for (code, quantity, unit_price) in priced_lines {
            let line = transfer_line::ActiveModel {
                transfer_order_id: Set(order.id),
                item_code: Set(code),
                quantity: Set(quantity),
                unit_price: Set(unit_price),
                status: Set(TransferLineStatus::Pending),
                failure_reason: Set(None),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            lines.push(line);
        }

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::TransferCreated(order.id))
            .await;

        info!(
            transfer_id = %order.id,
            transfer_number = %order.transfer_number,
            lines = lines.len(),
            "Created transfer order"
        );
        Ok(TransferDetails { order, lines })
    }

    /// Runs every pending line of a Pending or InTransit order. Line
    /// outcomes are persisted on the lines; the order lands on Completed
    /// when at least one line has moved stock, Failed when none did.
    #[instrument(skip(self))]
    pub async fn execute(
        &self,
        id: Uuid,
        policy: TransferPolicy,
    ) -> Result<TransferExecution, ServiceError> {
        let order = self.get_order(id).await?;
        if !matches!(
            order.status,
            TransferStatus::Pending | TransferStatus::InTransit
        ) {
            return Err(ServiceError::InvalidOperation(format!(
                "Transfer {} cannot be executed from status {}",
                order.transfer_number, order.status
            )));
        }

        let lines = self.order_lines(id).await?;
        match policy {
            TransferPolicy::PartialCommit => self.execute_partial(&order, &lines).await?,
            TransferPolicy::AllOrNothing => self.execute_atomic(&order, &lines).await?,
        }

        let lines = self.order_lines(id).await?;
        let completed_lines = lines
            .iter()
            .filter(|line| line.status == TransferLineStatus::Completed)
            .count() as u32;
        let failed_lines = lines
            .iter()
            .filter(|line| line.status == TransferLineStatus::Failed)
            .count() as u32;

        let next_status = if completed_lines > 0 {
            TransferStatus::Completed
        } else {
            TransferStatus::Failed
        };

        let old_status = order.status;
        let mut active: transfer_order::ActiveModel = order.into();
        active.status = Set(next_status);
        active.executed_at = Set(Some(Utc::now()));
        let order = active.update(&*self.db_pool).await?;

        self.event_sender
            .send_or_log(Event::TransferStatusChanged {
                transfer_id: order.id,
                old_status: old_status.to_string(),
                new_status: next_status.to_string(),
            })
            .await;
        self.event_sender
            .send_or_log(Event::TransferExecuted {
                transfer_id: order.id,
                completed_lines,
                failed_lines,
            })
            .await;

        info!(
            transfer_id = %order.id,
            completed = completed_lines,
            failed = failed_lines,
            status = %order.status,
            "Executed transfer order"
        );
        Ok(TransferExecution {
            order,
            lines,
            completed_lines,
            failed_lines,
        })
    }

    async fn execute_partial(
        &self,
        order: &transfer_order::Model,
        lines: &[transfer_line::Model],
    ) -> Result<(), ServiceError> {
        for line in lines {
            if line.status != TransferLineStatus::Pending {
                continue;
            }

            let moved: Result<(), ServiceError> = async {
                let txn = self.db_pool.begin().await?;
                move_line_stock(&txn, order, line).await?;
                mark_line(&txn, line, TransferLineStatus::Completed, None).await?;
                txn.commit().await?;
                Ok(())
            }
            .await;

            if let Err(err) = moved {
                warn!(
                    transfer_id = %order.id,
                    item_code = %line.item_code,
                    error = %err,
                    "Transfer line failed"
                );
                // The stock movement rolled back; the outcome still has
                // to stick, so it is written outside that transaction.
                mark_line(
                    &*self.db_pool,
                    line,
                    TransferLineStatus::Failed,
                    Some(err.to_string()),
                )
                .await?;
            }
        }
        Ok(())
    }

    async fn execute_atomic(
        &self,
        order: &transfer_order::Model,
        lines: &[transfer_line::Model],
    ) -> Result<(), ServiceError> {
        let pending: Vec<&transfer_line::Model> = lines
            .iter()
            .filter(|line| line.status == TransferLineStatus::Pending)
            .collect();

        let txn = self.db_pool.begin().await?;
        let mut trigger: Option<(usize, String)> = None;

        for (index, line) in pending.iter().enumerate() {
            match move_line_stock(&txn, order, line).await {
                Ok(()) => {
                    mark_line(&txn, line, TransferLineStatus::Completed, None).await?;
                }
                Err(err) => {
                    trigger = Some((index, err.to_string()));
                    break;
                }
            }
        }

        match trigger {
            None => {
                txn.commit().await?;
                Ok(())
            }
            Some((trigger_index, reason)) => {
                txn.rollback().await?;
                warn!(
                    transfer_id = %order.id,
                    item_code = %pending[trigger_index].item_code,
                    error = %reason,
                    "Rolling back all lines"
                );
                for (index, line) in pending.iter().enumerate() {
                    let line_reason = if index == trigger_index {
                        reason.clone()
                    } else {
                        format!("rolled back: {}", reason)
                    };
                    mark_line(
                        &*self.db_pool,
                        line,
                        TransferLineStatus::Failed,
                        Some(line_reason),
                    )
                    .await?;
                }
                Ok(())
            }
        }
    }

    /// Linear progression guard. Repeating the current status is a
    /// no-op; anything else must be a legal transition.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: Uuid,
        next: TransferStatus,
    ) -> Result<transfer_order::Model, ServiceError> {
        let order = self.get_order(id).await?;
        if order.status == next {
            return Ok(order);
        }
        if !order.status.can_transition_to(next) {
            return Err(ServiceError::InvalidOperation(format!(
                "Transfer {} cannot move from {} to {}",
                order.transfer_number, order.status, next
            )));
        }

        let old_status = order.status;
        let mut active: transfer_order::ActiveModel = order.into();
        active.status = Set(next);
        let order = active.update(&*self.db_pool).await?;

        self.event_sender
            .send_or_log(Event::TransferStatusChanged {
                transfer_id: order.id,
                old_status: old_status.to_string(),
                new_status: next.to_string(),
            })
            .await;

        info!(transfer_id = %order.id, from = %old_status, to = %next, "Transfer status changed");
        Ok(order)
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, id: Uuid) -> Result<transfer_order::Model, ServiceError> {
        let order = self.update_status(id, TransferStatus::Cancelled).await?;
        self.event_sender
            .send_or_log(Event::TransferCancelled(order.id))
            .await;
        Ok(order)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<TransferDetails, ServiceError> {
        let order = self.get_order(id).await?;
        let lines = self.order_lines(id).await?;
        Ok(TransferDetails { order, lines })
    }

    /// Paginated order listing, newest first. `page` is 1-based.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        limit: u64,
        status: Option<TransferStatus>,
    ) -> Result<(Vec<transfer_order::Model>, u64), ServiceError> {
        let mut query = TransferOrder::find();
        if let Some(status) = status {
            query = query.filter(transfer_order::Column::Status.eq(status));
        }

        let paginator = query
            .order_by_desc(transfer_order::Column::CreatedAt)
            .paginate(&*self.db_pool, limit.max(1));
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((orders, total))
    }

    async fn get_order(&self, id: Uuid) -> Result<transfer_order::Model, ServiceError> {
        TransferOrder::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Transfer {} not found", id)))
    }

    async fn order_lines(&self, id: Uuid) -> Result<Vec<transfer_line::Model>, ServiceError> {
        TransferLine::find()
            .filter(transfer_line::Column::TransferOrderId.eq(id))
            .order_by_asc(transfer_line::Column::CreatedAt)
            .all(&*self.db_pool)
            .await
            .map_err(Into::into)
    }
}

/// Moves one line's quantity from source to destination. Source stock is
/// decremented under a conditional guard; a missing destination record
/// is bootstrapped from the source item's catalog fields with stock
/// equal to the transferred quantity.
async fn move_line_stock<C: ConnectionTrait>(
    conn: &C,
    order: &transfer_order::Model,
    line: &transfer_line::Model,
) -> Result<(), ServiceError> {
    let source = Item::find()
        .filter(item::Column::LocationId.eq(order.from_location_id))
        .filter(item::Column::Code.eq(line.item_code.as_str()))
        .one(conn)
        .await?
        .ok_or_else(|| {
            ServiceError::InsufficientStock(format!(
                "Item {} does not exist at the source location",
                line.item_code
            ))
        })?;

    adjust_stock_on(conn, source.id, -line.quantity, TRANSFER_ACTOR).await?;

    let destination = Item::find()
        .filter(item::Column::LocationId.eq(order.to_location_id))
        .filter(item::Column::Code.eq(line.item_code.as_str()))
        .one(conn)
        .await?;

    match destination {
        Some(existing) => {
            adjust_stock_on(conn, existing.id, line.quantity, TRANSFER_ACTOR).await?;
        }
        None => {
            item::ActiveModel {
                location_id: Set(order.to_location_id),
                code: Set(source.code.clone()),
                external_id: Set(source.external_id.clone()),
                name: Set(source.name.clone()),
                description: Set(source.description.clone()),
                category: Set(source.category.clone()),
                sub_category: Set(source.sub_category.clone()),
                kind: Set(source.kind),
                unit: Set(source.unit),
                unit_price: Set(source.unit_price),
                cost_price: Set(source.cost_price),
                current_stock: Set(line.quantity),
                minimum_stock: Set(source.minimum_stock),
                maximum_stock: Set(source.maximum_stock),
                reorder_point: Set(source.reorder_point),
                total_value: Set(line.quantity * source.unit_price),
                catalog_status: Set(source.catalog_status),
                stock_status: Set(StockStatus::from_levels(
                    line.quantity,
                    source.reorder_point,
                    source.maximum_stock,
                )),
                is_active: Set(true),
                created_by: Set(TRANSFER_ACTOR.to_string()),
                updated_by: Set(TRANSFER_ACTOR.to_string()),
                ..Default::default()
            }
            .insert(conn)
            .await?;
        }
    }

    Ok(())
}

async fn mark_line<C: ConnectionTrait>(
    conn: &C,
    line: &transfer_line::Model,
    status: TransferLineStatus,
    failure_reason: Option<String>,
) -> Result<transfer_line::Model, ServiceError> {
    let mut active: transfer_line::ActiveModel = line.clone().into();
    active.status = Set(status);
    active.failure_reason = Set(failure_reason);
    active.update(conn).await.map_err(Into::into)
}

fn generate_transfer_number() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("TRF-{}", &id[..12])
}

fn validate_positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(ValidationError::new("must be positive"));
    }
    Ok(())
}

/// Input for creating a transfer order
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTransferInput {
    pub from_location_id: Uuid,
    pub to_location_id: Uuid,
    #[validate(length(min = 1, message = "At least one line is required"))]
    pub lines: Vec<CreateTransferLine>,
    pub notes: Option<String>,
    /// Recorded as the requesting actor; defaults to "system"
    pub requested_by: Option<String>,
    /// Create as Draft instead of Pending
    #[serde(default)]
    pub draft: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTransferLine {
    #[validate(length(min = 1, max = 50))]
    pub item_code: String,
    #[validate(custom = "validate_positive")]
    pub quantity: Decimal,
}

/// An order with its lines
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransferDetails {
    pub order: transfer_order::Model,
    pub lines: Vec<transfer_line::Model>,
}

/// Execution result: refreshed order and lines plus outcome counts
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransferExecution {
    pub order: transfer_order::Model,
    pub lines: Vec<transfer_line::Model>,
    pub completed_lines: u32,
    pub failed_lines: u32,
}
