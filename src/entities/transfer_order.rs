use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use strum::Display;
use utoipa::ToSchema;
use uuid::Uuid;

/// Transfer order header: moves stock between two locations
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = TransferOrder)]
#[sea_orm(table_name = "transfer_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub transfer_number: String,
    pub from_location_id: Uuid,
    pub to_location_id: Uuid,
    pub status: TransferStatus,
    /// Derived sum of quantity * unit_price over lines
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub requested_by: String,
    pub executed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transfer_line::Entity")]
    TransferLines,
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::FromLocationId",
        to = "super::location::Column::Id"
    )]
    FromLocation,
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::ToLocationId",
        to = "super::location::Column::Id"
    )]
    ToLocation,
}

impl Related<super::transfer_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransferLines.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr> {
        let mut active_model = self;
        let now = Utc::now();

        if insert {
            if active_model.id.is_not_set() {
                active_model.id = Set(Uuid::new_v4());
            }
            if active_model.created_at.is_not_set() {
                active_model.created_at = Set(now);
            }
        }
        active_model.updated_at = Set(now);

        Ok(active_model)
    }
}

#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    Display,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransferStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in_transit")]
    InTransit,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl TransferStatus {
    /// Completed, Failed and Cancelled orders accept no further mutation.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransferStatus::Completed | TransferStatus::Failed | TransferStatus::Cancelled
        )
    }

    /// Linear progression: Draft -> Pending -> InTransit -> Completed/Failed,
    /// with Cancelled reachable from any non-terminal state. No cycles.
    pub fn can_transition_to(&self, next: TransferStatus) -> bool {
        use TransferStatus::*;
        match (self, next) {
            (Draft, Pending) | (Draft, Cancelled) => true,
            (Pending, InTransit) | (Pending, Completed) | (Pending, Failed)
            | (Pending, Cancelled) => true,
            (InTransit, Completed) | (InTransit, Failed) | (InTransit, Cancelled) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(TransferStatus::Draft, TransferStatus::Pending, true; "draft to pending")]
    #[test_case(TransferStatus::Draft, TransferStatus::Cancelled, true; "draft cancels")]
    #[test_case(TransferStatus::Draft, TransferStatus::InTransit, false; "draft cannot skip to in transit")]
    #[test_case(TransferStatus::Pending, TransferStatus::InTransit, true; "pending to in transit")]
    #[test_case(TransferStatus::Pending, TransferStatus::Completed, true; "pending completes on execute")]
    #[test_case(TransferStatus::Pending, TransferStatus::Failed, true; "pending fails on execute")]
    #[test_case(TransferStatus::InTransit, TransferStatus::Completed, true; "in transit completes")]
    #[test_case(TransferStatus::InTransit, TransferStatus::Draft, false; "no going back to draft")]
    #[test_case(TransferStatus::Completed, TransferStatus::Cancelled, false; "completed is terminal")]
    #[test_case(TransferStatus::Failed, TransferStatus::Pending, false; "failed is terminal")]
    #[test_case(TransferStatus::Cancelled, TransferStatus::Pending, false; "cancelled is terminal")]
    fn transition_rules(from: TransferStatus, to: TransferStatus, allowed: bool) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn terminal_states_accept_nothing() {
        use TransferStatus::*;
        for terminal in [Completed, Failed, Cancelled] {
            assert!(terminal.is_terminal());
            for next in [Draft, Pending, InTransit, Completed, Failed, Cancelled] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn status_strings_are_snake_case() {
        assert_eq!(TransferStatus::InTransit.to_string(), "in_transit");
        assert_eq!(TransferStatus::Draft.to_string(), "draft");
    }
}
