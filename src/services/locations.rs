use crate::{
    db::DbPool,
    entities::location::{self, Entity as Location, LocationKind},
    errors::ServiceError,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Registry of physical locations (central kitchens and outlets).
/// Transfers and item queries are scoped by these records.
#[derive(Clone)]
pub struct LocationService {
    db_pool: Arc<DbPool>,
}

impl LocationService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, input: CreateLocationInput) -> Result<location::Model, ServiceError> {
        input.validate()?;

        let code = input.code.trim().to_string();
        let existing = Location::find()
            .filter(location::Column::Code.eq(code.as_str()))
            .one(&*self.db_pool)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::DuplicateKey(format!(
                "Location with code {} already exists",
                code
            )));
        }

        let model = location::ActiveModel {
            code: Set(code),
            name: Set(input.name.trim().to_string()),
            kind: Set(input.kind),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(location_id = %model.id, code = %model.code, "Created location");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<location::Model, ServiceError> {
        Location::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Location {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn find_by_code(&self, code: &str) -> Result<location::Model, ServiceError> {
        Location::find()
            .filter(location::Column::Code.eq(code))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Location with code {} not found", code)))
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<location::Model>, ServiceError> {
        Location::find()
            .order_by_asc(location::Column::Code)
            .all(&*self.db_pool)
            .await
            .map_err(Into::into)
    }
}

/// Input for registering a location
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateLocationInput {
    #[validate(length(min = 1, max = 50))]
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub kind: LocationKind,
}
