use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240115_000001_create_locations_table::Migration),
            Box::new(m20240115_000002_create_items_table::Migration),
            Box::new(m20240115_000003_create_transfer_orders_table::Migration),
            Box::new(m20240115_000004_create_transfer_lines_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240115_000001_create_locations_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240115_000001_create_locations_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create locations table aligned with entities::location Model
            manager
                .create_table(
                    Table::create()
                        .table(Locations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Locations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Locations::Code).string().not_null())
                        .col(ColumnDef::new(Locations::Name).string().not_null())
                        .col(ColumnDef::new(Locations::Kind).string().not_null())
                        .col(
                            ColumnDef::new(Locations::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Locations::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Locations::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_locations_code")
                        .table(Locations::Table)
                        .col(Locations::Code)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Locations::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Locations {
        Table,
        Id,
        Code,
        Name,
        Kind,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240115_000002_create_items_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240115_000002_create_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create items table aligned with entities::item Model
            manager
                .create_table(
                    Table::create()
                        .table(Items::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Items::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Items::LocationId).uuid().not_null())
                        .col(ColumnDef::new(Items::Code).string().not_null())
                        .col(ColumnDef::new(Items::ExternalId).string().null())
                        .col(ColumnDef::new(Items::Name).string().not_null())
                        .col(ColumnDef::new(Items::Description).text().null())
                        .col(ColumnDef::new(Items::Category).string().not_null())
                        .col(ColumnDef::new(Items::SubCategory).string().null())
                        .col(ColumnDef::new(Items::Kind).string().not_null())
                        .col(ColumnDef::new(Items::Unit).string().not_null())
                        .col(
                            ColumnDef::new(Items::UnitPrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Items::CostPrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Items::CurrentStock)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Items::MinimumStock)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Items::MaximumStock)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Items::ReorderPoint)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Items::TotalValue)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Items::CatalogStatus).string().not_null())
                        .col(ColumnDef::new(Items::StockStatus).string().not_null())
                        .col(
                            ColumnDef::new(Items::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Items::CreatedBy).string().not_null())
                        .col(ColumnDef::new(Items::UpdatedBy).string().not_null())
                        .col(ColumnDef::new(Items::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Items::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            // Identity: one code per location
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_items_location_code")
                        .table(Items::Table)
                        .col(Items::LocationId)
                        .col(Items::Code)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_items_external_id")
                        .table(Items::Table)
                        .col(Items::ExternalId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_items_category")
                        .table(Items::Table)
                        .col(Items::Category)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_items_stock_status")
                        .table(Items::Table)
                        .col(Items::StockStatus)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Items::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Items {
        Table,
        Id,
        LocationId,
        Code,
        ExternalId,
        Name,
        Description,
        Category,
        SubCategory,
        Kind,
        Unit,
        UnitPrice,
        CostPrice,
        CurrentStock,
        MinimumStock,
        MaximumStock,
        ReorderPoint,
        TotalValue,
        CatalogStatus,
        StockStatus,
        IsActive,
        CreatedBy,
        UpdatedBy,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240115_000003_create_transfer_orders_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240115_000003_create_transfer_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create transfer_orders table aligned with entities::transfer_order Model
            manager
                .create_table(
                    Table::create()
                        .table(TransferOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TransferOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TransferOrders::TransferNumber)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TransferOrders::FromLocationId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TransferOrders::ToLocationId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(TransferOrders::Status).string().not_null())
                        .col(
                            ColumnDef::new(TransferOrders::TotalAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(TransferOrders::Notes).string().null())
                        .col(
                            ColumnDef::new(TransferOrders::RequestedBy)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TransferOrders::ExecutedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(TransferOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TransferOrders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transfer_orders_transfer_number")
                        .table(TransferOrders::Table)
                        .col(TransferOrders::TransferNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transfer_orders_status")
                        .table(TransferOrders::Table)
                        .col(TransferOrders::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TransferOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum TransferOrders {
        Table,
        Id,
        TransferNumber,
        FromLocationId,
        ToLocationId,
        Status,
        TotalAmount,
        Notes,
        RequestedBy,
        ExecutedAt,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240115_000004_create_transfer_lines_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240115_000004_create_transfer_lines_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create transfer_lines table aligned with entities::transfer_line Model
            manager
                .create_table(
                    Table::create()
                        .table(TransferLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TransferLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TransferLines::TransferOrderId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(TransferLines::ItemCode).string().not_null())
                        .col(ColumnDef::new(TransferLines::Quantity).decimal().not_null())
                        .col(
                            ColumnDef::new(TransferLines::UnitPrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(TransferLines::Status).string().not_null())
                        .col(ColumnDef::new(TransferLines::FailureReason).string().null())
                        .col(
                            ColumnDef::new(TransferLines::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TransferLines::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_transfer_lines_transfer_order_id")
                                .from(TransferLines::Table, TransferLines::TransferOrderId)
                                .to(TransferOrders::Table, TransferOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transfer_lines_transfer_order_id")
                        .table(TransferLines::Table)
                        .col(TransferLines::TransferOrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TransferLines::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum TransferLines {
        Table,
        Id,
        TransferOrderId,
        ItemCode,
        Quantity,
        UnitPrice,
        Status,
        FailureReason,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum TransferOrders {
        Table,
        Id,
    }
}
