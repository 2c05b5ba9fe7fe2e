mod common;

use assert_matches::assert_matches;
use common::TestApp;
use larder_api::{
    entities::{
        item::{ItemKind, UnitOfMeasure},
        location::LocationKind,
        transfer_line::TransferLineStatus,
        transfer_order::TransferStatus,
    },
    errors::ServiceError,
    services::{
        catalog::{CatalogService, NewItem},
        transfers::{CreateTransferInput, CreateTransferLine, TransferPolicy},
    },
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

async fn seed_item(catalog: &CatalogService, location_id: Uuid, code: &str, stock: Decimal) {
    catalog
        .insert(
            NewItem {
                location_id,
                code: code.to_string(),
                external_id: None,
                name: format!("{} stock", code),
                description: None,
                category: Some("Baking".to_string()),
                sub_category: None,
                kind: ItemKind::RawMaterial,
                unit: UnitOfMeasure::Kg,
                unit_price: dec!(3.00),
                cost_price: dec!(2.00),
                current_stock: stock,
                minimum_stock: Decimal::ZERO,
                maximum_stock: dec!(500),
                reorder_point: dec!(5),
                catalog_status: None,
            },
            "manual",
        )
        .await
        .expect("seeding should succeed");
}

fn request(from: Uuid, to: Uuid, lines: Vec<(&str, Decimal)>) -> CreateTransferInput {
    CreateTransferInput {
        from_location_id: from,
        to_location_id: to,
        lines: lines
            .into_iter()
            .map(|(code, quantity)| CreateTransferLine {
                item_code: code.to_string(),
                quantity,
            })
            .collect(),
        notes: None,
        requested_by: Some("tester".to_string()),
        draft: false,
    }
}

async fn stock_at(catalog: &CatalogService, location_id: Uuid, code: &str) -> Option<Decimal> {
    match catalog.find_by_code(location_id, code).await {
        Ok(item) => Some(item.current_stock),
        Err(ServiceError::NotFound(_)) => None,
        Err(err) => panic!("unexpected lookup error: {err}"),
    }
}

#[tokio::test]
async fn execute_moves_stock_and_bootstraps_the_destination() {
    let app = TestApp::new().await;
    let kitchen = app.create_location("CK", LocationKind::CentralKitchen).await;
    let outlet = app.create_location("OUT-1", LocationKind::Outlet).await;
    let catalog = &app.state.services.catalog;
    let transfers = &app.state.services.transfers;

    seed_item(catalog, kitchen, "FLR-001", dec!(40)).await;

    let details = transfers
        .create(request(kitchen, outlet, vec![("FLR-001", dec!(15))]))
        .await
        .unwrap();
    assert_eq!(details.order.status, TransferStatus::Pending);
    assert!(details.order.transfer_number.starts_with("TRF-"));
    assert_eq!(details.lines.len(), 1);
    assert_eq!(details.lines[0].unit_price, dec!(3.00));
    assert_eq!(details.order.total_amount, dec!(45.00));

    let execution = transfers
        .execute(details.order.id, TransferPolicy::PartialCommit)
        .await
        .unwrap();
    assert_eq!(execution.completed_lines, 1);
    assert_eq!(execution.failed_lines, 0);
    assert_eq!(execution.order.status, TransferStatus::Completed);
    assert!(execution.order.executed_at.is_some());
    assert_eq!(execution.lines[0].status, TransferLineStatus::Completed);

    assert_eq!(stock_at(catalog, kitchen, "FLR-001").await, Some(dec!(25)));
    // Destination row did not exist before; it is created carrying the
    // source's catalog fields.
    let landed = catalog
        .find_by_code(outlet, "FLR-001")
        .await
        .expect("destination row should exist after execution");
    assert_eq!(landed.current_stock, dec!(15));
    assert_eq!(landed.unit_price, dec!(3.00));
    assert_eq!(landed.created_by, "transfer");
}

#[tokio::test]
async fn execute_tops_up_an_existing_destination_row() {
    let app = TestApp::new().await;
    let kitchen = app.create_location("CK", LocationKind::CentralKitchen).await;
    let outlet = app.create_location("OUT-1", LocationKind::Outlet).await;
    let catalog = &app.state.services.catalog;
    let transfers = &app.state.services.transfers;

    seed_item(catalog, kitchen, "FLR-001", dec!(40)).await;
    seed_item(catalog, outlet, "FLR-001", dec!(7)).await;

    let details = transfers
        .create(request(kitchen, outlet, vec![("FLR-001", dec!(10))]))
        .await
        .unwrap();
    transfers
        .execute(details.order.id, TransferPolicy::PartialCommit)
        .await
        .unwrap();

    assert_eq!(stock_at(catalog, kitchen, "FLR-001").await, Some(dec!(30)));
    assert_eq!(stock_at(catalog, outlet, "FLR-001").await, Some(dec!(17)));
}

#[tokio::test]
async fn partial_commit_moves_what_it_can_and_records_failures() {
    let app = TestApp::new().await;
    let kitchen = app.create_location("CK", LocationKind::CentralKitchen).await;
    let outlet = app.create_location("OUT-1", LocationKind::Outlet).await;
    let catalog = &app.state.services.catalog;
    let transfers = &app.state.services.transfers;

    seed_item(catalog, kitchen, "FLR-001", dec!(40)).await;
    seed_item(catalog, kitchen, "SUG-001", dec!(5)).await;

    let details = transfers
        .create(request(
            kitchen,
            outlet,
            vec![
                ("FLR-001", dec!(10)),
                ("SUG-001", dec!(100)),
                ("GHT-001", dec!(1)),
            ],
        ))
        .await
        .unwrap();
    let execution = transfers
        .execute(details.order.id, TransferPolicy::PartialCommit)
        .await
        .unwrap();

    assert_eq!(execution.completed_lines, 1);
    assert_eq!(execution.failed_lines, 2);
    // At least one line moved, so the order completes
    assert_eq!(execution.order.status, TransferStatus::Completed);

    let by_code = |code: &str| {
        execution
            .lines
            .iter()
            .find(|line| line.item_code == code)
            .unwrap()
    };
    assert_eq!(by_code("FLR-001").status, TransferLineStatus::Completed);
    assert!(by_code("FLR-001").failure_reason.is_none());

    let short = by_code("SUG-001");
    assert_eq!(short.status, TransferLineStatus::Failed);
    assert!(short.failure_reason.as_deref().unwrap().contains("on hand"));

    let ghost = by_code("GHT-001");
    assert_eq!(ghost.status, TransferLineStatus::Failed);
    assert!(ghost
        .failure_reason
        .as_deref()
        .unwrap()
        .contains("does not exist at the source location"));

    // Failed lines left their stock untouched
    assert_eq!(stock_at(catalog, kitchen, "FLR-001").await, Some(dec!(30)));
    assert_eq!(stock_at(catalog, kitchen, "SUG-001").await, Some(dec!(5)));
    assert_eq!(stock_at(catalog, outlet, "SUG-001").await, None);
}

#[tokio::test]
async fn all_or_nothing_rolls_back_every_line() {
    let app = TestApp::new().await;
    let kitchen = app.create_location("CK", LocationKind::CentralKitchen).await;
    let outlet = app.create_location("OUT-1", LocationKind::Outlet).await;
    let catalog = &app.state.services.catalog;
    let transfers = &app.state.services.transfers;

    seed_item(catalog, kitchen, "FLR-001", dec!(40)).await;
    seed_item(catalog, kitchen, "SUG-001", dec!(5)).await;

    let details = transfers
        .create(request(
            kitchen,
            outlet,
            vec![("FLR-001", dec!(10)), ("SUG-001", dec!(100))],
        ))
        .await
        .unwrap();
    let execution = transfers
        .execute(details.order.id, TransferPolicy::AllOrNothing)
        .await
        .unwrap();

    assert_eq!(execution.completed_lines, 0);
    assert_eq!(execution.failed_lines, 2);
    assert_eq!(execution.order.status, TransferStatus::Failed);

    // The flour line would have succeeded; the rollback took it down too
    for line in &execution.lines {
        assert_eq!(line.status, TransferLineStatus::Failed);
        assert!(line.failure_reason.is_some());
    }

    assert_eq!(stock_at(catalog, kitchen, "FLR-001").await, Some(dec!(40)));
    assert_eq!(stock_at(catalog, kitchen, "SUG-001").await, Some(dec!(5)));
    assert_eq!(stock_at(catalog, outlet, "FLR-001").await, None);
}

#[tokio::test]
async fn terminal_transfers_reject_further_mutation() {
    let app = TestApp::new().await;
    let kitchen = app.create_location("CK", LocationKind::CentralKitchen).await;
    let outlet = app.create_location("OUT-1", LocationKind::Outlet).await;
    let catalog = &app.state.services.catalog;
    let transfers = &app.state.services.transfers;

    seed_item(catalog, kitchen, "FLR-001", dec!(40)).await;

    let details = transfers
        .create(request(kitchen, outlet, vec![("FLR-001", dec!(5))]))
        .await
        .unwrap();
    transfers
        .execute(details.order.id, TransferPolicy::PartialCommit)
        .await
        .unwrap();

    let again = transfers
        .execute(details.order.id, TransferPolicy::PartialCommit)
        .await
        .expect_err("a completed transfer cannot run again");
    assert_matches!(again, ServiceError::InvalidOperation(_));

    let cancel = transfers
        .cancel(details.order.id)
        .await
        .expect_err("a completed transfer cannot be cancelled");
    assert_matches!(cancel, ServiceError::InvalidOperation(_));

    // Executing twice must not move stock twice
    assert_eq!(stock_at(catalog, kitchen, "FLR-001").await, Some(dec!(35)));
}

#[tokio::test]
async fn draft_orders_wait_until_promoted() {
    let app = TestApp::new().await;
    let kitchen = app.create_location("CK", LocationKind::CentralKitchen).await;
    let outlet = app.create_location("OUT-1", LocationKind::Outlet).await;
    let catalog = &app.state.services.catalog;
    let transfers = &app.state.services.transfers;

    seed_item(catalog, kitchen, "FLR-001", dec!(40)).await;

    let mut input = request(kitchen, outlet, vec![("FLR-001", dec!(5))]);
    input.draft = true;
    let details = transfers.create(input).await.unwrap();
    assert_eq!(details.order.status, TransferStatus::Draft);

    let premature = transfers
        .execute(details.order.id, TransferPolicy::PartialCommit)
        .await
        .expect_err("drafts are not executable");
    assert_matches!(premature, ServiceError::InvalidOperation(_));
    assert_eq!(stock_at(catalog, kitchen, "FLR-001").await, Some(dec!(40)));

    let promoted = transfers
        .update_status(details.order.id, TransferStatus::Pending)
        .await
        .unwrap();
    assert_eq!(promoted.status, TransferStatus::Pending);

    let execution = transfers
        .execute(details.order.id, TransferPolicy::PartialCommit)
        .await
        .unwrap();
    assert_eq!(execution.order.status, TransferStatus::Completed);
}

#[tokio::test]
async fn create_validates_locations_and_lines() {
    let app = TestApp::new().await;
    let kitchen = app.create_location("CK", LocationKind::CentralKitchen).await;
    let outlet = app.create_location("OUT-1", LocationKind::Outlet).await;
    let transfers = &app.state.services.transfers;

    let same = transfers
        .create(request(kitchen, kitchen, vec![("FLR-001", dec!(1))]))
        .await
        .expect_err("source and destination must differ");
    assert_matches!(same, ServiceError::InvalidOperation(_));

    let missing = transfers
        .create(request(kitchen, Uuid::new_v4(), vec![("FLR-001", dec!(1))]))
        .await
        .expect_err("unknown destination must fail");
    assert_matches!(missing, ServiceError::NotFound(_));

    let empty = transfers
        .create(request(kitchen, outlet, vec![]))
        .await
        .expect_err("at least one line is required");
    assert_matches!(empty, ServiceError::ValidationError(_));

    let zero = transfers
        .create(request(kitchen, outlet, vec![("FLR-001", Decimal::ZERO)]))
        .await
        .expect_err("zero quantity lines are rejected");
    assert_matches!(zero, ServiceError::ValidationError(message) if message.contains("line 1"));
}

#[tokio::test]
async fn cancelled_orders_keep_their_lines_for_audit() {
    let app = TestApp::new().await;
    let kitchen = app.create_location("CK", LocationKind::CentralKitchen).await;
    let outlet = app.create_location("OUT-1", LocationKind::Outlet).await;
    let catalog = &app.state.services.catalog;
    let transfers = &app.state.services.transfers;

    seed_item(catalog, kitchen, "FLR-001", dec!(40)).await;

    let details = transfers
        .create(request(kitchen, outlet, vec![("FLR-001", dec!(5))]))
        .await
        .unwrap();
    let cancelled = transfers.cancel(details.order.id).await.unwrap();
    assert_eq!(cancelled.status, TransferStatus::Cancelled);

    let fetched = transfers.get(details.order.id).await.unwrap();
    assert_eq!(fetched.order.status, TransferStatus::Cancelled);
    assert_eq!(fetched.lines.len(), 1);
    assert_eq!(fetched.lines[0].status, TransferLineStatus::Pending);
    assert_eq!(stock_at(catalog, kitchen, "FLR-001").await, Some(dec!(40)));
}

#[tokio::test]
async fn list_filters_by_status() {
    let app = TestApp::new().await;
    let kitchen = app.create_location("CK", LocationKind::CentralKitchen).await;
    let outlet = app.create_location("OUT-1", LocationKind::Outlet).await;
    let catalog = &app.state.services.catalog;
    let transfers = &app.state.services.transfers;

    seed_item(catalog, kitchen, "FLR-001", dec!(40)).await;

    let first = transfers
        .create(request(kitchen, outlet, vec![("FLR-001", dec!(1))]))
        .await
        .unwrap();
    let second = transfers
        .create(request(kitchen, outlet, vec![("FLR-001", dec!(2))]))
        .await
        .unwrap();
    transfers.cancel(second.order.id).await.unwrap();

    let (all, total) = transfers.list(1, 20, None).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(all.len(), 2);

    let (pending, pending_total) = transfers
        .list(1, 20, Some(TransferStatus::Pending))
        .await
        .unwrap();
    assert_eq!(pending_total, 1);
    assert_eq!(pending[0].id, first.order.id);
}
