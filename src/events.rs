use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the channel is closed.
    /// Used after commit: the write already happened, so the caller must not fail.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!(error = %e, "Dropped event after commit");
        }
    }
}

// The events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Catalog events
    ItemCreated(Uuid),
    ItemUpdated(Uuid),
    ItemArchived(Uuid),
    ItemRestored(Uuid),
    StockAdjusted {
        item_id: Uuid,
        location_id: Uuid,
        old_quantity: Decimal,
        new_quantity: Decimal,
        reason: String,
    },
    LowStock {
        item_id: Uuid,
        location_id: Uuid,
        current_stock: Decimal,
        reorder_point: Decimal,
    },

    // Import and sync events
    ImportCompleted {
        location_id: Uuid,
        inserted: u64,
        updated: u64,
        skipped: u64,
    },
    CatalogSyncCompleted {
        location_id: Uuid,
        created: u64,
        updated: u64,
        skipped: u64,
        failed: u64,
    },

    // Transfer events
    TransferCreated(Uuid),
    TransferStatusChanged {
        transfer_id: Uuid,
        old_status: String,
        new_status: String,
    },
    TransferExecuted {
        transfer_id: Uuid,
        completed_lines: u32,
        failed_lines: u32,
    },
    TransferCancelled(Uuid),

    // Generic event for custom messages
    Generic {
        message: String,
        timestamp: DateTime<Utc>,
        metadata: serde_json::Value,
    },
}

impl Event {
    /// Create a generic event with string data
    pub fn with_data(data: String) -> Self {
        Event::Generic {
            message: data,
            timestamp: Utc::now(),
            metadata: serde_json::Value::Null,
        }
    }
}

// Processes incoming events. Runs as a background task for the lifetime of the server.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match event {
            Event::LowStock {
                item_id,
                location_id,
                current_stock,
                reorder_point,
            } => {
                if let Err(e) =
                    handle_low_stock(item_id, location_id, current_stock, reorder_point).await
                {
                    error!(
                        "Failed to handle low stock event: item_id={}, error={}",
                        item_id, e
                    );
                }
            }
            Event::StockAdjusted {
                item_id,
                location_id,
                old_quantity,
                new_quantity,
                reason,
            } => {
                if let Err(e) = handle_stock_adjustment(
                    item_id,
                    location_id,
                    old_quantity,
                    new_quantity,
                    &reason,
                )
                .await
                {
                    error!(
                        "Failed to handle stock adjustment: item_id={}, error={}",
                        item_id, e
                    );
                }
            }
            Event::TransferExecuted {
                transfer_id,
                completed_lines,
                failed_lines,
            } => {
                if failed_lines > 0 {
                    warn!(
                        "Transfer {} executed with {} failed of {} total lines",
                        transfer_id,
                        failed_lines,
                        completed_lines + failed_lines
                    );
                } else {
                    info!(
                        "Transfer {} executed: all {} lines completed",
                        transfer_id, completed_lines
                    );
                }
            }
            Event::CatalogSyncCompleted {
                location_id,
                created,
                updated,
                skipped,
                failed,
            } => {
                info!(
                    "Catalog sync for location {} finished: created={}, updated={}, skipped={}, failed={}",
                    location_id, created, updated, skipped, failed
                );
                if failed > 0 {
                    warn!(
                        "Catalog sync for location {} had {} failed rows",
                        location_id, failed
                    );
                }
            }
            Event::ImportCompleted {
                location_id,
                inserted,
                updated,
                skipped,
            } => {
                info!(
                    "Import for location {} finished: inserted={}, updated={}, skipped={}",
                    location_id, inserted, updated, skipped
                );
            }
            _ => {
                info!("No specific handler for event: {:?}", event);
            }
        }
    }

    warn!("Event processing loop has ended");
}

// Handler functions for specific events
async fn handle_low_stock(
    item_id: Uuid,
    location_id: Uuid,
    current_stock: Decimal,
    reorder_point: Decimal,
) -> Result<(), String> {
    warn!(
        "Low stock alert: item {} at location {} has {} on hand (reorder point {})",
        item_id, location_id, current_stock, reorder_point
    );

    // Reorder workflow integration would go here
    Ok(())
}

async fn handle_stock_adjustment(
    item_id: Uuid,
    location_id: Uuid,
    old_quantity: Decimal,
    new_quantity: Decimal,
    reason: &str,
) -> Result<(), String> {
    info!(
        "Stock adjustment: item={}, location={}, old={}, new={}, reason={}",
        item_id, location_id, old_quantity, new_quantity, reason
    );

    if new_quantity < Decimal::ZERO {
        warn!(
            "Stock for item {} at location {} went negative ({})",
            item_id, location_id, new_quantity
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sender_delivers_events() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        let item_id = Uuid::new_v4();
        sender.send(Event::ItemCreated(item_id)).await.unwrap();

        match rx.recv().await {
            Some(Event::ItemCreated(id)) => assert_eq!(id, item_id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_or_log_swallows_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        let sender = EventSender::new(tx);
        drop(rx);

        // Must not panic or propagate the error
        sender.send_or_log(Event::ItemUpdated(Uuid::new_v4())).await;
    }
}
