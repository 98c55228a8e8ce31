use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::ServiceError;

pub mod feed;

/// Domain events emitted after a service operation commits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Warehouse topology events
    WarehouseCreated(Uuid),
    WarehouseUpdated(Uuid),
    WarehouseDeleted(Uuid),
    BinCreated {
        bin_id: Uuid,
        rack_id: Uuid,
    },

    // Inventory events
    InventoryReceived {
        record_id: Uuid,
        product_id: Uuid,
        bin_id: Uuid,
        quantity: Decimal,
    },
    StockPutAway {
        record_id: Uuid,
        from_bin_id: Uuid,
        to_bin_id: Uuid,
    },
    InventoryAdjusted {
        product_id: Uuid,
        mode: String,
        quantity: Decimal,
        bin_count: usize,
        reference_number: Option<String>,
    },

    // Chat events
    MessageSent {
        message_id: Uuid,
        sender_id: Uuid,
        mentioned_user_ids: Vec<Uuid>,
    },
    ReactionToggled {
        message_id: Uuid,
        user_id: Uuid,
        emoji: String,
        added: bool,
    },
    ReadStateUpdated {
        user_id: Uuid,
        last_read_at: DateTime<Utc>,
    },
}

/// Cloneable handle for emitting events into the processing loop.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), ServiceError> {
        self.sender
            .send(event)
            .await
            .map_err(|e| ServiceError::EventError(format!("failed to send event: {}", e)))
    }
}

/// Drains the event channel and logs each event. Runs for the lifetime of
/// the server; exits when every `EventSender` has been dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::InventoryAdjusted {
                product_id,
                mode,
                quantity,
                bin_count,
                reference_number,
            } => {
                info!(
                    %product_id,
                    mode,
                    %quantity,
                    bin_count,
                    reference_number = reference_number.as_deref().unwrap_or("-"),
                    "inventory adjusted"
                );
            }
            Event::InventoryReceived {
                record_id,
                product_id,
                bin_id,
                quantity,
            } => {
                info!(%record_id, %product_id, %bin_id, %quantity, "inventory received");
            }
            Event::StockPutAway {
                record_id,
                from_bin_id,
                to_bin_id,
            } => {
                info!(%record_id, %from_bin_id, %to_bin_id, "stock put away");
            }
            Event::MessageSent {
                message_id,
                sender_id,
                mentioned_user_ids,
            } => {
                info!(
                    %message_id,
                    %sender_id,
                    mentions = mentioned_user_ids.len(),
                    "chat message sent"
                );
            }
            other => debug!(event = ?other, "event processed"),
        }
    }

    info!("event channel closed, stopping event processing loop");
}
