use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Events emitted by the services after a successful state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    ProductCreated(i64),
    CategoryCreated(i64),
    UserRegistered(Uuid),
    MovementRecorded {
        movement_id: i64,
        product_id: i64,
        movement_type: String,
        quantity: i32,
        user_id: Uuid,
        new_quantity: i32,
    },
    MovementReverted {
        movement_id: i64,
        product_id: i64,
    },
}

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
}

/// Background consumer for the event channel. Runs until every sender is
/// dropped; a full channel back-pressures the emitting service call.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::MovementRecorded {
                movement_id,
                product_id,
                movement_type,
                quantity,
                new_quantity,
                ..
            } => {
                info!(
                    movement_id,
                    product_id,
                    movement_type = %movement_type,
                    quantity,
                    new_quantity,
                    "inventory movement recorded"
                );
            }
            Event::MovementReverted {
                movement_id,
                product_id,
            } => {
                info!(movement_id, product_id, "inventory movement reverted");
            }
            Event::ProductCreated(id) => info!(product_id = id, "product created"),
            Event::CategoryCreated(id) => info!(category_id = id, "category created"),
            Event::UserRegistered(id) => info!(user_id = %id, "user registered"),
        }
    }

    warn!("event channel closed; processor exiting");
}
