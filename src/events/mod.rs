use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;

/// Domain events emitted after state changes commit. The processor currently
/// logs them; downstream consumers (notifications, analytics) attach here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    AccountCreated {
        account_id: i64,
        account_number: String,
        currency: String,
    },
    AccountDeleted {
        account_id: i64,
    },
    DepositCompleted {
        account_id: i64,
        amount: Decimal,
    },
    WithdrawalCompleted {
        account_id: i64,
        amount: Decimal,
    },
    TransferCompleted {
        transaction_id: i64,
        sender_account_id: i64,
        receiver_account_number: String,
        amount: Decimal,
        currency: String,
    },
    FavoriteAdded {
        customer_id: i64,
        recipient_account_id: i64,
    },
    FavoriteRemoved {
        customer_id: i64,
        recipient_account_id: i64,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Event processing loop; runs for the lifetime of the server.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::TransferCompleted {
                transaction_id,
                sender_account_id,
                amount,
                currency,
                ..
            } => {
                info!(
                    transaction_id,
                    sender_account_id,
                    %amount,
                    currency,
                    "transfer completed"
                );
            }
            other => info!("Received event: {:?}", other),
        }
    }

    info!("Event processing loop stopped");
}
