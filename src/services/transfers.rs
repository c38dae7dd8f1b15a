use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set, TransactionTrait};
use tracing::{info, instrument, warn};

use crate::db::DbPool;
use crate::entities::{account, transaction};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::accounts::{
    credit, debit, ensure_positive, find_account_by_id_locked, find_account_by_number,
    find_owned_account, unwrap_txn_err,
};
use crate::services::currency::CurrencyConverter;

#[derive(Debug, Clone)]
pub struct TransferInput {
    pub from_account_number: String,
    pub to_account_number: String,
    pub amount: Decimal,
    /// Expected recipient display name. When supplied, the transfer is
    /// refused unless it matches the receiving account exactly, so a
    /// mistyped account number cannot silently pay a stranger.
    pub recipient_name: Option<String>,
}

fn verify_recipient_name(
    expected: Option<&str>,
    receiver: &account::Model,
) -> Result<(), ServiceError> {
    match expected {
        Some(name) if name != receiver.account_name => Err(ServiceError::NotFound(
            "Recipient name mismatch".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Result of a committed transfer: the ledger entry and the sender's
/// post-debit account state.
#[derive(Debug)]
pub struct TransferOutcome {
    pub transaction: transaction::Model,
    pub sender_account: account::Model,
}

/// Money movement between accounts.
///
/// The rate lookup happens before the database transaction opens so that a
/// slow or failed rate source can never strand a committed debit and row
/// locks are never held across network calls. Debit, credit, and the ledger
/// insert then commit or roll back together.
pub struct TransferService {
    db: Arc<DbPool>,
    converter: Arc<dyn CurrencyConverter>,
    event_sender: EventSender,
}

impl TransferService {
    pub fn new(
        db: Arc<DbPool>,
        converter: Arc<dyn CurrencyConverter>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            db,
            converter,
            event_sender,
        }
    }

    #[instrument(skip(self, input), fields(amount = %input.amount))]
    pub async fn transfer(
        &self,
        caller_email: &str,
        input: TransferInput,
    ) -> Result<TransferOutcome, ServiceError> {
        ensure_positive(input.amount)?;
        if input.from_account_number == input.to_account_number {
            return Err(ServiceError::InvalidInput(
                "Cannot transfer to the same account".to_string(),
            ));
        }

        let sender =
            find_owned_account(self.db.as_ref(), caller_email, &input.from_account_number).await?;
        let receiver = find_account_by_number(self.db.as_ref(), &input.to_account_number).await?;
        verify_recipient_name(input.recipient_name.as_deref(), &receiver)?;

        let credited_amount = self
            .converter
            .convert(input.amount, &sender.currency, &receiver.currency)
            .await?;

        let amount = input.amount;
        let sender_id = sender.id;
        let receiver_id = receiver.id;
        let sender_currency = sender.currency.clone();
        let receiver_number = receiver.account_number.clone();
        let expected_name = input.recipient_name.clone();

        let outcome = self
            .db
            .transaction::<_, TransferOutcome, ServiceError>(move |txn| {
                Box::pin(async move {
                    // Lock both rows in ascending id order so concurrent
                    // opposite-direction transfers cannot deadlock.
                    let (first_id, second_id) = if sender_id < receiver_id {
                        (sender_id, receiver_id)
                    } else {
                        (receiver_id, sender_id)
                    };
                    let first = find_account_by_id_locked(txn, first_id).await?;
                    let second = find_account_by_id_locked(txn, second_id).await?;
                    let (locked_sender, locked_receiver) = if first.id == sender_id {
                        (first, second)
                    } else {
                        (second, first)
                    };

                    // Re-verify against the locked row in case the account
                    // was renamed between the pre-read and the lock.
                    verify_recipient_name(expected_name.as_deref(), &locked_receiver)?;
                    let receiver_name = locked_receiver.account_name.clone();

                    let sender_account = debit(txn, locked_sender, amount).await?;
                    credit(txn, locked_receiver, credited_amount).await?;

                    // Ledger rows are sender-anchored and record the amount
                    // in the sender's currency, before conversion.
                    let entry = transaction::ActiveModel {
                        sender_account_id: Set(sender_id),
                        currency: Set(sender_currency),
                        amount_transferred: Set(amount),
                        receiver_account_number: Set(receiver_number),
                        receiver_account_name: Set(receiver_name),
                        created_at: Set(Utc::now()),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    Ok(TransferOutcome {
                        transaction: entry,
                        sender_account,
                    })
                })
            })
            .await
            .map_err(unwrap_txn_err)?;

        info!(
            transaction_id = outcome.transaction.id,
            sender_account_id = sender_id,
            "transfer committed"
        );
        if let Err(e) = self
            .event_sender
            .send(Event::TransferCompleted {
                transaction_id: outcome.transaction.id,
                sender_account_id: sender_id,
                receiver_account_number: outcome.transaction.receiver_account_number.clone(),
                amount: outcome.transaction.amount_transferred,
                currency: outcome.transaction.currency.clone(),
            })
            .await
        {
            warn!("event delivery failed: {}", e);
        }

        Ok(outcome)
    }
}
