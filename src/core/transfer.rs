//! Peer-to-peer transfers between accounts addressed by card number
//!
//! This module provides the `TransferEngine`, which moves currency from a
//! sender's account to the owner of a recipient card.
//!
//! # Validation Order
//!
//! Checks run in a fixed order and the first failure wins:
//! 1. The amount is positive
//! 2. The recipient card resolves to a user
//! 3. The recipient is not the sender
//! 4. Inside the atomic unit: the sender's balance covers the amount
//!
//! Recipient card expiry is not checked: an expired card still receives.
//!
//! # Atomicity
//!
//! The debit and credit are one commit over both accounts (see
//! [`run_transaction`]), so the sum of all balances is the same before and
//! after every successful transfer and no reader can observe one side
//! without the other. The matched `send`/`receive` records are written
//! after the commit.

use crate::core::atomic::run_transaction;
use crate::core::instrument_registry::InstrumentRegistry;
use crate::core::journal::Journal;
use crate::core::traits::{AccountStore, Clock};
use crate::types::{Entry, LedgerError, TransactionRecord, TransferReceipt, UserId};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct TransferEngine {
    store: Arc<dyn AccountStore>,
    registry: Arc<InstrumentRegistry>,
    journal: Arc<Journal>,
    clock: Arc<dyn Clock>,
    max_commit_attempts: u32,
}

impl TransferEngine {
    pub fn new(
        store: Arc<dyn AccountStore>,
        registry: Arc<InstrumentRegistry>,
        journal: Arc<Journal>,
        clock: Arc<dyn Clock>,
        max_commit_attempts: u32,
    ) -> Self {
        Self {
            store,
            registry,
            journal,
            clock,
            max_commit_attempts,
        }
    }

    /// Move `amount` from `sender` to the owner of `recipient_card`
    ///
    /// # Errors
    ///
    /// * `InvalidAmount` - `amount` is zero or negative
    /// * `RecipientNotFound` - the card is malformed or unregistered
    /// * `SelfTransferRejected` - the card belongs to `sender`
    /// * `InsufficientFunds` - the sender's balance is below `amount`
    /// * `TransferConflict`, `Unknown`, `StoreUnavailable` - see [`run_transaction`]
    pub fn transfer(
        &self,
        sender: &UserId,
        recipient_card: &str,
        amount: Decimal,
    ) -> Result<TransferReceipt, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(amount));
        }

        let recipient = match self.registry.resolve(recipient_card) {
            Ok(Some(resolution)) => resolution.user,
            Ok(None) | Err(LedgerError::InvalidInstrumentFormat { .. }) => {
                return Err(LedgerError::recipient_not_found(recipient_card))
            }
            Err(e) => return Err(e),
        };

        if recipient == *sender {
            return Err(LedgerError::self_transfer_rejected(sender.as_str()));
        }

        run_transaction(
            self.store.as_ref(),
            "transfer",
            &[sender, &recipient],
            self.max_commit_attempts,
            |accounts| {
                let (from, to) = accounts.split_at_mut(1);
                let (from, to) = (&mut from[0], &mut to[0]);

                if from.balance < amount {
                    return Err(LedgerError::insufficient_funds(
                        sender.as_str(),
                        from.balance,
                        amount,
                    ));
                }

                from.balance = from
                    .balance
                    .checked_sub(amount)
                    .ok_or_else(|| LedgerError::arithmetic_overflow("transfer", sender.as_str()))?;
                to.balance = to
                    .balance
                    .checked_add(amount)
                    .ok_or_else(|| LedgerError::arithmetic_overflow("transfer", recipient.as_str()))?;
                Ok(())
            },
        )?;

        let created_at = self.clock.now();
        let sender_record = TransactionRecord::new(
            sender.clone(),
            Entry::Send {
                to: recipient.clone(),
                amount,
            },
            format!("Sent {} to {}", amount, recipient),
            created_at,
        );
        let recipient_record = TransactionRecord::new(
            recipient.clone(),
            Entry::Receive {
                from: sender.clone(),
                amount,
            },
            format!("Received {} from {}", amount, sender),
            created_at,
        );

        info!(sender = %sender, recipient = %recipient, %amount, "transfer committed");

        let log_status = self
            .journal
            .record(&[sender_record.clone(), recipient_record.clone()]);

        Ok(TransferReceipt {
            sender_record,
            recipient_record,
            log_status,
        })
    }
}
