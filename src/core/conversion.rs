//! Reward point conversion
//!
//! The `PointConverter` turns reward points into spendable currency at the
//! configured rate. The points debit, the balance credit and the
//! spent-points audit counter change together in one commit on the user's
//! account; a single `conversion` record follows.

use crate::core::atomic::run_transaction;
use crate::core::journal::Journal;
use crate::core::traits::{AccountStore, Clock};
use crate::types::{Entry, LedgerError, Receipt, TransactionRecord, UserId};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct PointConverter {
    store: Arc<dyn AccountStore>,
    journal: Arc<Journal>,
    clock: Arc<dyn Clock>,
    /// Currency units per point
    rate: Decimal,
    max_commit_attempts: u32,
}

impl PointConverter {
    pub fn new(
        store: Arc<dyn AccountStore>,
        journal: Arc<Journal>,
        clock: Arc<dyn Clock>,
        rate: Decimal,
        max_commit_attempts: u32,
    ) -> Self {
        Self {
            store,
            journal,
            clock,
            rate,
            max_commit_attempts,
        }
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    /// Convert `points` of `user`'s reward points into currency
    ///
    /// # Errors
    ///
    /// * `InvalidAmount` - `points` is zero or negative
    /// * `InsufficientPoints` - the user holds fewer than `points`
    /// * `ArithmeticOverflow` - the credited amount is out of range
    /// * `TransferConflict`, `Unknown`, `StoreUnavailable` - see [`run_transaction`]
    pub fn convert(&self, user: &UserId, points: Decimal) -> Result<Receipt, LedgerError> {
        if points <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(points));
        }

        let amount = points
            .checked_mul(self.rate)
            .ok_or_else(|| LedgerError::arithmetic_overflow("conversion", user.as_str()))?;

        run_transaction(
            self.store.as_ref(),
            "conversion",
            &[user],
            self.max_commit_attempts,
            |accounts| {
                let account = &mut accounts[0];
                if account.reward_points < points {
                    return Err(LedgerError::insufficient_points(
                        user.as_str(),
                        account.reward_points,
                        points,
                    ));
                }

                let overflow = || LedgerError::arithmetic_overflow("conversion", user.as_str());
                account.reward_points = account.reward_points.checked_sub(points).ok_or_else(overflow)?;
                account.balance = account.balance.checked_add(amount).ok_or_else(overflow)?;
                account.spent_points = account.spent_points.checked_add(points).ok_or_else(overflow)?;
                Ok(())
            },
        )?;

        let record = TransactionRecord::new(
            user.clone(),
            Entry::Conversion { points, amount },
            format!("Converted {} points into {}", points, amount),
            self.clock.now(),
        );

        info!(user = %user, %points, %amount, "points converted");

        let log_status = self.journal.record(std::slice::from_ref(&record));
        Ok(Receipt { record, log_status })
    }
}
