//! Ledger facade
//!
//! This module provides the `Ledger`, the single entry point collaborators
//! use. It wires the account store, the card registry, the transfer engine,
//! the point converter and the history journal together and adds the
//! account adjustments (deposit, withdraw, point accrual) that sit outside
//! the transfer and conversion flows.
//!
//! # Architecture
//!
//! ```text
//! Ledger
//!     ├── Arc<dyn AccountStore>     (versioned accounts, atomic commits)
//!     ├── Arc<InstrumentRegistry>   (card number → user)
//!     ├── TransferEngine            (account pair debit/credit)
//!     ├── PointConverter            (points → balance)
//!     └── Arc<Journal>              (history append + reconciliation)
//!             └── Arc<dyn TransactionLog>
//! ```
//!
//! # Thread Safety
//!
//! The ledger is cloneable and every clone shares the same state, so it
//! can be handed to as many threads or tasks as needed.

use crate::core::account_store::MemoryAccountStore;
use crate::core::atomic::run_transaction;
use crate::core::clock::SystemClock;
use crate::core::config::LedgerConfig;
use crate::core::conversion::PointConverter;
use crate::core::instrument_registry::InstrumentRegistry;
use crate::core::journal::Journal;
use crate::core::traits::{AccountStore, Clock, TransactionLog};
use crate::core::transaction_log::{MemoryTransactionLog, TransactionHistory};
use crate::core::transfer::TransferEngine;
use crate::types::{
    Account, Balance, Entry, Instrument, LedgerError, LogStatus, Operation, Receipt, Resolution,
    TransactionRecord, TransferReceipt, UserId,
};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

/// Parse a caller-supplied amount
///
/// Accepts plain decimal notation only and requires a strictly positive
/// value.
pub fn parse_amount(raw: &str) -> Result<Decimal, LedgerError> {
    match Decimal::from_str(raw.trim()) {
        Ok(amount) if amount > Decimal::ZERO => Ok(amount),
        _ => Err(LedgerError::invalid_amount(raw)),
    }
}

#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn AccountStore>,
    registry: Arc<InstrumentRegistry>,
    journal: Arc<Journal>,
    transfers: TransferEngine,
    converter: PointConverter,
    clock: Arc<dyn Clock>,
    config: LedgerConfig,
}

impl Ledger {
    /// Create a ledger over in-memory storage and the system clock
    pub fn new(config: LedgerConfig) -> Self {
        Self::with_backends(
            Arc::new(MemoryAccountStore::new()),
            Arc::new(MemoryTransactionLog::new()),
            Arc::new(SystemClock),
            config,
        )
    }

    /// Create a ledger over caller-provided storage and clock
    pub fn with_backends(
        store: Arc<dyn AccountStore>,
        log: Arc<dyn TransactionLog>,
        clock: Arc<dyn Clock>,
        config: LedgerConfig,
    ) -> Self {
        let registry = Arc::new(InstrumentRegistry::new(
            Arc::clone(&clock),
            config.instrument_ttl,
        ));
        let journal = Arc::new(Journal::new(log));
        let transfers = TransferEngine::new(
            Arc::clone(&store),
            Arc::clone(&registry),
            Arc::clone(&journal),
            Arc::clone(&clock),
            config.max_commit_attempts,
        );
        let converter = PointConverter::new(
            Arc::clone(&store),
            Arc::clone(&journal),
            Arc::clone(&clock),
            config.conversion_rate,
            config.max_commit_attempts,
        );

        Self {
            store,
            registry,
            journal,
            transfers,
            converter,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn registry(&self) -> &InstrumentRegistry {
        &self.registry
    }

    /// Bind a card number to `user`
    pub fn register_instrument(
        &self,
        user: &UserId,
        instrument: &str,
    ) -> Result<Instrument, LedgerError> {
        self.registry.register(user, instrument)
    }

    /// Find the owner of a card number and whether the card has expired
    ///
    /// A malformed number cannot be registered, so it resolves to `None`.
    pub fn resolve_instrument(&self, instrument: &str) -> Option<Resolution> {
        self.registry.resolve(instrument).ok().flatten()
    }

    /// Move `amount` from `sender` to the owner of `recipient_instrument`
    pub fn transfer(
        &self,
        sender: &UserId,
        recipient_instrument: &str,
        amount: Decimal,
    ) -> Result<TransferReceipt, LedgerError> {
        self.transfers.transfer(sender, recipient_instrument, amount)
    }

    /// Convert reward points into balance at the configured rate
    pub fn convert_points(&self, user: &UserId, points: Decimal) -> Result<Receipt, LedgerError> {
        self.converter.convert(user, points)
    }

    /// Current balances of `user`
    ///
    /// A user that has never been written reads as all zeros.
    pub fn balance(&self, user: &UserId) -> Result<Balance, LedgerError> {
        let account = self
            .store
            .load(user)
            .map_err(|e| LedgerError::store_unavailable("balance", e))?
            .map(|versioned| versioned.value)
            .unwrap_or_else(|| Account::new(user.clone()));
        Ok(account.balances())
    }

    /// History of `user`, newest first
    pub fn transactions(&self, user: &UserId) -> Result<TransactionHistory, LedgerError> {
        self.journal
            .log()
            .query_by_user(user)
            .map_err(|e| LedgerError::store_unavailable("transactions", e))
    }

    /// Snapshot of every account, ordered by user
    pub fn accounts(&self) -> Result<Vec<Account>, LedgerError> {
        self.store
            .accounts()
            .map_err(|e| LedgerError::store_unavailable("accounts", e))
    }

    /// Credit reward points from an engagement event
    ///
    /// No history record is written; points are not currency.
    pub fn accrue_points(&self, user: &UserId, points: Decimal) -> Result<Balance, LedgerError> {
        if points <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(points));
        }

        let balance = run_transaction(
            self.store.as_ref(),
            "accrual",
            &[user],
            self.config.max_commit_attempts,
            |accounts| {
                let account = &mut accounts[0];
                account.reward_points = account
                    .reward_points
                    .checked_add(points)
                    .ok_or_else(|| LedgerError::arithmetic_overflow("accrual", user.as_str()))?;
                Ok(account.balances())
            },
        )?;

        info!(user = %user, %points, "points accrued");
        Ok(balance)
    }

    /// Credit funds from outside the ledger
    pub fn deposit(&self, user: &UserId, amount: Decimal) -> Result<Receipt, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(amount));
        }

        run_transaction(
            self.store.as_ref(),
            "deposit",
            &[user],
            self.config.max_commit_attempts,
            |accounts| {
                let account = &mut accounts[0];
                account.balance = account
                    .balance
                    .checked_add(amount)
                    .ok_or_else(|| LedgerError::arithmetic_overflow("deposit", user.as_str()))?;
                Ok(())
            },
        )?;

        info!(user = %user, %amount, "deposit committed");
        Ok(self.record_single(
            user,
            Entry::Deposit { amount },
            format!("Deposited {}", amount),
        ))
    }

    /// Debit funds to outside the ledger
    pub fn withdraw(&self, user: &UserId, amount: Decimal) -> Result<Receipt, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(amount));
        }

        run_transaction(
            self.store.as_ref(),
            "withdraw",
            &[user],
            self.config.max_commit_attempts,
            |accounts| {
                let account = &mut accounts[0];
                if account.balance < amount {
                    return Err(LedgerError::insufficient_funds(
                        user.as_str(),
                        account.balance,
                        amount,
                    ));
                }
                account.balance = account
                    .balance
                    .checked_sub(amount)
                    .ok_or_else(|| LedgerError::arithmetic_overflow("withdraw", user.as_str()))?;
                Ok(())
            },
        )?;

        info!(user = %user, %amount, "withdrawal committed");
        Ok(self.record_single(
            user,
            Entry::Withdraw { amount },
            format!("Withdrew {}", amount),
        ))
    }

    /// Route a replayed operation to the matching call
    ///
    /// A deferred history append is logged but does not fail the operation.
    pub fn execute(&self, operation: &Operation) -> Result<(), LedgerError> {
        let log_status = match operation {
            Operation::Deposit { user, amount } => self.deposit(user, *amount)?.log_status,
            Operation::Withdraw { user, amount } => self.withdraw(user, *amount)?.log_status,
            Operation::Accrue { user, points } => {
                self.accrue_points(user, *points)?;
                LogStatus::Recorded
            }
            Operation::Register { user, instrument } => {
                self.register_instrument(user, instrument)?;
                LogStatus::Recorded
            }
            Operation::Transfer {
                user,
                instrument,
                amount,
            } => self.transfer(user, instrument, *amount)?.log_status,
            Operation::Convert { user, points } => self.convert_points(user, *points)?.log_status,
        };

        if let LogStatus::Deferred { reason } = log_status {
            warn!(
                operation = operation.name(),
                user = %operation.user(),
                %reason,
                "operation committed with history pending"
            );
        }
        Ok(())
    }

    /// Retry history appends that failed after their commit
    ///
    /// Returns the number of records still pending.
    pub fn reconcile_log(&self) -> usize {
        self.journal.reconcile()
    }

    pub fn pending_log_records(&self) -> usize {
        self.journal.pending()
    }

    fn record_single(&self, user: &UserId, entry: Entry, note: String) -> Receipt {
        let record = TransactionRecord::new(user.clone(), entry, note, self.clock.now());
        let log_status = self.journal.record(std::slice::from_ref(&record));
        Receipt { record, log_status }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("registry", &self.registry)
            .field("journal", &self.journal)
            .field("config", &self.config)
            .finish()
    }
}
