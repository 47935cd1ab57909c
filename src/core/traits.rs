//! Core traits for account storage, history storage, and time
//!
//! These are the seams between the ledger's logic and whatever backs it.
//! The crate ships in-memory implementations of each; a document or
//! relational store only needs to honour the same contracts.

use crate::core::transaction_log::TransactionHistory;
use crate::types::{Account, StoreError, TransactionRecord, UserId, Versioned};
use chrono::{DateTime, Utc};

/// Durable mapping of user to account state with transactional commits
///
/// Implementations must make [`AccountStore::commit`] all-or-nothing across
/// every account in the write set, and must compare each account's current
/// version with the version it was read at.
pub trait AccountStore: Send + Sync {
    /// Read the current state of an account
    ///
    /// Returns `None` if the account has never been written.
    fn load(&self, user: &UserId) -> Result<Option<Versioned<Account>>, StoreError>;

    /// Atomically write every account in `writes`
    ///
    /// Each entry carries the version it was read at (`0` for accounts that
    /// did not exist). If any account's current version differs, nothing is
    /// written and [`StoreError::Conflict`] is returned.
    fn commit(&self, writes: &[Versioned<Account>]) -> Result<(), StoreError>;

    /// Snapshot of every stored account
    fn accounts(&self) -> Result<Vec<Account>, StoreError>;
}

/// Append-only transaction history
///
/// There is intentionally no update or delete.
pub trait TransactionLog: Send + Sync {
    /// Write a record once
    ///
    /// Appending a record whose id is already present is a no-op, so an
    /// append that failed ambiguously can be retried safely.
    fn append(&self, record: &TransactionRecord) -> Result<(), StoreError>;

    /// All records filed under `user`, newest first
    fn query_by_user(&self, user: &UserId) -> Result<TransactionHistory, StoreError>;
}

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
