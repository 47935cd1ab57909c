//! Core business logic module
//!
//! This module contains the ledger components:
//! - `traits` - Store, history and clock seams
//! - `account_store` - Versioned in-memory account storage
//! - `atomic` - Optimistic read-modify-commit with bounded retry
//! - `instrument_registry` - Card number bindings with lazy expiry
//! - `transaction_log` - Append-only history, queried newest first
//! - `journal` - History appends after commit, with reconciliation
//! - `transfer` - Card-addressed transfers between two accounts
//! - `conversion` - Reward point conversion
//! - `ledger` - Facade wiring the components together
//! - `batch_processor` - Concurrent replay of independent operations

pub mod account_store;
pub mod atomic;
pub mod batch_processor;
pub mod clock;
pub mod config;
pub mod conversion;
pub mod instrument_registry;
pub mod journal;
pub mod ledger;
pub mod traits;
pub mod transaction_log;
pub mod transfer;

pub use account_store::MemoryAccountStore;
pub use atomic::run_transaction;
pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use clock::{ManualClock, SystemClock};
pub use config::LedgerConfig;
pub use conversion::PointConverter;
pub use instrument_registry::InstrumentRegistry;
pub use journal::Journal;
pub use ledger::{parse_amount, Ledger};
pub use traits::{AccountStore, Clock, TransactionLog};
pub use transaction_log::{MemoryTransactionLog, TransactionHistory};
pub use transfer::TransferEngine;
