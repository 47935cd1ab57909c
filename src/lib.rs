//! Card Ledger Library
//! # Overview
//!
//! A multi-user ledger in which users hold a currency balance and reward
//! points, bind a 10-digit card number to their account, and move money to
//! each other by card number. Every balance-affecting call commits
//! atomically under optimistic concurrency and leaves an append-only
//! history.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Account, TransactionRecord, errors, etc.)
//! - [`core`] - Business logic components:
//!   - [`core::ledger`] - The facade collaborators call
//!   - [`core::account_store`] - Versioned account storage with atomic multi-account commits
//!   - [`core::instrument_registry`] - Card bindings with lazy 48-hour expiry
//!   - [`core::transfer`] - Card-addressed transfers
//!   - [`core::conversion`] - Reward point conversion
//!   - [`core::transaction_log`] - Append-only history, newest first
//! - [`io`] - CSV replay input and account/history output
//! - [`strategy`] - Sync and async replay pipelines
//! - [`cli`] - CLI arguments parsing
//!
//! # Example
//!
//! ```
//! use card_ledger::{Ledger, UserId};
//! use rust_decimal::Decimal;
//!
//! let ledger = Ledger::default();
//! let (alice, bob) = (UserId::from("alice"), UserId::from("bob"));
//!
//! ledger.deposit(&alice, Decimal::new(1000, 0)).unwrap();
//! ledger.register_instrument(&bob, "2222222222").unwrap();
//! ledger.transfer(&alice, "2222222222", Decimal::new(400, 0)).unwrap();
//!
//! assert_eq!(ledger.balance(&alice).unwrap().balance, Decimal::new(600, 0));
//! assert_eq!(ledger.balance(&bob).unwrap().balance, Decimal::new(400, 0));
//! ```

pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod telemetry;
pub mod types;

pub use core::{Ledger, LedgerConfig};
pub use io::write_accounts_csv;
pub use types::{
    Account, Balance, Entry, InstrumentId, LedgerError, LogStatus, Receipt, TransactionKind,
    TransactionRecord, TransferReceipt, UserId,
};
