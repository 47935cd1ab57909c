//! Types module
//!
//! Contains core data structures used throughout the ledger.
//! This module organizes types into logical submodules:
//! - `account`: Account state and user identifiers
//! - `instrument`: Card identifiers and registrations
//! - `transaction`: Transaction records and their entries
//! - `operation`: Replayable ledger operations
//! - `error`: Error types for the ledger and its store seam

pub mod account;
pub mod error;
pub mod instrument;
pub mod operation;
pub mod transaction;

pub use account::{Account, Balance, UserId, Versioned};
pub use error::{LedgerError, StoreError};
pub use instrument::{Instrument, InstrumentId, Resolution};
pub use operation::Operation;
pub use transaction::{
    Entry, LogStatus, Receipt, TransactionKind, TransactionRecord, TransferReceipt,
};
