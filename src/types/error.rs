//! Error types for the card ledger
//!
//! This module defines all error types that can occur while operating the
//! ledger, plus the narrower error type of the account store seam.
//!
//! # Error Categories
//!
//! - **Validation Errors**: Bad amounts, malformed card numbers, self transfers.
//!   Detected before any write; nothing has changed when they are returned.
//! - **Balance Errors**: Insufficient funds or points, detected inside the
//!   atomic unit, which is then abandoned.
//! - **Store Errors**: Retry-exhausted conflicts, unavailable stores and
//!   commits whose outcome is unknown.
//! - **Replay Errors**: File I/O and CSV parsing for the command-line replay.

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the ledger
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Amount is not a positive decimal
    #[error("Invalid amount '{amount}': must be a positive decimal")]
    InvalidAmount {
        /// The rejected amount as given
        amount: String,
    },

    /// Card number is not exactly ten ASCII digits
    #[error("Invalid card number '{instrument}': expected exactly 10 digits")]
    InvalidInstrumentFormat {
        /// The rejected card number as given
        instrument: String,
    },

    /// Card number is already bound to another user
    #[error("Card {instrument} is already registered to another user")]
    InstrumentAlreadyRegistered {
        /// The contested card number
        instrument: String,
    },

    /// No user is bound to the recipient card
    #[error("No recipient found for card {instrument}")]
    RecipientNotFound {
        /// The card number that did not resolve
        instrument: String,
    },

    /// The recipient card belongs to the sender
    #[error("User {user} cannot transfer to their own card")]
    SelfTransferRejected {
        /// The sending (and receiving) user
        user: String,
    },

    /// Balance is lower than the requested debit
    ///
    /// The atomic unit is abandoned and no balance changes.
    #[error("Insufficient funds for user {user}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        user: String,
        balance: Decimal,
        requested: Decimal,
    },

    /// Reward points are lower than the requested conversion
    #[error("Insufficient points for user {user}: available {available}, requested {requested}")]
    InsufficientPoints {
        user: String,
        available: Decimal,
        requested: Decimal,
    },

    /// Optimistic commit kept conflicting with concurrent writers
    #[error("{operation} for user {user} gave up after {attempts} conflicting commit attempts")]
    TransferConflict {
        operation: String,
        user: String,
        attempts: u32,
    },

    /// Commit was issued but its outcome could not be determined
    ///
    /// Callers must reconcile through the balance or the history before
    /// retrying; a blind retry may apply the operation twice.
    #[error("Outcome of {operation} for user {user} is unknown: {reason}")]
    Unknown {
        operation: String,
        user: String,
        reason: String,
    },

    /// Store refused the call and nothing was applied
    #[error("Account store unavailable during {operation}: {reason}")]
    StoreUnavailable { operation: String, reason: String },

    /// A balance would exceed the decimal range
    #[error("Arithmetic overflow in {operation} for user {user}")]
    ArithmeticOverflow { operation: String, user: String },

    /// I/O error while reading or writing replay files
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Malformed replay row
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    Parse {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        message: String,
    },
}

/// Error type of the account store seam
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// An account changed since it was read; nothing was written
    #[error("Write conflict on account {user}")]
    Conflict { user: String },

    /// The call did not return in time; a commit may or may not have landed
    #[error("Store call timed out: {message}")]
    Timeout { message: String },

    /// The store rejected the call; nothing was written
    #[error("Store unavailable: {message}")]
    Unavailable { message: String },
}

impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::Io {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::Parse {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: impl ToString) -> Self {
        LedgerError::InvalidAmount {
            amount: amount.to_string(),
        }
    }

    /// Create an InvalidInstrumentFormat error
    pub fn invalid_instrument_format(instrument: &str) -> Self {
        LedgerError::InvalidInstrumentFormat {
            instrument: instrument.to_string(),
        }
    }

    /// Create an InstrumentAlreadyRegistered error
    pub fn instrument_already_registered(instrument: &str) -> Self {
        LedgerError::InstrumentAlreadyRegistered {
            instrument: instrument.to_string(),
        }
    }

    /// Create a RecipientNotFound error
    pub fn recipient_not_found(instrument: &str) -> Self {
        LedgerError::RecipientNotFound {
            instrument: instrument.to_string(),
        }
    }

    /// Create a SelfTransferRejected error
    pub fn self_transfer_rejected(user: &str) -> Self {
        LedgerError::SelfTransferRejected {
            user: user.to_string(),
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(user: &str, balance: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            user: user.to_string(),
            balance,
            requested,
        }
    }

    /// Create an InsufficientPoints error
    pub fn insufficient_points(user: &str, available: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientPoints {
            user: user.to_string(),
            available,
            requested,
        }
    }

    /// Create a TransferConflict error
    pub fn transfer_conflict(operation: &str, user: &str, attempts: u32) -> Self {
        LedgerError::TransferConflict {
            operation: operation.to_string(),
            user: user.to_string(),
            attempts,
        }
    }

    /// Create an Unknown error
    pub fn unknown(operation: &str, user: &str, reason: impl ToString) -> Self {
        LedgerError::Unknown {
            operation: operation.to_string(),
            user: user.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a StoreUnavailable error
    pub fn store_unavailable(operation: &str, reason: impl ToString) -> Self {
        LedgerError::StoreUnavailable {
            operation: operation.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, user: &str) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            user: user.to_string(),
        }
    }

    /// Whether the caller must reconcile before retrying
    pub fn is_unknown_outcome(&self) -> bool {
        matches!(self, LedgerError::Unknown { .. })
    }
}
