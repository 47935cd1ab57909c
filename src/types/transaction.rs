//! Transaction-related types for the card ledger
//!
//! This module defines the immutable transaction records that make up the
//! ledger's history, and the receipts returned by balance-affecting calls.

use super::account::UserId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Flat classification of a transaction record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Outgoing side of a transfer
    Send,
    /// Incoming side of a transfer
    Receive,
    /// Reward points converted into currency
    Conversion,
    /// Funds credited from outside the ledger
    Deposit,
    /// Funds debited to outside the ledger
    Withdraw,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Send => "send",
            TransactionKind::Receive => "receive",
            TransactionKind::Conversion => "conversion",
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdraw => "withdraw",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a transaction record did, with only the fields each kind needs
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// Sent `amount` to another user
    Send { to: UserId, amount: Decimal },

    /// Received `amount` from another user
    Receive { from: UserId, amount: Decimal },

    /// Converted `points` reward points into `amount` currency
    Conversion { points: Decimal, amount: Decimal },

    /// External credit
    Deposit { amount: Decimal },

    /// External debit
    Withdraw { amount: Decimal },
}

/// Immutable ledger history record
///
/// Filed under `subject`. A transfer produces a matched pair (one `Send`,
/// one `Receive`) sharing amount and timestamp; every other operation
/// produces a single record.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub subject: UserId,
    pub entry: Entry,
    /// Informational description for display
    pub note: String,
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Create a record with a fresh identifier
    pub fn new(
        subject: UserId,
        entry: Entry,
        note: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        TransactionRecord {
            id: Uuid::new_v4(),
            subject,
            entry,
            note: note.into(),
            created_at,
        }
    }

    pub fn kind(&self) -> TransactionKind {
        match self.entry {
            Entry::Send { .. } => TransactionKind::Send,
            Entry::Receive { .. } => TransactionKind::Receive,
            Entry::Conversion { .. } => TransactionKind::Conversion,
            Entry::Deposit { .. } => TransactionKind::Deposit,
            Entry::Withdraw { .. } => TransactionKind::Withdraw,
        }
    }

    /// Currency amount moved by this record (always positive)
    pub fn amount(&self) -> Decimal {
        match &self.entry {
            Entry::Send { amount, .. }
            | Entry::Receive { amount, .. }
            | Entry::Conversion { amount, .. }
            | Entry::Deposit { amount }
            | Entry::Withdraw { amount } => *amount,
        }
    }

    pub fn counterparty(&self) -> Option<&UserId> {
        match &self.entry {
            Entry::Send { to, .. } => Some(to),
            Entry::Receive { from, .. } => Some(from),
            Entry::Conversion { .. } | Entry::Deposit { .. } | Entry::Withdraw { .. } => None,
        }
    }
}

/// Whether the history records of a committed operation reached the log
///
/// `Deferred` is a warning, not a failure: the balance change is committed
/// and the records wait in the ledger's reconciliation queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogStatus {
    Recorded,
    Deferred { reason: String },
}

impl LogStatus {
    pub fn is_recorded(&self) -> bool {
        matches!(self, LogStatus::Recorded)
    }
}

/// Outcome of a committed transfer
#[derive(Debug, Clone, PartialEq)]
pub struct TransferReceipt {
    pub sender_record: TransactionRecord,
    pub recipient_record: TransactionRecord,
    pub log_status: LogStatus,
}

/// Outcome of a committed single-record operation
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub record: TransactionRecord,
    pub log_status: LogStatus,
}
