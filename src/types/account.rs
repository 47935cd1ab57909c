//! Account-related types for the card ledger
//!
//! This module defines the Account structure, the user identifier that keys
//! it, and the versioned wrapper the store uses for optimistic commits.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, stable user identifier
///
/// The ledger never interprets the contents; it only compares and orders them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        UserId(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        UserId(id)
    }
}

/// User account state
///
/// Holds the spendable balance, the reward-point balance and the audit
/// counter of points ever converted.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The owning user
    pub user: UserId,

    /// Spendable currency balance
    ///
    /// Never negative. Only the transfer engine, the point converter and
    /// the deposit/withdraw adjustments change it.
    pub balance: Decimal,

    /// Reward points accrued from engagement events
    ///
    /// Incremented by the external accrual input, decremented only by
    /// point conversion.
    pub reward_points: Decimal,

    /// Cumulative points ever converted into currency
    ///
    /// Monotonically non-decreasing audit figure.
    pub spent_points: Decimal,
}

impl Account {
    /// Create a new account with zero balances
    ///
    /// Accounts are created implicitly on first write, so this is the
    /// state every unknown user is read as.
    pub fn new(user: UserId) -> Self {
        Account {
            user,
            balance: Decimal::ZERO,
            reward_points: Decimal::ZERO,
            spent_points: Decimal::ZERO,
        }
    }

    /// Read-only view of the three balances
    pub fn balances(&self) -> Balance {
        Balance {
            balance: self.balance,
            reward_points: self.reward_points,
            spent_points: self.spent_points,
        }
    }
}

/// Snapshot of an account's balances as returned to display code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balance {
    pub balance: Decimal,
    pub reward_points: Decimal,
    pub spent_points: Decimal,
}

/// A value paired with the store version it was read at
///
/// Version `0` means the value was not present in the store; committing
/// against version `0` inserts it.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub version: u64,
}

impl<T> Versioned<T> {
    pub fn new(value: T, version: u64) -> Self {
        Versioned { value, version }
    }

    /// A value that does not exist in the store yet
    pub fn absent(value: T) -> Self {
        Versioned { value, version: 0 }
    }

    pub fn is_absent(&self) -> bool {
        self.version == 0
    }
}
