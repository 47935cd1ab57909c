//! Replayable ledger operations
//!
//! One `Operation` is one call against the ledger, as read from a replay
//! file. Amounts are already parsed; card numbers are kept raw so that the
//! ledger reports format errors the same way it does for live callers.

use super::account::UserId;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Credit `amount` to `user`
    Deposit { user: UserId, amount: Decimal },

    /// Debit `amount` from `user`
    Withdraw { user: UserId, amount: Decimal },

    /// Credit `points` reward points to `user`
    Accrue { user: UserId, points: Decimal },

    /// Bind `instrument` to `user`
    Register { user: UserId, instrument: String },

    /// Send `amount` from `user` to the owner of `instrument`
    Transfer {
        user: UserId,
        instrument: String,
        amount: Decimal,
    },

    /// Convert `points` of `user`'s reward points
    Convert { user: UserId, points: Decimal },
}

impl Operation {
    /// The user initiating the operation
    pub fn user(&self) -> &UserId {
        match self {
            Operation::Deposit { user, .. }
            | Operation::Withdraw { user, .. }
            | Operation::Accrue { user, .. }
            | Operation::Register { user, .. }
            | Operation::Transfer { user, .. }
            | Operation::Convert { user, .. } => user,
        }
    }

    /// The card number the operation names, if any
    pub fn instrument(&self) -> Option<&str> {
        match self {
            Operation::Register { instrument, .. } | Operation::Transfer { instrument, .. } => {
                Some(instrument)
            }
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Deposit { .. } => "deposit",
            Operation::Withdraw { .. } => "withdraw",
            Operation::Accrue { .. } => "accrue",
            Operation::Register { .. } => "register",
            Operation::Transfer { .. } => "transfer",
            Operation::Convert { .. } => "convert",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let transfer = Operation::Transfer {
            user: UserId::from("alice"),
            instrument: "1234567890".to_string(),
            amount: Decimal::ONE,
        };
        assert_eq!(transfer.user().as_str(), "alice");
        assert_eq!(transfer.instrument(), Some("1234567890"));
        assert_eq!(transfer.name(), "transfer");

        let accrue = Operation::Accrue {
            user: UserId::from("bob"),
            points: Decimal::ONE,
        };
        assert_eq!(accrue.instrument(), None);
        assert_eq!(accrue.name(), "accrue");
    }
}
