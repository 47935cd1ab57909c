//! CSV format handling for replayed operations and ledger output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvOperation structure for deserialization
//! - Conversion from CSV records to domain operations
//! - Account and history output serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::core::parse_amount;
use crate::types::{Account, Operation, TransactionRecord, UserId};
use serde::Deserialize;
use std::io::Write;

/// CSV record structure for deserialization
///
/// Matches the input CSV format with columns: op, user, target, amount.
/// `target` is the card number for `register` and `transfer` and is empty
/// otherwise; `amount` is empty for `register`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvOperation {
    pub op: String,
    pub user: String,
    pub target: Option<String>,
    pub amount: Option<String>,
}

fn non_empty(field: Option<String>) -> Option<String> {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Convert a CsvOperation to an Operation
///
/// This function:
/// - Parses the op string (case insensitive)
/// - Requires a target for `register` and `transfer`
/// - Parses the amount as a strictly positive decimal where one is needed
///
/// # Returns
///
/// * `Ok(Operation)` - Successfully converted record
/// * `Err(String)` - Error message describing the conversion failure
pub fn convert_csv_record(csv_record: CsvOperation) -> Result<Operation, String> {
    let op = csv_record.op.trim().to_lowercase();
    let user_name = csv_record.user.trim();
    if user_name.is_empty() {
        return Err(format!("{} operation is missing a user", op));
    }
    let user = UserId::from(user_name);
    let raw_target = non_empty(csv_record.target);
    let raw_amount = non_empty(csv_record.amount);

    let amount = || -> Result<_, String> {
        let raw = raw_amount
            .as_deref()
            .ok_or_else(|| format!("{} operation for user {} requires an amount", op, user))?;
        parse_amount(raw).map_err(|e| format!("{} for user {}", e, user))
    };
    let target = || {
        raw_target
            .clone()
            .ok_or_else(|| format!("{} operation for user {} requires a target", op, user))
    };

    let operation = match op.as_str() {
        "deposit" => Operation::Deposit {
            amount: amount()?,
            user,
        },
        "withdraw" => Operation::Withdraw {
            amount: amount()?,
            user,
        },
        "accrue" => Operation::Accrue {
            points: amount()?,
            user,
        },
        "convert" => Operation::Convert {
            points: amount()?,
            user,
        },
        "register" => Operation::Register {
            instrument: target()?,
            user,
        },
        "transfer" => Operation::Transfer {
            instrument: target()?,
            amount: amount()?,
            user,
        },
        _ => {
            return Err(format!(
                "Invalid operation: '{}' for user {}",
                csv_record.op, user
            ))
        }
    };

    Ok(operation)
}

/// Write account states to CSV format
///
/// Writes accounts in CSV format with columns:
/// user, balance, reward_points, spent_points.
/// Accounts are sorted by user for deterministic output.
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["user", "balance", "reward_points", "spent_points"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted_accounts = accounts.to_vec();
    sorted_accounts.sort_by(|a, b| a.user.cmp(&b.user));

    for account in sorted_accounts {
        writer
            .write_record(&[
                account.user.to_string(),
                format!("{:.2}", account.balance),
                format!("{:.2}", account.reward_points),
                format!("{:.2}", account.spent_points),
            ])
            .map_err(|e| format!("Failed to write account record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

/// Write history records to CSV format
///
/// Columns: user, kind, counterparty, amount, note. Records are written in
/// the order given.
pub fn write_journal_csv(
    records: &[TransactionRecord],
    output: &mut dyn Write,
) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["user", "kind", "counterparty", "amount", "note"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    for record in records {
        writer
            .write_record(&[
                record.subject.to_string(),
                record.kind().to_string(),
                record
                    .counterparty()
                    .map(UserId::to_string)
                    .unwrap_or_default(),
                format!("{:.2}", record.amount()),
                record.note.clone(),
            ])
            .map_err(|e| format!("Failed to write history record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
