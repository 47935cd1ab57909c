//! Instrument (card) types for the card ledger
//!
//! A card is a 10-digit number bound to exactly one user. It addresses
//! transfer recipients and expires lazily a fixed time after registration.

use super::account::UserId;
use super::error::LedgerError;
use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::str::FromStr;

/// Number of ASCII digits in a card number
pub const INSTRUMENT_ID_LEN: usize = 10;

/// Validated card number
///
/// Always exactly ten ASCII digits. Leading zeros are significant, so the
/// identifier is kept as text rather than as an integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstrumentId(String);

impl InstrumentId {
    /// Parse a card number, rejecting anything but exactly ten digits
    pub fn parse(raw: &str) -> Result<Self, LedgerError> {
        if raw.len() == INSTRUMENT_ID_LEN && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(InstrumentId(raw.to_string()))
        } else {
            Err(LedgerError::invalid_instrument_format(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for InstrumentId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InstrumentId::parse(s)
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered card
///
/// The expiry is never stored; it is recomputed from `created_at` and the
/// configured time-to-live on every read.
#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    pub id: InstrumentId,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
}

impl Instrument {
    pub fn expires_at(&self, ttl: Duration) -> DateTime<Utc> {
        self.created_at + ttl
    }

    /// Whether the card is past its expiry at `now`
    ///
    /// The card is still valid at the exact expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now > self.expires_at(ttl)
    }
}

/// Result of resolving a card number to its owner
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub user: UserId,
    pub expired: bool,
    pub instrument: Instrument,
}
