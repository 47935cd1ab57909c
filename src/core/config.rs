//! Ledger configuration

use chrono::Duration;
use rust_decimal::Decimal;

/// Tunables shared by the ledger's components
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    /// Currency units credited per converted reward point
    pub conversion_rate: Decimal,

    /// Commit attempts before an optimistic conflict is surfaced
    pub max_commit_attempts: u32,

    /// How long a card stays valid after (re-)registration
    pub instrument_ttl: Duration,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            conversion_rate: Decimal::TEN,
            max_commit_attempts: 5,
            instrument_ttl: Duration::hours(48),
        }
    }
}

impl LedgerConfig {
    /// Create a config with custom rate and retry budget
    ///
    /// A non-positive rate or a zero attempt budget falls back to the default.
    pub fn new(conversion_rate: Decimal, max_commit_attempts: u32) -> Self {
        let default = Self::default();

        let conversion_rate = if conversion_rate <= Decimal::ZERO {
            tracing::warn!(
                %conversion_rate,
                default = %default.conversion_rate,
                "invalid conversion rate, using default"
            );
            default.conversion_rate
        } else {
            conversion_rate
        };

        let max_commit_attempts = if max_commit_attempts == 0 {
            tracing::warn!(
                default = default.max_commit_attempts,
                "invalid max_commit_attempts (0), using default"
            );
            default.max_commit_attempts
        } else {
            max_commit_attempts
        };

        Self {
            conversion_rate,
            max_commit_attempts,
            ..default
        }
    }
}
