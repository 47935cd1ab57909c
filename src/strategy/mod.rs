//! Processing strategy module for scripted replay
//!
//! This module defines the Strategy pattern for complete replay pipelines,
//! encompassing CSV parsing, ledger execution and output. This allows
//! different implementations (synchronous, asynchronous batch) to be
//! selected at runtime.

use crate::cli::StrategyType;
use crate::core::{Ledger, LedgerConfig};
use crate::io::csv_format::{write_accounts_csv, write_journal_csv};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete replay pipelines
pub trait ProcessingStrategy: Send + Sync {
    /// Replay operations from `input_path` and write account states to `output`
    ///
    /// # Errors
    ///
    /// Returns an error if the input file cannot be opened or an output
    /// cannot be written.
    ///
    /// Malformed rows and rejected operations are logged and skipped; they
    /// never cause this method to return an error.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String>;
}

/// Settings shared by every strategy
#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    pub ledger: LedgerConfig,

    /// Where to write every account's history, if anywhere
    pub journal_path: Option<PathBuf>,
}

/// Running totals of a replay
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ReplayStats {
    pub applied: usize,
    pub rejected: usize,
    pub malformed: usize,
}

impl ReplayStats {
    pub(crate) fn log(&self) {
        info!(
            applied = self.applied,
            rejected = self.rejected,
            malformed = self.malformed,
            "replay finished"
        );
    }
}

/// Create a processing strategy based on the specified strategy type
///
/// `config` is only used by the async strategy.
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
    options: ReplayOptions,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(options)),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config, options))
        }
    }
}

/// Flush pending history, then write the account states and the journal
pub(crate) fn write_outputs(
    ledger: &Ledger,
    options: &ReplayOptions,
    output: &mut dyn Write,
) -> Result<(), String> {
    let pending = ledger.reconcile_log();
    if pending > 0 {
        warn!(pending, "history records still pending after reconciliation");
    }

    let accounts = ledger.accounts().map_err(|e| e.to_string())?;
    write_accounts_csv(&accounts, output)?;

    if let Some(path) = &options.journal_path {
        let mut records = Vec::new();
        for account in &accounts {
            records.extend(ledger.transactions(&account.user).map_err(|e| e.to_string())?);
        }

        let mut file = File::create(path)
            .map_err(|e| format!("Failed to create journal '{}': {}", path.display(), e))?;
        write_journal_csv(&records, &mut file)?;
    }

    Ok(())
}
